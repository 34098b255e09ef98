//! Listing paginator.
//!
//! Walks the raffle listing backward in time. Each page is requested with
//! the id of the oldest raffle seen so far as the cursor; the platform
//! answers with the next batch of older raffles and a `done` flag.

use serde_json::Value;
use tracing::{debug, info};

use crate::markup;
use crate::session::{RaffleSession, PAGINATE_PATH};
use crate::types::{RaffleError, RaffleId, RaffleResult, RaffleSummary, Token};

/// Sort order requested from the listing (newest first).
const SORT_NEWEST: &str = "0";
/// Puzzle raffles are excluded from the listing.
const PUZZLE_FILTER: &str = "0";

/// One batch of the listing, newest first.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingPage {
    pub raffles: Vec<RaffleSummary>,
    pub more_available: bool,
}

/// Fetch the batch of raffles older than `cursor` (or the newest batch when
/// `cursor` is `None`).
pub async fn fetch_page(
    session: &dyn RaffleSession,
    token: &Token,
    cursor: Option<&RaffleId>,
) -> RaffleResult<ListingPage> {
    let fields = [
        ("start", cursor.map(|c| c.to_string()).unwrap_or_default()),
        ("sort", SORT_NEWEST.to_string()),
        ("puzzle", PUZZLE_FILTER.to_string()),
        ("csrf", token.expose().to_string()),
    ];

    let body = session.post_form(PAGINATE_PATH, &fields).await?;
    parse_page(&body)
}

/// Interpret a pagination response body.
fn parse_page(body: &str) -> RaffleResult<ListingPage> {
    let json: Value = serde_json::from_str(body)
        .map_err(|e| RaffleError::MalformedResponse(format!("pagination body is not JSON: {e}")))?;

    let obj = json
        .as_object()
        .ok_or_else(|| RaffleError::MalformedResponse("pagination body is not an object".into()))?;

    if obj.get("success") != Some(&Value::Bool(true)) {
        let message = obj
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("listing page request was not successful");
        return Err(RaffleError::UpstreamRejected(message.to_string()));
    }

    let html = obj
        .get("html")
        .and_then(Value::as_str)
        .ok_or_else(|| RaffleError::MalformedResponse("pagination response has no html".into()))?;
    let done = obj
        .get("done")
        .and_then(Value::as_bool)
        .ok_or_else(|| RaffleError::MalformedResponse("pagination response has no done flag".into()))?;

    Ok(ListingPage {
        raffles: markup::parse_raffle_panels(html)?,
        more_available: !done,
    })
}

/// Collect every open raffle, newest first.
///
/// Stops as soon as the platform reports no more pages. A batch that claims
/// more pages but would not advance the cursor (empty, or ending on the
/// cursor it was requested with) is treated as a malformed response.
pub async fn enumerate_all(
    session: &dyn RaffleSession,
    token: &Token,
) -> RaffleResult<Vec<RaffleSummary>> {
    let mut raffles: Vec<RaffleSummary> = Vec::new();
    let mut pages = 0usize;

    loop {
        let cursor = raffles.last().map(|r| r.id.clone());
        let page = fetch_page(session, token, cursor.as_ref()).await?;
        pages += 1;

        debug!(
            page = pages,
            cursor = cursor.as_ref().map(RaffleId::as_str).unwrap_or(""),
            batch = page.raffles.len(),
            more = page.more_available,
            "Listing batch fetched"
        );

        if page.raffles.is_empty() && page.more_available {
            return Err(RaffleError::MalformedResponse(
                "empty listing batch while more pages were reported".into(),
            ));
        }

        let last = page.raffles.last().map(|r| &r.id);
        if page.more_available && cursor.is_some() && last == cursor.as_ref() {
            return Err(RaffleError::MalformedResponse(format!(
                "listing batch did not advance past cursor {}",
                cursor.as_ref().map(RaffleId::as_str).unwrap_or("")
            )));
        }

        raffles.extend(page.raffles);
        if !page.more_available {
            break;
        }
    }

    info!(pages, total = raffles.len(), "Listing enumerated");
    Ok(raffles)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
