//! Entry submitter.
//!
//! One call enters one raffle: fetch its detail page, scrape a fresh CSRF
//! token and the enter button's action hash, post the entry and interpret
//! the platform's verdict. Nothing is retried here; the orchestrator decides
//! what happens after a failure.

use serde_json::Value;
use tracing::{info, warn};

use crate::markup;
use crate::session::{detail_path, RaffleSession, ENTER_PATH};
use crate::types::{EntryOutcome, RaffleError, RaffleId, RaffleResult};

/// Attempt to enter `raffle_id`.
///
/// Every failure is folded into the returned [`EntryOutcome`].
pub async fn enter(session: &dyn RaffleSession, raffle_id: &RaffleId) -> EntryOutcome {
    info!(raffle = %raffle_id, "Attempting to enter raffle");

    match try_enter(session, raffle_id).await {
        Ok(outcome) => outcome,
        Err(e) => {
            warn!(raffle = %raffle_id, error = %e, "Entry attempt failed before a verdict");
            EntryOutcome::ProtocolError(e)
        }
    }
}

async fn try_enter(session: &dyn RaffleSession, raffle_id: &RaffleId) -> RaffleResult<EntryOutcome> {
    let page = session.get_page(&detail_path(raffle_id.as_str())).await?;

    let csrf = markup::extract_csrf_token(&page).ok_or_else(|| {
        RaffleError::TokenMissing(format!("CSRF token not found on raffle page {raffle_id}"))
    })?;
    let hash = markup::extract_action_hash(&page).ok_or_else(|| {
        RaffleError::TokenMissing(format!("enter button hash not found on raffle page {raffle_id}"))
    })?;

    let fields = [
        ("raffle", raffle_id.to_string()),
        ("hash", hash),
        ("csrf", csrf.expose().to_string()),
    ];
    let body = session.post_form(ENTER_PATH, &fields).await?;

    interpret_response(&body)
}

/// Turn the entry response into an outcome.
///
/// Only a strict boolean `true` counts as success; a `success` field of any
/// other type is treated as a rejection.
fn interpret_response(body: &str) -> RaffleResult<EntryOutcome> {
    let json: Value = serde_json::from_str(body)
        .map_err(|e| RaffleError::MalformedResponse(format!("entry response is not JSON: {e}")))?;

    let (Some(success), Some(message)) = (json.get("success"), json.get("message")) else {
        return Err(RaffleError::MalformedResponse(
            "entry response is missing success or message".into(),
        ));
    };

    let message = match message {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    info!(message = %message, "Platform response");

    Ok(match success {
        Value::Bool(true) => EntryOutcome::Success,
        _ => EntryOutcome::Rejected(message),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
