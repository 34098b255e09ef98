//! Markup scraping for the raffle pages.
//!
//! Everything here is pure: each function takes a page body (or a fragment
//! of one) and returns what it found. The scanning rules mirror how the
//! platform renders its pages, so they are deliberately literal: the first
//! script block carrying the token marker wins, and the token ends at the
//! first line break after the assignment.

use scraper::{Html, Selector};
use std::sync::LazyLock;

use crate::types::{RaffleError, RaffleId, RaffleResult, RaffleStats, RaffleSummary, Token};

// ---------------------------------------------------------------------------
// Selectors and markers
// ---------------------------------------------------------------------------

/// Script assignment that carries the session CSRF token.
pub const CSRF_MARKER: &str = "ScrapTF.User.Hash";

/// Class present on every raffle panel in a listing.
const PANEL_CLASS: &str = "panel-raffle";

/// Extra class on panels the account has already entered.
const ENTERED_CLASS: &str = "raffle-entered";

static SCRIPT: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("script").expect("valid selector"));
static ENTER_BUTTON: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("button#raffle-enter").expect("valid selector"));
static PANEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.panel-raffle").expect("valid selector"));
static STAT_HEADING: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.raffle-list-stat h1").expect("valid selector"));

// ---------------------------------------------------------------------------
// CSRF token
// ---------------------------------------------------------------------------

/// Pull the CSRF token out of a page's embedded scripts.
///
/// Returns `None` when no script mentions [`CSRF_MARKER`] or when the first
/// one that does has no usable assignment after it.
pub fn extract_csrf_token(html: &str) -> Option<Token> {
    let document = Html::parse_document(html);
    let script = document
        .select(&SCRIPT)
        .map(|s| s.text().collect::<String>())
        .find(|content| content.contains(CSRF_MARKER))?;

    assignment_value(&script, CSRF_MARKER).map(Token::new)
}

/// Value assigned after `marker`: from the first `=` up to the next line
/// break, with whitespace, the statement terminator and quotes removed.
fn assignment_value(content: &str, marker: &str) -> Option<String> {
    let after_marker = &content[content.find(marker)? + marker.len()..];
    let after_eq = &after_marker[after_marker.find('=')? + 1..];
    let line = after_eq.split('\n').next().unwrap_or_default();

    let value = strip_quotes(line.trim().trim_end_matches(';'));
    (!value.is_empty()).then_some(value)
}

fn strip_quotes(raw: &str) -> String {
    raw.replace(['"', '\''], "").trim().to_string()
}

// ---------------------------------------------------------------------------
// Enter button
// ---------------------------------------------------------------------------

/// Find the enter button on a raffle detail page and recover its action hash.
pub fn extract_action_hash(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let onclick = document
        .select(&ENTER_BUTTON)
        .next()?
        .value()
        .attr("onclick")?
        .to_string();

    parse_action_hash(&onclick)
}

/// Second argument of a call-like descriptor, e.g.
/// `ScrapTF.Raffles.EnterRaffle('AB12CD', 'f00d', 0)` gives `f00d`.
pub fn parse_action_hash(descriptor: &str) -> Option<String> {
    let args = &descriptor[descriptor.find('(')? + 1..];
    let args = &args[..args.find(')')?];
    let hash = strip_quotes(args.split(',').nth(1)?);
    (!hash.is_empty()).then_some(hash)
}

// ---------------------------------------------------------------------------
// Listing panels
// ---------------------------------------------------------------------------

/// Parse every raffle panel in a listing fragment, in document order.
///
/// A panel whose element id carries no raffle id means the listing markup
/// changed shape, which is reported rather than skipped.
pub fn parse_raffle_panels(fragment: &str) -> RaffleResult<Vec<RaffleSummary>> {
    let document = Html::parse_fragment(fragment);

    document
        .select(&PANEL)
        .map(|panel| -> RaffleResult<RaffleSummary> {
            let element = panel.value();
            let id = element
                .id()
                .and_then(RaffleId::from_element_id)
                .ok_or_else(|| {
                    RaffleError::MalformedResponse(format!(
                        "{PANEL_CLASS} element without a raffle id"
                    ))
                })?;
            let entered = element.classes().any(|c| c == ENTERED_CLASS);
            Ok(RaffleSummary::new(id, entered))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Stats box
// ---------------------------------------------------------------------------

/// Read the "entered / total" counter shown on the main listing page.
pub fn parse_stats(html: &str) -> Option<RaffleStats> {
    let document = Html::parse_document(html);
    let text: String = document.select(&STAT_HEADING).next()?.text().collect();

    let (entered, total) = text.split_once('/')?;
    Some(RaffleStats {
        entered: entered.trim().parse().ok()?,
        total: total.trim().parse().ok()?,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
