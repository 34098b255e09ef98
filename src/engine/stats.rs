//! Post-run stats: the platform's own entered/total counter.

use tracing::{debug, warn};

use crate::markup;
use crate::session::{RaffleSession, LISTING_PATH};
use crate::types::{RaffleResult, RaffleStats};

/// Fetch the listing page and read its stats box.
///
/// `Ok(None)` means the page loaded but the counter was missing or could not
/// be parsed.
pub async fn fetch_stats(session: &dyn RaffleSession) -> RaffleResult<Option<RaffleStats>> {
    let page = session.get_page(LISTING_PATH).await?;
    let stats = markup::parse_stats(&page);

    match stats {
        Some(s) => debug!(entered = s.entered, total = s.total, "Raffle stats read"),
        None => warn!("Raffle stats box not found on listing page"),
    }
    Ok(stats)
}
