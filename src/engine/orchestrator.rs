//! Entry orchestrator — the listing → filter → enter loop.
//!
//! A run fetches the main listing for its CSRF token, enumerates every open
//! raffle, and enters the unentered ones oldest first, one at a time, with a
//! fixed delay between attempts. The first attempt that does not succeed
//! ends the loop: a rejection usually means the account is rate limited or
//! blocked, and continuing would only pile up more rejections.

use chrono::{DateTime, Utc};
use std::time::Duration;
use tracing::{info, warn};

use super::cancel::CancelToken;
use super::{paginator, submitter};
use crate::markup;
use crate::session::{RaffleSession, LISTING_PATH};
use crate::types::{EntryOutcome, RaffleError, RaffleId, RaffleResult, RunResult, RunStatus};

// ---------------------------------------------------------------------------
// Running counts
// ---------------------------------------------------------------------------

struct Tally {
    new_entries: usize,
    total_entered: usize,
    total_raffles: usize,
    started_at: DateTime<Utc>,
}

impl Tally {
    fn new() -> Self {
        Self {
            new_entries: 0,
            total_entered: 0,
            total_raffles: 0,
            started_at: Utc::now(),
        }
    }

    fn finish(self, status: RunStatus) -> RunResult {
        RunResult {
            new_entries: self.new_entries,
            total_entered: self.total_entered,
            total_raffles: self.total_raffles,
            status,
            started_at: self.started_at,
            finished_at: Utc::now(),
        }
    }
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

pub struct EntryOrchestrator {
    entry_delay: Duration,
}

impl EntryOrchestrator {
    pub fn new(entry_delay: Duration) -> Self {
        Self { entry_delay }
    }

    /// Run one full pass.
    ///
    /// Fails only when no raffle could be attempted: the listing token is
    /// missing or enumeration failed. Cancellation and entry failures end
    /// the pass normally with the counts reached so far.
    pub async fn run(
        &self,
        session: &dyn RaffleSession,
        cancel: &CancelToken,
    ) -> RaffleResult<RunResult> {
        let mut tally = Tally::new();

        if cancel.is_cancelled() {
            return Ok(tally.finish(RunStatus::Cancelled));
        }

        let page = session.get_page(LISTING_PATH).await?;
        let token = markup::extract_csrf_token(&page).ok_or_else(|| {
            RaffleError::TokenMissing("CSRF token not found on main listing page".into())
        })?;

        if cancel.is_cancelled() {
            info!("Cancelled before enumerating raffles");
            return Ok(tally.finish(RunStatus::Cancelled));
        }

        let raffles = paginator::enumerate_all(session, &token).await?;
        tally.total_raffles = raffles.len();

        // Listing order is newest first; entering runs oldest first.
        let mut queue: Vec<RaffleId> = Vec::new();
        for raffle in raffles {
            if raffle.entered {
                tally.total_entered += 1;
            } else {
                queue.push(raffle.id);
            }
        }
        queue.reverse();

        info!(
            total = tally.total_raffles,
            already_entered = tally.total_entered,
            to_enter = queue.len(),
            "Raffles discovered"
        );

        if cancel.is_cancelled() {
            info!("Cancelled before entering raffles");
            return Ok(tally.finish(RunStatus::Cancelled));
        }

        let status = self.enter_queue(session, cancel, &queue, &mut tally).await;
        Ok(tally.finish(status))
    }

    async fn enter_queue(
        &self,
        session: &dyn RaffleSession,
        cancel: &CancelToken,
        queue: &[RaffleId],
        tally: &mut Tally,
    ) -> RunStatus {
        for (i, raffle) in queue.iter().enumerate() {
            if cancel.is_cancelled() {
                info!(raffle = %raffle, "Cancelled, halting before next entry");
                return RunStatus::Cancelled;
            }

            match submitter::enter(session, raffle).await {
                EntryOutcome::Success => {
                    tally.new_entries += 1;
                    tally.total_entered += 1;
                    info!(
                        raffle = %raffle,
                        "{}/{} raffles entered",
                        tally.total_entered,
                        tally.total_raffles
                    );
                }
                outcome => {
                    let reason = outcome.reason().unwrap_or_default();
                    warn!(raffle = %raffle, reason = %reason, "Failed to enter raffle, stopping");
                    return RunStatus::StoppedOnFailure {
                        raffle: raffle.clone(),
                        reason,
                    };
                }
            }

            if i + 1 < queue.len() {
                if cancel.is_cancelled() {
                    info!("Cancelled, halting after entry");
                    return RunStatus::Cancelled;
                }
                info!(delay_secs = self.entry_delay.as_secs_f64(), "Waiting before next entry");
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => {
                        info!("Cancelled during delay");
                        return RunStatus::Cancelled;
                    }
                    _ = tokio::time::sleep(self.entry_delay) => {}
                }
            }
        }

        RunStatus::Completed
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
