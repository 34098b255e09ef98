//! Shared types for the raffle runner.
//!
//! The engine, markup, and session modules all speak in these types so the
//! orchestrator can compose them without knowing how pages are fetched.

use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use std::fmt;

// ---------------------------------------------------------------------------
// RaffleId
// ---------------------------------------------------------------------------

/// Identifier of a single raffle, always held in canonical uppercase form.
///
/// The platform treats ids case-insensitively but only the uppercase form is
/// accepted in detail URLs and entry payloads, so canonicalization happens at
/// construction and every later use is verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RaffleId(String);

impl RaffleId {
    /// Canonicalize a raw identifier. Returns `None` for blank input.
    pub fn new(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self(trimmed.to_uppercase()))
    }

    /// Recover the id from a panel element identifier such as
    /// `panel-raffle-AB12CD` (the segment after the last `-`).
    pub fn from_element_id(element_id: &str) -> Option<Self> {
        element_id.rsplit('-').next().and_then(Self::new)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RaffleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One raffle as seen on the listing, with the listing's own entered marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RaffleSummary {
    pub id: RaffleId,
    /// May be stale by the time an entry is attempted.
    pub entered: bool,
}

impl RaffleSummary {
    pub fn new(id: RaffleId, entered: bool) -> Self {
        Self { id, entered }
    }
}

// ---------------------------------------------------------------------------
// Token
// ---------------------------------------------------------------------------

/// Anti-forgery token scraped from a page.
///
/// Wrapped in a secret so it never shows up in `Debug` output or logs.
#[derive(Debug)]
pub struct Token(SecretString);

impl Token {
    pub fn new(value: String) -> Self {
        Self(SecretString::new(value))
    }

    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// Result of a single entry attempt. Nothing is retried automatically.
#[derive(Debug, Clone, PartialEq)]
pub enum EntryOutcome {
    Success,
    /// The platform answered but did not confirm the entry.
    Rejected(String),
    /// No verdict was obtained: missing token, unexpected markup or response
    /// shape, or the request itself failed.
    ProtocolError(RaffleError),
}

impl EntryOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, EntryOutcome::Success)
    }

    /// Human-readable reason for a non-success outcome.
    pub fn reason(&self) -> Option<String> {
        match self {
            EntryOutcome::Success => None,
            EntryOutcome::Rejected(message) => Some(message.clone()),
            EntryOutcome::ProtocolError(e) => Some(e.to_string()),
        }
    }
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum RunStatus {
    /// Every unentered raffle was entered.
    Completed,
    /// An entry attempt did not succeed; later raffles were not attempted.
    StoppedOnFailure { raffle: RaffleId, reason: String },
    /// Cancelled by the user; counts reflect progress so far.
    Cancelled,
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunStatus::Completed => write!(f, "completed"),
            RunStatus::StoppedOnFailure { raffle, reason } => {
                write!(f, "stopped at {raffle}: {reason}")
            }
            RunStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Aggregate of one orchestration pass.
///
/// Serializes to the JSON run summary printed when JSON logging is enabled.
#[derive(Debug, Clone, Serialize)]
pub struct RunResult {
    /// Raffles entered during this run.
    pub new_entries: usize,
    /// Already-entered raffles plus `new_entries`.
    pub total_entered: usize,
    /// Raffles found on the listing (0 if cancelled before enumeration).
    pub total_raffles: usize,
    pub status: RunStatus,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl fmt::Display for RunResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} newly entered, {}/{} entered ({})",
            self.new_entries, self.total_entered, self.total_raffles, self.status,
        )
    }
}

/// The platform's own "entered / total" counter from the listing page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RaffleStats {
    pub entered: u32,
    pub total: u32,
}

impl fmt::Display for RaffleStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.entered, self.total)
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Domain errors for listing, entry, and session calls.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RaffleError {
    #[error("Token missing: {0}")]
    TokenMissing(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Rejected by platform: {0}")]
    UpstreamRejected(String),

    #[error("Transport failure: {0}")]
    Transport(String),
}

impl From<reqwest::Error> for RaffleError {
    fn from(e: reqwest::Error) -> Self {
        RaffleError::Transport(e.to_string())
    }
}

pub type RaffleResult<T> = std::result::Result<T, RaffleError>;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
