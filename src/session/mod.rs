//! Session layer.
//!
//! Defines the `RaffleSession` trait every engine call goes through, and
//! provides:
//! - `HttpSession` — reqwest client with a persisted cookie jar and identity
//! - `cookies` / `identity` — loading and saving of the on-disk session files

pub mod cookies;
pub mod http;
pub mod identity;

use async_trait::async_trait;

use crate::types::RaffleResult;

/// Main listing page; carries the session CSRF token and the stats box.
pub const LISTING_PATH: &str = "/raffles";
/// Listing pagination endpoint.
pub const PAGINATE_PATH: &str = "/ajax/raffles/Paginate";
/// Entry submission endpoint.
pub const ENTER_PATH: &str = "/ajax/viewraffle/EnterRaffle";

/// Detail page path for a raffle id (already canonical).
pub fn detail_path(raffle_id: &str) -> String {
    format!("{LISTING_PATH}/{}", urlencoding::encode(raffle_id))
}

/// Capability handle for talking to the raffle platform.
///
/// Implementors own cookie state and identity headers. One orchestrator uses
/// a session at a time, so no interior locking is expected beyond what the
/// HTTP client already does.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RaffleSession: Send + Sync {
    /// GET a page relative to the platform root and return its body.
    async fn get_page(&self, path: &str) -> RaffleResult<String>;

    /// POST url-encoded form fields and return the response body.
    async fn post_form(&self, path: &str, fields: &[(&'static str, String)]) -> RaffleResult<String>;
}
