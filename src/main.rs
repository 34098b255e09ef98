//! raffle-runner — enters every open raffle with a persisted session.
//!
//! Entry point. Loads configuration, initialises structured logging,
//! restores the cookie jar and identity, runs one entry pass with Ctrl+C
//! cancellation, reports the platform's stats, and saves the cookie jar.

use anyhow::Result;
use tracing::{error, info, warn};

use raffle_runner::config::AppConfig;
use raffle_runner::engine::stats::fetch_stats;
use raffle_runner::engine::{CancelToken, EntryOrchestrator};
use raffle_runner::session::cookies::{load_cookie_jar, save_cookie_jar};
use raffle_runner::session::http::HttpSession;
use raffle_runner::session::identity::load_user_agent;
use raffle_runner::types::RunStatus;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    init_logging();

    let cfg = AppConfig::load_or_default()?;
    let base_url = cfg.base_url()?;

    // -- Session ---------------------------------------------------------

    let jar = load_cookie_jar(&cfg.session.cookies_path, &base_url)?;
    let user_agent = load_user_agent(&cfg.session.user_agent_path, &cfg.session.default_user_agent)?;
    info!(user_agent = %user_agent, "Identity configured");

    let session = HttpSession::new(base_url.clone(), jar, &user_agent, cfg.request_timeout())?;

    // -- Cancellation ----------------------------------------------------

    let cancel = CancelToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Interrupt detected, halting after the current step...");
                cancel.cancel();
            }
        });
    }

    // -- Run -------------------------------------------------------------

    let orchestrator = EntryOrchestrator::new(cfg.entry_delay());
    info!(
        base_url = %base_url,
        delay_secs = cfg.run.entry_delay_secs,
        "Starting raffle run. Press Ctrl+C to stop."
    );

    let json_summary = json_logging();
    let run_error = match orchestrator.run(&session, &cancel).await {
        Ok(result) => {
            info!(
                new = result.new_entries,
                entered = result.total_entered,
                total = result.total_raffles,
                status = %result.status,
                "Run finished"
            );
            if let RunStatus::StoppedOnFailure { raffle, reason } = &result.status {
                warn!(raffle = %raffle, reason = %reason, "Stopped early");
            }
            if json_summary {
                match serde_json::to_string(&result) {
                    Ok(summary) => info!(summary = %summary, "Run summary"),
                    Err(e) => warn!(error = %e, "Could not serialize run summary"),
                }
            }
            println!("{} raffles newly entered", result.new_entries);
            None
        }
        Err(e) => {
            error!(error = %e, "Run aborted before any entry");
            Some(e)
        }
    };

    // -- Stats -----------------------------------------------------------

    if cancel.is_cancelled() {
        info!("Skipping raffle stats after cancellation");
    } else if run_error.is_some() {
        info!("Skipping raffle stats after a failed run");
    } else {
        tokio::select! {
            stats = fetch_stats(&session) => match stats {
                Ok(Some(stats)) => println!("{stats} raffles entered"),
                Ok(None) => warn!("Could not load raffle stats"),
                Err(e) => warn!(error = %e, "Could not load raffle stats"),
            },
            _ = cancel.cancelled() => info!("Cancelled fetching of raffle stats"),
        }
    }

    // -- Persist ---------------------------------------------------------

    let saved = save_cookie_jar(session.jar(), &cfg.session.cookies_path, &base_url)?;
    info!(count = saved, path = %cfg.session.cookies_path.display(), "Cookie jar saved");

    match run_error {
        Some(e) => Err(e.into()),
        None => Ok(()),
    }
}

fn json_logging() -> bool {
    std::env::var("RAFFLE_LOG_JSON").is_ok()
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("raffle_runner=info"));

    if json_logging() {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    }
}
