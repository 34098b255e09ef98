//! User-agent identity file.

use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

/// Read the user agent from the first line of `path`.
///
/// A missing or blank file falls back to `default` so a fresh checkout
/// still runs; unreadable files are an error.
pub fn load_user_agent(path: &Path, default: &str) -> Result<String> {
    if !path.exists() {
        info!(path = %path.display(), "No user-agent file, using default");
        return Ok(default.to_string());
    }

    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read user-agent file {}", path.display()))?;

    match contents.lines().next().map(str::trim).filter(|l| !l.is_empty()) {
        Some(agent) => {
            info!(path = %path.display(), "Loaded user agent from file");
            Ok(agent.to_string())
        }
        None => Ok(default.to_string()),
    }
}
