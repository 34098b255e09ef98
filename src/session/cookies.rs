//! Cookie-jar persistence.
//!
//! Cookies are stored one per line in `Set-Cookie` form (`name=value`, with
//! optional attributes). Blank lines and `#` comments are ignored. The jar is
//! read before a run and written back once the run has finished or been
//! cancelled, so a login established in a browser carries over.
//!
//! Saving is lossy: only the `name=value` pairs the jar would send to the
//! base URL are written back. Attributes (expiry, domain, path) are dropped,
//! and cookies scoped to other paths are not saved at all. Reloaded cookies
//! become session cookies for the base URL's host.

use anyhow::{Context, Result};
use reqwest::cookie::{CookieStore, Jar};
use reqwest::Url;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Load a cookie jar for `base_url`. A missing file yields an empty jar.
pub fn load_cookie_jar(path: &Path, base_url: &Url) -> Result<Arc<Jar>> {
    let jar = Jar::default();

    if !path.exists() {
        info!(path = %path.display(), "No cookie file found, starting with an empty jar");
        return Ok(Arc::new(jar));
    }

    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read cookies from {}", path.display()))?;

    let lines = cookie_lines(&contents);
    for line in &lines {
        jar.add_cookie_str(line, base_url);
    }

    info!(path = %path.display(), count = lines.len(), "Cookies loaded");
    Ok(Arc::new(jar))
}

/// Write every cookie the jar would send to `base_url` back to `path`.
/// Returns the number of cookies written.
pub fn save_cookie_jar(jar: &Jar, path: &Path, base_url: &Url) -> Result<usize> {
    let header = jar
        .cookies(base_url)
        .map(|value| value.to_str().map(str::to_string))
        .transpose()
        .context("Cookie header is not valid UTF-8")?
        .unwrap_or_default();

    let pairs = split_cookie_header(&header);
    let mut out = String::from("# raffle-runner cookie jar\n");
    for pair in &pairs {
        out.push_str(pair);
        out.push('\n');
    }

    std::fs::write(path, out)
        .with_context(|| format!("Failed to write cookies to {}", path.display()))?;

    debug!(path = %path.display(), count = pairs.len(), "Cookies saved");
    Ok(pairs.len())
}

/// Non-empty, non-comment lines of a cookie file.
fn cookie_lines(contents: &str) -> Vec<&str> {
    contents
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .collect()
}

/// Split a `Cookie` request header (`a=1; b=2`) into its pairs.
fn split_cookie_header(header: &str) -> Vec<String> {
    header
        .split(';')
        .map(str::trim)
        .filter(|p| p.contains('='))
        .map(String::from)
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
