//! reqwest-backed session for the live platform.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::cookie::Jar;
use reqwest::{Client, Url};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use super::RaffleSession;
use crate::types::{RaffleError, RaffleResult};

/// Live HTTP session: one client, one cookie jar, one identity.
pub struct HttpSession {
    http: Client,
    base_url: Url,
    jar: Arc<Jar>,
}

impl HttpSession {
    /// Build a session that sends `user_agent` and the cookies in `jar`.
    ///
    /// Redirects are followed and gzip bodies decoded by the client.
    pub fn new(base_url: Url, jar: Arc<Jar>, user_agent: &str, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .cookie_provider(jar.clone())
            .gzip(true)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .context("Failed to build HTTP client for raffle session")?;

        Ok(Self { http, base_url, jar })
    }

    /// The cookie jar backing this session, for persisting after a run.
    pub fn jar(&self) -> &Jar {
        &self.jar
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, path: &str) -> RaffleResult<Url> {
        self.base_url
            .join(path)
            .map_err(|e| RaffleError::Transport(format!("invalid path {path}: {e}")))
    }

    async fn read_body(resp: reqwest::Response) -> RaffleResult<String> {
        let status = resp.status();
        if !status.is_success() {
            return Err(RaffleError::Transport(format!("HTTP {status} from {}", resp.url())));
        }
        Ok(resp.text().await?)
    }
}

#[async_trait]
impl RaffleSession for HttpSession {
    async fn get_page(&self, path: &str) -> RaffleResult<String> {
        let url = self.url(path)?;
        debug!(url = %url, "GET");

        let resp = self.http.get(url).send().await?;
        Self::read_body(resp).await
    }

    async fn post_form(&self, path: &str, fields: &[(&'static str, String)]) -> RaffleResult<String> {
        let url = self.url(path)?;
        debug!(url = %url, fields = fields.len(), "POST");

        let resp = self
            .http
            .post(url)
            .header("X-Requested-With", "XMLHttpRequest")
            .form(fields)
            .send()
            .await?;
        Self::read_body(resp).await
    }
}
