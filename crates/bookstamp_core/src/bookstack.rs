use std::time::Duration;

use anyhow::{Context, Result, bail};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use crate::config::StampConfig;

/// Subset of the Bookstack page envelope this tool reads.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct PageDetails {
    pub id: i64,
    pub book_id: i64,
    #[serde(default)]
    pub html: String,
    #[serde(default)]
    pub raw_html: String,
}

/// Body of the page update request.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PageUpdate {
    pub book_id: i64,
    pub id: i64,
    pub html: String,
    pub raw_html: String,
}

/// Seam between orchestration and transport; implemented by
/// [`BookstackClient`] and by mocks in tests.
pub trait PageApi {
    fn get_page(&mut self, page_id: i64) -> Result<PageDetails>;
    fn update_page(&mut self, page_id: i64, update: &PageUpdate) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct BookstackClientConfig {
    pub base_url: String,
    pub token_id: String,
    pub token_secret: String,
    pub user_agent: String,
    pub timeout_ms: u64,
}

impl BookstackClientConfig {
    pub fn from_config(config: &StampConfig) -> Result<Self> {
        let Some(base_url) = config.base_url() else {
            bail!("Bookstack base URL is not configured (set BOOKSTACK_URL or [bookstack].url)");
        };
        let Some(token_id) = config.token_id() else {
            bail!(
                "Bookstack token id is not configured (set BOOKSTACK_TOKEN_ID or [bookstack].token_id)"
            );
        };
        let Some(token_secret) = config.token_secret() else {
            bail!(
                "Bookstack token secret is not configured (set BOOKSTACK_TOKEN_SECRET or [bookstack].token_secret)"
            );
        };
        Ok(Self {
            base_url,
            token_id,
            token_secret,
            user_agent: config.user_agent(),
            timeout_ms: config.timeout_ms(),
        })
    }

    /// Bookstack's static token scheme: `Token <id>:<secret>`.
    fn authorization(&self) -> String {
        format!("Token {}:{}", self.token_id, self.token_secret)
    }

    fn page_url(&self, page_id: i64) -> String {
        format!(
            "{}/api/pages/{page_id}",
            self.base_url.trim_end_matches('/')
        )
    }
}

pub struct BookstackClient {
    client: Client,
    config: BookstackClientConfig,
}

impl BookstackClient {
    pub fn new(config: BookstackClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .context("failed to build Bookstack HTTP client")?;
        Ok(Self { client, config })
    }
}

impl PageApi for BookstackClient {
    fn get_page(&mut self, page_id: i64) -> Result<PageDetails> {
        let response = self
            .client
            .get(self.config.page_url(page_id))
            .header("User-Agent", self.config.user_agent.clone())
            .header("Authorization", self.config.authorization())
            .send()
            .with_context(|| format!("failed to fetch Bookstack page {page_id}"))?;
        let status = response.status();
        if !status.is_success() {
            bail!("Bookstack page fetch failed with HTTP {status}");
        }
        let page: PageDetails = response
            .json()
            .context("failed to decode Bookstack page JSON response")?;
        Ok(page)
    }

    fn update_page(&mut self, page_id: i64, update: &PageUpdate) -> Result<()> {
        let response = self
            .client
            .put(self.config.page_url(page_id))
            .header("User-Agent", self.config.user_agent.clone())
            .header("Authorization", self.config.authorization())
            .json(update)
            .send()
            .with_context(|| format!("failed to update Bookstack page {page_id}"))?;
        let status = response.status();
        if !status.is_success() {
            bail!("Bookstack page update failed with HTTP {status}");
        }
        Ok(())
    }
}
