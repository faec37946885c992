//! # `remates-browser`: WebDriver Page Fetcher
//!
//! The [`EdictoFetcher`] implementation that drives a real browser through
//! a WebDriver endpoint (chromedriver). One session is opened before the
//! batch, reused for every record, and closed unconditionally afterwards.
//!
//! The interaction per record mirrors a human visit: navigate to the search
//! results for the code, wait for the content container, scroll down and
//! back up to trigger lazy loading, then read the visible text. The scroll
//! sequence is best-effort; its failures never fail the record.

use async_trait::async_trait;
use fantoccini::error::{CmdError, NewSessionError};
use fantoccini::wd::Capabilities;
use fantoccini::{Client, ClientBuilder, Locator};
use remates::fetch::{EdictoFetcher, FetchError};
use serde_json::json;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// The content containers known to hold the edicto text, tried in order by
/// the driver as one selector list.
pub const CONTENT_SELECTORS: &str = "div.entry-content, article, .td-post-content";

/// Desktop user agent presented to the site.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
    (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

#[derive(Error, Debug)]
pub enum BrowserError {
    #[error("Failed to start the WebDriver session: {0}")]
    NewSession(#[from] NewSessionError),
    #[error("WebDriver command failed: {0}")]
    Cmd(#[from] CmdError),
}

/// Configuration for one browser session.
#[derive(Debug, Clone)]
pub struct BrowserConfig {
    /// WebDriver endpoint, e.g. `http://localhost:9515`.
    pub webdriver_url: String,
    /// Site root, without a trailing slash.
    pub base_url: String,
    /// Bound on the wait for a content container.
    pub selector_timeout: Duration,
    pub headless: bool,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            webdriver_url: "http://localhost:9515".to_string(),
            base_url: "https://rematesjudiciales.com.co".to_string(),
            selector_timeout: Duration::from_secs(15),
            headless: true,
        }
    }
}

/// A live WebDriver session implementing [`EdictoFetcher`].
pub struct BrowserSession {
    client: Client,
    config: BrowserConfig,
}

impl BrowserSession {
    /// Connects to the WebDriver endpoint and warms the session up with a
    /// visit to the site home (for cookies). The warm-up is best-effort;
    /// a failure there still leaves a usable session.
    pub async fn abrir(config: BrowserConfig) -> Result<Self, BrowserError> {
        let mut args = vec![
            "--disable-blink-features=AutomationControlled".to_string(),
            "--window-size=1920,1080".to_string(),
            format!("--user-agent={USER_AGENT}"),
        ];
        if config.headless {
            args.push("--headless=new".to_string());
        }

        let mut caps = Capabilities::new();
        caps.insert("goog:chromeOptions".to_string(), json!({ "args": args }));
        // "eager" returns control at DOMContentLoaded instead of full load,
        // matching the bounded selector wait below.
        caps.insert("pageLoadStrategy".to_string(), json!("eager"));

        info!("Connecting to WebDriver at {}", config.webdriver_url);
        let client = ClientBuilder::rustls()
            .expect("rustls initialization")
            .capabilities(caps)
            .connect(&config.webdriver_url)
            .await?;

        let session = Self { client, config };
        session.warm_up().await;
        Ok(session)
    }

    async fn warm_up(&self) {
        info!("Warming up session at {}", self.config.base_url);
        if let Err(e) = self.client.goto(&self.config.base_url).await {
            warn!("Warm-up visit failed, continuing with direct lookups: {e}");
            return;
        }
        tokio::time::sleep(Duration::from_secs(2)).await;
    }

    /// Fixed scroll-down-then-up sequence with short pauses, intended to
    /// trigger lazy-loaded content. Purely best-effort.
    async fn scroll_sequence(&self) {
        if let Err(e) = self.scroll_by(500).await {
            debug!("Scroll down failed: {e}");
        }
        tokio::time::sleep(Duration::from_secs(1)).await;
        if let Err(e) = self.scroll_by(-200).await {
            debug!("Scroll up failed: {e}");
        }
        tokio::time::sleep(Duration::from_millis(500)).await;
    }

    async fn scroll_by(&self, delta: i64) -> Result<(), CmdError> {
        self.client
            .execute("window.scrollBy(0, arguments[0]);", vec![json!(delta)])
            .await
            .map(|_| ())
    }

    /// Closes the session. Call this after the batch regardless of how many
    /// records failed.
    pub async fn cerrar(self) -> Result<(), BrowserError> {
        info!("Closing WebDriver session");
        self.client.close().await?;
        Ok(())
    }
}

#[async_trait]
impl EdictoFetcher for BrowserSession {
    async fn fetch_text(&mut self, codigo: &str) -> Result<String, FetchError> {
        let url = format!("{}/?s={}", self.config.base_url, codigo);
        debug!("Navigating to {url}");
        self.client
            .goto(&url)
            .await
            .map_err(|e| FetchError::Navigation(e.to_string()))?;

        let element = self
            .client
            .wait()
            .at_most(self.config.selector_timeout)
            .for_element(Locator::Css(CONTENT_SELECTORS))
            .await
            .map_err(|e| match e {
                CmdError::WaitTimeout => {
                    FetchError::SelectorTimeout(CONTENT_SELECTORS.to_string())
                }
                other => FetchError::Extraction(other.to_string()),
            })?;

        self.scroll_sequence().await;

        element
            .text()
            .await
            .map_err(|e| FetchError::Extraction(e.to_string()))
    }
}
