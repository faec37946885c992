//! # Fetcher Seam
//!
//! The pipeline drives page extraction through this trait so the browser
//! session (`remates-browser`) stays an implementation detail and the loop
//! can be exercised with a scripted fetcher in tests.

use async_trait::async_trait;
use thiserror::Error;

/// Errors a fetch implementation can surface for one record. The pipeline
/// converts every variant into a placeholder extraction; none of them abort
/// the batch.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("navigation failed: {0}")]
    Navigation(String),
    #[error("timed out waiting for a content container: {0}")]
    SelectorTimeout(String),
    #[error("failed to read the content container: {0}")]
    Extraction(String),
}

/// Fetches the visible edicto text for one lookup code.
#[async_trait]
pub trait EdictoFetcher: Send {
    async fn fetch_text(&mut self, codigo: &str) -> Result<String, FetchError>;
}
