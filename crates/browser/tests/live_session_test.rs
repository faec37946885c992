//! # Live Browser Session Test
//!
//! Requires a running chromedriver (`chromedriver --port=9515`) and network
//! access to the target site, so it is ignored by default:
//!
//! ```sh
//! cargo test -p remates-browser -- --ignored
//! ```

use remates::fetch::EdictoFetcher;
use remates_browser::{BrowserConfig, BrowserSession};

#[tokio::test]
#[ignore = "needs a running chromedriver and network access"]
async fn fetches_text_for_a_known_code() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let mut session = BrowserSession::abrir(BrowserConfig::default()).await?;
    let result = session.fetch_text("100045").await;
    session.cerrar().await?;

    let texto = result?;
    assert!(
        !texto.trim().is_empty(),
        "expected visible text from the content container"
    );
    Ok(())
}
