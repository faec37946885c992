//! # Pipeline Tests
//!
//! These exercise the sequential extraction loop with a scripted fetcher
//! and the mock AI provider, focusing on the length/order invariant of the
//! result sequences under per-record failures.

use remates::pipeline::{run_extraction, Annotation, Extraction, RunConfig};
use remates::Ficha;
use remates_test_utils::{sample_listing, FetchStep, MockAiProvider, ScriptedFetcher};
use serde_json::json;
use std::sync::Once;

static INIT: Once = Once::new();

/// Initializes tracing for tests.
pub fn setup_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt::init();
    });
}

/// A config with the inter-record pause disabled.
fn fast_config(usar_ia: bool) -> RunConfig {
    RunConfig {
        usar_ia,
        pausa_entre_registros: (0.0, 0.0),
        ..RunConfig::default()
    }
}

#[tokio::test]
async fn extraction_count_matches_filtered_rows_despite_failures() {
    // --- 1. Arrange ---
    setup_tracing();
    let filtrado = sample_listing(5);
    let mut fetcher = ScriptedFetcher::new(vec![
        FetchStep::Text(String::new()),
        FetchStep::Timeout,
        FetchStep::Text(String::new()),
        FetchStep::NavigationError("net::ERR_CONNECTION_RESET".to_string()),
        FetchStep::Text(String::new()),
    ]);

    // --- 2. Act ---
    let report = run_extraction(filtrado, &mut fetcher, None, &fast_config(false)).await;

    // --- 3. Assert ---
    assert_eq!(report.detalles.len(), report.filtrado.len());
    assert_eq!(report.detalles.len(), 5);
    let failed = report.detalles.iter().filter(|d| d.is_failed()).count();
    assert_eq!(failed, 2);
    assert!(report.detalles[1].is_failed());
    assert!(report.detalles[3].is_failed());
    assert!(report.fichas.is_none());
}

#[tokio::test]
async fn lookup_codes_lose_their_float_artifact() {
    setup_tracing();
    let filtrado = sample_listing(3);
    let mut fetcher = ScriptedFetcher::echoing(3);

    let report = run_extraction(filtrado, &mut fetcher, None, &fast_config(false)).await;

    assert_eq!(fetcher.codes_seen, vec!["1001", "1002", "1003"]);
    assert_eq!(
        report.detalles[0],
        Extraction::Text("texto 1001".to_string())
    );
}

#[tokio::test]
async fn annotations_stay_aligned_with_extractions() {
    // --- 1. Arrange ---
    setup_tracing();
    let filtrado = sample_listing(4);
    // Row 2 (index 1) times out before the AI ever runs.
    let mut fetcher = ScriptedFetcher::new(vec![
        FetchStep::Text(String::new()),
        FetchStep::Timeout,
        FetchStep::Text(String::new()),
        FetchStep::Text(String::new()),
    ]);
    let ai = MockAiProvider::new();
    ai.add_response("texto 1001", &json!({"radicado": "R-1001", "score": 3}).to_string());
    ai.add_response("texto 1003", &json!({"radicado": "R-1003", "score": 4}).to_string());
    ai.add_response("texto 1004", &json!({"radicado": "R-1004", "score": 5}).to_string());

    // --- 2. Act ---
    let report = run_extraction(filtrado, &mut fetcher, Some(&ai), &fast_config(true)).await;

    // --- 3. Assert ---
    let fichas = report.fichas.expect("annotations should be present");
    assert_eq!(fichas.len(), report.detalles.len());
    assert_eq!(fichas.len(), 4);

    // The failed fetch keeps its slot as an empty annotation.
    assert_eq!(fichas[1], Annotation::Vacia);
    assert_eq!(
        fichas[0].as_ficha().and_then(|f| f.radicado.as_deref()),
        Some("R-1001")
    );
    assert_eq!(
        fichas[2].as_ficha().and_then(|f| f.radicado.as_deref()),
        Some("R-1003")
    );
    assert_eq!(
        fichas[3].as_ficha().and_then(|f| f.radicado.as_deref()),
        Some("R-1004")
    );

    // The AI only ran for the three successful fetches.
    assert_eq!(ai.get_calls().len(), 3);
}

#[tokio::test]
async fn ai_failure_degrades_to_error_ficha_without_aborting() {
    setup_tracing();
    let filtrado = sample_listing(2);
    let mut fetcher = ScriptedFetcher::echoing(2);
    let ai = MockAiProvider::new();
    ai.fail_with("quota exceeded");

    let report = run_extraction(filtrado, &mut fetcher, Some(&ai), &fast_config(true)).await;

    let fichas = report.fichas.expect("annotations should be present");
    assert_eq!(fichas.len(), 2);
    for entry in &fichas {
        let ficha = entry.as_ficha().expect("degraded ficha, not Vacia");
        let riesgo = ficha.riesgo.as_deref().unwrap_or_default();
        assert!(
            riesgo.starts_with("Error IA:"),
            "unexpected riesgo: {riesgo}"
        );
        assert_eq!(
            *ficha,
            Ficha {
                riesgo: ficha.riesgo.clone(),
                ..Ficha::default()
            },
            "only riesgo should be populated on a degraded ficha"
        );
    }
    // The extractions themselves still succeeded.
    assert!(report.detalles.iter().all(|d| !d.is_failed()));
}

#[tokio::test]
async fn disabling_ai_skips_the_provider_entirely() {
    setup_tracing();
    let filtrado = sample_listing(3);
    let mut fetcher = ScriptedFetcher::echoing(3);
    let ai = MockAiProvider::new();

    let report = run_extraction(filtrado, &mut fetcher, Some(&ai), &fast_config(false)).await;

    assert!(report.fichas.is_none());
    assert!(ai.get_calls().is_empty());
}

#[tokio::test]
async fn missing_provider_behaves_like_disabled_ai() {
    setup_tracing();
    let filtrado = sample_listing(2);
    let mut fetcher = ScriptedFetcher::echoing(2);

    let report = run_extraction(filtrado, &mut fetcher, None, &fast_config(true)).await;

    assert!(report.fichas.is_none());
    assert_eq!(report.detalles.len(), 2);
}

#[tokio::test(start_paused = true)]
async fn failed_records_skip_the_inter_record_pause() {
    // --- 1. Arrange ---
    setup_tracing();
    // A fixed 5s pause, paired with the auto-advancing test clock, makes the
    // number of pauses taken directly observable.
    let config = RunConfig {
        usar_ia: false,
        pausa_entre_registros: (5.0, 5.0),
        ..RunConfig::default()
    };
    let filtrado = sample_listing(3);
    let mut fetcher = ScriptedFetcher::new(vec![
        FetchStep::Timeout,
        FetchStep::Text(String::new()),
        FetchStep::Text(String::new()),
    ]);

    // --- 2. Act ---
    let inicio = tokio::time::Instant::now();
    run_extraction(filtrado, &mut fetcher, None, &config).await;

    // --- 3. Assert ---
    // Only row 2 pauses: row 1 failed and row 3 is the last of the batch.
    assert_eq!(inicio.elapsed().as_secs(), 5);

    // A batch that fails outright never pauses at all.
    let filtrado = sample_listing(2);
    let mut fetcher = ScriptedFetcher::new(vec![FetchStep::Timeout, FetchStep::Timeout]);
    let inicio = tokio::time::Instant::now();
    run_extraction(filtrado, &mut fetcher, None, &config).await;
    assert_eq!(inicio.elapsed().as_secs(), 0);
}

#[tokio::test]
async fn placeholder_cell_carries_the_error_message() {
    setup_tracing();
    let filtrado = sample_listing(1);
    let mut fetcher = ScriptedFetcher::new(vec![FetchStep::NavigationError(
        "net::ERR_NAME_NOT_RESOLVED".to_string(),
    )]);

    let report = run_extraction(filtrado, &mut fetcher, None, &fast_config(false)).await;

    let cell = report.detalles[0].as_cell();
    assert!(cell.starts_with("No accesible / Error:"), "got: {cell}");
    assert!(cell.contains("net::ERR_NAME_NOT_RESOLVED"));
}
