//! # remates CLI
//!
//! Command-line front end for the judicial auction extractor. The flags
//! mirror the run-time inputs of the pipeline: the uploaded listing, the
//! geography filters and row range, the AI toggle and provider, and the
//! two output paths.

mod secret;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use remates::pipeline::{run_extraction, RunConfig};
use remates::providers::ai::{gemini::GeminiProvider, local::LocalAiProvider, AiProvider};
use remates::listado::{COL_CIUDAD, COL_DEPARTAMENTO};
use remates::{ListadoFilter, ListingTable, Normalizer};
use remates_browser::{BrowserConfig, BrowserSession};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

// --- CLI Definition ---

#[derive(Parser, Debug)]
#[command(name = "remates", author, version, about = "Extractor de remates judiciales")]
struct Cli {
    /// Listing spreadsheet (xlsx) to process.
    #[arg(long)]
    input: PathBuf,

    /// List the department and city values present in the listing, then exit.
    #[arg(long = "listar-filtros")]
    listar_filtros: bool,

    /// Department filter; repeat the flag for several values.
    #[arg(long = "departamento")]
    departamentos: Vec<String>,

    /// City filter; repeat the flag for several values.
    #[arg(long = "ciudad")]
    ciudades: Vec<String>,

    /// First filtered row to process (0-based).
    #[arg(long, default_value_t = 0)]
    desde: usize,

    /// One past the last filtered row to process.
    #[arg(long, default_value_t = 5)]
    hasta: usize,

    /// Disable AI annotation (and the dossier).
    #[arg(long = "sin-ia")]
    sin_ia: bool,

    /// AI provider for annotation.
    #[arg(long, value_enum, default_value_t = Provider::Gemini)]
    provider: Provider,

    /// Gemini API key; falls back to the system keyring when absent.
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Endpoint for the `local` provider (OpenAI-compatible).
    #[arg(long, env = "LOCAL_AI_URL")]
    local_url: Option<String>,

    /// WebDriver endpoint driving the browser.
    #[arg(long, default_value = "http://localhost:9515")]
    webdriver: String,

    /// Site root to scrape.
    #[arg(long, default_value = "https://rematesjudiciales.com.co")]
    base_url: String,

    /// Run the browser with a visible window.
    #[arg(long)]
    no_headless: bool,

    /// Output path for the report spreadsheet.
    #[arg(long, default_value = "Remates_Final.xlsx")]
    excel: PathBuf,

    /// Output path for the dossier PDF (written only when AI ran).
    #[arg(long, default_value = "Dossier_Remates.pdf")]
    dossier: PathBuf,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Provider {
    Gemini,
    Local,
}

const GEMINI_API_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent";

// --- Main Application Entry ---

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();

    // 1. Load and filter the listing. Loading errors are fatal.
    let tabla = remates_sheets::cargar_listado(&cli.input)
        .with_context(|| format!("no se pudo cargar el listado '{}'", cli.input.display()))?;

    if cli.listar_filtros {
        imprimir_filtros(&tabla);
        return Ok(());
    }

    let filtro = ListadoFilter {
        departamentos: cli.departamentos.clone(),
        ciudades: cli.ciudades.clone(),
        rango: Some((cli.desde, cli.hasta)),
    };
    let filtrado = tabla.filter(&filtro);
    info!("Registros a procesar: {}", filtrado.len());
    if filtrado.is_empty() {
        bail!("los filtros no dejaron ninguna fila para procesar");
    }

    // 2. Resolve the AI provider. A missing credential degrades to a
    //    text-only run instead of aborting.
    let ai: Option<Box<dyn AiProvider>> = if cli.sin_ia {
        None
    } else {
        match build_provider(&cli) {
            Ok(provider) => Some(provider),
            Err(e) => {
                warn!("IA desactivada: {e}");
                None
            }
        }
    };

    // 3. One browser session for the whole batch, closed regardless of how
    //    the loop went.
    let browser_config = BrowserConfig {
        webdriver_url: cli.webdriver.clone(),
        base_url: cli.base_url.trim_end_matches('/').to_string(),
        selector_timeout: Duration::from_secs(15),
        headless: !cli.no_headless,
    };
    let mut session = BrowserSession::abrir(browser_config)
        .await
        .context("no se pudo iniciar la sesión del navegador")?;

    let config = RunConfig {
        usar_ia: ai.is_some(),
        pausa_entre_registros: (1.0, 2.0),
        normalizer: Normalizer::default(),
    };
    let report = run_extraction(filtrado, &mut session, ai.as_deref(), &config).await;

    if let Err(e) = session.cerrar().await {
        warn!("no se pudo cerrar la sesión del navegador: {e}");
    }

    // 4. Export.
    let buffer =
        remates_sheets::exportar_reporte(&report.filtrado, &report.detalles, report.fichas.as_deref())?;
    std::fs::write(&cli.excel, buffer)
        .with_context(|| format!("no se pudo escribir '{}'", cli.excel.display()))?;
    info!("Excel escrito en {}", cli.excel.display());

    if let Some(fichas) = &report.fichas {
        let pdf = remates_pdf::generar_dossier(fichas)?;
        std::fs::write(&cli.dossier, pdf)
            .with_context(|| format!("no se pudo escribir '{}'", cli.dossier.display()))?;
        info!("Dossier escrito en {}", cli.dossier.display());
    }

    let fallidos = report.detalles.iter().filter(|d| d.is_failed()).count();
    info!(
        "Extracción completada: {} registros, {} no accesibles",
        report.detalles.len(),
        fallidos
    );
    Ok(())
}

/// Prints the distinct values of the two geography columns, the choices a
/// `--departamento`/`--ciudad` flag can take for this listing.
fn imprimir_filtros(tabla: &ListingTable) {
    for (titulo, columna) in [
        ("Departamentos", COL_DEPARTAMENTO),
        ("Ciudades", COL_CIUDAD),
    ] {
        println!("{titulo}:");
        let valores = tabla.unique_values(columna);
        if valores.is_empty() {
            println!("  (ninguno)");
        }
        for valor in valores {
            println!("  {valor}");
        }
    }
}

fn build_provider(cli: &Cli) -> Result<Box<dyn AiProvider>> {
    match cli.provider {
        Provider::Gemini => {
            let api_key = match &cli.api_key {
                Some(key) => key.clone(),
                None => secret::gemini_api_key()?,
            };
            Ok(Box::new(GeminiProvider::new(
                GEMINI_API_URL.to_string(),
                api_key,
            )?))
        }
        Provider::Local => {
            let url = cli
                .local_url
                .clone()
                .context("falta --local-url para el proveedor local")?;
            Ok(Box::new(LocalAiProvider::new(
                url,
                cli.api_key.clone(),
                None,
            )?))
        }
    }
}
