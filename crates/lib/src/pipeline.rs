//! # Extraction Pipeline
//!
//! The single sequential loop over the filtered listing: derive the lookup
//! code, fetch the page text, normalize it, optionally annotate it, pause.
//! One failing record never aborts the batch; failures become placeholder
//! entries so the result sequences always stay aligned with the filtered
//! rows.

use crate::{
    annotate::{annotate_edicto, Ficha},
    fetch::EdictoFetcher,
    listado::{lookup_code, ListingTable, COL_CODIGO},
    providers::ai::AiProvider,
    texto::Normalizer,
};
use rand::Rng;
use std::time::Duration;
use tracing::{info, warn};

/// Run-time configuration for one extraction batch. This replaces the
/// ambient UI state of an interactive session with an explicit value passed
/// into [`run_extraction`].
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Whether to annotate successful extractions with the AI provider.
    pub usar_ia: bool,
    /// Bounds in seconds for the randomized pause between records.
    pub pausa_entre_registros: (f64, f64),
    /// Text cleanup applied to every successful extraction.
    pub normalizer: Normalizer,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            usar_ia: true,
            pausa_entre_registros: (1.0, 2.0),
            normalizer: Normalizer::default(),
        }
    }
}

/// Per-record extraction result. A failure keeps its slot in the sequence
/// instead of shortening it.
#[derive(Debug, Clone, PartialEq)]
pub enum Extraction {
    /// Cleaned page text.
    Text(String),
    /// The error message for a record whose fetch failed.
    Failed(String),
}

impl Extraction {
    /// The spreadsheet cell value for this result. Failures render as the
    /// fixed placeholder.
    pub fn as_cell(&self) -> String {
        match self {
            Extraction::Text(texto) => texto.clone(),
            Extraction::Failed(msg) => format!("No accesible / Error: {msg}"),
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Extraction::Failed(_))
    }
}

/// Per-record annotation entry, aligned positionally with the extractions.
#[derive(Debug, Clone, PartialEq)]
pub enum Annotation {
    /// A structured ficha (including the degraded error-only variant).
    Ficha(Ficha),
    /// The fetch failed before the AI ran; exports as empty columns and
    /// produces no dossier page.
    Vacia,
}

impl Annotation {
    pub fn as_ficha(&self) -> Option<&Ficha> {
        match self {
            Annotation::Ficha(ficha) => Some(ficha),
            Annotation::Vacia => None,
        }
    }
}

/// The consolidated output of one batch, ready for export.
#[derive(Debug)]
pub struct RunReport {
    /// The filtered listing the batch ran over.
    pub filtrado: ListingTable,
    /// One entry per filtered row, in row order.
    pub detalles: Vec<Extraction>,
    /// One entry per filtered row when AI annotation ran, `None` otherwise.
    pub fichas: Option<Vec<Annotation>>,
}

/// Processes every row of the filtered listing, strictly in order, through
/// one fetcher session.
///
/// Invariant: `detalles.len() == filtrado.len()`, and when annotation runs
/// `fichas.len() == filtrado.len()`, regardless of per-record failures.
pub async fn run_extraction(
    filtrado: ListingTable,
    fetcher: &mut dyn EdictoFetcher,
    ai: Option<&dyn AiProvider>,
    config: &RunConfig,
) -> RunReport {
    let codigo_col = filtrado.column_index(COL_CODIGO);
    if codigo_col.is_none() {
        warn!("the listing has no '{COL_CODIGO}' column; lookup codes will be empty");
    }

    let total = filtrado.len();
    let anotar = config.usar_ia && ai.is_some();
    let mut detalles: Vec<Extraction> = Vec::with_capacity(total);
    let mut fichas: Option<Vec<Annotation>> = anotar.then(|| Vec::with_capacity(total));

    for (i, row) in filtrado.rows.iter().enumerate() {
        let codigo = codigo_col
            .and_then(|col| row.get(col))
            .map(|raw| lookup_code(raw))
            .unwrap_or_default();
        info!("Procesando {}/{}: código {}", i + 1, total, codigo);

        match fetcher.fetch_text(&codigo).await {
            Ok(texto_raw) => {
                let limpio = config.normalizer.normalize(Some(&texto_raw));
                if let (Some(fichas), Some(ai)) = (fichas.as_mut(), ai) {
                    let outcome = annotate_edicto(ai, &limpio).await;
                    if !outcome.ok {
                        warn!("código {codigo}: la IA no pudo estructurar el edicto");
                    }
                    fichas.push(Annotation::Ficha(outcome.ficha));
                }
                detalles.push(Extraction::Text(limpio));
                // The courtesy pause only follows a request the site actually
                // served; a failed record moves straight on to the next one.
                if i + 1 < total {
                    pausa_aleatoria(config.pausa_entre_registros).await;
                }
            }
            Err(e) => {
                warn!("Error en {codigo}: {e}");
                detalles.push(Extraction::Failed(e.to_string()));
                if let Some(fichas) = fichas.as_mut() {
                    fichas.push(Annotation::Vacia);
                }
            }
        }
    }

    debug_assert_eq!(detalles.len(), filtrado.len());
    RunReport {
        filtrado,
        detalles,
        fichas,
    }
}

/// Sleeps a uniformly random duration inside the configured bounds, to keep
/// the request rate down. A zero range disables the pause.
async fn pausa_aleatoria((min, max): (f64, f64)) {
    let secs = if max > min {
        rand::thread_rng().gen_range(min..max)
    } else {
        min
    };
    if secs > 0.0 {
        tokio::time::sleep(Duration::from_secs_f64(secs)).await;
    }
}
