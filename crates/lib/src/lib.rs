//! # remates
//!
//! Core library for the judicial auction listing extractor. It drives a
//! linear pipeline: a listing spreadsheet is loaded and filtered, one web
//! page is fetched per lookup code through an [`EdictoFetcher`], the visible
//! text is cleaned, optionally structured into a [`Ficha`] by an AI
//! provider, and the results are handed to the report crates.
//!
//! The fetch and export steps live in sibling crates (`remates-browser`,
//! `remates-sheets`, `remates-pdf`); this crate owns the data model, the
//! provider abstraction and the per-record error policy.

pub mod annotate;
pub mod errors;
pub mod fetch;
pub mod listado;
pub mod pipeline;
pub mod prompts;
pub mod providers;
pub mod texto;

pub use annotate::{annotate_edicto, AnnotationOutcome, Ficha};
pub use errors::PromptError;
pub use fetch::{EdictoFetcher, FetchError};
pub use listado::{lookup_code, ListadoFilter, ListingTable};
pub use pipeline::{run_extraction, Annotation, Extraction, RunConfig, RunReport};
pub use texto::Normalizer;
