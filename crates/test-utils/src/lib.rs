use async_trait::async_trait;
use remates::errors::PromptError;
use remates::fetch::{EdictoFetcher, FetchError};
use remates::listado::{ListingTable, COL_CIUDAD, COL_CODIGO, COL_DEPARTAMENTO};
use remates::providers::ai::AiProvider;
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::{Arc, Mutex};

// --- Mock AI Provider ---

#[derive(Clone, Debug, Default)]
pub struct MockAiProvider {
    responses: Arc<Mutex<HashMap<String, String>>>,
    calls: Arc<Mutex<Vec<(String, String)>>>,
    failure: Arc<Mutex<Option<String>>>,
}

impl MockAiProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-programs a response for prompts whose user half contains `key`.
    pub fn add_response(&self, key: &str, response: &str) {
        let mut responses = self.responses.lock().unwrap();
        responses.insert(key.to_string(), response.to_string());
    }

    /// Makes every subsequent call fail with an API error.
    pub fn fail_with(&self, message: &str) {
        *self.failure.lock().unwrap() = Some(message.to_string());
    }

    /// Retrieves the recorded calls for assertion.
    pub fn get_calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl AiProvider for MockAiProvider {
    async fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String, PromptError> {
        let mut calls = self.calls.lock().unwrap();
        calls.push((system_prompt.to_string(), user_prompt.to_string()));

        if let Some(message) = self.failure.lock().unwrap().clone() {
            return Err(PromptError::AiApi(message));
        }

        let responses = self.responses.lock().unwrap();
        for (key, response) in responses.iter() {
            if user_prompt.contains(key) {
                return Ok(response.clone());
            }
        }

        Err(PromptError::AiApi(format!(
            "MockAiProvider: No response programmed for user prompt. Got: '{user_prompt}'"
        )))
    }
}

// --- Scripted Fetcher ---

/// One scripted step of a [`ScriptedFetcher`].
#[derive(Clone, Debug)]
pub enum FetchStep {
    Text(String),
    Timeout,
    NavigationError(String),
}

/// An `EdictoFetcher` that replays a fixed script, recording the codes it
/// was asked for. Used to simulate per-record failures in pipeline tests.
#[derive(Debug, Default)]
pub struct ScriptedFetcher {
    steps: Vec<FetchStep>,
    next: usize,
    pub codes_seen: Vec<String>,
}

impl ScriptedFetcher {
    pub fn new(steps: Vec<FetchStep>) -> Self {
        Self {
            steps,
            next: 0,
            codes_seen: Vec::new(),
        }
    }

    /// A fetcher that returns `"texto <code>"` for every request.
    pub fn echoing(len: usize) -> Self {
        Self::new(vec![FetchStep::Text(String::new()); len])
    }
}

#[async_trait]
impl EdictoFetcher for ScriptedFetcher {
    async fn fetch_text(&mut self, codigo: &str) -> Result<String, FetchError> {
        self.codes_seen.push(codigo.to_string());
        let step = self
            .steps
            .get(self.next)
            .cloned()
            .unwrap_or(FetchStep::Timeout);
        self.next += 1;
        match step {
            FetchStep::Text(texto) if texto.is_empty() => Ok(format!("texto {codigo}")),
            FetchStep::Text(texto) => Ok(texto),
            FetchStep::Timeout => Err(FetchError::SelectorTimeout(
                "div.entry-content, article, .td-post-content".to_string(),
            )),
            FetchStep::NavigationError(msg) => Err(FetchError::Navigation(msg)),
        }
    }
}

// --- Table Helpers ---

/// Builds a listing table with the three well-known columns and sequential
/// codes starting at `1001.0`.
pub fn sample_listing(rows: usize) -> ListingTable {
    let headers = vec![
        COL_CODIGO.to_string(),
        COL_DEPARTAMENTO.to_string(),
        COL_CIUDAD.to_string(),
    ];
    let data = (0..rows)
        .map(|i| {
            vec![
                format!("{}.0", 1001 + i),
                "Antioquia".to_string(),
                "Medellín".to_string(),
            ]
        })
        .collect();
    ListingTable::new(headers, data)
}
