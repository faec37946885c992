//! # AI Annotation
//!
//! Turns a cleaned edicto text into a structured [`Ficha`] via an
//! [`AiProvider`]. Annotation never fails past its call site: any provider
//! or parse error degrades into a ficha whose `riesgo` carries the error
//! message, with `ok` set to `false`.

use crate::{
    errors::PromptError,
    prompts::{FICHA_SYSTEM_PROMPT, FICHA_USER_PROMPT_TEMPLATE},
    providers::ai::AiProvider,
};
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// Structured annotation of one edicto. Every field is nullable; a model
/// that cannot locate a value returns `null` for it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ficha {
    /// Case reference (radicado).
    pub radicado: Option<String>,
    /// Court handling the case.
    pub juzgado: Option<String>,
    /// Appraisal value.
    pub avaluo: Option<f64>,
    /// Minimum bid value.
    pub postura: Option<f64>,
    /// Property registration id (matrícula inmobiliaria).
    pub matricula: Option<String>,
    /// Property address.
    pub direccion: Option<String>,
    /// Free-text risk assessment.
    pub riesgo: Option<String>,
    /// Numeric score, 1 to 5.
    pub score: Option<f64>,
}

/// Result of one annotation attempt. `ok` is `false` when the provider or
/// the response parsing failed and the ficha only carries the error.
#[derive(Debug, Clone)]
pub struct AnnotationOutcome {
    pub ficha: Ficha,
    pub ok: bool,
}

/// Asks the provider to structure the cleaned text into a [`Ficha`].
///
/// Never returns an error: failures produce a degraded outcome carrying
/// `Error IA: <mensaje>` in the `riesgo` field.
pub async fn annotate_edicto(provider: &dyn AiProvider, texto_limpio: &str) -> AnnotationOutcome {
    match try_annotate(provider, texto_limpio).await {
        Ok(ficha) => AnnotationOutcome { ficha, ok: true },
        Err(e) => {
            warn!("AI annotation failed: {e}");
            AnnotationOutcome {
                ficha: Ficha {
                    riesgo: Some(format!("Error IA: {e}")),
                    ..Default::default()
                },
                ok: false,
            }
        }
    }
}

async fn try_annotate(provider: &dyn AiProvider, texto_limpio: &str) -> Result<Ficha, PromptError> {
    let user_prompt = FICHA_USER_PROMPT_TEMPLATE.replace("{texto}", texto_limpio);
    let raw = provider.generate(FICHA_SYSTEM_PROMPT, &user_prompt).await?;
    debug!("<-- Ficha from AI: {raw}");
    parse_ficha(&raw)
}

/// Parses a provider reply into a [`Ficha`]. A JSON array reply uses its
/// first element; markdown code fences around the JSON are tolerated.
pub fn parse_ficha(raw: &str) -> Result<Ficha, PromptError> {
    let value: Value = serde_json::from_str(strip_fences(raw))?;
    let value = match value {
        Value::Array(mut items) if !items.is_empty() => items.remove(0),
        other => other,
    };
    let obj = value
        .as_object()
        .ok_or_else(|| PromptError::AiApi("response is not a JSON object".to_string()))?;

    Ok(Ficha {
        radicado: campo_texto(obj, "radicado"),
        juzgado: campo_texto(obj, "juzgado"),
        avaluo: campo_numero(obj, "avaluo"),
        postura: campo_numero(obj, "postura"),
        matricula: campo_texto(obj, "matricula"),
        direccion: campo_texto(obj, "direccion"),
        riesgo: campo_texto(obj, "riesgo"),
        score: campo_numero(obj, "score"),
    })
}

/// Trims a leading ```` ```json ```` (or bare ```` ``` ````) fence and its
/// closing fence, which non-JSON-mode providers tend to add.
fn strip_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

fn campo_texto(obj: &Map<String, Value>, key: &str) -> Option<String> {
    match obj.get(key) {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        // Models occasionally return numeric ids for text fields.
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

fn campo_numero(obj: &Map<String, Value>, key: &str) -> Option<f64> {
    match obj.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().replace(['$', ',', ' '], "").parse().ok(),
        _ => None,
    }
}
