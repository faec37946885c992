//! Prompt templates for edicto annotation.

/// System prompt instructing the model to structure an edicto into the
/// fixed ficha schema. Every field is nullable.
pub const FICHA_SYSTEM_PROMPT: &str = "Eres un analista de remates judiciales. \
Analiza el edicto proporcionado por el usuario y responde únicamente con un \
objeto JSON con las claves: radicado, juzgado, avaluo (número), postura \
(número), matricula, direccion, riesgo, score (1-5). \
Si no encuentras un dato, pon null. No agregues explicaciones ni texto fuera del JSON.";

/// User prompt template; `{texto}` is replaced with the cleaned extraction.
pub const FICHA_USER_PROMPT_TEMPLATE: &str = "TEXTO: {texto}";
