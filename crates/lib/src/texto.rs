//! # Text Normalization
//!
//! Cleanup applied to every extracted edicto before it is exported or sent
//! to an AI provider. Normalization is total (a missing input yields an
//! empty string) and idempotent.

/// Boilerplate phrases the target site appends to every edicto.
///
/// The list is configurable through [`Normalizer::with_frases`]; this
/// default is the union of the phrases observed on the site.
pub const FRASES_RUIDO: &[&str] = &[
    "Recuerda tener en cuenta la fecha de remate",
    "Al utilizar esta información el usuario se hace responsable",
];

/// Typographic characters replaced with their plain ASCII equivalents.
const REMPLAZOS: [(char, char); 6] = [
    ('\u{2013}', '-'),
    ('\u{2014}', '-'),
    ('\u{201c}', '"'),
    ('\u{201d}', '"'),
    ('\u{2018}', '\''),
    ('\u{2019}', '\''),
];

/// Cleans extracted page text: substitutes curly quotes and dashes, strips
/// the configured boilerplate phrases, and trims surrounding whitespace.
#[derive(Debug, Clone)]
pub struct Normalizer {
    frases_ruido: Vec<String>,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::with_frases(FRASES_RUIDO.iter().map(|s| s.to_string()).collect())
    }
}

impl Normalizer {
    /// Creates a normalizer with a custom boilerplate phrase list.
    pub fn with_frases(frases_ruido: Vec<String>) -> Self {
        Self { frases_ruido }
    }

    /// Normalizes arbitrary input. Never fails: `None` becomes `""`.
    pub fn normalize(&self, entrada: Option<&str>) -> String {
        let Some(texto) = entrada else {
            return String::new();
        };

        let mut texto: String = texto
            .chars()
            .map(|c| {
                REMPLAZOS
                    .iter()
                    .find(|(original, _)| *original == c)
                    .map(|(_, nuevo)| *nuevo)
                    .unwrap_or(c)
            })
            .collect();

        for frase in &self.frases_ruido {
            if !frase.is_empty() {
                texto = texto.replace(frase.as_str(), "");
            }
        }

        texto.trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_is_total() {
        let normalizer = Normalizer::default();
        assert_eq!(normalizer.normalize(None), "");
        assert_eq!(normalizer.normalize(Some("")), "");
        assert_eq!(normalizer.normalize(Some("   ")), "");
    }

    #[test]
    fn normalize_replaces_typographic_characters() {
        let normalizer = Normalizer::default();
        let entrada = "\u{201c}Finca\u{201d} \u{2013} lote \u{2018}B\u{2019} \u{2014} etapa 2";
        assert_eq!(
            normalizer.normalize(Some(entrada)),
            "\"Finca\" - lote 'B' - etapa 2"
        );
    }

    #[test]
    fn normalize_strips_boilerplate_phrases() {
        let normalizer = Normalizer::default();
        let entrada =
            "Remate de finca rural. Recuerda tener en cuenta la fecha de remate publicada.";
        assert_eq!(
            normalizer.normalize(Some(entrada)),
            "Remate de finca rural.  publicada."
        );
    }

    #[test]
    fn normalize_is_idempotent() {
        let normalizer = Normalizer::default();
        let entrada = "\u{201c}Juzgado 3\u{2019} Civil\u{201d} \u{2014} Bogotá \
            Al utilizar esta información el usuario se hace responsable de su uso.";
        let una_vez = normalizer.normalize(Some(entrada));
        let dos_veces = normalizer.normalize(Some(&una_vez));
        assert_eq!(una_vez, dos_veces);
    }

    #[test]
    fn custom_phrase_list_is_honored() {
        let normalizer = Normalizer::with_frases(vec!["AVISO LEGAL".to_string()]);
        assert_eq!(
            normalizer.normalize(Some("AVISO LEGAL Remate urgente")),
            "Remate urgente"
        );
        // The default phrases are no longer stripped.
        assert_eq!(
            normalizer.normalize(Some("Recuerda tener en cuenta la fecha de remate")),
            "Recuerda tener en cuenta la fecha de remate"
        );
    }
}
