// src/middleware/i18n.rs

use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};

const SUPPORTED_LANGS: &[&str] = &["en", "fr", "pt"];
const DEFAULT_LANG: &str = "en";

/// Idioma da resposta, tirado do `Accept-Language`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locale(pub String);

impl Locale {
    /// Primeiro idioma suportado da lista (já ordenada por qualidade).
    /// "pt-BR" conta como "pt"; nada suportado cai no inglês.
    pub fn from_header(value: Option<&str>) -> Self {
        let lang = value
            .map(accept_language::parse)
            .unwrap_or_default()
            .iter()
            .filter_map(|tag| tag.split('-').next())
            .map(str::to_ascii_lowercase)
            .find(|primary| SUPPORTED_LANGS.contains(&primary.as_str()))
            .unwrap_or_else(|| DEFAULT_LANG.to_string());

        Locale(lang)
    }
}

impl<S> FromRequestParts<S> for Locale
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header_value = parts
            .headers
            .get(header::ACCEPT_LANGUAGE)
            .and_then(|v| v.to_str().ok());

        Ok(Locale::from_header(header_value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn region_is_dropped() {
        assert_eq!(Locale::from_header(Some("pt-BR,pt;q=0.9")).0, "pt");
        assert_eq!(Locale::from_header(Some("fr-CA")).0, "fr");
    }

    #[test]
    fn first_supported_language_wins() {
        assert_eq!(Locale::from_header(Some("de-DE,de;q=0.9,fr;q=0.8")).0, "fr");
    }

    #[test]
    fn missing_or_unknown_header_defaults_to_english() {
        assert_eq!(Locale::from_header(None).0, "en");
        assert_eq!(Locale::from_header(Some("ja")).0, "en");
    }
}
