// src/common/i18n.rs

use std::collections::HashMap;

use anyhow::Context;

const DEFAULT_LANG: &str = "en";

// Os dicionários vão embutidos no binário
const LOCALES: &[(&str, &str)] = &[
    ("en", include_str!("../../locales/en.json")),
    ("fr", include_str!("../../locales/fr.json")),
    ("pt", include_str!("../../locales/pt.json")),
];

/// Tabela de traduções: idioma -> (código -> mensagem).
#[derive(Debug, Clone)]
pub struct I18nStore {
    messages: HashMap<String, HashMap<String, String>>,
}

impl I18nStore {
    pub fn new() -> anyhow::Result<Self> {
        let mut messages = HashMap::new();
        for (lang, raw) in LOCALES {
            let table: HashMap<String, String> = serde_json::from_str(raw)
                .with_context(|| format!("Arquivo de tradução inválido: {}", lang))?;
            messages.insert(lang.to_string(), table);
        }
        Ok(Self { messages })
    }

    /// Traduz um código. Idioma desconhecido cai no inglês; código desconhecido volta como está.
    pub fn translate(&self, lang: &str, code: &str) -> String {
        self.lookup(lang, code)
            .or_else(|| self.lookup(DEFAULT_LANG, code))
            .unwrap_or_else(|| code.to_string())
    }

    fn lookup(&self, lang: &str, code: &str) -> Option<String> {
        self.messages.get(lang).and_then(|t| t.get(code)).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_locale_covers_the_english_keys() {
        let store = I18nStore::new().unwrap();
        let en = store.messages.get("en").unwrap();
        for (lang, table) in &store.messages {
            for key in en.keys() {
                assert!(table.contains_key(key), "'{}' sem a chave '{}'", lang, key);
            }
        }
    }

    #[test]
    fn falls_back_to_english_then_to_the_code() {
        let store = I18nStore::new().unwrap();
        assert_eq!(
            store.translate("de", "article_not_found"),
            store.translate("en", "article_not_found")
        );
        assert_eq!(store.translate("fr", "unknown_code_xyz"), "unknown_code_xyz");
    }
}
