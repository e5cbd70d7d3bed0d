// src/common/slug.rs

use std::collections::HashSet;

const FALLBACK_SLUG: &str = "article";
const MAX_SLUG_BASE: usize = 200;

// Letras acentuadas mais comuns (fr/pt) -> ASCII
fn fold_char(c: char) -> Option<&'static str> {
    let folded = match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => "a",
        'À' | 'Á' | 'Â' | 'Ã' | 'Ä' | 'Å' => "a",
        'ç' | 'Ç' => "c",
        'è' | 'é' | 'ê' | 'ë' | 'È' | 'É' | 'Ê' | 'Ë' => "e",
        'ì' | 'í' | 'î' | 'ï' | 'Ì' | 'Í' | 'Î' | 'Ï' => "i",
        'ñ' | 'Ñ' => "n",
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'Ò' | 'Ó' | 'Ô' | 'Õ' | 'Ö' => "o",
        'ù' | 'ú' | 'û' | 'ü' | 'Ù' | 'Ú' | 'Û' | 'Ü' => "u",
        'ý' | 'ÿ' | 'Ý' => "y",
        'œ' | 'Œ' => "oe",
        'æ' | 'Æ' => "ae",
        'ß' => "ss",
        _ => return None,
    };
    Some(folded)
}

/// Deriva o slug de um título: minúsculas ASCII, palavras separadas por '-'.
pub fn slugify(title: &str) -> String {
    let mut ascii = String::with_capacity(title.len());
    for c in title.chars() {
        if c.is_ascii() {
            ascii.push(c.to_ascii_lowercase());
        } else if let Some(folded) = fold_char(c) {
            ascii.push_str(folded);
        }
        // o resto (emojis, outros alfabetos) é descartado
    }

    let mut slug = String::with_capacity(ascii.len());
    let mut pending_dash = false;
    for c in ascii.chars() {
        if c.is_ascii_alphanumeric() || c == '_' {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else if c == '-' || c.is_ascii_whitespace() {
            pending_dash = true;
        }
    }

    if slug.len() > MAX_SLUG_BASE {
        slug.truncate(MAX_SLUG_BASE);
        while slug.ends_with('-') {
            slug.pop();
        }
    }

    if slug.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        slug
    }
}

/// O candidato número `attempt`: `base`, `base-1`, `base-2`, ...
pub fn slug_candidate(base: &str, attempt: u32) -> String {
    if attempt == 0 {
        base.to_string()
    } else {
        format!("{}-{}", base, attempt)
    }
}

/// Primeiro candidato livre dado o conjunto de slugs já ocupados.
/// Devolve também o índice, para o laço de retentativa continuar dali.
pub fn next_free_slug(base: &str, taken: &HashSet<String>, start: u32) -> (String, u32) {
    let mut attempt = start;
    loop {
        let candidate = slug_candidate(base, attempt);
        if !taken.contains(&candidate) {
            return (candidate, attempt);
        }
        attempt += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_basic_titles() {
        assert_eq!(slugify("Quarterly Report"), "quarterly-report");
        assert_eq!(slugify("  Hello,   World!  "), "hello-world");
        assert_eq!(slugify("Réunion d'équipe à Paris"), "reunion-dequipe-a-paris");
        assert_eq!(slugify("already-slugged--title"), "already-slugged-title");
    }

    #[test]
    fn slugify_never_returns_empty() {
        assert_eq!(slugify("!!!"), "article");
        assert_eq!(slugify(""), "article");
    }

    #[test]
    fn second_article_with_same_title_gets_suffix() {
        let base = slugify("Quarterly Report");
        let mut taken = HashSet::new();

        let (first, _) = next_free_slug(&base, &taken, 0);
        assert_eq!(first, "quarterly-report");
        taken.insert(first);

        let (second, attempt) = next_free_slug(&base, &taken, 0);
        assert_eq!(second, "quarterly-report-1");
        assert_eq!(attempt, 1);
        taken.insert(second);

        let (third, _) = next_free_slug(&base, &taken, 0);
        assert_eq!(third, "quarterly-report-2");
    }

    #[test]
    fn retry_continues_after_the_lost_candidate() {
        // Outro pedido levou o "-1" entre a leitura e o INSERT
        let taken: HashSet<String> = ["news".to_string()].into_iter().collect();
        let (candidate, attempt) = next_free_slug("news", &taken, 2);
        assert_eq!(candidate, "news-2");
        assert_eq!(attempt, 2);
    }
}
