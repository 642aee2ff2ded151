//! Case- and accent-insensitive text normalization.
//!
//! Control keywords and affirmation words must match however the user types
//! them ("Não", "nao", "NÃO"), so comparisons go through `fold` first.

/// Lowercase and strip the diacritics that occur in Portuguese text.
pub fn fold(text: &str) -> String {
    text.trim()
        .chars()
        .flat_map(|c| c.to_lowercase())
        .map(|c| match c {
            'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'í' | 'ì' | 'î' | 'ï' => 'i',
            'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
            'ú' | 'ù' | 'û' | 'ü' => 'u',
            'ç' => 'c',
            other => other,
        })
        .collect()
}

/// Whole-string match against a folded keyword set.
pub fn matches_any(text: &str, keywords: &[&str]) -> bool {
    let folded = fold(text);
    keywords.iter().any(|k| folded == *k)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold_accents_and_case() {
        assert_eq!(fold("NÃO"), "nao");
        assert_eq!(fold("  Reunião às 15h "), "reuniao as 15h");
        assert_eq!(fold("começar"), "comecar");
    }

    #[test]
    fn test_matches_any_is_whole_string() {
        assert!(matches_any("Cancelar", &["cancelar"]));
        assert!(matches_any("CANCELA", &["cancelar", "cancela"]));
        assert!(!matches_any("cancelar tudo amanhã", &["cancelar"]));
    }
}
