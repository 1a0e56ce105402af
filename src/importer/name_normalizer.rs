// ==========================================
// Vendi Backoffice - Product name normalizer
// ==========================================
// Optional cosmetic rewrite of product names during import.
// Modes: none (keep as-is), uppercase, sentence, title.
// ==========================================

use crate::domain::types::NameNormalization;

pub struct NameNormalizer;

impl NameNormalizer {
    /// Rewrite `name` according to `mode`. Blank input is returned
    /// unchanged; the `none` mode keeps the original string.
    pub fn normalize(name: &str, mode: NameNormalization) -> String {
        if mode == NameNormalization::None {
            return name.to_string();
        }

        let trimmed = name.trim();
        if trimmed.is_empty() {
            return name.to_string();
        }

        match mode {
            NameNormalization::None => name.to_string(),
            NameNormalization::Uppercase => trimmed.to_uppercase(),
            NameNormalization::Sentence => sentence_case(trimmed),
            NameNormalization::Title => title_case(trimmed),
        }
    }
}

/// Lowercase everything, uppercase the first letter.
fn sentence_case(value: &str) -> String {
    let lower = value.to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => lower,
    }
}

/// Lowercase everything, uppercase the first letter of each
/// whitespace-separated word (whitespace runs collapse to one space).
fn title_case(value: &str) -> String {
    value
        .split_whitespace()
        .map(|word| {
            let lower = word.to_lowercase();
            let mut chars = lower.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => lower,
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_none_keeps_original() {
        assert_eq!(
            NameNormalizer::normalize("  cAmisa ", NameNormalization::None),
            "  cAmisa "
        );
    }

    #[test]
    fn test_uppercase() {
        assert_eq!(
            NameNormalizer::normalize("camisa polo", NameNormalization::Uppercase),
            "CAMISA POLO"
        );
        assert_eq!(
            NameNormalizer::normalize("calça", NameNormalization::Uppercase),
            "CALÇA"
        );
    }

    #[test]
    fn test_sentence() {
        assert_eq!(
            NameNormalizer::normalize("CAMISA POLO azul", NameNormalization::Sentence),
            "Camisa polo azul"
        );
        assert_eq!(
            NameNormalizer::normalize("ágata", NameNormalization::Sentence),
            "Ágata"
        );
    }

    #[test]
    fn test_title() {
        assert_eq!(
            NameNormalizer::normalize("camisa POLO azul", NameNormalization::Title),
            "Camisa Polo Azul"
        );
    }

    #[test]
    fn test_blank_unchanged() {
        assert_eq!(NameNormalizer::normalize("", NameNormalization::Title), "");
        assert_eq!(
            NameNormalizer::normalize("   ", NameNormalization::Uppercase),
            "   "
        );
    }
}
