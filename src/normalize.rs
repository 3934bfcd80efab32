// 🔑 Key Normalizer - Canonical keys for equality, display names for people
// Canonical keys are comparison-only; display normalization is presentation-only

// ============================================================================
// CANONICAL KEY
// ============================================================================

/// Canonical key for equality comparison.
///
/// Trim, lowercase, collapse internal whitespace runs to a single space,
/// strip periods, commas and hash marks. Two strings denote the same entity
/// iff their canonical keys are equal. Never shown to the user.
pub fn canonical_key(text: &str) -> String {
    text.trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .filter(|c| !matches!(c, '.' | ',' | '#'))
        .collect()
}

/// Check whether two strings denote the same entity.
pub fn same_entity(a: &str, b: &str) -> bool {
    canonical_key(a) == canonical_key(b)
}

// ============================================================================
// DISPLAY NORMALIZER
// ============================================================================

/// Trailing legal-entity suffixes stripped for display.
const LEGAL_SUFFIXES: &[&str] = &[
    "inc",
    "incorporated",
    "llc",
    "l.l.c",
    "co",
    "company",
    "corp",
    "corporation",
];

/// Display-friendly dealer name. Presentation only - never use for equality.
///
/// Collapses whitespace, strips common trailing legal-entity suffixes
/// (Inc., LLC, Co., Company), and title-cases words while preserving
/// short all-caps tokens like "USA".
pub fn display_dealer(name: &str) -> String {
    let mut words: Vec<&str> = name.split_whitespace().collect();

    // Strip trailing suffixes (and any trailing punctuation they carry)
    while let Some(last) = words.last() {
        let bare: String = last
            .trim_end_matches(|c: char| c == '.' || c == ',')
            .to_lowercase();
        if bare.is_empty() || LEGAL_SUFFIXES.contains(&bare.as_str()) {
            words.pop();
        } else {
            break;
        }
    }

    words
        .iter()
        .map(|w| title_case_word(w))
        .collect::<Vec<_>>()
        .join(" ")
}

fn title_case_word(word: &str) -> String {
    // Keep short all-caps tokens like "USA" or "LLC-free" state codes
    if word.len() <= 3 && word.chars().all(|c| !c.is_lowercase()) {
        return word.to_string();
    }
    let lower = word.to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_key_basic() {
        assert_eq!(canonical_key("  Acme   Seafood  "), "acme seafood");
        assert_eq!(canonical_key("ACME SEAFOOD"), "acme seafood");
    }

    #[test]
    fn test_canonical_key_strips_punctuation() {
        assert_eq!(canonical_key("Acme Seafood, Inc."), "acme seafood inc");
        assert_eq!(canonical_key("Dock #4"), "dock 4");
    }

    #[test]
    fn test_canonical_key_idempotent() {
        let samples = [
            "Acme Seafood Co.",
            "  MACHIAS   bay  ",
            "a.b,c#d",
            "",
            "   ",
            "résumé  Côte",
        ];
        for s in samples {
            let once = canonical_key(s);
            assert_eq!(canonical_key(&once), once, "not idempotent for {:?}", s);
        }
    }

    #[test]
    fn test_same_entity() {
        assert!(same_entity("Acme Seafood", "ACME   SEAFOOD"));
        assert!(same_entity("Acme Seafood, Inc.", "acme seafood inc"));
        assert!(!same_entity("Acme Seafood", "Acme Shellfish"));
    }

    #[test]
    fn test_display_dealer_strips_suffixes() {
        assert_eq!(display_dealer("ACME SEAFOOD CO."), "Acme Seafood");
        assert_eq!(display_dealer("Eastport Shellfish LLC"), "Eastport Shellfish");
        assert_eq!(display_dealer("Bay Harvest Company"), "Bay Harvest");
        assert_eq!(display_dealer("Downeast Trading Inc."), "Downeast Trading");
    }

    #[test]
    fn test_display_dealer_title_cases() {
        assert_eq!(display_dealer("acme seafood"), "Acme Seafood");
        assert_eq!(display_dealer("EASTPORT shellfish"), "Eastport Shellfish");
    }

    #[test]
    fn test_display_dealer_keeps_short_allcaps() {
        // Short all-caps tokens read as intentional (USA, BAY)
        assert_eq!(display_dealer("MACHIAS BAY SEAFOOD"), "Machias BAY Seafood");
        assert_eq!(display_dealer("SEAFOOD OF USA"), "Seafood OF USA");
    }

    #[test]
    fn test_display_dealer_empty() {
        assert_eq!(display_dealer(""), "");
        assert_eq!(display_dealer("   Inc.  "), "");
    }

    #[test]
    fn test_display_is_not_canonical() {
        // The display form is not a key: same entity, different renderings
        assert!(same_entity("ACME SEAFOOD CO.", "Acme Seafood Co"));
        assert_ne!(display_dealer("ACME SEAFOOD"), canonical_key("ACME SEAFOOD"));
    }
}
