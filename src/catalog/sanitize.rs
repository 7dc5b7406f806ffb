//! Name Sanitization
//!
//! Folds user input and display names into the slug form the catalog uses.

use unicode_normalization::UnicodeNormalization;

/// Converts a display name or search input into a catalog slug.
///
/// Accents are stripped (`Flabébé` → `Flabebe`), gender symbols become
/// letters (`♀` → `f`, `♂` → `m`) and every run of other non-alphanumeric
/// characters becomes a single `-`, never leading or trailing. Case is kept;
/// callers lowercase the result.
pub fn sanitize_name(raw: &str) -> String {
    let mut slug = String::with_capacity(raw.len());
    let mut separator = false;

    for c in raw.nfd() {
        let c = match c {
            '\u{0300}'..='\u{036f}' => continue,
            '♀' => 'f',
            '♂' => 'm',
            c if c.is_ascii_alphanumeric() => c,
            _ => {
                separator = true;
                continue;
            }
        };

        if separator && !slug.is_empty() {
            slug.push('-');
        }
        separator = false;
        slug.push(c);
    }

    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_accents() {
        assert_eq!(sanitize_name("Flabébé"), "Flabebe");
    }

    #[test]
    fn test_gender_symbols() {
        assert_eq!(sanitize_name("Nidoran♀"), "Nidoranf");
        assert_eq!(sanitize_name("Nidoran ♂"), "Nidoran-m");
    }

    #[test]
    fn test_punctuation_collapses_to_single_dash() {
        assert_eq!(sanitize_name("Mr. Mime"), "Mr-Mime");
        assert_eq!(sanitize_name("Farfetch’d"), "Farfetch-d");
        assert_eq!(sanitize_name("  --Type: Null!!  "), "Type-Null");
    }

    #[test]
    fn test_empty_and_symbol_only_input() {
        assert_eq!(sanitize_name(""), "");
        assert_eq!(sanitize_name("?!- "), "");
    }

    #[test]
    fn test_already_clean_name_unchanged() {
        assert_eq!(sanitize_name("porygon-z"), "porygon-z");
        assert_eq!(sanitize_name("Pikachu"), "Pikachu");
    }
}
