//! Character-name autocompletion
//!
//! Suggestions appear while typing a character element and are suppressed
//! aggressively: a mid-text cursor, leaving the element, scrolling, or
//! Escape all clear the list. The filter is a case-insensitive starts-with
//! match over registry keys in insertion order, capped at five.

use crate::models::characters::CharacterRegistry;

/// Maximum number of suggestions shown at once
pub const MAX_SUGGESTIONS: usize = 5;

/// Compute the suggestion list for a cursor inside a character element.
///
/// `element_text` is the element's full text and `cursor_offset` the
/// character offset within it. A non-empty element with the cursor anywhere
/// but the end yields no suggestions. Names equal to the typed prefix or to
/// the full element text are excluded; the prefix match ignores case.
pub fn suggest(
    registry: &CharacterRegistry,
    element_text: &str,
    cursor_offset: usize,
) -> Vec<String> {
    let text_len = element_text.chars().count();
    if text_len > 0 && cursor_offset != text_len {
        return Vec::new();
    }

    let prefix: String = element_text
        .chars()
        .take(cursor_offset)
        .collect::<String>()
        .to_lowercase();

    registry
        .names()
        .filter(|name| {
            let lowered = name.to_lowercase();
            lowered != prefix && lowered.starts_with(&prefix) && *name != element_text
        })
        .take(MAX_SUGGESTIONS)
        .map(|name| name.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::elements::Gender;

    fn registry(names: &[&str]) -> CharacterRegistry {
        let mut registry = CharacterRegistry::new();
        for name in names {
            registry.create(name, Gender::Other, "").unwrap();
        }
        registry
    }

    #[test]
    fn test_prefix_filter_in_insertion_order() {
        let registry = registry(&["JOHN", "JOSEPH", "MARY"]);
        assert_eq!(suggest(&registry, "JO", 2), vec!["JOHN", "JOSEPH"]);
    }

    #[test]
    fn test_exact_match_excluded() {
        let registry = registry(&["JOHN", "JOSEPH", "MARY"]);
        assert!(suggest(&registry, "JOHN", 4).is_empty());
        // a name the typed text is a strict prefix of still matches
        assert_eq!(suggest(&registry, "JOS", 3), vec!["JOSEPH"]);
    }

    #[test]
    fn test_mid_text_cursor_suppresses() {
        let registry = registry(&["JOHN"]);
        assert!(suggest(&registry, "JO", 1).is_empty());
    }

    #[test]
    fn test_empty_element_lists_up_to_cap() {
        let registry = registry(&["A", "B", "C", "D", "E", "F", "G"]);
        let list = suggest(&registry, "", 0);
        assert_eq!(list.len(), MAX_SUGGESTIONS);
        assert_eq!(list[0], "A");
    }

    #[test]
    fn test_case_insensitive_prefix() {
        let registry = registry(&["JOHN"]);
        assert_eq!(suggest(&registry, "jo", 2), vec!["JOHN"]);
    }

    #[test]
    fn test_no_match_yields_empty() {
        let registry = registry(&["MARY"]);
        assert!(suggest(&registry, "JO", 2).is_empty());
    }
}
