//! Occurrence scanning for character names
//!
//! Case-insensitive matching of a name against element text. Counting reads
//! the first text run of every element, which is the long-standing behavior
//! the rename warning is calibrated against; substitution is restricted to
//! character-kind elements so a name mentioned in dialogue or action stays
//! untouched.

use regex::{Regex, RegexBuilder};

use crate::models::core::Document;
use crate::models::elements::ElementKind;

/// Build the case-insensitive literal pattern for a name
fn name_pattern(name: &str) -> Option<Regex> {
    match RegexBuilder::new(&regex::escape(name))
        .case_insensitive(true)
        .build()
    {
        Ok(re) => Some(re),
        Err(err) => {
            log::warn!("occurrence pattern for {:?} failed: {}", name, err);
            None
        }
    }
}

/// Count case-insensitive occurrences of `name` across the document,
/// reading the first text run of each element.
pub fn count_occurrences(document: &Document, name: &str) -> usize {
    let Some(re) = name_pattern(name) else {
        return 0;
    };
    document
        .elements()
        .map(|element| re.find_iter(element.first_run_text()).count())
        .sum()
}

/// Substitute every case-insensitive occurrence of `old` with `new` inside
/// character-kind elements only, across all runs. Returns the number of
/// occurrences replaced.
pub fn replace_in_character_elements(document: &mut Document, old: &str, new: &str) -> usize {
    let Some(re) = name_pattern(old) else {
        return 0;
    };
    let mut replaced = 0;
    for page in &mut document.pages {
        for element in &mut page.elements {
            if element.kind != ElementKind::Character {
                continue;
            }
            for run in &mut element.runs {
                let count = re.find_iter(&run.text).count();
                if count > 0 {
                    run.text = re.replace_all(&run.text, new).into_owned();
                    replaced += count;
                }
            }
        }
    }
    if replaced > 0 {
        log::debug!("replaced {} occurrences of {} with {}", replaced, old, new);
    }
    replaced
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::core::{Element, Page};

    fn document(elements: Vec<Element>) -> Document {
        Document {
            pages: vec![Page { elements }],
        }
    }

    #[test]
    fn test_count_is_case_insensitive() {
        let doc = document(vec![
            Element::with_text(ElementKind::Character, "JOHN"),
            Element::with_text(ElementKind::Dialogue, "I am John, call me john."),
        ]);
        assert_eq!(count_occurrences(&doc, "john"), 3);
    }

    #[test]
    fn test_count_reads_first_run_only() {
        let mut element = Element::with_text(ElementKind::Action, "John left. ");
        element
            .runs
            .push(crate::models::core::TextRun::plain("John returned."));
        let doc = document(vec![element]);
        assert_eq!(count_occurrences(&doc, "JOHN"), 1);
    }

    #[test]
    fn test_replace_restricted_to_character_elements() {
        let mut doc = document(vec![
            Element::with_text(ElementKind::Character, "JOHN"),
            Element::with_text(ElementKind::Dialogue, "JOHN is my name."),
            Element::with_text(ElementKind::Character, "john"),
        ]);
        let replaced = replace_in_character_elements(&mut doc, "JOHN", "JACK");
        assert_eq!(replaced, 2);
        assert_eq!(doc.element(0).unwrap().text(), "JACK");
        assert_eq!(doc.element(1).unwrap().text(), "JOHN is my name.");
        assert_eq!(doc.element(2).unwrap().text(), "JACK");
    }

    #[test]
    fn test_regex_metacharacters_treated_literally() {
        let doc = document(vec![Element::with_text(ElementKind::Character, "MR. X")]);
        assert_eq!(count_occurrences(&doc, "MR. X"), 1);
        assert_eq!(count_occurrences(&doc, "MRS X"), 0);
    }
}
