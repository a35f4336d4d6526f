//! Scene index derivation
//!
//! Derives the ordered scene list the navigator sidebar renders: one entry
//! per scene-kind element, with a preview of the following lines and the
//! character-offset span used for jump-to-scene and select-scene.
//!
//! The index is recomputed wholesale on every meaningful document change
//! (debounced by the session); it is never patched incrementally.
//! Correctness over locality.

use serde::{Deserialize, Serialize};

use crate::models::core::{element_span, Document, Element};
use crate::models::elements::ElementKind;

/// Longest preview kept before the forward scan stops
const PREVIEW_TARGET_LEN: usize = 30;

/// One derived scene: a span of the document starting at a scene heading
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Scene {
    /// Uppercased text of the scene-kind element
    pub title: String,

    /// Space-joined text of the following non-scene elements, roughly 30
    /// characters
    pub preview: String,

    /// Global character offset where this scene's element opens
    pub position: usize,

    /// Global character offset where the next scene opens (or the document
    /// ends); `position..next_position` is the selectable span
    pub next_position: usize,
}

/// Forward scan from `start`, accumulating element text until the preview
/// is long enough or the next scene heading is reached (exclusive).
fn scene_preview(elements: &[&Element], start: usize) -> String {
    let mut preview = String::new();
    for element in elements.iter().skip(start) {
        if preview.chars().count() > PREVIEW_TARGET_LEN {
            break;
        }
        match element.kind {
            ElementKind::None => continue,
            ElementKind::Scene => break,
            _ => {
                preview.push_str(&element.text());
                preview.push(' ');
            }
        }
    }
    preview
}

/// Recompute the full scene list from the current document.
///
/// Walks the flattened elements tracking the global offset cursor: the walk
/// starts at 1, every element spans `text_len + 2`, and a `none` element
/// spans exactly 2 without otherwise participating.
pub fn compute_scenes(document: &Document) -> Vec<Scene> {
    let elements: Vec<&Element> = document.elements().collect();
    let mut scenes: Vec<Scene> = Vec::new();
    let mut cursor = 1usize;

    for (idx, element) in elements.iter().enumerate() {
        if element.kind == ElementKind::None {
            cursor += 2;
            continue;
        }

        if element.kind == ElementKind::Scene {
            if let Some(last) = scenes.last_mut() {
                last.next_position = cursor;
            }
            scenes.push(Scene {
                title: element.text().to_uppercase(),
                preview: scene_preview(&elements, idx + 1),
                position: cursor,
                next_position: 0,
            });
        }

        cursor += element_span(element);
    }

    if let Some(last) = scenes.last_mut() {
        last.next_position = cursor;
    }

    log::debug!("scene index recomputed: {} scenes", scenes.len());
    scenes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::core::Page;

    fn document(elements: Vec<Element>) -> Document {
        Document {
            pages: vec![Page { elements }],
        }
    }

    #[test]
    fn test_scene_offsets_chain() {
        let doc = document(vec![
            Element::with_text(ElementKind::Scene, "INT. HOUSE"),
            Element::with_text(ElementKind::Action, "He walks in."),
            Element::with_text(ElementKind::Scene, "EXT. STREET"),
        ]);
        let scenes = compute_scenes(&doc);
        assert_eq!(scenes.len(), 2);

        assert_eq!(scenes[0].position, 1);
        // "INT. HOUSE" spans 12, "He walks in." spans 14
        assert_eq!(scenes[1].position, 27);
        assert_eq!(scenes[0].next_position, scenes[1].position);
        assert_eq!(scenes[1].next_position, doc.end_offset());
    }

    #[test]
    fn test_title_uppercased_and_preview_joined() {
        let doc = document(vec![
            Element::with_text(ElementKind::Scene, "int. house"),
            Element::with_text(ElementKind::Action, "A dark"),
            Element::with_text(ElementKind::Dialogue, "room."),
            Element::with_text(ElementKind::Scene, "EXT. STREET"),
        ]);
        let scenes = compute_scenes(&doc);
        assert_eq!(scenes[0].title, "INT. HOUSE");
        assert_eq!(scenes[0].preview, "A dark room. ");
        // the next scene never leaks into the preview
        assert!(!scenes[0].preview.contains("EXT"));
    }

    #[test]
    fn test_preview_stops_past_thirty_chars() {
        let doc = document(vec![
            Element::with_text(ElementKind::Scene, "INT. HOUSE"),
            Element::with_text(ElementKind::Action, "twelve chars"),
            Element::with_text(ElementKind::Action, "twelve chars"),
            Element::with_text(ElementKind::Action, "twelve chars"),
            Element::with_text(ElementKind::Action, "never reached"),
        ]);
        let scenes = compute_scenes(&doc);
        assert_eq!(scenes[0].preview, "twelve chars twelve chars twelve chars ");
    }

    #[test]
    fn test_none_elements_add_two_and_skip() {
        let doc = document(vec![
            Element::new(ElementKind::None),
            Element::with_text(ElementKind::Scene, "INT. A"),
        ]);
        let scenes = compute_scenes(&doc);
        assert_eq!(scenes.len(), 1);
        assert_eq!(scenes[0].position, 3);
    }

    #[test]
    fn test_idempotent() {
        let doc = document(vec![
            Element::with_text(ElementKind::Scene, "INT. HOUSE"),
            Element::with_text(ElementKind::Action, "text"),
        ]);
        assert_eq!(compute_scenes(&doc), compute_scenes(&doc));
    }

    #[test]
    fn test_no_scenes_yields_empty() {
        let doc = document(vec![Element::with_text(ElementKind::Action, "just action")]);
        assert!(compute_scenes(&doc).is_empty());
    }
}
