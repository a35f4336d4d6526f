//! Export data shaping
//!
//! Flattens the document into the ordered sequence of styled nodes an
//! export backend (PDF or otherwise) lays out. This module only shapes
//! data; file generation mechanics belong to the export collaborator.

use serde::{Deserialize, Serialize};

use crate::models::core::{Document, Element};
use crate::models::elements::ElementKind;

/// Options controlling the shaped output
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ExportOptions {
    pub title: String,
    pub author: String,

    /// When set, only these characters' dialogue blocks are exported;
    /// names are compared against the canonical uppercase form
    pub characters: Option<Vec<String>>,

    /// Diagonal watermark text, if any
    pub watermark: Option<String>,

    /// Page margins: left, top, right, bottom
    pub margins: [f64; 4],

    /// Whether note elements are exported at all
    pub include_notes: bool,

    /// Background color for exported notes
    pub notes_color: Option<String>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            title: String::new(),
            author: String::new(),
            characters: None,
            watermark: None,
            margins: [104.0, 70.0, 70.0, 70.0],
            include_notes: true,
            notes_color: None,
        }
    }
}

/// Style class of one shaped node; `Offset` is a vertical spacer
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ExportStyle {
    Scene,
    Action,
    Character,
    Dialogue,
    Parenthetical,
    Transition,
    Section,
    Note,
    Offset,
}

/// One shaped node, ready for layout
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ExportNode {
    pub style: ExportStyle,
    pub text: String,

    /// Rendered as a filled box (scene headings and notes) rather than a
    /// bare text line
    pub boxed: bool,
}

impl ExportNode {
    fn plain(style: ExportStyle, text: impl Into<String>) -> Self {
        Self {
            style,
            text: text.into(),
            boxed: false,
        }
    }

    fn boxed(style: ExportStyle, text: impl Into<String>) -> Self {
        Self {
            style,
            text: text.into(),
            boxed: true,
        }
    }

    fn offset() -> Self {
        Self::plain(ExportStyle::Offset, "")
    }
}

/// Whether a character line should be dropped under the active filter
fn character_excluded(opts: &ExportOptions, name: &str) -> bool {
    match &opts.characters {
        Some(selected) => !selected.iter().any(|s| s.eq_ignore_ascii_case(name)),
        None => false,
    }
}

/// Shape the document for export.
///
/// Skips `none` elements, applies the per-kind text transforms (uppercase
/// headings, parenthetical wrapping, transition colon), inserts spacing
/// offsets, and elides the whole dialogue block of any character excluded
/// by the filter: the character line plus the consecutive parenthetical and
/// dialogue elements that follow it.
pub fn shape_for_export(document: &Document, opts: &ExportOptions) -> Vec<ExportNode> {
    let elements: Vec<&Element> = document.elements().collect();
    let mut nodes: Vec<ExportNode> = Vec::new();
    let mut i = 0;

    while i < elements.len() {
        let element = elements[i];
        let text = element.text();

        if element.kind == ElementKind::None {
            i += 1;
            continue;
        }

        let next_kind = elements
            .get(i + 1)
            .map(|e| e.kind)
            .unwrap_or(ElementKind::Action);

        if element.kind == ElementKind::Character && character_excluded(opts, &text) {
            // Drop the whole block: this line plus the consecutive
            // parenthetical/dialogue elements following it.
            let mut j = i + 1;
            while j < elements.len()
                && matches!(
                    elements[j].kind,
                    ElementKind::Parenthetical | ElementKind::Dialogue
                )
            {
                j += 1;
            }
            i = j;
            continue;
        }

        match element.kind {
            ElementKind::Scene => {
                nodes.push(ExportNode::boxed(ExportStyle::Scene, text.to_uppercase()));
                nodes.push(ExportNode::offset());
            }
            ElementKind::Character => {
                nodes.push(ExportNode::plain(ExportStyle::Character, text.to_uppercase()));
            }
            ElementKind::Dialogue => {
                nodes.push(ExportNode::plain(ExportStyle::Dialogue, text));
                if next_kind != ElementKind::Parenthetical {
                    nodes.push(ExportNode::offset());
                }
            }
            ElementKind::Parenthetical => {
                nodes.push(ExportNode::plain(
                    ExportStyle::Parenthetical,
                    format!("({})", text),
                ));
            }
            ElementKind::Transition => {
                nodes.push(ExportNode::plain(
                    ExportStyle::Transition,
                    format!("{}:", text.to_uppercase()),
                ));
            }
            ElementKind::Section => {
                nodes.push(ExportNode::plain(ExportStyle::Section, text.to_uppercase()));
            }
            ElementKind::Note => {
                if opts.include_notes {
                    nodes.push(ExportNode::boxed(ExportStyle::Note, text));
                    nodes.push(ExportNode::offset());
                }
            }
            ElementKind::Action | ElementKind::None => {
                nodes.push(ExportNode::plain(ExportStyle::Action, text));
            }
        }

        i += 1;
    }

    nodes
}
