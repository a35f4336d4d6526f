//! Document wire format
//!
//! The canonical on-disk and over-the-wire representation exchanged with
//! the persistence collaborator: nested structural nodes tagged by `type`
//! (`screenplay` | `page` | `element` | `text`), with elements carrying the
//! kind string in `attrs.class` and text runs carrying mark annotations.
//! Known content must round-trip exactly.
//!
//! An unrecognized `attrs.class` does not fail deserialization: the element
//! degrades to the `none` kind, which contributes only character offsets
//! and never a scene boundary.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::core::{Document, Element, Page, TextRun};
use crate::models::elements::{ElementKind, Mark, MarkSet};

/// Interchange failures
#[derive(Debug, Error)]
pub enum InterchangeError {
    /// JSON structure does not match the wire schema
    #[error("invalid document JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// A node appeared where the schema does not allow it
    #[error("unexpected {found} node inside {context}")]
    UnexpectedNode {
        found: &'static str,
        context: &'static str,
    },
}

/// One mark annotation on a text run (`{"type": "bold"}`)
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct MarkNode {
    #[serde(rename = "type")]
    pub kind: MarkName,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum MarkName {
    Bold,
    Italic,
    Underline,
}

impl MarkName {
    fn to_mark(self) -> Mark {
        match self {
            MarkName::Bold => Mark::Bold,
            MarkName::Italic => Mark::Italic,
            MarkName::Underline => Mark::Underline,
        }
    }

    fn from_mark(mark: Mark) -> MarkName {
        match mark {
            Mark::Bold => MarkName::Bold,
            Mark::Italic => MarkName::Italic,
            Mark::Underline => MarkName::Underline,
        }
    }
}

/// Element attributes; `class` stays a raw string so unknown kinds can
/// degrade instead of failing the whole document
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct ElementAttrs {
    pub class: String,
}

/// A wire node
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Node {
    Screenplay {
        content: Vec<Node>,
    },
    Page {
        content: Vec<Node>,
    },
    Element {
        attrs: ElementAttrs,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        content: Vec<Node>,
    },
    Text {
        text: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        marks: Vec<MarkNode>,
    },
}

/// Classification of a wire node for derivation passes
#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
    /// Structural page boundary, skipped by every derivation pass
    Page,
    Element(ElementKind),
}

/// Semantic kind plus flattened plain text of a wire node
#[derive(Clone, Debug, PartialEq)]
pub struct NodeData {
    pub kind: NodeKind,
    pub text: String,
}

/// Flatten inline content to plain text, ignoring marks
fn flatten_text(content: &[Node]) -> String {
    let mut out = String::new();
    for node in content {
        if let Node::Text { text, .. } = node {
            out.push_str(text);
        }
    }
    out
}

/// Extract the semantic kind and flattened text from a wire node.
///
/// Page nodes classify as a non-semantic marker; screenplay and stray text
/// nodes have no classification of their own and degrade to `none`.
pub fn classify(node: &Node) -> NodeData {
    match node {
        Node::Page { .. } => NodeData {
            kind: NodeKind::Page,
            text: String::new(),
        },
        Node::Element { attrs, content } => {
            let kind = ElementKind::from_class(&attrs.class).unwrap_or_else(|| {
                log::warn!("unknown element class {:?}, treating as none", attrs.class);
                ElementKind::None
            });
            NodeData {
                kind: NodeKind::Element(kind),
                text: flatten_text(content),
            }
        }
        Node::Screenplay { .. } => NodeData {
            kind: NodeKind::Element(ElementKind::None),
            text: String::new(),
        },
        Node::Text { text, .. } => NodeData {
            kind: NodeKind::Element(ElementKind::None),
            text: text.clone(),
        },
    }
}

fn marks_to_wire(marks: MarkSet) -> Vec<MarkNode> {
    marks
        .iter()
        .map(|m| MarkNode {
            kind: MarkName::from_mark(m),
        })
        .collect()
}

fn marks_from_wire(nodes: &[MarkNode]) -> MarkSet {
    nodes.iter().map(|n| n.kind.to_mark()).collect()
}

fn element_to_wire(element: &Element) -> Node {
    Node::Element {
        attrs: ElementAttrs {
            class: element.kind.class_name().to_string(),
        },
        content: element
            .runs
            .iter()
            .filter(|run| !run.is_empty())
            .map(|run| Node::Text {
                text: run.text.clone(),
                marks: marks_to_wire(run.marks),
            })
            .collect(),
    }
}

fn element_from_wire(attrs: &ElementAttrs, content: &[Node]) -> Result<Element, InterchangeError> {
    let kind = ElementKind::from_class(&attrs.class).unwrap_or_else(|| {
        log::warn!("unknown element class {:?}, treating as none", attrs.class);
        ElementKind::None
    });
    let mut runs = Vec::new();
    for node in content {
        match node {
            Node::Text { text, marks } => runs.push(TextRun::new(text.clone(), marks_from_wire(marks))),
            other => {
                return Err(InterchangeError::UnexpectedNode {
                    found: wire_name(other),
                    context: "element",
                })
            }
        }
    }
    Ok(Element { kind, runs })
}

fn wire_name(node: &Node) -> &'static str {
    match node {
        Node::Screenplay { .. } => "screenplay",
        Node::Page { .. } => "page",
        Node::Element { .. } => "element",
        Node::Text { .. } => "text",
    }
}

/// Serialize a document into its wire tree
pub fn to_wire(document: &Document) -> Node {
    Node::Screenplay {
        content: document
            .pages
            .iter()
            .map(|page| Node::Page {
                content: page.elements.iter().map(element_to_wire).collect(),
            })
            .collect(),
    }
}

/// Rebuild a document from its wire tree, repairing structural invariants.
///
/// A bare element at the screenplay level is tolerated by wrapping it in an
/// implicit page (the title-page variant of the format omits pages).
pub fn from_wire(node: &Node) -> Result<Document, InterchangeError> {
    let content = match node {
        Node::Screenplay { content } => content,
        other => {
            return Err(InterchangeError::UnexpectedNode {
                found: wire_name(other),
                context: "document root",
            })
        }
    };

    let mut document = Document { pages: Vec::new() };
    let mut loose_elements: Vec<Element> = Vec::new();

    for child in content {
        match child {
            Node::Page { content } => {
                let mut page = Page { elements: Vec::new() };
                for node in content {
                    match node {
                        Node::Element { attrs, content } => {
                            page.elements.push(element_from_wire(attrs, content)?)
                        }
                        other => {
                            return Err(InterchangeError::UnexpectedNode {
                                found: wire_name(other),
                                context: "page",
                            })
                        }
                    }
                }
                document.pages.push(page);
            }
            Node::Element { attrs, content } => {
                loose_elements.push(element_from_wire(attrs, content)?)
            }
            other => {
                return Err(InterchangeError::UnexpectedNode {
                    found: wire_name(other),
                    context: "screenplay",
                })
            }
        }
    }

    if !loose_elements.is_empty() {
        document.pages.push(Page {
            elements: loose_elements,
        });
    }

    document.ensure_invariants();
    Ok(document)
}

/// Serialize a document straight to a JSON value
pub fn to_json(document: &Document) -> Result<serde_json::Value, InterchangeError> {
    Ok(serde_json::to_value(to_wire(document))?)
}

/// Parse a document from a JSON value
pub fn from_json(value: serde_json::Value) -> Result<Document, InterchangeError> {
    let node: Node = serde_json::from_value(value)?;
    from_wire(&node)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_page_is_marker() {
        let node = Node::Page { content: vec![] };
        assert_eq!(classify(&node).kind, NodeKind::Page);
    }

    #[test]
    fn test_classify_flattens_runs() {
        let node = Node::Element {
            attrs: ElementAttrs {
                class: "dialogue".to_string(),
            },
            content: vec![
                Node::Text {
                    text: "Get ".to_string(),
                    marks: vec![],
                },
                Node::Text {
                    text: "out".to_string(),
                    marks: vec![MarkNode { kind: MarkName::Bold }],
                },
            ],
        };
        let data = classify(&node);
        assert_eq!(data.kind, NodeKind::Element(ElementKind::Dialogue));
        assert_eq!(data.text, "Get out");
    }

    #[test]
    fn test_unknown_class_degrades_to_none() {
        let node = Node::Element {
            attrs: ElementAttrs {
                class: "montage".to_string(),
            },
            content: vec![],
        };
        assert_eq!(classify(&node).kind, NodeKind::Element(ElementKind::None));
    }

    #[test]
    fn test_wire_tag_strings() {
        let doc = Document::new();
        let json = to_json(&doc).unwrap();
        assert_eq!(json["type"], "screenplay");
        assert_eq!(json["content"][0]["type"], "page");
        assert_eq!(json["content"][0]["content"][0]["type"], "element");
        assert_eq!(json["content"][0]["content"][0]["attrs"]["class"], "action");
    }
}
