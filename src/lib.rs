//! Screenplay Editor Engine
//!
//! Headless engine for a structured screenplay editor: the typed document
//! model, the element-classification rules, the derived views (scene index,
//! character registry, pagination hints), and the cursor-driven editing
//! session that keeps them consistent under debounced updates.
//!
//! The host rich-text surface owns rendering and undo history; this crate
//! owns the semantics.

pub mod models;
pub mod structure;
pub mod converters;
pub mod api;

// Re-export commonly used types
pub use models::core::{Document, Element, Page, TextRun};
pub use models::elements::{ElementKind, Gender, Mark, MarkSet, SaveStatus};
pub use models::characters::{Character, CharacterError, CharacterRegistry};
pub use models::editor_state::{Pos, SessionState};
pub use structure::scenes::{compute_scenes, Scene};
pub use api::core::Session;
