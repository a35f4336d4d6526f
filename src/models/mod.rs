//! Data model for the screenplay editor engine
//!
//! - `core`: the Document → Page → Element tree and offset addressing
//! - `elements`: element kinds, inline marks, shared enumerations
//! - `characters`: the named-character registry
//! - `editor_state`: transient per-session state

pub mod core;
pub mod elements;
pub mod characters;
pub mod editor_state;

pub use self::core::{element_span, Document, Element, Location, Page, TextRun};
pub use elements::{ElementKind, Gender, Mark, MarkSet, SaveStatus};
pub use characters::{Character, CharacterError, CharacterRegistry};
pub use editor_state::{Pos, SessionState};
