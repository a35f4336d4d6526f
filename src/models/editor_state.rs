//! Editing session state
//!
//! This module contains the SessionState struct which represents the
//! transient state of an editing session: the cursor, the element kind and
//! marks under it, the autocomplete suggestion list, and the save status.
//!
//! This is the engine-owned source of truth the host UI renders from.

use serde::{Deserialize, Serialize};

use super::core::Document;
use super::elements::{ElementKind, MarkSet, SaveStatus};

/// A cursor position: flat element index plus character offset within it
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Pos {
    pub element: usize,
    pub offset: usize,
}

impl Pos {
    pub fn new(element: usize, offset: usize) -> Self {
        Self { element, offset }
    }
}

/// Transient state of one editing session
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct SessionState {
    /// Current cursor position
    pub cursor: Pos,

    /// Kind of the element holding the cursor
    pub active_kind: ElementKind,

    /// Marks derived from the run immediately before the cursor (or after
    /// it at the element start); newly typed text carries these
    pub active_marks: MarkSet,

    /// Pending character-name suggestions; empty means no popover
    pub suggestions: Vec<String>,

    /// Persistence status of the open document
    pub save_status: SaveStatus,
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            cursor: Pos::default(),
            active_kind: ElementKind::Action,
            active_marks: MarkSet::EMPTY,
            suggestions: Vec::new(),
            save_status: SaveStatus::Saved,
        }
    }

    /// Clamp the cursor to the document's bounds
    pub fn validate_cursor(&mut self, document: &Document) {
        let count = document.element_count();
        if count == 0 {
            self.cursor = Pos::default();
            return;
        }
        if self.cursor.element >= count {
            self.cursor.element = count - 1;
        }
        if let Some(element) = document.element(self.cursor.element) {
            let max = element.text_len();
            if self.cursor.offset > max {
                self.cursor.offset = max;
            }
        }
    }

    pub fn clear_suggestions(&mut self) {
        self.suggestions.clear();
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}
