//! Host-facing editing session
//!
//! A `Session` owns one open screenplay: the document tree, the character
//! registry, the cached scene index, and the transient editing state the
//! host renders from. Keystroke policies mutate the model synchronously and
//! schedule the debounced fan-out (scene index, character refresh, save);
//! the host drives expiry by calling `tick` with its clock.
//!
//! There is no global document. Every session is an explicit value with its
//! own persistence sink, and dropping it cancels whatever was pending.

use std::time::Instant;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::api::autocomplete::suggest;
use crate::api::characters::{self, EditOutcome, RenameProposal};
use crate::api::persistence::{characters_wire, PersistenceSink};
use crate::api::schedule::{
    Debouncer, CHARACTERS_UPDATE_DELAY, EDITOR_SAVE_DELAY, SCENE_UPDATE_DELAY,
};
use crate::converters::interchange;
use crate::models::characters::{CharacterError, CharacterRegistry};
use crate::models::core::Document;
use crate::models::editor_state::{Pos, SessionState};
use crate::models::elements::{ElementKind, Gender, MarkSet, SaveStatus};
use crate::structure::pagination::{is_overflown, ElementBounds, PageBounds};
use crate::structure::scenes::{compute_scenes, Scene};

/// An action line opening with "int." or "ext." is a scene heading
static SCENE_HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\s*(int|ext)\.").expect("invalid scene heading regex"));

/// One open screenplay and everything the host needs to edit it
pub struct Session {
    project_id: String,
    document: Document,
    registry: CharacterRegistry,
    scenes: Vec<Scene>,
    state: SessionState,
    scene_update: Debouncer,
    characters_update: Debouncer,
    save: Debouncer,
    sink: Box<dyn PersistenceSink>,
}

impl Session {
    /// Start a session on a fresh default screenplay
    pub fn new(project_id: impl Into<String>, sink: Box<dyn PersistenceSink>) -> Self {
        Self::open(
            project_id,
            Document::default_screenplay(),
            CharacterRegistry::new(),
            sink,
        )
    }

    /// Open a loaded document. Structural invariants are repaired, the
    /// scene index and character registry are brought current immediately,
    /// and the cursor lands on the first element.
    pub fn open(
        project_id: impl Into<String>,
        mut document: Document,
        mut registry: CharacterRegistry,
        sink: Box<dyn PersistenceSink>,
    ) -> Self {
        document.ensure_invariants();
        let scenes = compute_scenes(&document);
        characters::refresh_from_document(&document, &mut registry);

        let mut session = Self {
            project_id: project_id.into(),
            document,
            registry,
            scenes,
            state: SessionState::new(),
            scene_update: Debouncer::new(SCENE_UPDATE_DELAY),
            characters_update: Debouncer::new(CHARACTERS_UPDATE_DELAY),
            save: Debouncer::new(EDITOR_SAVE_DELAY),
            sink,
        };
        session.refresh_caret();
        log::info!(
            "session opened: project {}, {} elements, {} scenes",
            session.project_id,
            session.document.element_count(),
            session.scenes.len()
        );
        session
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn registry(&self) -> &CharacterRegistry {
        &self.registry
    }

    /// Scene index as of the last debounced refresh
    pub fn scenes(&self) -> &[Scene] {
        &self.scenes
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Recompute the caret-derived state: active kind, active marks, and
    /// the suggestion list (present only inside a character element with
    /// the cursor at the end).
    fn refresh_caret(&mut self) {
        self.state.validate_cursor(&self.document);
        let cursor = self.state.cursor;
        let element = match self.document.element(cursor.element) {
            Some(element) => element,
            None => return,
        };
        self.state.active_kind = element.kind;
        self.state.active_marks = element.marks_at(cursor.offset);
        if element.kind == ElementKind::Character {
            self.state.suggestions = suggest(&self.registry, &element.text(), cursor.offset);
        } else {
            self.state.clear_suggestions();
        }
    }

    /// Move the cursor; derived caret state follows, and leaving a
    /// character element clears the suggestion popover.
    pub fn set_cursor(&mut self, cursor: Pos) {
        self.state.cursor = cursor;
        self.refresh_caret();
    }

    /// Mark a document mutation: status goes to Saving and all three
    /// debounce windows restart.
    fn touch(&mut self, now: Instant) {
        self.state.save_status = SaveStatus::Saving;
        self.scene_update.schedule(now);
        self.characters_update.schedule(now);
        self.save.schedule(now);
    }

    /// Type a single character at the cursor, carrying the active marks.
    /// A space committed in an action element whose text then reads like a
    /// scene heading promotes the element to a scene.
    pub fn insert_char(&mut self, ch: char, now: Instant) {
        let cursor = self.state.cursor;
        let marks = self.state.active_marks;
        let mut buf = [0u8; 4];
        let text: &str = ch.encode_utf8(&mut buf);
        if let Some(element) = self.document.element_mut(cursor.element) {
            element.insert_text(cursor.offset, text, marks);
            self.state.cursor.offset += 1;
            if ch == ' '
                && element.kind == ElementKind::Action
                && SCENE_HEADING.is_match(&element.text())
            {
                log::debug!("action element promoted to scene heading");
                element.kind = ElementKind::Scene;
            }
        }
        self.touch(now);
        self.refresh_caret();
    }

    /// Insert a text fragment at the cursor (paste path); no kind promotion
    pub fn insert_text(&mut self, text: &str, now: Instant) {
        if text.is_empty() {
            return;
        }
        let cursor = self.state.cursor;
        let marks = self.state.active_marks;
        if let Some(element) = self.document.element_mut(cursor.element) {
            element.insert_text(cursor.offset, text, marks);
            self.state.cursor.offset += text.chars().count();
        }
        self.touch(now);
        self.refresh_caret();
    }

    /// Delete backwards: one character, or at an element start, join the
    /// element into its predecessor.
    pub fn backspace(&mut self, now: Instant) {
        let cursor = self.state.cursor;
        if cursor.offset > 0 {
            if let Some(element) = self.document.element_mut(cursor.element) {
                element.delete_range(cursor.offset - 1, cursor.offset);
            }
            self.state.cursor.offset -= 1;
        } else if cursor.element > 0 {
            if let Some(removed) = self.document.remove_element(cursor.element) {
                if let Some(prev) = self.document.element_mut(cursor.element - 1) {
                    let join_at = prev.text_len();
                    prev.runs.extend(removed.runs);
                    self.state.cursor = Pos::new(cursor.element - 1, join_at);
                }
            }
        } else {
            return;
        }
        self.touch(now);
        self.refresh_caret();
    }

    /// Enter policy, in priority order: commit the top suggestion; coerce
    /// an empty element to action without inserting; split mid-text; insert
    /// the follower kind at the end.
    pub fn key_enter(&mut self, now: Instant) {
        let cursor = self.state.cursor;

        if let Some(name) = self.state.suggestions.first().cloned() {
            if let Some(element) = self.document.element_mut(cursor.element) {
                element.set_text(&name);
                self.state.cursor.offset = element.text_len();
            }
            self.state.clear_suggestions();
            self.touch(now);
            self.refresh_caret();
            return;
        }

        let (len, kind) = match self.document.element(cursor.element) {
            Some(element) => (element.text_len(), element.kind),
            None => return,
        };

        if len == 0 {
            if let Some(element) = self.document.element_mut(cursor.element) {
                element.kind = ElementKind::Action;
            }
        } else if cursor.offset < len {
            let tail = match self.document.element_mut(cursor.element) {
                Some(element) => element.split_at(cursor.offset),
                None => return,
            };
            if let Some(idx) = self.document.insert_after(cursor.element, tail) {
                self.state.cursor = Pos::new(idx, 0);
            }
        } else if let Some(idx) = self
            .document
            .insert_element_after(cursor.element, kind.follower())
        {
            self.state.cursor = Pos::new(idx, 0);
        }

        self.touch(now);
        self.refresh_caret();
    }

    /// Cycle the current element's kind along the tab ring
    pub fn key_tab(&mut self, now: Instant) {
        let next = self.state.active_kind.tab_cycle();
        if next == self.state.active_kind {
            return;
        }
        self.set_element_kind(next, now);
    }

    /// Escape dismisses the suggestion popover; nothing else changes
    pub fn key_escape(&mut self) {
        self.state.clear_suggestions();
    }

    /// A host scroll also dismisses the popover
    pub fn scrolled(&mut self) {
        self.state.clear_suggestions();
    }

    /// Change the cursor element's kind; text and marks stay untouched
    pub fn set_element_kind(&mut self, kind: ElementKind, now: Instant) {
        let cursor = self.state.cursor;
        if let Some(element) = self.document.element_mut(cursor.element) {
            log::debug!(
                "element {} kind {} -> {}",
                cursor.element,
                element.kind.class_name(),
                kind.class_name()
            );
            element.kind = kind;
        }
        self.touch(now);
        self.refresh_caret();
    }

    /// Insert a new empty element of `kind` after the element at `index`
    /// and move the cursor into it.
    pub fn insert_element_after(&mut self, index: usize, kind: ElementKind, now: Instant) {
        if let Some(idx) = self.document.insert_element_after(index, kind) {
            self.state.cursor = Pos::new(idx, 0);
            self.touch(now);
        }
        self.refresh_caret();
    }

    /// Toggle a style mask on the caret: newly typed text carries the result
    pub fn toggle_marks(&mut self, marks: MarkSet) {
        self.state.active_marks.toggle_all(marks);
    }

    /// Insert text at a global character offset
    pub fn insert_text_at(&mut self, text: &str, offset: usize, now: Instant) {
        if text.is_empty() {
            return;
        }
        if let Some(loc) = self.document.locate(offset) {
            if let Some(element) = self.document.element_mut(loc.element) {
                element.insert_text(loc.offset, text, MarkSet::EMPTY);
            }
            self.touch(now);
            self.refresh_caret();
        }
    }

    /// Delete a global character-offset range. A range spanning elements
    /// deletes the covered tail, head, and whole elements in between, then
    /// joins the boundary elements.
    pub fn delete_range(&mut self, start: usize, end: usize, now: Instant) {
        if start >= end {
            return;
        }
        let (from, to) = match (self.document.locate(start), self.document.locate(end)) {
            (Some(from), Some(to)) => (from, to),
            _ => return,
        };

        if from.element == to.element {
            if let Some(element) = self.document.element_mut(from.element) {
                element.delete_range(from.offset, to.offset);
            }
        } else {
            // tail of the last covered element survives and joins the first
            let tail = match self.document.element_mut(to.element) {
                Some(element) => element.split_at(to.offset),
                None => return,
            };
            if let Some(first) = self.document.element_mut(from.element) {
                let len = first.text_len();
                first.delete_range(from.offset, len);
                first.runs.extend(tail.runs);
            }
            // backwards, so removals (and any page drops they cause) never
            // shift the indices still to be removed
            for idx in (from.element + 1..=to.element).rev() {
                self.document.remove_element(idx);
            }
        }
        self.state.cursor = Pos::new(from.element, from.offset);
        self.touch(now);
        self.refresh_caret();
    }

    /// Replace a global character-offset range with plain text
    pub fn replace_range(&mut self, start: usize, end: usize, text: &str, now: Instant) {
        self.delete_range(start, end, now);
        self.insert_text_at(text, start, now);
    }

    /// Move the cursor to the opening of the scene at `index`
    pub fn jump_to_scene(&mut self, index: usize) -> Option<Pos> {
        let position = self.scenes.get(index)?.position;
        let loc = self.document.locate(position)?;
        self.set_cursor(Pos::new(loc.element, 0));
        Some(self.state.cursor)
    }

    /// The global offset span `position..next_position` of the scene at
    /// `index`, for a host-side selection.
    pub fn select_scene(&self, index: usize) -> Option<(usize, usize)> {
        let scene = self.scenes.get(index)?;
        Some((scene.position, scene.next_position))
    }

    /// Register a new character. The character map is persisted with the
    /// screenplay, so the change enters the save lifecycle like a text edit.
    pub fn create_character(
        &mut self,
        name: &str,
        gender: Gender,
        synopsis: &str,
        now: Instant,
    ) -> Result<(), CharacterError> {
        self.registry.create(name, gender, synopsis)?;
        self.touch(now);
        self.refresh_caret();
        Ok(())
    }

    /// Remove a registry entry; text mentions are left untouched
    pub fn delete_character(&mut self, name: &str, now: Instant) -> bool {
        let deleted = self.registry.delete(name);
        if deleted {
            self.touch(now);
            self.refresh_caret();
        }
        deleted
    }

    /// Edit a character's name and metadata. A rename that touches existing
    /// text returns `NeedsConfirmation` without mutating anything; pass the
    /// proposal to `confirm_rename` or drop it. An applied edit schedules
    /// the save fan-out.
    pub fn edit_character(
        &mut self,
        existing_name: &str,
        new_name: &str,
        gender: Gender,
        synopsis: &str,
        now: Instant,
    ) -> Result<EditOutcome, CharacterError> {
        let outcome = characters::edit_character(
            &mut self.document,
            &mut self.registry,
            existing_name,
            new_name,
            gender,
            synopsis,
        )?;
        if matches!(outcome, EditOutcome::Applied) {
            self.touch(now);
            self.refresh_caret();
        }
        Ok(outcome)
    }

    /// Apply a confirmed rename and schedule the fan-out for the rewritten
    /// text. Returns the number of occurrences replaced.
    pub fn confirm_rename(
        &mut self,
        proposal: RenameProposal,
        now: Instant,
    ) -> Result<usize, CharacterError> {
        let replaced = proposal.confirm(&mut self.document, &mut self.registry)?;
        self.touch(now);
        self.refresh_caret();
        Ok(replaced)
    }

    /// Record the host's measured layout after a transaction. Overflow is
    /// observed and logged; no reflow is performed.
    pub fn observe_layout(&self, elements: &[ElementBounds], page: &PageBounds) {
        for (idx, bounds) in elements.iter().enumerate() {
            if is_overflown(bounds, page) {
                log::warn!(
                    "element {} overflows its page (top {} height {} against {})",
                    idx,
                    bounds.top,
                    bounds.height,
                    page.content_height
                );
            }
        }
    }

    /// Drive debounce expiry. Fires at most one refresh per concern per
    /// schedule: the scene index and character registry are recomputed
    /// wholesale, and an expired save window flushes to the sink.
    pub fn tick(&mut self, now: Instant) {
        if self.scene_update.fire_if_due(now) {
            self.scenes = compute_scenes(&self.document);
        }
        if self.characters_update.fire_if_due(now) {
            characters::refresh_from_document(&self.document, &mut self.registry);
            self.refresh_caret();
        }
        if self.save.fire_if_due(now) {
            self.save_now();
        }
    }

    /// Flush the current document and character map to the sink, bypassing
    /// the debounce window.
    pub fn save_now(&mut self) {
        self.state.save_status = SaveStatus::Saving;
        let document = match interchange::to_json(&self.document) {
            Ok(value) => value,
            Err(err) => {
                log::warn!("save failed for project {}: {}", self.project_id, err);
                self.state.save_status = SaveStatus::Error;
                return;
            }
        };
        let characters = characters_wire(&self.registry);
        match self
            .sink
            .save_screenplay(&self.project_id, &document, &characters)
        {
            Ok(()) => self.state.save_status = SaveStatus::Saved,
            Err(err) => {
                log::warn!("save failed for project {}: {}", self.project_id, err);
                self.state.save_status = SaveStatus::Error;
            }
        }
    }

    /// Cancel everything pending. A closed session never saves again.
    pub fn close(&mut self) {
        self.scene_update.cancel();
        self.characters_update.cancel();
        self.save.cancel();
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.close();
    }
}
