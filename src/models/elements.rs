//! Element kinds and enumerations for screenplay notation
//!
//! This module defines the core enums used throughout the typed
//! screenplay element system.

use serde::{Deserialize, Serialize};
use serde_repr::{Deserialize_repr, Serialize_repr};

/// Enumeration of all screenplay element kinds an editable line can hold.
///
/// Serialized as the lowercase class string carried in the wire format's
/// `attrs.class` field (`"scene"`, `"action"`, ..., `"none"`).
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    /// Scene heading ("INT. HOUSE - DAY")
    Scene,

    /// Action/description line (the default kind)
    Action,

    /// Character name introducing dialogue
    Character,

    /// Spoken dialogue
    Dialogue,

    /// Parenthetical direction inside a dialogue block
    Parenthetical,

    /// Transition ("CUT TO")
    Transition,

    /// Structural section marker
    Section,

    /// Author note, optionally included in exports
    Note,

    /// Empty marker for a just-created line with no committed kind
    None,
}

impl ElementKind {
    /// The class string used on the wire and by the host stylesheet
    pub fn class_name(&self) -> &'static str {
        match self {
            ElementKind::Scene => "scene",
            ElementKind::Action => "action",
            ElementKind::Character => "character",
            ElementKind::Dialogue => "dialogue",
            ElementKind::Parenthetical => "parenthetical",
            ElementKind::Transition => "transition",
            ElementKind::Section => "section",
            ElementKind::Note => "note",
            ElementKind::None => "none",
        }
    }

    /// Parse a wire class string. Unknown classes yield `None` so malformed
    /// content degrades to inert offset-only elements instead of failing a
    /// whole derivation pass.
    pub fn from_class(class: &str) -> Option<ElementKind> {
        match class {
            "scene" => Some(ElementKind::Scene),
            "action" => Some(ElementKind::Action),
            "character" => Some(ElementKind::Character),
            "dialogue" => Some(ElementKind::Dialogue),
            "parenthetical" => Some(ElementKind::Parenthetical),
            "transition" => Some(ElementKind::Transition),
            "section" => Some(ElementKind::Section),
            "note" => Some(ElementKind::Note),
            "none" => Some(ElementKind::None),
            _ => None,
        }
    }

    /// Whether this kind participates in derivation passes at all
    pub fn is_semantic(&self) -> bool {
        !matches!(self, ElementKind::None)
    }

    /// The kind a new element takes when Enter is pressed at the end of an
    /// element of this kind: dialogue blocks continue, everything else
    /// falls back to action.
    pub fn follower(&self) -> ElementKind {
        match self {
            ElementKind::Character | ElementKind::Parenthetical => ElementKind::Dialogue,
            _ => ElementKind::Action,
        }
    }

    /// The Tab key cycles kinds along a fixed ring; kinds outside the ring
    /// are left untouched.
    pub fn tab_cycle(&self) -> ElementKind {
        match self {
            ElementKind::Action => ElementKind::Character,
            ElementKind::Character => ElementKind::Action,
            ElementKind::Parenthetical => ElementKind::Dialogue,
            ElementKind::Dialogue => ElementKind::Parenthetical,
            other => *other,
        }
    }
}

impl Default for ElementKind {
    fn default() -> Self {
        ElementKind::Action
    }
}

/// A single inline style
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mark {
    Bold = 0x01,
    Italic = 0x02,
    Underline = 0x04,
}

impl Mark {
    /// Wire name of this mark
    pub fn class_name(&self) -> &'static str {
        match self {
            Mark::Bold => "bold",
            Mark::Italic => "italic",
            Mark::Underline => "underline",
        }
    }

    pub fn from_class(class: &str) -> Option<Mark> {
        match class {
            "bold" => Some(Mark::Bold),
            "italic" => Some(Mark::Italic),
            "underline" => Some(Mark::Underline),
            _ => None,
        }
    }

    const ALL: [Mark; 3] = [Mark::Bold, Mark::Italic, Mark::Underline];
}

/// Bit flags for the inline styles applied to a text run.
///
/// Marks combine freely (bold italic text is a single run with two bits
/// set), so this is a mask rather than a mutually exclusive enum.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct MarkSet(u8);

impl MarkSet {
    pub const EMPTY: MarkSet = MarkSet(0);

    pub fn new() -> Self {
        MarkSet(0)
    }

    pub fn single(mark: Mark) -> Self {
        MarkSet(mark as u8)
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn contains(&self, mark: Mark) -> bool {
        self.0 & mark as u8 != 0
    }

    pub fn insert(&mut self, mark: Mark) {
        self.0 |= mark as u8;
    }

    pub fn remove(&mut self, mark: Mark) {
        self.0 &= !(mark as u8);
    }

    pub fn toggle(&mut self, mark: Mark) {
        self.0 ^= mark as u8;
    }

    /// Toggle every mark present in `other`, mirroring how the format
    /// sidebar applies a style mask to the current selection.
    pub fn toggle_all(&mut self, other: MarkSet) {
        self.0 ^= other.0;
    }

    /// Iterate set marks in Bold, Italic, Underline order
    pub fn iter(&self) -> impl Iterator<Item = Mark> + '_ {
        Mark::ALL.into_iter().filter(|m| self.contains(*m))
    }
}

impl FromIterator<Mark> for MarkSet {
    fn from_iter<T: IntoIterator<Item = Mark>>(iter: T) -> Self {
        let mut set = MarkSet::new();
        for mark in iter {
            set.insert(mark);
        }
        set
    }
}

/// Character gender, numeric on the wire (0 = Female, 1 = Male, 2 = Other)
#[derive(Serialize_repr, Deserialize_repr, Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Gender {
    Female = 0,
    Male = 1,
    Other = 2,
}

impl Default for Gender {
    fn default() -> Self {
        Gender::Other
    }
}

/// Persistence status of the open document, process-wide per session
#[derive(Serialize_repr, Deserialize_repr, Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum SaveStatus {
    Saving = 0,
    Saved = 1,
    Error = 2,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tab_cycle_ring() {
        assert_eq!(ElementKind::Action.tab_cycle(), ElementKind::Character);
        assert_eq!(ElementKind::Character.tab_cycle(), ElementKind::Action);
        assert_eq!(ElementKind::Parenthetical.tab_cycle(), ElementKind::Dialogue);
        assert_eq!(ElementKind::Dialogue.tab_cycle(), ElementKind::Parenthetical);
        // kinds outside the ring are no-ops
        assert_eq!(ElementKind::Scene.tab_cycle(), ElementKind::Scene);
        assert_eq!(ElementKind::Note.tab_cycle(), ElementKind::Note);
    }

    #[test]
    fn test_follower_kind() {
        assert_eq!(ElementKind::Character.follower(), ElementKind::Dialogue);
        assert_eq!(ElementKind::Parenthetical.follower(), ElementKind::Dialogue);
        assert_eq!(ElementKind::Action.follower(), ElementKind::Action);
        assert_eq!(ElementKind::Scene.follower(), ElementKind::Action);
    }

    #[test]
    fn test_class_round_trip() {
        for kind in [
            ElementKind::Scene,
            ElementKind::Action,
            ElementKind::Character,
            ElementKind::Dialogue,
            ElementKind::Parenthetical,
            ElementKind::Transition,
            ElementKind::Section,
            ElementKind::Note,
            ElementKind::None,
        ] {
            assert_eq!(ElementKind::from_class(kind.class_name()), Some(kind));
        }
        assert_eq!(ElementKind::from_class("heading"), None);
    }

    #[test]
    fn test_kind_serde_as_class_string() {
        let json = serde_json::to_string(&ElementKind::Parenthetical).unwrap();
        assert_eq!(json, "\"parenthetical\"");
        let kind: ElementKind = serde_json::from_str("\"none\"").unwrap();
        assert_eq!(kind, ElementKind::None);
    }

    #[test]
    fn test_mark_set_flags() {
        let mut marks = MarkSet::new();
        assert!(marks.is_empty());

        marks.insert(Mark::Bold);
        marks.insert(Mark::Underline);
        assert!(marks.contains(Mark::Bold));
        assert!(!marks.contains(Mark::Italic));
        assert!(marks.contains(Mark::Underline));

        marks.toggle(Mark::Bold);
        assert!(!marks.contains(Mark::Bold));

        marks.toggle_all(MarkSet::single(Mark::Italic));
        assert!(marks.contains(Mark::Italic));

        let collected: Vec<Mark> = marks.iter().collect();
        assert_eq!(collected, vec![Mark::Italic, Mark::Underline]);
    }

    #[test]
    fn test_gender_numeric_wire_values() {
        assert_eq!(serde_json::to_string(&Gender::Female).unwrap(), "0");
        assert_eq!(serde_json::to_string(&Gender::Male).unwrap(), "1");
        let gender: Gender = serde_json::from_str("2").unwrap();
        assert_eq!(gender, Gender::Other);
    }
}
