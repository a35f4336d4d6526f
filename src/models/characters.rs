//! Character registry
//!
//! The registry owns the set of named characters and their metadata. The
//! document only owns text that happens to mention character names; the two
//! are kept eventually-consistent by the session's debounced refresh, never
//! transactionally linked.
//!
//! Name identity is case-insensitive and the canonical stored form is
//! uppercase. Iteration order is insertion order, which is also the
//! suggestion order contract, so the backing store is a Vec rather than a
//! map.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::elements::Gender;

/// Registry operation failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CharacterError {
    /// The target name is already taken by a different character
    /// (case-insensitive)
    #[error("a character named {0} already exists")]
    NameConflict(String),

    /// The character to edit or delete is not in the registry
    #[error("no character named {0}")]
    UnknownCharacter(String),
}

/// A named character, distinct from its textual mentions
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Character {
    pub name: String,
    pub gender: Gender,
    pub synopsis: String,

    /// Explicitly created through the registry, as opposed to inferred from
    /// a character-kind element encountered in the text
    pub persistent: bool,

    /// Mention count from the last document refresh
    #[serde(default)]
    pub occurrences: usize,
}

impl Character {
    pub fn new(name: impl Into<String>, gender: Gender, synopsis: impl Into<String>) -> Self {
        Self {
            name: name.into().to_uppercase(),
            gender,
            synopsis: synopsis.into(),
            persistent: true,
            occurrences: 0,
        }
    }

    /// An entry inferred from the text rather than created by the user
    pub fn inferred(name: impl Into<String>) -> Self {
        Self {
            name: name.into().to_uppercase(),
            gender: Gender::Other,
            synopsis: String::new(),
            persistent: false,
            occurrences: 0,
        }
    }
}

/// Insertion-ordered character set with case-insensitive identity
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct CharacterRegistry {
    characters: Vec<Character>,
}

impl CharacterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.characters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Character> {
        self.characters.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Character> {
        self.characters.iter_mut()
    }

    /// Registry keys in insertion order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.characters.iter().map(|c| c.name.as_str())
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.characters
            .iter()
            .position(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// Case-insensitive lookup
    pub fn get(&self, name: &str) -> Option<&Character> {
        self.position(name).map(|i| &self.characters[i])
    }

    /// Case-insensitive existence check
    pub fn exists(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Create a new persistent character. Fails when the name is already
    /// taken, comparing case-insensitively.
    pub fn create(
        &mut self,
        name: &str,
        gender: Gender,
        synopsis: &str,
    ) -> Result<(), CharacterError> {
        if self.exists(name) {
            return Err(CharacterError::NameConflict(name.to_uppercase()));
        }
        log::debug!("registering character {}", name.to_uppercase());
        self.characters.push(Character::new(name, gender, synopsis));
        Ok(())
    }

    /// Insert an entry without a conflict check; used by the document
    /// refresh for inferred names already known to be absent.
    pub fn insert_raw(&mut self, character: Character) {
        self.characters.push(character);
    }

    /// Update gender and synopsis in place, marking the entry persistent
    pub fn update_meta(
        &mut self,
        name: &str,
        gender: Gender,
        synopsis: &str,
    ) -> Result<(), CharacterError> {
        let idx = self
            .position(name)
            .ok_or_else(|| CharacterError::UnknownCharacter(name.to_uppercase()))?;
        let entry = &mut self.characters[idx];
        entry.gender = gender;
        entry.synopsis = synopsis.to_string();
        entry.persistent = true;
        Ok(())
    }

    /// Remove an entry. Existing text occurrences are left untouched; the
    /// orphaned mentions stay as plain text.
    pub fn delete(&mut self, name: &str) -> bool {
        match self.position(name) {
            Some(idx) => {
                self.characters.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Retain only entries matching the predicate
    pub fn retain(&mut self, f: impl FnMut(&Character) -> bool) {
        self.characters.retain(f);
    }

    /// Wire shape persisted alongside the screenplay: a map keyed by
    /// canonical name.
    pub fn to_wire(&self) -> serde_json::Value {
        let mut map = serde_json::Map::new();
        for c in &self.characters {
            map.insert(
                c.name.clone(),
                serde_json::json!({
                    "gender": c.gender,
                    "synopsis": c.synopsis,
                    "persistent": c.persistent,
                }),
            );
        }
        serde_json::Value::Object(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_uppercases_and_conflicts() {
        let mut registry = CharacterRegistry::new();
        registry.create("John", Gender::Male, "the hero").unwrap();
        assert!(registry.exists("JOHN"));
        assert!(registry.exists("john"));
        assert_eq!(registry.get("john").unwrap().name, "JOHN");

        let err = registry.create("jOhN", Gender::Male, "").unwrap_err();
        assert_eq!(err, CharacterError::NameConflict("JOHN".to_string()));
    }

    #[test]
    fn test_names_keep_insertion_order() {
        let mut registry = CharacterRegistry::new();
        registry.create("JOHN", Gender::Male, "").unwrap();
        registry.create("JOSEPH", Gender::Male, "").unwrap();
        registry.create("MARY", Gender::Female, "").unwrap();
        let names: Vec<&str> = registry.names().collect();
        assert_eq!(names, vec!["JOHN", "JOSEPH", "MARY"]);
    }

    #[test]
    fn test_update_meta_promotes_to_persistent() {
        let mut registry = CharacterRegistry::new();
        registry.insert_raw(Character::inferred("guard"));
        assert!(!registry.get("GUARD").unwrap().persistent);

        registry
            .update_meta("guard", Gender::Other, "palace guard")
            .unwrap();
        let entry = registry.get("GUARD").unwrap();
        assert!(entry.persistent);
        assert_eq!(entry.synopsis, "palace guard");
    }

    #[test]
    fn test_delete_unknown_is_false() {
        let mut registry = CharacterRegistry::new();
        assert!(!registry.delete("NOBODY"));
    }

    #[test]
    fn test_wire_map_shape() {
        let mut registry = CharacterRegistry::new();
        registry.create("MARY", Gender::Female, "lead").unwrap();
        let wire = registry.to_wire();
        assert_eq!(wire["MARY"]["gender"], 0);
        assert_eq!(wire["MARY"]["synopsis"], "lead");
        assert_eq!(wire["MARY"]["persistent"], true);
    }
}
