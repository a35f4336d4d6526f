//! Character commands: the two-phase rename protocol and the document
//! refresh
//!
//! Renaming a character that is mentioned in the text is destructive, so it
//! runs as propose → confirm/cancel: the proposal carries the occurrence
//! count the caller shows the user, and nothing is mutated until the caller
//! confirms. Cancelling leaves both document and registry untouched.

use crate::models::characters::{Character, CharacterError, CharacterRegistry};
use crate::models::core::Document;
use crate::models::elements::{ElementKind, Gender};
use crate::structure::occurrences::{count_occurrences, replace_in_character_elements};

/// Result of an edit request
#[derive(Debug)]
pub enum EditOutcome {
    /// The change was applied immediately (metadata-only edit, or a rename
    /// with no text occurrences)
    Applied,

    /// A rename touching existing text; nothing has been mutated yet
    NeedsConfirmation(RenameProposal),
}

/// A pending rename awaiting explicit confirmation
#[derive(Debug, Clone, PartialEq)]
pub struct RenameProposal {
    pub old_name: String,
    pub new_name: String,
    pub gender: Gender,
    pub synopsis: String,

    /// How many text occurrences of the old name the caller is being asked
    /// about (counted across all element text, the same number the warning
    /// dialog shows)
    pub occurrences: usize,
}

impl RenameProposal {
    /// Apply the rename: substitute the old name inside character-kind
    /// elements, then replace the registry entry (delete old, insert new).
    /// Returns the number of occurrences actually replaced.
    pub fn confirm(
        self,
        document: &mut Document,
        registry: &mut CharacterRegistry,
    ) -> Result<usize, CharacterError> {
        if !registry.exists(&self.old_name) {
            return Err(CharacterError::UnknownCharacter(self.old_name));
        }
        let replaced = replace_in_character_elements(document, &self.old_name, &self.new_name);
        registry.delete(&self.old_name);
        registry.insert_raw(Character::new(&self.new_name, self.gender, &self.synopsis));
        log::info!(
            "renamed character {} to {} ({} occurrences rewritten)",
            self.old_name,
            self.new_name,
            replaced
        );
        Ok(replaced)
    }

    /// Drop the proposal; document and registry stay untouched
    pub fn cancel(self) {}
}

fn apply_rename(
    document: &mut Document,
    registry: &mut CharacterRegistry,
    proposal: RenameProposal,
) -> Result<(), CharacterError> {
    proposal.confirm(document, registry).map(|_| ())
}

/// Edit a character's name and metadata.
///
/// A same-name edit (case-insensitive) updates gender and synopsis in
/// place. A rename fails with `NameConflict` when the target name belongs
/// to a different character; otherwise it is applied directly when the old
/// name has no text occurrences and returns a proposal when it does.
pub fn edit_character(
    document: &mut Document,
    registry: &mut CharacterRegistry,
    existing_name: &str,
    new_name: &str,
    gender: Gender,
    synopsis: &str,
) -> Result<EditOutcome, CharacterError> {
    if !registry.exists(existing_name) {
        return Err(CharacterError::UnknownCharacter(existing_name.to_uppercase()));
    }

    let canonical_new = new_name.to_uppercase();
    if canonical_new.eq_ignore_ascii_case(existing_name) {
        registry.update_meta(existing_name, gender, synopsis)?;
        return Ok(EditOutcome::Applied);
    }

    if registry.exists(&canonical_new) {
        return Err(CharacterError::NameConflict(canonical_new));
    }

    let occurrences = count_occurrences(document, existing_name);
    let proposal = RenameProposal {
        old_name: existing_name.to_uppercase(),
        new_name: canonical_new,
        gender,
        synopsis: synopsis.to_string(),
        occurrences,
    };

    if occurrences == 0 {
        apply_rename(document, registry, proposal)?;
        return Ok(EditOutcome::Applied);
    }

    Ok(EditOutcome::NeedsConfirmation(proposal))
}

/// Reconcile the registry with the document: register unknown names found
/// in character-kind elements as inferred entries, refresh occurrence
/// counts, and drop inferred entries whose mentions have vanished.
/// Persistent entries always survive.
pub fn refresh_from_document(document: &Document, registry: &mut CharacterRegistry) {
    for element in document.elements() {
        if element.kind != ElementKind::Character {
            continue;
        }
        let name = element.text().trim().to_uppercase();
        if name.is_empty() || registry.exists(&name) {
            continue;
        }
        log::debug!("inferred character {} from text", name);
        registry.insert_raw(Character::inferred(name));
    }

    let counts: Vec<(String, usize)> = registry
        .names()
        .map(|name| (name.to_string(), count_occurrences(document, name)))
        .collect();
    for (name, count) in counts {
        if let Some(entry) = registry.iter_mut().find(|c| c.name == name) {
            entry.occurrences = count;
        }
    }

    registry.retain(|c| c.persistent || c.occurrences > 0);
}
