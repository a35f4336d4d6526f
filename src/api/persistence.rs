//! Persistence collaborator interface
//!
//! The backend is an external collaborator performing idempotent
//! full-document overwrites. The session sets the save status to `Saving`
//! before invoking the sink and to `Saved`/`Error` on the response; there
//! is no automatic retry, the next save attempt clears an error.

use std::fs;
use std::path::PathBuf;

use thiserror::Error;

use crate::models::characters::CharacterRegistry;

/// Save failures surfaced to the status indicator
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("save request failed: {0}")]
    Backend(String),

    #[error("serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("write failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Destination for debounced full-document saves
pub trait PersistenceSink {
    /// Overwrite the stored screenplay and character map for a project
    fn save_screenplay(
        &mut self,
        project_id: &str,
        document: &serde_json::Value,
        characters: &serde_json::Value,
    ) -> Result<(), PersistenceError>;

    /// Overwrite the stored title page for a project. Title pages reuse the
    /// wire structure and are passed through opaquely.
    fn save_title_page(
        &mut self,
        project_id: &str,
        document: &serde_json::Value,
    ) -> Result<(), PersistenceError>;
}

/// Serialize the character registry into the persisted map shape
pub fn characters_wire(registry: &CharacterRegistry) -> serde_json::Value {
    registry.to_wire()
}

/// File-backed sink writing one JSON document per project under a root
/// directory. Used for local persistence and in tests.
pub struct DirectorySink {
    root: PathBuf,
}

impl DirectorySink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn write(&self, file_name: &str, value: &serde_json::Value) -> Result<(), PersistenceError> {
        fs::create_dir_all(&self.root)?;
        let path = self.root.join(file_name);
        fs::write(&path, serde_json::to_vec_pretty(value)?)?;
        log::debug!("wrote {}", path.display());
        Ok(())
    }
}

impl PersistenceSink for DirectorySink {
    fn save_screenplay(
        &mut self,
        project_id: &str,
        document: &serde_json::Value,
        characters: &serde_json::Value,
    ) -> Result<(), PersistenceError> {
        let payload = serde_json::json!({
            "screenplay": document,
            "characters": characters,
        });
        self.write(&format!("{}.screenplay.json", project_id), &payload)
    }

    fn save_title_page(
        &mut self,
        project_id: &str,
        document: &serde_json::Value,
    ) -> Result<(), PersistenceError> {
        self.write(&format!("{}.title.json", project_id), document)
    }
}
