//! Host-facing editing API
//!
//! Everything the host application touches goes through a `Session`: key
//! policies, cursor and caret state, scene navigation, the character
//! commands, and the debounced persistence fan-out. The layers below
//! (`models`, `structure`, `converters`) never reach out to a host.

pub mod autocomplete;
pub mod characters;
pub mod core;
pub mod persistence;
pub mod schedule;

pub use autocomplete::{suggest, MAX_SUGGESTIONS};
pub use characters::{edit_character, refresh_from_document, EditOutcome, RenameProposal};
pub use self::core::Session;
pub use persistence::{characters_wire, DirectorySink, PersistenceError, PersistenceSink};
pub use schedule::{
    Debouncer, CHARACTERS_UPDATE_DELAY, EDITOR_SAVE_DELAY, SCENE_UPDATE_DELAY,
};
