//! Derived structure
//!
//! This module derives secondary views (scene index, occurrence counts,
//! pagination hints) from the document model.
//!
//! ## Architecture
//!
//! This layer is stateless - it analyzes the document on demand and returns
//! derived structures. No editing state is stored here.
//!
//! ## Modules
//!
//! - `scenes`: scene list derivation with offset spans and previews
//! - `occurrences`: character-name occurrence counting and substitution
//! - `pagination`: page overflow detection over host-reported geometry

pub mod scenes;
pub mod occurrences;
pub mod pagination;

// Re-exports for convenience
pub use scenes::{compute_scenes, Scene};
pub use occurrences::{count_occurrences, replace_in_character_elements};
pub use pagination::{is_overflown, page_count_estimate, ElementBounds, PageBounds};
