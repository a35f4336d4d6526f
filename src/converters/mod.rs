//! Converters between the document model and external representations
//!
//! - `interchange`: the canonical JSON wire format persisted to the backend
//! - `export`: shaping the document for the export collaborator

pub mod interchange;
pub mod export;

pub use interchange::{classify, from_json, from_wire, to_json, to_wire, InterchangeError, Node, NodeData, NodeKind};
pub use export::{shape_for_export, ExportNode, ExportOptions, ExportStyle};
