//! Immutable inputs for a template build.
//!
//! A build runs asynchronously while the user may keep editing, so it works
//! from a copy taken up front: the layers in creation order plus the bytes
//! behind every pending local image.

use crate::error::ResourceError;
use crate::model::{CanvasSpec, Layer};
use crate::resources::LocalFile;

/// One layer as captured at snapshot time.
#[derive(Debug, Clone)]
pub struct SnapshotLayer {
    pub layer: Layer,
    /// Bytes behind the layer's local handle. `None` when the layer has no
    /// handle, `Err` when the handle could no longer be read.
    pub pending: Option<Result<LocalFile, ResourceError>>,
}

/// Everything `TemplateBuilder::build` needs. Nothing in here refers back
/// to live editor state.
#[derive(Debug, Clone)]
pub struct BuildRequest {
    /// Explicit document id; a time-based one is generated when absent.
    pub id: Option<String>,
    pub name: String,
    pub category: String,
    pub canvas: CanvasSpec,
    pub background: Option<LocalFile>,
    pub thumbnail: Option<LocalFile>,
    /// Creation order.
    pub layers: Vec<SnapshotLayer>,
}
