pub mod coords;
pub mod error;
pub mod id;
pub mod model;
pub mod resources;
pub mod snapshot;
pub mod store;
pub mod template;

pub use coords::{PreviewConfig, clamp, compute_scale, preview_delta_to_canvas_delta};
pub use error::{ModelError, ResourceError};
pub use id::LayerId;
pub use model::*;
pub use resources::{LocalFile, ResourceArena, ResourceHandle, ResourceLifecycle};
pub use snapshot::{BuildRequest, SnapshotLayer};
pub use store::LayerStore;
pub use template::{DEFAULT_CATEGORY, Element, KNOWN_CATEGORIES, Template};
