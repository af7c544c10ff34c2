//! Error types for the layer model and the resource arena.

use crate::id::LayerId;
use crate::resources::ResourceHandle;

/// Programmer errors raised by the model. Normal editing never produces these.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("layer id `{0}` is already in use")]
    DuplicateId(LayerId),

    #[error("invalid canvas size {width}x{height}: both sides must be positive")]
    InvalidCanvas { width: f32, height: f32 },
}

/// Misuse of a transient resource handle. Logged, never shown to the user.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceError {
    #[error("resource {0} was already released")]
    AlreadyReleased(ResourceHandle),

    #[error("resource {0} was never acquired by this arena")]
    Unknown(ResourceHandle),
}
