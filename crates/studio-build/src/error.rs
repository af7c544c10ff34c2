//! Build error taxonomy.
//!
//! Validation and upload failures abort the build and come back as a
//! [`BuildError`]. A single image layer that cannot be resolved only yields a
//! [`LayerResolutionWarning`] and is left out of the document.

use crate::stores::AssetKind;
use smallvec::SmallVec;
use std::fmt;
use studio_core::LayerId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredField {
    Name,
    Background,
    Thumbnail,
}

impl fmt::Display for RequiredField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Name => "name",
            Self::Background => "background",
            Self::Thumbnail => "thumbnail",
        })
    }
}

fn join_fields(fields: &[RequiredField]) -> String {
    fields.iter().map(|f| f.to_string()).collect::<Vec<_>>().join(", ")
}

/// Required top-level inputs are missing. Raised before any network call.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("missing required field(s): {}", join_fields(.missing))]
pub struct ValidationError {
    pub missing: SmallVec<[RequiredField; 3]>,
}

/// Failure reported by an asset or template store.
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    /// Worth retrying (timeouts, throttling).
    #[error("transient store failure: {0}")]
    Transient(String),

    #[error("store rejected the request: {0}")]
    Rejected(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Serialize(#[from] serde_json::Error),
}

impl StoreError {
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_))
    }
}

#[derive(thiserror::Error, Debug)]
pub enum BuildError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("failed to upload {asset}: {source}")]
    Upload {
        asset: AssetKind,
        #[source]
        source: StoreError,
    },

    #[error("failed to save template: {0}")]
    Submit(#[source] StoreError),
}

/// An image layer that could not be resolved to a URL and was dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerResolutionWarning {
    pub layer: LayerId,
    pub name: String,
    pub reason: String,
}

impl fmt::Display for LayerResolutionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "layer `{}` ({}) was left out: {}", self.name, self.layer, self.reason)
    }
}
