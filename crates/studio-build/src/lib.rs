pub mod builder;
pub mod error;
pub mod stores;

pub use builder::{BuildConfig, BuildReport, TemplateBuilder};
pub use error::{BuildError, LayerResolutionWarning, RequiredField, StoreError, ValidationError};
pub use stores::{
    AssetKind, AssetStore, AssetUpload, MemoryAssetStore, MemoryTemplateStore, SavedTemplate,
    TemplateStore, TemplateSummary, UploadedAsset,
};
