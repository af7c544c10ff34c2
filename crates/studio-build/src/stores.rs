//! External collaborators: the asset store (binary uploads → stable URLs)
//! and the template store (persisted documents).
//!
//! Both are async traits. `MemoryAssetStore` and `MemoryTemplateStore` keep
//! everything in process and back tests and offline tooling.

use crate::error::StoreError;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use studio_core::{LocalFile, Template};

/// What an upload is for; stores may route kinds to different folders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AssetKind {
    Thumbnail,
    Background,
    LayerImage,
}

impl AssetKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Thumbnail => "thumbnail",
            Self::Background => "background",
            Self::LayerImage => "layer-image",
        }
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct AssetUpload {
    pub kind: AssetKind,
    pub file: LocalFile,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedAsset {
    pub url: String,
}

/// Where a saved template ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedTemplate {
    pub id: String,
    pub url: String,
}

/// Listing entry for the template catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateSummary {
    pub id: String,
    pub name: String,
    pub category: String,
    pub thumbnail: String,
}

impl From<&Template> for TemplateSummary {
    fn from(t: &Template) -> Self {
        Self {
            id: t.id.clone(),
            name: t.name.clone(),
            category: t.category.clone(),
            thumbnail: t.thumbnail.clone(),
        }
    }
}

/// Binary uploads. Retrying an upload must be safe.
pub trait AssetStore {
    fn upload(
        &self,
        upload: AssetUpload,
    ) -> impl Future<Output = Result<UploadedAsset, StoreError>>;
}

/// Persisted template documents.
pub trait TemplateStore {
    fn save(&self, template: &Template) -> impl Future<Output = Result<SavedTemplate, StoreError>>;

    fn get(&self, id: &str) -> impl Future<Output = Result<Option<Template>, StoreError>>;

    /// All templates, or only those in `category`.
    fn list(
        &self,
        category: Option<&str>,
    ) -> impl Future<Output = Result<Vec<TemplateSummary>, StoreError>>;

    /// Returns whether a template was removed.
    fn delete(&self, id: &str) -> impl Future<Output = Result<bool, StoreError>>;
}

impl<S: AssetStore> AssetStore for &S {
    fn upload(
        &self,
        upload: AssetUpload,
    ) -> impl Future<Output = Result<UploadedAsset, StoreError>> {
        (**self).upload(upload)
    }
}

impl<S: TemplateStore> TemplateStore for &S {
    fn save(&self, template: &Template) -> impl Future<Output = Result<SavedTemplate, StoreError>> {
        (**self).save(template)
    }

    fn get(&self, id: &str) -> impl Future<Output = Result<Option<Template>, StoreError>> {
        (**self).get(id)
    }

    fn list(
        &self,
        category: Option<&str>,
    ) -> impl Future<Output = Result<Vec<TemplateSummary>, StoreError>> {
        (**self).list(category)
    }

    fn delete(&self, id: &str) -> impl Future<Output = Result<bool, StoreError>> {
        (**self).delete(id)
    }
}

// ─── In-memory stores ────────────────────────────────────────────────────

/// Keeps uploaded bytes in memory and hands out `memory://<kind>/<n>` URLs.
#[derive(Debug, Default)]
pub struct MemoryAssetStore {
    assets: Mutex<BTreeMap<String, LocalFile>>,
    next: AtomicU64,
}

impl MemoryAssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.assets.lock().map(|a| a.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn fetch(&self, url: &str) -> Option<LocalFile> {
        self.assets.lock().ok()?.get(url).cloned()
    }
}

impl AssetStore for MemoryAssetStore {
    async fn upload(&self, upload: AssetUpload) -> Result<UploadedAsset, StoreError> {
        let n = self.next.fetch_add(1, Ordering::Relaxed) + 1;
        let url = format!("memory://{}/{n}", upload.kind);
        self.assets
            .lock()
            .map_err(|_| StoreError::Rejected("asset store poisoned".into()))?
            .insert(url.clone(), upload.file);
        Ok(UploadedAsset { url })
    }
}

#[derive(Debug, Default)]
pub struct MemoryTemplateStore {
    templates: Mutex<BTreeMap<String, Template>>,
}

impl MemoryTemplateStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, BTreeMap<String, Template>>, StoreError> {
        self.templates
            .lock()
            .map_err(|_| StoreError::Rejected("template store poisoned".into()))
    }
}

impl TemplateStore for MemoryTemplateStore {
    async fn save(&self, template: &Template) -> Result<SavedTemplate, StoreError> {
        // Round-trip through JSON so the stored copy is exactly what a
        // remote store would have received.
        let json = serde_json::to_string(template)?;
        let stored: Template = serde_json::from_str(&json)?;
        let id = stored.id.clone();
        self.lock()?.insert(id.clone(), stored);
        Ok(SavedTemplate {
            url: format!("memory://templates/{id}.json"),
            id,
        })
    }

    async fn get(&self, id: &str) -> Result<Option<Template>, StoreError> {
        Ok(self.lock()?.get(id).cloned())
    }

    async fn list(&self, category: Option<&str>) -> Result<Vec<TemplateSummary>, StoreError> {
        Ok(self
            .lock()?
            .values()
            .filter(|t| category.is_none_or(|c| t.category == c))
            .map(TemplateSummary::from)
            .collect())
    }

    async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        Ok(self.lock()?.remove(id).is_some())
    }
}
