//! Directory-backed asset and template store.
//!
//! Layout under the root:
//!
//! ```text
//! assets/<kind>/<n>-<file name>
//! templates/<id>.json
//! ```
//!
//! URLs handed out are `file://` URLs of the written files.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use studio_build::{
    AssetStore, AssetUpload, SavedTemplate, StoreError, TemplateStore, TemplateSummary,
    UploadedAsset,
};
use studio_core::Template;

pub struct DirStore {
    root: PathBuf,
    next: AtomicU64,
}

impl DirStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            next: AtomicU64::new(0),
        }
    }

    fn templates_dir(&self) -> PathBuf {
        self.root.join("templates")
    }

    fn template_path(&self, id: &str) -> Result<PathBuf, StoreError> {
        if id.is_empty() || id.contains(['/', '\\']) || id.starts_with('.') {
            return Err(StoreError::Rejected(format!("invalid template id `{id}`")));
        }
        Ok(self.templates_dir().join(format!("{id}.json")))
    }
}

fn file_url(path: &Path) -> String {
    let abs = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    format!("file://{}", abs.display())
}

/// Keep file names to a safe character set.
fn sanitize(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    match cleaned.trim_start_matches('.') {
        "" => "asset".to_string(),
        rest => rest.to_string(),
    }
}

impl AssetStore for DirStore {
    async fn upload(&self, upload: AssetUpload) -> Result<UploadedAsset, StoreError> {
        let dir = self.root.join("assets").join(upload.kind.as_str());
        tokio::fs::create_dir_all(&dir).await?;
        let n = self.next.fetch_add(1, Ordering::Relaxed) + 1;
        let path = dir.join(format!("{n}-{}", sanitize(&upload.file.name)));
        tokio::fs::write(&path, &upload.file.bytes[..]).await?;
        log::debug!("stored {} ({} bytes)", path.display(), upload.file.len());
        Ok(UploadedAsset { url: file_url(&path) })
    }
}

impl TemplateStore for DirStore {
    async fn save(&self, template: &Template) -> Result<SavedTemplate, StoreError> {
        let path = self.template_path(&template.id)?;
        tokio::fs::create_dir_all(self.templates_dir()).await?;
        let json = serde_json::to_vec_pretty(template)?;
        tokio::fs::write(&path, json).await?;
        Ok(SavedTemplate {
            id: template.id.clone(),
            url: file_url(&path),
        })
    }

    async fn get(&self, id: &str) -> Result<Option<Template>, StoreError> {
        let path = self.template_path(id)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    async fn list(&self, category: Option<&str>) -> Result<Vec<TemplateSummary>, StoreError> {
        let mut entries = match tokio::fs::read_dir(self.templates_dir()).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };

        let mut out = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().is_none_or(|ext| ext != "json") {
                continue;
            }
            let bytes = tokio::fs::read(&path).await?;
            let template: Template = match serde_json::from_slice(&bytes) {
                Ok(t) => t,
                Err(err) => {
                    log::warn!("skipping unreadable template {}: {err}", path.display());
                    continue;
                }
            };
            if category.is_none_or(|c| template.category == c) {
                out.push(TemplateSummary::from(&template));
            }
        }
        out.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(out)
    }

    async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let path = self.template_path(id)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn sanitize_strips_path_tricks() {
        assert_eq!(sanitize("../../etc/passwd"), "_.._etc_passwd");
        assert_eq!(sanitize("my photo.png"), "my_photo.png");
        assert_eq!(sanitize("..."), "asset");
    }

    #[test]
    fn template_ids_cannot_escape_root() {
        let store = DirStore::new("/tmp/studio-test");
        assert!(store.template_path("../x").is_err());
        assert!(store.template_path("").is_err());
        assert!(store.template_path("template_1").is_ok());
    }
}
