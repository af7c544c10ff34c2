//! Template build pipeline.
//!
//! 1. Validate required inputs (no network before this passes).
//! 2. Upload thumbnail and background; any failure aborts the build.
//! 3. Resolve layers. Image layers reuse `remote_url` or upload their local
//!    bytes; a failed image upload drops that layer with a warning.
//! 4. Assemble `[background, ...layers by created_order]`. The order of
//!    `BuildRequest::layers` itself is not trusted.
//! 5. Submit the document to the template store.
//!
//! The pipeline reads only the [`BuildRequest`] snapshot, never live editor
//! state, so a failed build leaves the editor untouched.

use crate::error::{BuildError, LayerResolutionWarning, RequiredField, StoreError, ValidationError};
use crate::stores::{AssetKind, AssetStore, AssetUpload, SavedTemplate, TemplateStore};
use smallvec::SmallVec;
use std::time::{SystemTime, UNIX_EPOCH};
use studio_core::{BuildRequest, Element, LayerKind, LocalFile, SnapshotLayer, Template};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildConfig {
    /// Extra attempts after a transient upload failure.
    pub upload_retries: u32,
    /// Upload thumbnail and background at the same time.
    pub concurrent_required_uploads: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            upload_retries: 2,
            concurrent_required_uploads: true,
        }
    }
}

/// Result of a successful build.
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub template: Template,
    pub saved: SavedTemplate,
    /// Image layers that were left out of the document.
    pub warnings: Vec<LayerResolutionWarning>,
}

pub struct TemplateBuilder<A, T> {
    assets: A,
    templates: T,
    config: BuildConfig,
}

impl<A: AssetStore, T: TemplateStore> TemplateBuilder<A, T> {
    pub fn new(assets: A, templates: T) -> Self {
        Self {
            assets,
            templates,
            config: BuildConfig::default(),
        }
    }

    pub fn with_config(mut self, config: BuildConfig) -> Self {
        self.config = config;
        self
    }

    pub fn assets(&self) -> &A {
        &self.assets
    }

    pub fn templates(&self) -> &T {
        &self.templates
    }

    pub async fn build(&self, request: BuildRequest) -> Result<BuildReport, BuildError> {
        let (background, thumbnail) = validate(&request)?;
        log::info!("building template `{}` ({} layer(s))", request.name, request.layers.len());

        let (thumbnail_url, background_url) = if self.config.concurrent_required_uploads {
            tokio::try_join!(
                self.upload_required(AssetKind::Thumbnail, thumbnail),
                self.upload_required(AssetKind::Background, background),
            )?
        } else {
            (
                self.upload_required(AssetKind::Thumbnail, thumbnail).await?,
                self.upload_required(AssetKind::Background, background).await?,
            )
        };

        let mut elements = Vec::with_capacity(request.layers.len() + 1);
        elements.push(Element::background(background_url, &request.canvas));
        let mut warnings = Vec::new();
        let mut ordered: Vec<&SnapshotLayer> = request.layers.iter().collect();
        ordered.sort_by_key(|snap| snap.layer.created_order);
        for snap in ordered {
            match self.resolve_layer(snap).await {
                Ok(element) => elements.push(element),
                Err(reason) => {
                    let warning = LayerResolutionWarning {
                        layer: snap.layer.id,
                        name: snap.layer.name.clone(),
                        reason,
                    };
                    log::warn!("{warning}");
                    warnings.push(warning);
                }
            }
        }

        let template = Template {
            id: request.id.unwrap_or_else(generate_template_id),
            name: request.name,
            category: request.category,
            thumbnail: thumbnail_url,
            canvas: request.canvas,
            elements,
        };

        let saved = self.templates.save(&template).await.map_err(BuildError::Submit)?;
        log::info!("template `{}` saved at {}", saved.id, saved.url);
        Ok(BuildReport {
            template,
            saved,
            warnings,
        })
    }

    async fn upload_required(
        &self,
        kind: AssetKind,
        file: &LocalFile,
    ) -> Result<String, BuildError> {
        self.upload_with_retry(kind, file)
            .await
            .map_err(|source| BuildError::Upload { asset: kind, source })
    }

    async fn upload_with_retry(
        &self,
        kind: AssetKind,
        file: &LocalFile,
    ) -> Result<String, StoreError> {
        let mut attempt = 0;
        loop {
            let upload = AssetUpload {
                kind,
                file: file.clone(),
            };
            match self.assets.upload(upload).await {
                Ok(asset) => return Ok(asset.url),
                Err(err) if err.is_transient() && attempt < self.config.upload_retries => {
                    attempt += 1;
                    log::debug!("retrying {kind} upload of {} ({attempt}): {err}", file.name);
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Text and shape layers project directly; image layers need a URL.
    async fn resolve_layer(&self, snap: &SnapshotLayer) -> Result<Element, String> {
        let layer = &snap.layer;
        let src = match &layer.kind {
            LayerKind::Text(_) | LayerKind::Shape(_) => None,
            LayerKind::Image(img) => Some(match (&img.remote_url, &snap.pending) {
                (Some(url), _) => url.clone(),
                (None, Some(Ok(file))) => self
                    .upload_with_retry(AssetKind::LayerImage, file)
                    .await
                    .map_err(|err| format!("upload failed: {err}"))?,
                (None, Some(Err(err))) => return Err(format!("local image unavailable: {err}")),
                (None, None) => return Err("image has no source".to_string()),
            }),
        };
        Element::from_layer(layer, src).ok_or_else(|| "image has no source".to_string())
    }
}

fn validate(request: &BuildRequest) -> Result<(&LocalFile, &LocalFile), ValidationError> {
    let mut missing = SmallVec::new();
    if request.name.trim().is_empty() {
        missing.push(RequiredField::Name);
    }
    if request.background.is_none() {
        missing.push(RequiredField::Background);
    }
    if request.thumbnail.is_none() {
        missing.push(RequiredField::Thumbnail);
    }
    match (&request.background, &request.thumbnail) {
        (Some(bg), Some(thumb)) if missing.is_empty() => Ok((bg, thumb)),
        _ => Err(ValidationError { missing }),
    }
}

fn generate_template_id() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    format!("template_{millis}")
}
