//! Session description files.
//!
//! A session is the JSON equivalent of a user's editing pass: canvas,
//! background and thumbnail files, and layers in the order they were added.
//! Replaying it through `EditorAction`s yields the same `EditorState` the
//! interactive editor would have.

use anyhow::Context as _;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use studio_core::{
    CanvasSpec, Color, DEFAULT_CATEGORY, LayerDraft, LayerPatch, LocalFile, PreviewConfig,
    ShapeKind, TextAlign,
};
use studio_editor::{Dispatched, EditorAction, EditorState};

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

fn default_opacity() -> f32 {
    1.0
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionFile {
    pub name: String,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub canvas: CanvasSpec,
    #[serde(default)]
    pub preview: PreviewConfig,
    pub background: Option<PathBuf>,
    pub thumbnail: Option<PathBuf>,
    #[serde(default)]
    pub layers: Vec<LayerSpec>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LayerSpec {
    #[serde(rename_all = "camelCase")]
    Text {
        name: Option<String>,
        content: String,
        x: f32,
        y: f32,
        #[serde(default = "default_opacity")]
        opacity: f32,
        font_size: Option<f32>,
        color: Option<Color>,
        font_weight: Option<u16>,
        text_align: Option<TextAlign>,
    },
    #[serde(rename_all = "camelCase")]
    Shape {
        name: Option<String>,
        #[serde(default)]
        shape_type: ShapeKind,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: Option<Color>,
        #[serde(default = "default_opacity")]
        opacity: f32,
    },
    /// Either a local `path` (uploaded at build time) or a ready `src` URL.
    #[serde(rename_all = "camelCase")]
    Image {
        name: Option<String>,
        path: Option<PathBuf>,
        src: Option<String>,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        #[serde(default = "default_opacity")]
        opacity: f32,
    },
}

impl SessionFile {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read session '{}'", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parse session '{}'", path.display()))
    }

    /// Replay into a fresh editor. Relative paths resolve against `base`.
    pub fn replay(&self, base: &Path) -> anyhow::Result<EditorState> {
        let mut state = EditorState::new(self.canvas).with_preview(self.preview);

        if let Some(bg) = &self.background {
            state.dispatch(EditorAction::SetBackground(read_local(base, bg)?))?;
        }
        if let Some(thumb) = &self.thumbnail {
            state.dispatch(EditorAction::SetThumbnail(read_local(base, thumb)?))?;
        }
        for spec in &self.layers {
            replay_layer(&mut state, base, spec)?;
        }
        Ok(state)
    }
}

fn replay_layer(state: &mut EditorState, base: &Path, spec: &LayerSpec) -> anyhow::Result<()> {
    let (action, patch) = match spec {
        LayerSpec::Text {
            name,
            content,
            x,
            y,
            opacity,
            font_size,
            color,
            font_weight,
            text_align,
        } => {
            let mut draft = LayerDraft::text(content.clone()).at(*x, *y).with_opacity(*opacity);
            draft.name = name.clone();
            let patch = LayerPatch {
                font_size: *font_size,
                color: *color,
                font_weight: *font_weight,
                text_align: *text_align,
                ..LayerPatch::default()
            };
            (EditorAction::AddLayer(draft), Some(patch))
        }
        LayerSpec::Shape {
            name,
            shape_type,
            x,
            y,
            width,
            height,
            color,
            opacity,
        } => {
            let mut draft = LayerDraft::shape(*shape_type, *width, *height)
                .at(*x, *y)
                .with_opacity(*opacity);
            draft.name = name.clone();
            let patch = color.map(|color| LayerPatch {
                color: Some(color),
                ..LayerPatch::default()
            });
            (EditorAction::AddLayer(draft), patch)
        }
        LayerSpec::Image {
            name,
            path,
            src,
            x,
            y,
            width,
            height,
            opacity,
        } => {
            let patch = LayerPatch {
                opacity: Some(*opacity),
                ..LayerPatch::default()
            };
            let action = match (path, src) {
                (_, Some(url)) => {
                    let mut draft =
                        LayerDraft::remote_image(url.clone(), *width, *height).at(*x, *y);
                    draft.name = name.clone();
                    EditorAction::AddLayer(draft)
                }
                (Some(path), None) => EditorAction::AddImage {
                    file: read_local(base, path)?,
                    width: *width,
                    height: *height,
                    x: *x,
                    y: *y,
                    name: name.clone(),
                },
                (None, None) => anyhow::bail!("image layer {name:?} needs a `path` or a `src`"),
            };
            (action, Some(patch))
        }
    };

    if let Dispatched::Added(id) = state.dispatch(action)?
        && let Some(patch) = patch
    {
        state.dispatch(EditorAction::UpdateLayer { id, patch })?;
    }
    Ok(())
}

/// Read a user file into memory.
pub fn read_local(base: &Path, path: &Path) -> anyhow::Result<LocalFile> {
    let full = if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    };
    let bytes = std::fs::read(&full).with_context(|| format!("read '{}'", full.display()))?;
    let name = full
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "file".to_string());
    let file = LocalFile::new(name, bytes);
    Ok(match mime_for(&full) {
        Some(mime) => file.with_mime(mime),
        None => file,
    })
}

fn mime_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    Some(match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        _ => return None,
    })
}
