//! Layer data model for the template canvas.
//!
//! A template is an artboard (`CanvasSpec`) plus an ordered set of
//! rectangular layers. Every layer carries its **center point** in canvas
//! space; `created_order` is the only thing that decides persisted order.

use crate::error::ModelError;
use crate::id::LayerId;
use crate::resources::ResourceHandle;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

// ─── Colors ──────────────────────────────────────────────────────────────

/// RGBA8 color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

fn hex_val(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parse `#RGB`, `#RGBA`, `#RRGGBB` or `#RRGGBBAA`. The `#` is optional.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        let bytes = hex.as_bytes();

        let short = |i: usize| hex_val(bytes[i]).map(|v| v * 17);
        let long = |i: usize| Some(hex_val(bytes[i])? << 4 | hex_val(bytes[i + 1])?);

        match bytes.len() {
            3 => Some(Self::rgb(short(0)?, short(1)?, short(2)?)),
            4 => Some(Self::rgba(short(0)?, short(1)?, short(2)?, short(3)?)),
            6 => Some(Self::rgb(long(0)?, long(2)?, long(4)?)),
            8 => Some(Self::rgba(long(0)?, long(2)?, long(4)?, long(6)?)),
            _ => None,
        }
    }

    /// Lowercase `#rrggbb`, with `aa` appended only when not opaque.
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Color::from_hex(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid color `{s}`")))
    }
}

// ─── Canvas ──────────────────────────────────────────────────────────────

pub const DEFAULT_CANVAS_SIDE: f32 = 1080.0;
/// Fallback box side for shapes and images drafted with an unusable size.
pub const DEFAULT_LAYER_SIDE: f32 = 200.0;

/// The artboard: true pixel dimensions plus background fill.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawCanvas")]
pub struct CanvasSpec {
    width: f32,
    height: f32,
    pub background_color: Color,
}

/// Unchecked wire form of [`CanvasSpec`].
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCanvas {
    width: f32,
    height: f32,
    background_color: Color,
}

impl TryFrom<RawCanvas> for CanvasSpec {
    type Error = ModelError;

    fn try_from(raw: RawCanvas) -> Result<Self, Self::Error> {
        CanvasSpec::new(raw.width, raw.height, raw.background_color)
    }
}

/// Width/height pair used for clamping layer positions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasBounds {
    pub width: f32,
    pub height: f32,
}

fn valid_side(v: f32) -> bool {
    v.is_finite() && v > 0.0
}

impl CanvasSpec {
    pub fn new(width: f32, height: f32, background_color: Color) -> Result<Self, ModelError> {
        if !valid_side(width) || !valid_side(height) {
            return Err(ModelError::InvalidCanvas { width, height });
        }
        Ok(Self {
            width,
            height,
            background_color,
        })
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn bounds(&self) -> CanvasBounds {
        CanvasBounds {
            width: self.width,
            height: self.height,
        }
    }

    /// Change the artboard size.
    ///
    /// Layers are NOT re-clamped here: the caller must follow up with
    /// [`LayerStore::reclamp`](crate::store::LayerStore::reclamp) so no layer
    /// is left outside the new bounds.
    pub fn resize(&mut self, width: f32, height: f32) -> Result<(), ModelError> {
        if !valid_side(width) || !valid_side(height) {
            return Err(ModelError::InvalidCanvas { width, height });
        }
        self.width = width;
        self.height = height;
        Ok(())
    }
}

impl Default for CanvasSpec {
    fn default() -> Self {
        Self {
            width: DEFAULT_CANVAS_SIDE,
            height: DEFAULT_CANVAS_SIDE,
            background_color: Color::WHITE,
        }
    }
}

impl CanvasBounds {
    /// Clamp a point into `[0, width] × [0, height]`.
    pub fn clamp_point(&self, x: f32, y: f32) -> (f32, f32) {
        (
            crate::coords::clamp(x, 0.0, self.width),
            crate::coords::clamp(y, 0.0, self.height),
        )
    }
}

// ─── Layer variants ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    #[default]
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    #[default]
    Rectangle,
    Circle,
}

/// Discriminant of [`LayerKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerKindTag {
    Text,
    Shape,
    Image,
}

impl LayerKindTag {
    /// Prefix used when minting ids for this kind.
    pub fn id_prefix(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Shape => "shape",
            Self::Image => "image",
        }
    }

    pub fn default_name(self) -> &'static str {
        match self {
            Self::Text => "Text",
            Self::Shape => "Shape",
            Self::Image => "Image",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextProps {
    pub content: String,
    pub font_size: f32,
    pub color: Color,
    pub font_weight: u16,
    pub text_align: TextAlign,
}

impl Default for TextProps {
    fn default() -> Self {
        Self {
            content: String::new(),
            font_size: 48.0,
            color: Color::BLACK,
            font_weight: 400,
            text_align: TextAlign::Center,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShapeProps {
    pub shape_kind: ShapeKind,
    pub width: f32,
    pub height: f32,
    pub color: Color,
}

impl Default for ShapeProps {
    fn default() -> Self {
        Self {
            shape_kind: ShapeKind::Rectangle,
            width: DEFAULT_LAYER_SIDE,
            height: DEFAULT_LAYER_SIDE,
            color: Color::rgb(0x33, 0x66, 0xff),
        }
    }
}

/// Image layer payload. At build time either `remote_url` is set or the
/// bytes behind `local` are uploaded to obtain one.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageProps {
    pub width: f32,
    pub height: f32,
    pub local: Option<ResourceHandle>,
    pub remote_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LayerKind {
    Text(TextProps),
    Shape(ShapeProps),
    Image(ImageProps),
}

impl LayerKind {
    pub fn tag(&self) -> LayerKindTag {
        match self {
            Self::Text(_) => LayerKindTag::Text,
            Self::Shape(_) => LayerKindTag::Shape,
            Self::Image(_) => LayerKindTag::Image,
        }
    }
    /// Replace non-positive or non-finite sizes with the variant default.
    fn sanitized(mut self) -> Self {
        match &mut self {
            Self::Text(text) => {
                text.font_size = size_or(text.font_size, TextProps::default().font_size);
            }
            Self::Shape(ShapeProps { width, height, .. })
            | Self::Image(ImageProps { width, height, .. }) => {
                *width = size_or(*width, DEFAULT_LAYER_SIDE);
                *height = size_or(*height, DEFAULT_LAYER_SIDE);
            }
        }
        self
    }
}

// ─── Layer ───────────────────────────────────────────────────────────────

/// A positioned visual element. `x`/`y` are the center point in canvas space.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub id: LayerId,
    pub name: String,
    pub x: f32,
    pub y: f32,
    pub opacity: f32,
    pub created_order: u64,
    pub kind: LayerKind,
}

impl Layer {
    pub fn tag(&self) -> LayerKindTag {
        self.kind.tag()
    }

    /// The local handle of an image layer, if it still holds one.
    pub fn local_handle(&self) -> Option<ResourceHandle> {
        match &self.kind {
            LayerKind::Image(img) => img.local,
            _ => None,
        }
    }

    /// Merge a patch into this layer. Fields foreign to the variant are
    /// ignored, invalid sizes keep the previous value. Position is written
    /// as given; clamping is the store's job.
    pub fn apply(&mut self, patch: LayerPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(x) = patch.x.filter(|v| v.is_finite()) {
            self.x = x;
        }
        if let Some(y) = patch.y.filter(|v| v.is_finite()) {
            self.y = y;
        }
        if let Some(opacity) = patch.opacity {
            self.opacity = clamp_opacity(opacity);
        }

        match &mut self.kind {
            LayerKind::Text(text) => {
                if let Some(content) = patch.content {
                    text.content = content;
                }
                if let Some(size) = patch.font_size.filter(size_ok) {
                    text.font_size = size;
                }
                if let Some(color) = patch.color {
                    text.color = color;
                }
                if let Some(weight) = patch.font_weight {
                    text.font_weight = weight;
                }
                if let Some(align) = patch.text_align {
                    text.text_align = align;
                }
            }
            LayerKind::Shape(shape) => {
                if let Some(kind) = patch.shape_kind {
                    shape.shape_kind = kind;
                }
                if let Some(w) = patch.width.filter(size_ok) {
                    shape.width = w;
                }
                if let Some(h) = patch.height.filter(size_ok) {
                    shape.height = h;
                }
                if let Some(color) = patch.color {
                    shape.color = color;
                }
            }
            LayerKind::Image(img) => {
                if let Some(w) = patch.width.filter(size_ok) {
                    img.width = w;
                }
                if let Some(h) = patch.height.filter(size_ok) {
                    img.height = h;
                }
                if let Some(url) = patch.remote_url {
                    img.remote_url = Some(url);
                }
            }
        }
    }
}

fn size_ok(v: &f32) -> bool {
    v.is_finite() && *v > 0.0
}

fn size_or(v: f32, fallback: f32) -> f32 {
    if size_ok(&v) { v } else { fallback }
}

fn clamp_opacity(v: f32) -> f32 {
    if v.is_nan() { 1.0 } else { v.clamp(0.0, 1.0) }
}

/// Everything needed to create a layer except its id and creation order.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerDraft {
    pub name: Option<String>,
    pub x: f32,
    pub y: f32,
    pub opacity: f32,
    pub kind: LayerKind,
}

impl LayerDraft {
    pub fn new(kind: LayerKind) -> Self {
        Self {
            name: None,
            x: 0.0,
            y: 0.0,
            opacity: 1.0,
            kind,
        }
    }

    pub fn text(content: impl Into<String>) -> Self {
        Self::new(LayerKind::Text(TextProps {
            content: content.into(),
            ..TextProps::default()
        }))
    }

    pub fn shape(shape_kind: ShapeKind, width: f32, height: f32) -> Self {
        Self::new(LayerKind::Shape(ShapeProps {
            shape_kind,
            width,
            height,
            ..ShapeProps::default()
        }))
    }

    /// Draft for an image whose bytes are held by a freshly acquired handle.
    pub fn local_image(handle: ResourceHandle, width: f32, height: f32) -> Self {
        Self::new(LayerKind::Image(ImageProps {
            width,
            height,
            local: Some(handle),
            remote_url: None,
        }))
    }

    /// Draft for an image that already lives at a stable URL.
    pub fn remote_image(url: impl Into<String>, width: f32, height: f32) -> Self {
        Self::new(LayerKind::Image(ImageProps {
            width,
            height,
            local: None,
            remote_url: Some(url.into()),
        }))
    }

    pub fn at(mut self, x: f32, y: f32) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self
    }

    /// Materialize into a layer. Unusable sizes fall back to the variant
    /// default; position is left unclamped.
    pub(crate) fn into_layer(self, id: LayerId, created_order: u64) -> Layer {
        let name = self
            .name
            .unwrap_or_else(|| self.kind.tag().default_name().to_string());
        Layer {
            id,
            name,
            x: if self.x.is_finite() { self.x } else { 0.0 },
            y: if self.y.is_finite() { self.y } else { 0.0 },
            opacity: clamp_opacity(self.opacity),
            created_order,
            kind: self.kind.sanitized(),
        }
    }
}

/// Field-level edit. `None` means "leave unchanged".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayerPatch {
    pub name: Option<String>,
    pub x: Option<f32>,
    pub y: Option<f32>,
    pub opacity: Option<f32>,
    pub content: Option<String>,
    pub font_size: Option<f32>,
    pub color: Option<Color>,
    pub font_weight: Option<u16>,
    pub text_align: Option<TextAlign>,
    pub shape_kind: Option<ShapeKind>,
    pub width: Option<f32>,
    pub height: Option<f32>,
    pub remote_url: Option<String>,
}

impl LayerPatch {
    pub fn position(x: f32, y: f32) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Self::default()
        }
    }

    pub fn touches_position(&self) -> bool {
        self.x.is_some() || self.y.is_some()
    }
}
