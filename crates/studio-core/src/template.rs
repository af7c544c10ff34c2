//! The persisted template document.
//!
//! `elements[0]` is always the full-bleed background image; the rest mirror
//! the layer list in creation order and define back-to-front render order.

use crate::model::{CanvasSpec, Color, Layer, LayerKind, ShapeKind};
use serde::{Deserialize, Serialize};

pub const KNOWN_CATEGORIES: [&str; 4] = ["Instagram Post", "Poster", "YouTube Thumbnail", "Story"];
pub const DEFAULT_CATEGORY: &str = KNOWN_CATEGORIES[0];

pub const BACKGROUND_NAME: &str = "Background";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub id: String,
    pub name: String,
    pub category: String,
    pub thumbnail: String,
    pub canvas: CanvasSpec,
    pub elements: Vec<Element>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Element {
    Text(TextElement),
    Shape(ShapeElement),
    Image(ImageElement),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextElement {
    pub name: String,
    pub content: String,
    pub x: f32,
    pub y: f32,
    pub font_size: f32,
    pub color: Color,
    pub font_weight: u16,
    pub text_align: crate::model::TextAlign,
    pub opacity: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeElement {
    pub shape_type: ShapeKind,
    pub name: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub color: Color,
    pub opacity: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageElement {
    pub name: String,
    pub src: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Absent on the synthetic background.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f32>,
}

impl Element {
    /// Full-bleed background at the origin.
    pub fn background(src: impl Into<String>, canvas: &CanvasSpec) -> Self {
        Element::Image(ImageElement {
            name: BACKGROUND_NAME.to_string(),
            src: src.into(),
            x: 0.0,
            y: 0.0,
            width: canvas.width(),
            height: canvas.height(),
            opacity: None,
        })
    }

    /// Project a layer onto its persisted fields.
    ///
    /// Image layers need a resolved `src`; `None` for an image yields `None`.
    /// Text and shape layers ignore `src`.
    pub fn from_layer(layer: &Layer, src: Option<String>) -> Option<Self> {
        let name = layer.name.clone();
        let (x, y, opacity) = (layer.x, layer.y, layer.opacity);
        Some(match &layer.kind {
            LayerKind::Text(t) => Element::Text(TextElement {
                name,
                content: t.content.clone(),
                x,
                y,
                font_size: t.font_size,
                color: t.color,
                font_weight: t.font_weight,
                text_align: t.text_align,
                opacity,
            }),
            LayerKind::Shape(s) => Element::Shape(ShapeElement {
                shape_type: s.shape_kind,
                name,
                x,
                y,
                width: s.width,
                height: s.height,
                color: s.color,
                opacity,
            }),
            LayerKind::Image(img) => Element::Image(ImageElement {
                name,
                src: src?,
                x,
                y,
                width: img.width,
                height: img.height,
                opacity: Some(opacity),
            }),
        })
    }

    pub fn name(&self) -> &str {
        match self {
            Element::Text(e) => &e.name,
            Element::Shape(e) => &e.name,
            Element::Image(e) => &e.name,
        }
    }
}

impl Template {
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::LayerId;
    use crate::model::LayerDraft;
    use pretty_assertions::assert_eq;

    #[test]
    fn background_element_wire_shape() {
        let el = Element::background("https://cdn/bg.png", &CanvasSpec::default());
        assert_eq!(
            serde_json::to_value(&el).unwrap(),
            serde_json::json!({
                "type": "image",
                "name": "Background",
                "src": "https://cdn/bg.png",
                "x": 0.0,
                "y": 0.0,
                "width": 1080.0,
                "height": 1080.0,
            })
        );
    }

    #[test]
    fn text_layer_projects_to_camel_case() {
        let layer = LayerDraft::text("Sale")
            .named("Headline")
            .at(540.0, 100.0)
            .into_layer(LayerId::intern("text_1"), 1);
        let el = Element::from_layer(&layer, None).unwrap();
        let json = serde_json::to_value(&el).unwrap();
        assert_eq!(json["type"], "text");
        assert_eq!(json["fontSize"], 48.0);
        assert_eq!(json["textAlign"], "center");
        assert_eq!(json["color"], "#000000");
    }

    #[test]
    fn shape_layer_uses_shape_type_field() {
        let layer = LayerDraft::shape(ShapeKind::Circle, 80.0, 80.0)
            .into_layer(LayerId::intern("shape_1"), 1);
        let json = serde_json::to_value(Element::from_layer(&layer, None).unwrap()).unwrap();
        assert_eq!(json["type"], "shape");
        assert_eq!(json["shapeType"], "circle");
    }

    #[test]
    fn unresolved_image_has_no_element() {
        let layer =
            LayerDraft::remote_image("x", 10.0, 10.0).into_layer(LayerId::intern("image_1"), 1);
        assert!(Element::from_layer(&layer, None).is_none());
        assert!(Element::from_layer(&layer, Some("https://cdn/x.png".into())).is_some());
    }
}
