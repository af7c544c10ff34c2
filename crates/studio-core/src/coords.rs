//! Canvas space ↔ preview space mapping.
//!
//! The editor shows the artboard scaled down into a bounded preview box.
//! Pointer deltas arrive in preview space and are divided by the scale to
//! get canvas-space deltas.

use crate::model::CanvasSpec;
use serde::{Deserialize, Serialize};

/// Bounds of the on-screen preview box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PreviewConfig {
    pub max_width: f32,
    pub max_height: f32,
    /// Cap so a small canvas is never shown oversized.
    pub max_scale: f32,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            max_width: 400.0,
            max_height: 400.0,
            max_scale: 0.6,
        }
    }
}

impl PreviewConfig {
    pub fn scale_for(&self, canvas: &CanvasSpec) -> f32 {
        compute_scale(canvas, self.max_width, self.max_height, self.max_scale)
    }
}

/// `min(max_w / canvas.width, max_h / canvas.height, max_scale)`.
pub fn compute_scale(
    canvas: &CanvasSpec,
    max_preview_width: f32,
    max_preview_height: f32,
    max_scale: f32,
) -> f32 {
    let sx = max_preview_width / canvas.width();
    let sy = max_preview_height / canvas.height();
    sx.min(sy).min(max_scale)
}

/// Convert a preview-space pointer delta into a canvas-space delta.
/// A degenerate scale yields no movement.
pub fn preview_delta_to_canvas_delta(dx_preview: f32, dy_preview: f32, scale: f32) -> (f32, f32) {
    if !scale.is_finite() || scale <= 0.0 {
        return (0.0, 0.0);
    }
    (dx_preview / scale, dy_preview / scale)
}

/// Clamp without panicking on NaN: a NaN value collapses to `min`.
pub fn clamp(value: f32, min: f32, max: f32) -> f32 {
    value.max(min).min(max)
}

/// Map a canvas-space point to preview space.
pub fn canvas_to_preview(x: f32, y: f32, scale: f32) -> (f32, f32) {
    (x * scale, y * scale)
}

/// On-screen size of the artboard at the given scale.
pub fn preview_size(canvas: &CanvasSpec, scale: f32) -> (f32, f32) {
    (canvas.width() * scale, canvas.height() * scale)
}

pub fn preview_font_size(font_size: f32, scale: f32) -> f32 {
    font_size * scale
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Color;
    use pretty_assertions::assert_eq;

    fn canvas(w: f32, h: f32) -> CanvasSpec {
        CanvasSpec::new(w, h, Color::WHITE).unwrap()
    }

    #[test]
    fn large_canvas_fits_preview_box() {
        let c = canvas(1080.0, 1920.0);
        let scale = compute_scale(&c, 400.0, 400.0, 0.6);
        assert!((scale - 400.0 / 1920.0).abs() < 1e-6);
        let (w, h) = preview_size(&c, scale);
        assert!(w <= 400.0 && h <= 400.0 + 1e-3);
    }

    #[test]
    fn small_canvas_is_capped() {
        let c = canvas(100.0, 100.0);
        assert_eq!(compute_scale(&c, 400.0, 400.0, 0.6), 0.6);
    }

    #[test]
    fn scale_never_exceeds_cap_across_sizes() {
        for side in [1.0, 50.0, 333.0, 1080.0, 4096.0] {
            for max_scale in [0.3, 0.6, 1.0] {
                let c = canvas(side, side * 0.5);
                let scale = compute_scale(&c, 400.0, 300.0, max_scale);
                assert!(scale <= max_scale);
                let (w, h) = preview_size(&c, scale);
                assert!(w <= 400.0 + 1e-3 && h <= 300.0 + 1e-3, "{side}: {w}x{h}");
            }
        }
    }

    #[test]
    fn preview_delta_divides_by_scale() {
        assert_eq!(preview_delta_to_canvas_delta(30.0, 30.0, 0.5), (60.0, 60.0));
        assert_eq!(preview_delta_to_canvas_delta(30.0, 30.0, 0.0), (0.0, 0.0));
    }

    #[test]
    fn preview_projection_scales_points_and_fonts() {
        let scale = compute_scale(&canvas(1600.0, 1600.0), 400.0, 400.0, 0.6);
        assert_eq!(scale, 0.25);
        assert_eq!(canvas_to_preview(540.0, 1080.0, scale), (135.0, 270.0));
        assert_eq!(preview_font_size(48.0, 0.5), 24.0);

        // A preview move mapped back lands on the original canvas delta.
        let (px, py) = canvas_to_preview(100.0, 40.0, 0.25);
        assert_eq!(preview_delta_to_canvas_delta(px, py, 0.25), (100.0, 40.0));
    }

    #[test]
    fn clamp_handles_nan() {
        assert_eq!(clamp(-50.0, 0.0, 800.0), 0.0);
        assert_eq!(clamp(900.0, 0.0, 800.0), 800.0);
        assert_eq!(clamp(f32::NAN, 0.0, 800.0), 0.0);
    }

    #[test]
    fn default_config_matches_preview_box() {
        let cfg: PreviewConfig = serde_json::from_str(r#"{ "maxScale": 0.3 }"#).unwrap();
        assert_eq!(cfg.max_width, 400.0);
        assert_eq!(cfg.max_scale, 0.3);
    }
}
