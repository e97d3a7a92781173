//! Pan/zoom viewport for the drawing surface.
//!
//! The viewport is a uniform-scale affine applied to the surface only — it
//! never touches document coordinates. Modeled as a kurbo
//! [`TranslateScale`]: world point `p` appears at `p * scale + (tx, ty)`.

use kurbo::{Point, TranslateScale, Vec2};

pub const MIN_ZOOM: f64 = 0.1;
pub const MAX_ZOOM: f64 = 5.0;
/// Padding kept around the page by `zoom_to_fit`.
const FIT_PADDING: f64 = 48.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportController {
    scale: f64,
    translation: Vec2,
}

impl Default for ViewportController {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewportController {
    pub fn new() -> Self {
        Self {
            scale: 1.0,
            translation: Vec2::ZERO,
        }
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn translation(&self) -> (f64, f64) {
        (self.translation.x, self.translation.y)
    }

    /// The surface transform as an affine.
    pub fn transform(&self) -> TranslateScale {
        TranslateScale::new(self.translation, self.scale)
    }

    /// Largest uniform scale that fits the page within the container minus
    /// fixed padding, clamped to the minimum zoom. The page is centered.
    pub fn zoom_to_fit(&mut self, page_w: f64, page_h: f64, container_w: f64, container_h: f64) {
        let avail_w = (container_w - 2.0 * FIT_PADDING).max(1.0);
        let avail_h = (container_h - 2.0 * FIT_PADDING).max(1.0);
        let scale = (avail_w / page_w).min(avail_h / page_h).max(MIN_ZOOM);
        self.scale = scale;
        self.translation = Vec2::new(
            (container_w - page_w * scale) / 2.0,
            (container_h - page_h * scale) / 2.0,
        );
    }

    pub fn zoom_in(&mut self, factor: f64) {
        self.set_zoom(self.scale * (1.0 + factor));
    }

    pub fn zoom_out(&mut self, factor: f64) {
        self.set_zoom(self.scale / (1.0 + factor));
    }

    pub fn set_zoom(&mut self, scale: f64) {
        self.scale = scale.clamp(MIN_ZOOM, MAX_ZOOM);
    }

    pub fn reset_zoom(&mut self) {
        self.scale = 1.0;
        self.translation = Vec2::ZERO;
    }

    /// Translate the viewport without touching the scale (drag-pan or
    /// modifier+wheel).
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.translation += Vec2::new(dx, dy);
    }

    /// Zoom anchored at a pointer position in container coordinates: the
    /// world point under the cursor stays fixed. `delta > 0` zooms in.
    pub fn zoom_at(&mut self, anchor: Point, delta: f64) {
        let old_scale = self.scale;
        let factor = if delta > 0.0 {
            1.0 + delta
        } else {
            1.0 / (1.0 - delta)
        };
        let new_scale = (old_scale * factor).clamp(MIN_ZOOM, MAX_ZOOM);
        if new_scale == old_scale {
            return;
        }
        let ratio = new_scale / old_scale;
        self.translation = Vec2::new(
            anchor.x - (anchor.x - self.translation.x) * ratio,
            anchor.y - (anchor.y - self.translation.y) * ratio,
        );
        self.scale = new_scale;
    }

    /// Push the current transform to a surface.
    pub fn apply<S: crate::Surface>(&self, surface: &mut S) {
        surface.set_viewport_transform(self.scale, self.translation.x, self.translation.y);
    }
}
