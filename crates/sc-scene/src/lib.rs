//! Scanlate scene: rendering-surface contracts and the pan/zoom viewport.

pub mod surface;
pub mod viewport;

pub use surface::{
    BackgroundSpec, BubbleSpec, ImageInfo, NodeHandle, NodePatch, NodeSpec, RenderResourceError,
    Surface, SurfaceEvent, TextSpec,
};
pub use viewport::{MAX_ZOOM, MIN_ZOOM, ViewportController};
