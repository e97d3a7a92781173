//! The rendering-surface contract.
//!
//! The editor never talks to a concrete canvas library; it drives anything
//! that implements [`Surface`] and consumes the [`SurfaceEvent`]s the
//! surface raises from user manipulation. Scene nodes are transient,
//! surface-owned projections of document entities — every spec carries the
//! owning text box id as a back-reference for lookup, never as ownership:
//! destroying a node must never destroy the model entity.

use sc_core::model::Color;
use sc_core::ObjectId;
use thiserror::Error;

/// Opaque handle to a scene node, minted by the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeHandle(pub u64);

/// An editable text node.
#[derive(Debug, Clone, PartialEq)]
pub struct TextSpec {
    /// Back-reference to the owning text box.
    pub owner: ObjectId,
    pub content: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Degrees, clockwise.
    pub rotation: f64,
    pub font_size: f64,
    pub font_family: String,
    pub color: Color,
    pub line_height: f64,
}

/// The decorative shape behind a text node. Never selectable or
/// interactive.
#[derive(Debug, Clone, PartialEq)]
pub struct BubbleSpec {
    pub owner: ObjectId,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub fill: Color,
    pub corner_radius: f64,
}

/// The page background image. Never selectable or interactive, always at
/// the back of the draw order.
#[derive(Debug, Clone, PartialEq)]
pub struct BackgroundSpec {
    pub source: String,
    pub x: f64,
    pub y: f64,
    /// Uniform scale; the image is never upscaled past its natural size.
    pub scale: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeSpec {
    Text(TextSpec),
    Bubble(BubbleSpec),
    Background(BackgroundSpec),
}

impl NodeSpec {
    /// The id of the text box this node projects, if any.
    pub fn owner(&self) -> Option<ObjectId> {
        match self {
            NodeSpec::Text(spec) => Some(spec.owner),
            NodeSpec::Bubble(spec) => Some(spec.owner),
            NodeSpec::Background(_) => None,
        }
    }
}

/// Partial node update; unset fields are left as they are.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodePatch {
    pub content: Option<String>,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub rotation: Option<f64>,
    pub font_size: Option<f64>,
    pub font_family: Option<String>,
    pub color: Option<Color>,
    pub line_height: Option<f64>,
}

/// Natural dimensions of a loaded image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageInfo {
    pub width: f64,
    pub height: f64,
}

/// A background image could not be loaded. Recoverable: the page renders
/// without that background.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("failed to load {source_url}: {message}")]
pub struct RenderResourceError {
    pub source_url: String,
    pub message: String,
}

/// Events raised by the surface from user manipulation. Geometry payloads
/// report the node's *raw* dimensions plus the scale factors the surface
/// applied; effective size is `width × scale_x` / `height × scale_y`.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceEvent {
    /// A node was moved, resized, or rotated (or a drag frame thereof).
    ObjectModified {
        id: ObjectId,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        scale_x: f64,
        scale_y: f64,
        rotation: f64,
    },
    /// The surface selection changed; `None` means deselected.
    SelectionChanged { id: Option<ObjectId> },
    /// Inline text editing started on a node.
    TextEditStarted { id: ObjectId },
    /// Inline text editing finished; `text` is the edited content.
    TextEditFinished { id: ObjectId, text: String },
    /// An image requested via [`Surface::request_image`] finished loading.
    /// `token` echoes the request token so stale completions can be
    /// discarded.
    ImageLoaded {
        token: u64,
        result: Result<ImageInfo, RenderResourceError>,
    },
}

/// A mutable, interactive drawing surface.
pub trait Surface {
    fn create(&mut self, spec: NodeSpec) -> NodeHandle;
    fn update(&mut self, handle: NodeHandle, patch: NodePatch);
    fn remove(&mut self, handle: NodeHandle);
    /// Move a node to the back of the draw order.
    fn send_to_back(&mut self, handle: NodeHandle);
    /// Apply the viewport transform (uniform scale + translation).
    fn set_viewport_transform(&mut self, scale: f64, tx: f64, ty: f64);
    /// Begin loading an image. Completion arrives asynchronously as a
    /// [`SurfaceEvent::ImageLoaded`] carrying the same token.
    fn request_image(&mut self, source: &str, token: u64);
    /// Remove every node.
    fn clear(&mut self);
}
