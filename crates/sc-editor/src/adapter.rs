//! Scene adapter: bidirectional sync between the document store and a
//! rendering surface.
//!
//! - **Model → Scene**: `render_page` rebuilds the surface from a page;
//!   `sync_page` patches only what changed after a store notification.
//! - **Scene → Model**: `apply_event` translates surface manipulation
//!   events into store mutations.
//!
//! The two directions are serialized by a re-entrancy guard: while a scene
//! event is being written to the store, the resulting change notification
//! must not re-enter the scene and patch the very node the user is still
//! manipulating — without the guard the directions loop, or corrupt
//! transient state like the caret during text entry.
//!
//! Scene nodes are transient. The adapter may destroy and recreate them
//! freely; the document model is the only source of truth.

use crate::debounce::{Debouncer, SETTLE_DELAY};
use sc_core::model::{BubbleShape, Color, Page, TextBox, MIN_BOX_SIZE};
use sc_core::{DocumentStore, GeometryPatch, ObjectId, TextBoxPatch};
use sc_scene::{
    BackgroundSpec, BubbleSpec, ImageInfo, NodeHandle, NodePatch, NodeSpec, RenderResourceError,
    Surface, SurfaceEvent, TextSpec,
};
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Horizontal padding between text bounds and bubble edge.
const BUBBLE_PAD_X: f64 = 10.0;
/// Vertical padding between text bounds and bubble edge.
const BUBBLE_PAD_Y: f64 = 8.0;
/// Corner radius for `BubbleShape::Rounded`.
const ROUNDED_RADIUS: f64 = 14.0;

fn default_bubble_fill() -> Color {
    // Slate, 65% opacity.
    Color::rgba(15.0 / 255.0, 23.0 / 255.0, 42.0 / 255.0, 0.65)
}

/// Scene handles projecting one text box.
#[derive(Debug, Clone, Copy)]
struct BoxNodes {
    text: NodeHandle,
    bubble: Option<NodeHandle>,
}

pub struct SceneAdapter<S: Surface> {
    surface: S,
    nodes: HashMap<ObjectId, BoxNodes>,
    background: Option<NodeHandle>,
    /// Source url of the background whose load is in flight or displayed.
    background_source: Option<String>,
    page_id: Option<ObjectId>,
    page_w: f64,
    page_h: f64,
    /// Bumped on every full render; image completions carrying an older
    /// token are stale and discarded.
    epoch: u64,
    /// Re-entrancy guard: set while a scene event is written to the store.
    syncing: bool,
    disposed: bool,
    editing: bool,
    settle: Debouncer,
}

impl<S: Surface> SceneAdapter<S> {
    pub fn new(surface: S) -> Self {
        Self::with_settle_delay(surface, SETTLE_DELAY)
    }

    pub fn with_settle_delay(surface: S, delay: Duration) -> Self {
        Self {
            surface,
            nodes: HashMap::new(),
            background: None,
            background_source: None,
            page_id: None,
            page_w: 0.0,
            page_h: 0.0,
            epoch: 0,
            syncing: false,
            disposed: false,
            editing: false,
            settle: Debouncer::new(delay),
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// True while a scene node is in inline text edit mode. Collaborators
    /// use this to suppress keyboard shortcuts.
    pub fn is_text_editing(&self) -> bool {
        self.editing
    }

    /// The text node handle projecting `id`, if rendered.
    pub fn text_handle(&self, id: ObjectId) -> Option<NodeHandle> {
        self.nodes.get(&id).map(|n| n.text)
    }

    // ─── Model → Scene ───────────────────────────────────────────────────

    /// Full rebuild of the surface from a page.
    pub fn render_page(&mut self, page: &Page, show_inpainted: bool) {
        if self.disposed {
            return;
        }
        self.surface.clear();
        self.nodes.clear();
        self.background = None;
        self.background_source = None;
        self.page_id = Some(page.id);
        self.page_w = page.width;
        self.page_h = page.height;
        self.epoch += 1;

        if let Some(source) = page.background_source(show_inpainted) {
            self.background_source = Some(source.to_string());
            self.surface.request_image(source, self.epoch);
        }
        for tb in &page.text_boxes {
            self.add_text_box(tb);
        }
    }

    /// Create the scene nodes for one text box.
    pub fn add_text_box(&mut self, tb: &TextBox) {
        if self.disposed {
            return;
        }
        let bubble = bubble_spec(tb).map(|spec| self.surface.create(NodeSpec::Bubble(spec)));
        let text = self.surface.create(NodeSpec::Text(text_spec(tb)));
        self.nodes.insert(tb.id, BoxNodes { text, bubble });
    }

    /// Patch the scene nodes for one text box. The bubble is recreated
    /// rather than patched — it is cheap, non-interactive, and its shape
    /// may have toggled.
    pub fn update_text_box(&mut self, tb: &TextBox) {
        if self.disposed {
            return;
        }
        let Some(&BoxNodes { text, bubble }) = self.nodes.get(&tb.id) else {
            self.add_text_box(tb);
            return;
        };

        self.surface.update(text, text_patch(tb));
        if let Some(old) = bubble {
            self.surface.remove(old);
        }
        let bubble = bubble_spec(tb).map(|spec| {
            let handle = self.surface.create(NodeSpec::Bubble(spec));
            self.surface.send_to_back(handle);
            handle
        });
        // Bubbles sit behind text; the background stays behind everything.
        if let Some(bg) = self.background {
            self.surface.send_to_back(bg);
        }
        self.nodes.insert(tb.id, BoxNodes { text, bubble });
    }

    /// Remove the scene nodes for one text box. Never touches the model.
    pub fn remove_text_box(&mut self, id: ObjectId) {
        if self.disposed {
            return;
        }
        if let Some(BoxNodes { text, bubble }) = self.nodes.remove(&id) {
            self.surface.remove(text);
            if let Some(bubble) = bubble {
                self.surface.remove(bubble);
            }
        }
    }

    /// Re-sync the surface from the store after a change notification.
    /// No-op while the adapter itself is writing to the store — that write
    /// originated from the scene, which is already current.
    pub fn sync_page(&mut self, store: &DocumentStore) {
        if self.disposed || self.syncing {
            return;
        }
        let project = store.project();
        let Some(page) = project.active_page() else {
            return;
        };

        let background_changed = self.background_source.as_deref()
            != page.background_source(project.show_inpainted);
        if self.page_id != Some(page.id) || background_changed {
            self.render_page(page, project.show_inpainted);
            return;
        }

        let live: Vec<ObjectId> = self.nodes.keys().copied().collect();
        for id in live {
            if page.text_box(id).is_none() {
                self.remove_text_box(id);
            }
        }
        for tb in &page.text_boxes {
            if self.nodes.contains_key(&tb.id) {
                self.update_text_box(tb);
            } else {
                self.add_text_box(tb);
            }
        }
    }

    // ─── Scene → Model ───────────────────────────────────────────────────

    /// Translate a surface event into store mutations. Held under the
    /// re-entrancy guard; the store notification this produces arrives
    /// synchronously and is absorbed by the guard instead of re-entering
    /// the scene.
    pub fn apply_event(&mut self, store: &mut DocumentStore, event: SurfaceEvent) {
        if self.disposed {
            return;
        }
        match event {
            SurfaceEvent::ObjectModified {
                id,
                x,
                y,
                width,
                height,
                scale_x,
                scale_y,
                rotation,
            } => {
                // Effective size folds in the surface's scale factors;
                // everything rounds to whole pixels so repeated drags
                // never accumulate float drift.
                let patch = TextBoxPatch {
                    geometry: GeometryPatch {
                        x: Some(x.round()),
                        y: Some(y.round()),
                        w: Some((width * scale_x).round().max(MIN_BOX_SIZE)),
                        h: Some((height * scale_y).round().max(MIN_BOX_SIZE)),
                        rotation: Some(rotation),
                    },
                    ..Default::default()
                };
                self.write_to_store(store, |store| match store.update_text_box(id, patch) {
                    Ok(Some(_)) => {}
                    Ok(None) => log::debug!("modified event for unknown box {id}"),
                    Err(err) => log::warn!("rejected scene geometry for {id}: {err}"),
                });
                self.settle.arm(Instant::now());
            }
            SurfaceEvent::SelectionChanged { id } => {
                if let Some(id) = id {
                    // A selection raced with a page switch: the id no
                    // longer resolves on the active page. Drop it rather
                    // than propagate a stale reference.
                    if store.get_text_box(id).is_none() {
                        log::debug!("dropping stale selection {id}");
                        return;
                    }
                }
                self.write_to_store(store, |store| store.select_text_box(id));
            }
            SurfaceEvent::TextEditStarted { id } => {
                if self.nodes.contains_key(&id) {
                    self.editing = true;
                }
            }
            SurfaceEvent::TextEditFinished { id, text } => {
                self.editing = false;
                let patch = TextBoxPatch {
                    text: Some(text),
                    ..Default::default()
                };
                self.write_to_store(store, |store| match store.update_text_box(id, patch) {
                    Ok(_) => {}
                    Err(err) => log::warn!("rejected edited text for {id}: {err}"),
                });
                self.settle.arm(Instant::now());
            }
            SurfaceEvent::ImageLoaded { token, result } => {
                self.background_loaded(token, result);
            }
        }
    }

    /// Run a store mutation under the re-entrancy guard, then absorb the
    /// synchronous change notification.
    fn write_to_store(&mut self, store: &mut DocumentStore, f: impl FnOnce(&mut DocumentStore)) {
        self.syncing = true;
        f(store);
        // The notification for this mutation triggers a model→scene
        // re-sync; the guard makes it a no-op for the write we just made.
        self.sync_page(store);
        self.syncing = false;
    }

    /// Apply a background image load completion. Stale completions — an
    /// older render's load finishing after a newer render started, or any
    /// completion after disposal — are discarded.
    fn background_loaded(
        &mut self,
        token: u64,
        result: Result<ImageInfo, RenderResourceError>,
    ) {
        if self.disposed || token != self.epoch {
            log::debug!("discarding stale image completion (token {token})");
            return;
        }
        let info = match result {
            Ok(info) => info,
            Err(err) => {
                // The page renders without a background. The attempted
                // source stays recorded, so later syncs patch incrementally
                // instead of rebuilding and re-requesting a url that is
                // known to fail.
                log::warn!("background load failed: {err}");
                return;
            }
        };
        let Some(source) = self.background_source.clone() else {
            return;
        };

        // Uniform fit, never upscaled past natural size, centered.
        let scale = (self.page_w / info.width)
            .min(self.page_h / info.height)
            .min(1.0);
        let handle = self.surface.create(NodeSpec::Background(BackgroundSpec {
            source,
            x: (self.page_w - info.width * scale) / 2.0,
            y: (self.page_h - info.height * scale) / 2.0,
            scale,
        }));
        self.surface.send_to_back(handle);
        self.background = Some(handle);
    }

    // ─── Lifecycle ───────────────────────────────────────────────────────

    /// True exactly once per burst of manipulation events, after the
    /// trailing debounce window elapses. Drives autosave batching; the
    /// store itself was already updated per event.
    pub fn changes_settled(&mut self, now: Instant) -> bool {
        self.settle.fire_ready(now)
    }

    /// Tear down all scene resources. The document model is untouched, and
    /// every handler becomes a no-op from here on.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.settle.cancel();
        self.nodes.clear();
        self.background = None;
        self.background_source = None;
        self.surface.clear();
    }
}

fn text_spec(tb: &TextBox) -> TextSpec {
    TextSpec {
        owner: tb.id,
        content: tb.text.clone(),
        x: tb.geometry.x,
        y: tb.geometry.y,
        width: tb.geometry.w,
        height: tb.geometry.h,
        rotation: tb.geometry.rotation,
        font_size: tb.style.font_size,
        font_family: tb.style.font_family.clone(),
        color: tb.style.color,
        line_height: tb.style.line_height,
    }
}

fn text_patch(tb: &TextBox) -> NodePatch {
    NodePatch {
        content: Some(tb.text.clone()),
        x: Some(tb.geometry.x),
        y: Some(tb.geometry.y),
        width: Some(tb.geometry.w),
        height: Some(tb.geometry.h),
        rotation: Some(tb.geometry.rotation),
        font_size: Some(tb.style.font_size),
        font_family: Some(tb.style.font_family.clone()),
        color: Some(tb.style.color),
        line_height: Some(tb.style.line_height),
    }
}

/// Bubble sized to the text bounds plus fixed padding. Corner radius is
/// half the box height for ellipse, a fixed constant for rounded.
fn bubble_spec(tb: &TextBox) -> Option<BubbleSpec> {
    if tb.style.bubble_shape == BubbleShape::None {
        return None;
    }
    let g = &tb.geometry;
    Some(BubbleSpec {
        owner: tb.id,
        x: g.x - BUBBLE_PAD_X,
        y: g.y - BUBBLE_PAD_Y,
        width: g.w + 2.0 * BUBBLE_PAD_X,
        height: g.h + 2.0 * BUBBLE_PAD_Y,
        fill: tb.style.bg_color.unwrap_or_else(default_bubble_fill),
        corner_radius: match tb.style.bubble_shape {
            BubbleShape::Ellipse => g.h / 2.0,
            _ => ROUNDED_RADIUS,
        },
    })
}
