//! The document store: owns the live `Project`, applies validated
//! mutations, and keeps observers and the undo/redo history in sync.
//!
//! Every structural mutation follows the same discipline: validate the
//! resulting entity, apply it, refresh `updatedAt`, record one history
//! snapshot, notify observers exactly once. A mutation either fully applies
//! or is rejected before any of those steps, so observers never see a
//! half-updated project.
//!
//! Stores are plain constructed values with an explicit subscription API —
//! multiple editors (or tests) can hold independent stores without
//! interfering.

use crate::error::{Result, ValidationError};
use crate::history::{History, MAX_HISTORY};
use crate::id::ObjectId;
use crate::model::*;
use smallvec::SmallVec;

type Listener = Box<dyn FnMut(&Project)>;

/// Token returned by [`DocumentStore::on_change`]; pass to `unsubscribe`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subscription(u64);

/// Options for [`DocumentStore::add_page`]. Unset fields use the defaults
/// of a blank 900×1200 page named after its position.
#[derive(Debug, Clone, Default)]
pub struct PageOptions {
    pub name: Option<String>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub image_url: Option<String>,
    pub inpainted_image_url: Option<String>,
}

/// Partial page update; set fields are merged into the existing record.
#[derive(Debug, Clone, Default)]
pub struct PagePatch {
    pub name: Option<String>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub image_url: Option<String>,
    pub inpainted_image_url: Option<String>,
}

/// Initial values for a new text box. A fresh id is assigned when none is
/// given; `original_text` is captured from `text` when absent.
#[derive(Debug, Clone, Default)]
pub struct TextBoxInit {
    pub id: Option<ObjectId>,
    pub text: Option<String>,
    pub original_text: Option<String>,
    pub geometry: Option<Geometry>,
    pub style: Option<TextStyle>,
}

/// Partial geometry update.
#[derive(Debug, Clone, Copy, Default)]
pub struct GeometryPatch {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub w: Option<f64>,
    pub h: Option<f64>,
    pub rotation: Option<f64>,
}

/// Partial style update. The double option on `bg_color` distinguishes
/// "leave unchanged" from "clear to null".
#[derive(Debug, Clone, Default)]
pub struct StylePatch {
    pub font_size: Option<f64>,
    pub font_family: Option<String>,
    pub color: Option<Color>,
    pub bg_color: Option<Option<Color>>,
    pub bubble_shape: Option<BubbleShape>,
    pub line_height: Option<f64>,
}

/// Partial text box update, merged field-by-field before validation.
/// `original_text` is immutable after creation and has no patch field.
#[derive(Debug, Clone, Default)]
pub struct TextBoxPatch {
    pub text: Option<String>,
    pub geometry: GeometryPatch,
    pub style: StylePatch,
}

/// One entry of a bulk translation result.
#[derive(Debug, Clone)]
pub struct TextUpdate {
    pub id: ObjectId,
    pub text: String,
}

pub struct DocumentStore {
    project: Project,
    history: History,
    listeners: SmallVec<[(u64, Listener); 2]>,
    next_listener: u64,
    autosave: Option<Listener>,
}

impl Default for DocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentStore {
    /// A store holding a fresh one-page project.
    pub fn new() -> Self {
        Self::with_history_capacity(MAX_HISTORY)
    }

    pub fn with_history_capacity(capacity: usize) -> Self {
        let project = Project::new("Untitled chapter");
        let history = History::new(project.to_value(), capacity);
        Self {
            project,
            history,
            listeners: SmallVec::new(),
            next_listener: 0,
            autosave: None,
        }
    }

    // ─── Reads ───────────────────────────────────────────────────────────

    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn pages(&self) -> &[Page] {
        &self.project.pages
    }

    pub fn active_page(&self) -> Option<&Page> {
        self.project.active_page()
    }

    pub fn active_page_id(&self) -> usize {
        self.project.active_page_id
    }

    pub fn selected_text_box_id(&self) -> Option<ObjectId> {
        self.project.selected_text_box_id
    }

    pub fn show_inpainted(&self) -> bool {
        self.project.show_inpainted
    }

    /// Read-only lookup on the active page.
    pub fn get_text_box(&self, id: ObjectId) -> Option<&TextBox> {
        self.active_page()?.text_box(id)
    }

    /// Serializable project for autosave/export.
    pub fn to_value(&self) -> serde_json::Value {
        self.project.to_value()
    }

    // ─── Observers ───────────────────────────────────────────────────────

    pub fn on_change(&mut self, listener: impl FnMut(&Project) + 'static) -> Subscription {
        let id = self.next_listener;
        self.next_listener += 1;
        self.listeners.push((id, Box::new(listener)));
        Subscription(id)
    }

    pub fn unsubscribe(&mut self, subscription: Subscription) {
        self.listeners.retain(|(id, _)| *id != subscription.0);
    }

    /// Register the autosave callback, fired on every notification before
    /// the other listeners. Debouncing is the caller's concern.
    pub fn set_autosave(&mut self, callback: impl FnMut(&Project) + 'static) {
        self.autosave = Some(Box::new(callback));
    }

    fn notify(&mut self) {
        let project = &self.project;
        if let Some(autosave) = self.autosave.as_mut() {
            autosave(project);
        }
        for (_, listener) in self.listeners.iter_mut() {
            listener(project);
        }
    }

    /// Refresh `updatedAt`, record one history snapshot, notify once.
    /// Re-derives UI-adjacent state first, so a structural change that moved
    /// the active page never leaves a selection pointing off-page.
    fn commit(&mut self) {
        self.project.coerce();
        self.project.metadata.updated_at = now_ms();
        self.history.record(self.project.to_value());
        self.notify();
    }

    // ─── Project lifecycle ───────────────────────────────────────────────

    /// Replace the entire project from untrusted input. On success the
    /// history is reset to a single entry. `updatedAt` is left as loaded so
    /// `load_project(to_value())` round-trips exactly.
    pub fn load_project(&mut self, data: serde_json::Value) -> Result<()> {
        let project = Project::from_value(data)?;
        self.history.reset(project.to_value());
        self.project = project;
        self.notify();
        Ok(())
    }

    // ─── Page operations ─────────────────────────────────────────────────

    pub fn add_page(&mut self, options: PageOptions) -> ObjectId {
        let name = options
            .name
            .unwrap_or_else(|| format!("Page {}", self.project.pages.len() + 1));
        let mut page = Page::new(
            name,
            options.width.unwrap_or(DEFAULT_PAGE_WIDTH),
            options.height.unwrap_or(DEFAULT_PAGE_HEIGHT),
        );
        page.image_url = options.image_url;
        page.inpainted_image_url = options.inpainted_image_url;
        let id = page.id;

        self.project.pages.push(page);
        self.project.active_page_id = self.project.pages.len() - 1;
        self.commit();
        id
    }

    /// Deep-copy a page, inserting the copy right after the original and
    /// activating it. The copy and its text boxes get fresh ids — box ids
    /// are globally unique, so they are never shared between pages.
    pub fn duplicate_page(&mut self, id: ObjectId) -> Option<ObjectId> {
        let index = self.page_index(id)?;
        let mut copy = self.project.pages[index].clone();
        copy.id = ObjectId::page();
        copy.name = format!("{} (Copy)", copy.name);
        for tb in &mut copy.text_boxes {
            tb.id = ObjectId::text_box();
        }
        let new_id = copy.id;

        self.project.pages.insert(index + 1, copy);
        self.project.active_page_id = index + 1;
        self.commit();
        Some(new_id)
    }

    /// Remove a page. Returns false when the id is unknown or when this is
    /// the last remaining page — a project always keeps at least one.
    pub fn delete_page(&mut self, id: ObjectId) -> bool {
        let Some(index) = self.page_index(id) else {
            return false;
        };
        if self.project.pages.len() <= 1 {
            return false;
        }

        self.project.pages.remove(index);
        if index < self.project.active_page_id {
            self.project.active_page_id -= 1;
        } else if self.project.active_page_id >= self.project.pages.len() {
            self.project.active_page_id = self.project.pages.len() - 1;
        }
        self.commit();
        true
    }

    /// Reorder pages. Out-of-range indices are a no-op. The active page
    /// follows the moved page, or shifts to compensate when the move crosses
    /// over it.
    pub fn move_page(&mut self, from: usize, to: usize) {
        let len = self.project.pages.len();
        if from >= len || to >= len || from == to {
            return;
        }

        let page = self.project.pages.remove(from);
        self.project.pages.insert(to, page);

        let active = self.project.active_page_id;
        if active == from {
            self.project.active_page_id = to;
        } else if active > from && active <= to {
            self.project.active_page_id = active - 1;
        } else if active < from && active >= to {
            self.project.active_page_id = active + 1;
        }
        self.commit();
    }

    /// Merge a partial update into a page. Returns `Ok(false)` when the id
    /// is unknown, `Err` when the merged page fails validation (the page is
    /// left untouched).
    pub fn update_page(&mut self, id: ObjectId, patch: PagePatch) -> Result<bool> {
        let Some(index) = self.page_index(id) else {
            return Ok(false);
        };

        let mut merged = self.project.pages[index].clone();
        if let Some(name) = patch.name {
            merged.name = name;
        }
        if let Some(width) = patch.width {
            merged.width = width;
        }
        if let Some(height) = patch.height {
            merged.height = height;
        }
        if let Some(url) = patch.image_url {
            merged.image_url = Some(url);
        }
        if let Some(url) = patch.inpainted_image_url {
            merged.inpainted_image_url = Some(url);
        }
        merged.validate(&format!("pages[{index}]"))?;

        self.project.pages[index] = merged;
        self.commit();
        Ok(true)
    }

    pub fn set_active_page(&mut self, index: usize) {
        if index >= self.project.pages.len() || index == self.project.active_page_id {
            return;
        }
        self.project.active_page_id = index;
        // Selection never survives a page switch unless it resolves there.
        self.project.coerce();
        self.notify();
    }

    pub fn set_show_inpainted(&mut self, value: bool) {
        if self.project.show_inpainted != value {
            self.project.show_inpainted = value;
            self.notify();
        }
    }

    // ─── Text box operations ─────────────────────────────────────────────

    /// Append a text box to the active page and select it.
    pub fn add_text_box(&mut self, init: TextBoxInit) -> Result<ObjectId> {
        let text = init.text.unwrap_or_else(|| "New text".to_string());
        let tb = TextBox {
            id: init.id.unwrap_or_else(ObjectId::text_box),
            original_text: init.original_text.unwrap_or_else(|| text.clone()),
            text,
            geometry: init.geometry.unwrap_or_default(),
            style: init.style.unwrap_or_default(),
        };
        tb.validate("textBox")?;
        if self
            .project
            .pages
            .iter()
            .any(|page| page.text_box(tb.id).is_some())
        {
            return Err(ValidationError::new(
                "textBox.id",
                format!("id {:?} already exists", tb.id.as_str()),
            ));
        }

        let id = tb.id;
        let Some(page) = self.project.active_page_mut() else {
            return Err(ValidationError::new("activePageId", "no active page"));
        };
        page.text_boxes.push(tb);
        self.project.selected_text_box_id = Some(id);
        self.commit();
        Ok(id)
    }

    /// Merge a partial update into a box on the active page. Returns
    /// `Ok(None)` when the id does not resolve there; `Err` leaves the box
    /// untouched.
    pub fn update_text_box(&mut self, id: ObjectId, patch: TextBoxPatch) -> Result<Option<TextBox>> {
        let page_index = self.project.active_page_id;
        let Some(box_index) = self
            .project
            .active_page()
            .and_then(|p| p.text_boxes.iter().position(|tb| tb.id == id))
        else {
            return Ok(None);
        };

        let mut merged = self.project.pages[page_index].text_boxes[box_index].clone();
        if let Some(text) = patch.text {
            merged.text = text;
        }
        let g = &mut merged.geometry;
        let gp = patch.geometry;
        g.x = gp.x.unwrap_or(g.x);
        g.y = gp.y.unwrap_or(g.y);
        g.w = gp.w.unwrap_or(g.w);
        g.h = gp.h.unwrap_or(g.h);
        g.rotation = gp.rotation.unwrap_or(g.rotation);

        let s = &mut merged.style;
        let sp = patch.style;
        s.font_size = sp.font_size.unwrap_or(s.font_size);
        if let Some(family) = sp.font_family {
            s.font_family = family;
        }
        s.color = sp.color.unwrap_or(s.color);
        if let Some(bg) = sp.bg_color {
            s.bg_color = bg;
        }
        s.bubble_shape = sp.bubble_shape.unwrap_or(s.bubble_shape);
        s.line_height = sp.line_height.unwrap_or(s.line_height);

        merged.validate(&format!("pages[{page_index}].textBoxes[{box_index}]"))?;

        self.project.pages[page_index].text_boxes[box_index] = merged.clone();
        self.commit();
        Ok(Some(merged))
    }

    /// Remove a box from the active page, clearing the selection if it
    /// pointed at the removed box.
    pub fn remove_text_box(&mut self, id: ObjectId) -> bool {
        let Some(page) = self.project.active_page_mut() else {
            return false;
        };
        let Some(index) = page.text_boxes.iter().position(|tb| tb.id == id) else {
            return false;
        };

        page.text_boxes.remove(index);
        if self.project.selected_text_box_id == Some(id) {
            self.project.selected_text_box_id = None;
        }
        self.commit();
        true
    }

    /// Apply many text replacements atomically: one history entry, one
    /// notification. `originalText` is never touched. Unknown ids are
    /// skipped.
    pub fn batch_update_text_boxes(&mut self, updates: &[TextUpdate]) {
        let Some(page) = self.project.active_page_mut() else {
            return;
        };
        let mut changed = false;
        for update in updates {
            if let Some(tb) = page.text_box_mut(update.id) {
                tb.text = update.text.clone();
                changed = true;
            }
        }
        if changed {
            self.commit();
        }
    }

    /// Update the selection. Pure UI-focus state: notifies but pushes no
    /// history entry. An id that does not resolve on the active page is
    /// cleared rather than stored stale.
    pub fn select_text_box(&mut self, id: Option<ObjectId>) {
        let resolved = id.filter(|id| self.get_text_box(*id).is_some());
        if self.project.selected_text_box_id != resolved {
            self.project.selected_text_box_id = resolved;
            self.notify();
        }
    }

    // ─── Undo / redo ─────────────────────────────────────────────────────

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Step back one history entry. Returns false when there is nothing to
    /// undo, or when the snapshot fails to restore — in that case the
    /// cursor is put back and the live project is untouched.
    pub fn undo(&mut self) -> bool {
        let Some(snapshot) = self.history.step_back() else {
            return false;
        };
        match Project::from_value(snapshot.clone()) {
            Ok(project) => {
                self.project = project;
                self.notify();
                true
            }
            Err(err) => {
                log::warn!("undo: corrupt history snapshot: {err}");
                self.history.step_forward();
                false
            }
        }
    }

    pub fn redo(&mut self) -> bool {
        let Some(snapshot) = self.history.step_forward() else {
            return false;
        };
        match Project::from_value(snapshot.clone()) {
            Ok(project) => {
                self.project = project;
                self.notify();
                true
            }
            Err(err) => {
                log::warn!("redo: corrupt history snapshot: {err}");
                self.history.step_back();
                false
            }
        }
    }

    fn page_index(&self, id: ObjectId) -> Option<usize> {
        self.project.pages.iter().position(|p| p.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    fn store_with_box(text: &str) -> (DocumentStore, ObjectId) {
        let mut store = DocumentStore::new();
        let id = store
            .add_text_box(TextBoxInit {
                text: Some(text.into()),
                ..Default::default()
            })
            .unwrap();
        (store, id)
    }

    #[test]
    fn add_text_box_selects_it() {
        let (store, id) = store_with_box("hello");
        assert_eq!(store.selected_text_box_id(), Some(id));
        assert_eq!(store.get_text_box(id).unwrap().text, "hello");
        assert_eq!(store.get_text_box(id).unwrap().original_text, "hello");
    }

    #[test]
    fn update_merges_partial_geometry() {
        let (mut store, id) = store_with_box("hi");
        let updated = store
            .update_text_box(
                id,
                TextBoxPatch {
                    geometry: GeometryPatch {
                        x: Some(100.0),
                        y: Some(120.0),
                        ..Default::default()
                    },
                    ..Default::default()
                },
            )
            .unwrap()
            .unwrap();
        // Unset fields keep their values.
        assert_eq!(updated.geometry.x, 100.0);
        assert_eq!(updated.geometry.y, 120.0);
        assert_eq!(updated.geometry.w, 280.0);
        assert_eq!(updated.geometry.h, 80.0);
    }

    #[test]
    fn update_rejects_invalid_merge_and_leaves_box_untouched() {
        let (mut store, id) = store_with_box("hi");
        let err = store
            .update_text_box(
                id,
                TextBoxPatch {
                    geometry: GeometryPatch {
                        w: Some(-1.0),
                        ..Default::default()
                    },
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert_eq!(err.path, "pages[0].textBoxes[0].geometry.w");
        assert_eq!(store.get_text_box(id).unwrap().geometry.w, 280.0);
        // Rejected mutation pushed no history entry.
        assert!(store.can_undo()); // only the add itself
        store.undo();
        assert!(!store.can_undo());
    }

    #[test]
    fn update_unknown_id_returns_none() {
        let mut store = DocumentStore::new();
        let result = store
            .update_text_box(ObjectId::intern("missing"), TextBoxPatch::default())
            .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn remove_clears_selection() {
        let (mut store, id) = store_with_box("hi");
        assert_eq!(store.selected_text_box_id(), Some(id));
        assert!(store.remove_text_box(id));
        assert_eq!(store.selected_text_box_id(), None);
        assert!(!store.remove_text_box(id));
    }

    #[test]
    fn select_drops_unresolvable_id() {
        let (mut store, id) = store_with_box("hi");
        store.select_text_box(None);
        assert_eq!(store.selected_text_box_id(), None);
        store.select_text_box(Some(ObjectId::intern("ghost")));
        assert_eq!(store.selected_text_box_id(), None);
        store.select_text_box(Some(id));
        assert_eq!(store.selected_text_box_id(), Some(id));
    }

    #[test]
    fn batch_update_leaves_original_text_untouched() {
        let (mut store, id) = store_with_box("Hello");
        store.batch_update_text_boxes(&[TextUpdate {
            id,
            text: "Hola".into(),
        }]);
        let tb = store.get_text_box(id).unwrap();
        assert_eq!(tb.text, "Hola");
        assert_eq!(tb.original_text, "Hello");
    }

    #[test]
    fn batch_update_is_one_history_entry() {
        let mut store = DocumentStore::new();
        let a = store.add_text_box(TextBoxInit::default()).unwrap();
        let b = store.add_text_box(TextBoxInit::default()).unwrap();
        store.batch_update_text_boxes(&[
            TextUpdate {
                id: a,
                text: "one".into(),
            },
            TextUpdate {
                id: b,
                text: "two".into(),
            },
        ]);

        assert!(store.undo());
        assert_eq!(store.get_text_box(a).unwrap().text, "New text");
        assert_eq!(store.get_text_box(b).unwrap().text, "New text");
    }

    #[test]
    fn delete_last_page_is_refused() {
        let mut store = DocumentStore::new();
        let id = store.pages()[0].id;
        assert!(!store.delete_page(id));
        assert_eq!(store.pages().len(), 1);
    }

    #[test]
    fn delete_before_active_decrements_active() {
        let mut store = DocumentStore::new();
        let first = store.pages()[0].id;
        store.add_page(PageOptions::default());
        let third = store.add_page(PageOptions::default());
        assert_eq!(store.active_page_id(), 2);

        assert!(store.delete_page(first));
        assert_eq!(store.active_page_id(), 1);
        assert_eq!(store.pages()[1].id, third);
    }

    #[test]
    fn delete_active_page_clamps_to_nearest() {
        let mut store = DocumentStore::new();
        store.add_page(PageOptions::default());
        let last = store.add_page(PageOptions::default());
        assert!(store.delete_page(last));
        assert_eq!(store.active_page_id(), 1);
    }

    #[test]
    fn move_page_out_of_range_is_noop() {
        let mut store = DocumentStore::new();
        store.add_page(PageOptions::default());
        let before: Vec<_> = store.pages().iter().map(|p| p.id).collect();
        store.move_page(0, 5);
        store.move_page(9, 0);
        let after: Vec<_> = store.pages().iter().map(|p| p.id).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn move_page_keeps_active_following_the_page() {
        let mut store = DocumentStore::new();
        store.add_page(PageOptions::default());
        store.add_page(PageOptions::default());
        store.set_active_page(0);
        store.move_page(0, 2);
        assert_eq!(store.active_page_id(), 2);

        store.set_active_page(1);
        store.move_page(2, 0);
        assert_eq!(store.active_page_id(), 2);
    }

    #[test]
    fn duplicate_page_assigns_fresh_ids() {
        let (mut store, box_id) = store_with_box("hi");
        let original = store.pages()[0].id;
        let copy = store.duplicate_page(original).unwrap();

        assert_ne!(copy, original);
        assert_eq!(store.pages().len(), 2);
        assert_eq!(store.active_page_id(), 1);
        assert!(store.pages()[1].name.ends_with("(Copy)"));
        assert_eq!(store.pages()[1].text_boxes.len(), 1);
        assert_ne!(store.pages()[1].text_boxes[0].id, box_id);
        assert!(store.project().validate().is_ok());
    }

    #[test]
    fn update_page_merges_and_validates() {
        let mut store = DocumentStore::new();
        let id = store.pages()[0].id;
        assert!(
            store
                .update_page(
                    id,
                    PagePatch {
                        name: Some("Cover".into()),
                        ..Default::default()
                    },
                )
                .unwrap()
        );
        assert_eq!(store.pages()[0].name, "Cover");
        assert_eq!(store.pages()[0].width, DEFAULT_PAGE_WIDTH);

        let err = store
            .update_page(
                id,
                PagePatch {
                    width: Some(-1.0),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert_eq!(err.path, "pages[0].width");

        assert!(
            !store
                .update_page(ObjectId::intern("nope"), PagePatch::default())
                .unwrap()
        );
    }

    #[test]
    fn switching_pages_clears_foreign_selection() {
        let (mut store, id) = store_with_box("hi");
        store.add_page(PageOptions::default());
        // add_page activated the new page; the selection from page 0 is stale.
        assert_eq!(store.selected_text_box_id(), None);
        store.set_active_page(0);
        store.select_text_box(Some(id));
        store.set_active_page(1);
        assert_eq!(store.selected_text_box_id(), None);
    }

    #[test]
    fn notifications_fire_once_per_mutation() {
        let mut store = DocumentStore::new();
        let count = Rc::new(Cell::new(0));
        let seen = Rc::clone(&count);
        store.on_change(move |_| seen.set(seen.get() + 1));

        store.add_text_box(TextBoxInit::default()).unwrap();
        assert_eq!(count.get(), 1);
        store.batch_update_text_boxes(&[]);
        assert_eq!(count.get(), 1); // nothing changed, no notification
    }

    #[test]
    fn unsubscribe_stops_notifications() {
        let mut store = DocumentStore::new();
        let count = Rc::new(Cell::new(0));
        let seen = Rc::clone(&count);
        let sub = store.on_change(move |_| seen.set(seen.get() + 1));
        store.add_page(PageOptions::default());
        store.unsubscribe(sub);
        store.add_page(PageOptions::default());
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn autosave_fires_on_every_notification() {
        let mut store = DocumentStore::new();
        let count = Rc::new(Cell::new(0));
        let seen = Rc::clone(&count);
        store.set_autosave(move |_| seen.set(seen.get() + 1));

        store.add_text_box(TextBoxInit::default()).unwrap();
        store.select_text_box(None);
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn updated_at_refreshes_on_mutation() {
        let mut store = DocumentStore::new();
        let before = store.project().metadata.updated_at;
        // now_ms has millisecond resolution; equality either way is fine,
        // it just must never go backwards.
        store.add_page(PageOptions::default());
        assert!(store.project().metadata.updated_at >= before);
    }
}
