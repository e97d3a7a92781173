//! Scanlate core: the document model and the undoable document store.
//!
//! The model (`Project` → `Page` → `TextBox`) is the single source of truth
//! for an editing session. Rendering surfaces hold only derived, rebuildable
//! projections keyed by the stable ids defined here.

pub mod error;
pub mod history;
pub mod id;
pub mod model;
pub mod store;

pub use error::ValidationError;
pub use history::{History, HistoryEntry, MAX_HISTORY};
pub use id::ObjectId;
pub use model::*;
pub use store::{
    DocumentStore, GeometryPatch, PageOptions, PagePatch, StylePatch, Subscription, TextBoxInit,
    TextBoxPatch, TextUpdate,
};
