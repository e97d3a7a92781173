//! Scanlate editor: glue between the document store and a rendering
//! surface.
//!
//! [`SceneAdapter`] keeps the two in sync bidirectionally; the
//! [`Debouncer`] batches the "changes settled" signal behind rapid
//! manipulation bursts.

pub mod adapter;
pub mod debounce;

pub use adapter::SceneAdapter;
pub use debounce::{Debouncer, SETTLE_DELAY};
