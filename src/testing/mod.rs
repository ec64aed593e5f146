//! Headless testing framework: Pilot, snapshot helpers.
//!
//! Use the [`Pilot`] to drive an [`App`](crate::app::App) mounted into an
//! in-memory DOM. Use [`render_to_string`] and related helpers to capture a
//! view's output as markup for snapshot-style assertions.

pub mod pilot;
pub mod snapshot;

pub use pilot::Pilot;
pub use snapshot::{dom_to_string, render_to_markup, render_to_string};
