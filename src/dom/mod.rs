//! In-memory DOM: slotmap-backed node arena that patch lists are applied to.

pub mod apply;
pub mod html;
pub mod node;
pub mod tree;

pub use apply::{DomBinding, DomError};
pub use html::HtmlError;
pub use node::{DomId, DomNode};
pub use tree::Dom;
