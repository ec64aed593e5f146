//! Event system: DOM events and the handler registry.

pub mod input;
pub mod registry;

pub use input::Event;
pub use registry::{Callback, HandlerId, HandlerRegistry, HandlerSlot};
