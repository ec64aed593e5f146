//! Virtual node model: immutable element/text/fragment trees.

pub mod gesture;
pub mod node;
pub mod property;

pub use gesture::{Gesture, GesturePriority};
pub use node::{Key, Node, NodeIdentity, NodeKind};
pub use property::{Properties, Property, PropertyKey};
