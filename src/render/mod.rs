//! Render coordination: the view contract, the per-pass context, persistent
//! state and the ancestor stack.

pub mod ancestor;
pub mod context;
pub mod coordinator;
pub mod state;
pub mod view;

pub use ancestor::{Ancestor, AncestorStack, NavigationController, TabController};
pub use context::{PathSegment, RenderContext, ViewPath};
pub use coordinator::{Coordinator, RenderOutput};
pub use state::{StateArena, StateKey};
pub use view::{Capabilities, RenderError, TabItem, View, ViewExt, WithCapabilities};
