//! # raven-core
//!
//! Virtual-DOM reconciliation core for the Raven UI framework.
//!
//! Views lower themselves into immutable [`vdom::Node`] trees once per render
//! pass. Consecutive trees are diffed into ordered [`diff::Patch`] lists that a
//! DOM binding applies, and server-rendered markup can be hydrated instead of
//! remounted.
//!
//! ## Core Systems
//!
//! - **[`vdom`]**: Node, properties, gestures
//! - **[`diff`]**: keyed reconciliation into path-addressed patches
//! - **[`event`]**: DOM events and the handler registry swept every pass
//! - **[`render`]**: the View trait, render context, persistent state, ancestor stack
//! - **[`scheduler`]**: pass coalescing, signals, cooperative async tasks
//! - **[`dom`]**: the binding contract plus an in-memory DOM and HTML parser
//! - **[`ssr`]** / **[`hydrate`]**: server markup with markers, and adopting it
//! - **[`views`]**: built-in views
//! - **[`app`]**: the runtime gluing the above together
//! - **[`diagnostics`]**: non-fatal conditions recorded during a pass
//! - **[`testing`]**: headless pilot and snapshot helpers

// Tree model
pub mod diff;
pub mod vdom;

// Rendering
pub mod event;
pub mod render;
pub mod scheduler;
pub mod views;

// DOM side
pub mod dom;
pub mod hydrate;
pub mod ssr;

// Application
pub mod app;
pub mod diagnostics;
pub mod testing;

pub use app::{App, AppConfig, PassReport};
pub use diagnostics::{Diagnostic, Diagnostics};
pub use diff::{diff, diff_with, NodePath, Patch};
pub use render::{RenderContext, RenderError, View, ViewExt};
pub use vdom::Node;
