//! Hydration reconciler: adopts server-rendered markup on the first pass.

pub mod reconciler;

pub use reconciler::{hydrate, HydrationReport};
