//! Domain layer: pure link and reference rules with no rendering concerns.

pub mod links;
pub mod references;
pub mod shorthand;
