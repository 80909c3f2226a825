//! CLI command implementations

pub mod plan;
pub mod render;
pub mod stage;
