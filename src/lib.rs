//! Timber Gen — static page generator for a two-button branching game.
//!
//! Generates a constrained random level layout, derives which button
//! survives each animation frame, copies the numbered frames next to the
//! page and renders the page from a template.

pub mod core;
pub mod schema;

pub use crate::core::config::GameConfig;
pub use crate::core::pipeline::{BuildError, BuildReport, PageBuilder};
pub use crate::core::sequence::build_sequence;
pub use crate::core::tree::Tree;
