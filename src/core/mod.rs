pub mod assets;
pub mod config;
pub mod pipeline;
pub mod render;
pub mod sequence;
pub mod tree;
