pub mod filter;
pub mod grid;
pub mod heatmap;
pub mod loader;
pub mod normalize;
pub mod output;
pub mod projection;
pub mod stats;
