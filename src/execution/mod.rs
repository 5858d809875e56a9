//! Simulate-before-send execution pipeline

pub mod params;
pub mod builder;
pub mod relay;
pub mod pipeline;

pub use params::*;
pub use builder::*;
pub use relay::*;
pub use pipeline::*;
