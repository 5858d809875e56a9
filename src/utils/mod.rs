//! Utility functions and helpers

pub mod abi;
pub mod math;
pub mod amount;
pub mod logging;
pub mod display;

pub use abi::*;
pub use math::*;
pub use amount::*;
pub use logging::*;
pub use display::*;
