//! Data persistence and file operations

pub mod opportunities;
pub mod attempts;

pub use opportunities::*;
pub use attempts::*;
