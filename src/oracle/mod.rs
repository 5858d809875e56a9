//! Price oracle access and peg-adjustment math

pub mod venue;
pub mod fetcher;

pub use venue::*;
pub use fetcher::*;
