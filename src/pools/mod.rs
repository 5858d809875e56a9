//! Liquidity pool quoting

pub mod venue;
pub mod provider;

pub use venue::*;
pub use provider::*;
