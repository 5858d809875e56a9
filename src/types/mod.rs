//! Core data types and structures

pub mod tokens;
pub mod oracle;
pub mod arbitrage;
pub mod simulation;
pub mod execution;

pub use tokens::*;
pub use oracle::*;
pub use arbitrage::*;
pub use simulation::*;
pub use execution::*;
