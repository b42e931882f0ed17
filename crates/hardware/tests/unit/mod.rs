//! Unit and scenario tests.

/// Configuration defaults, parsing and validation.
pub mod config;

/// Scheduling structures and functional units.
pub mod core;


/// Whole-simulator scenarios, loading and randomized properties.
pub mod sim;
