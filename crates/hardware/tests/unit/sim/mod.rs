//! Whole-simulator tests.

pub mod simulator;
