//! Fluent builders for test inputs.

pub mod status;
