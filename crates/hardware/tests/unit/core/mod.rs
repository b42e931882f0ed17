//! Scheduling core tests.
