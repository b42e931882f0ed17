//! Program and configuration loading.
//!
//! This module resolves the inputs of a simulation run from disk:
//! 1. **Configuration:** An optional JSON file, validated; defaults when absent.
//! 2. **Program:** A JSON program description placed at the configured start address.

use std::path::Path;

use tracing::info;

use crate::common::error::SimError;
use crate::config::Config;
use crate::isa::Program;

/// Loads and validates a configuration file, or returns the defaults.
///
/// # Errors
///
/// Returns [`SimError::Io`] if the file cannot be read, [`SimError::Json`] if it
/// is malformed, and [`SimError::Config`] if validation fails.
pub fn load_config(path: Option<&Path>) -> Result<Config, SimError> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let json = std::fs::read_to_string(path).map_err(|source| SimError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config = Config::from_json(&json)?;
    info!(path = %path.display(), "loaded configuration");
    Ok(config)
}

/// Loads a program description at `config.general.start_pc`.
///
/// # Errors
///
/// As [`Program::load`].
pub fn load_program(path: &Path, config: &Config) -> Result<Program, SimError> {
    let program = Program::load(path, config.general.start_pc)?;
    info!(
        path = %path.display(),
        instructions = program.len(),
        base = format_args!("{:#x}", program.base()),
        "loaded program"
    );
    Ok(program)
}
