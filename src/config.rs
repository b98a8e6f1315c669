use std::path::PathBuf;

use crate::data::loader::LoadError;

/// Environment variable pointing at the WEO source file.
pub const DATA_PATH_ENV: &str = "DATA_PATH";

/// Resolve the data source path from the environment.
///
/// `main` loads `.env` via `dotenv` before this runs, so a `DATA_PATH=…`
/// line next to the binary works the same as an exported variable. An
/// unset or empty variable is the fatal `MissingConfiguration` error.
pub fn data_path() -> Result<PathBuf, LoadError> {
    match std::env::var(DATA_PATH_ENV) {
        Ok(value) if !value.trim().is_empty() => Ok(PathBuf::from(value.trim())),
        _ => Err(LoadError::MissingConfiguration),
    }
}
