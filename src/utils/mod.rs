pub mod connection;
pub mod journal;
pub mod process;

use crate::errors::{AppError, Result};

/// Accepts names that are safe to splice into DDL and file names.
pub fn validate_identifier(name: &str) -> Result<&str> {
    if name.trim().is_empty()
        || name.contains(|c: char| !c.is_ascii_alphanumeric() && c != '_' && c != '-')
    {
        return Err(AppError::InvalidIdentifier(name.to_string()));
    }
    Ok(name)
}
