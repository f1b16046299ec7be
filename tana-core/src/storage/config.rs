//! ConnectionConfig - Immutable Storage Connection Descriptor
//!
//! TigerStyle: Explicit validation with named limits; malformed input is a
//! `Configuration` error, never a retry.
//!
//! The descriptor format follows the table-storage convention of
//! `;`-separated `key=value` pairs naming at least an `AccountName`, with
//! `UseDevelopmentStorage=true` as the local-emulator shorthand.

use serde::{Deserialize, Serialize};

use crate::constants::{
    CONNECTION_STRING_BYTES_MAX, TABLE_NAME_BYTES_MAX, TABLE_NAME_BYTES_MIN,
};

use super::error::{StorageError, StorageResult};

/// Connection descriptor for the table storage backend.
///
/// Immutable after construction; owned by the initializer. Fields are public
/// so an external configuration loader can deserialize the struct directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Backend connection string (`key=value;...` pairs).
    pub connection_string: String,
    /// Name of the table to provision.
    pub table_name: String,
}

impl ConnectionConfig {
    /// Create a new descriptor. Validation is deferred to [`Self::validate`],
    /// which the provisioner runs before any remote call.
    #[must_use]
    pub fn new(connection_string: impl Into<String>, table_name: impl Into<String>) -> Self {
        Self {
            connection_string: connection_string.into(),
            table_name: table_name.into(),
        }
    }

    /// Validate the descriptor, failing fast on malformed input.
    ///
    /// # Errors
    /// Returns [`StorageError::Configuration`] for an empty or oversized
    /// connection string, a descriptor without an `AccountName`, or a table
    /// name outside the storage service naming rules.
    pub fn validate(&self) -> StorageResult<()> {
        validate_connection_string(&self.connection_string)?;
        validate_table_name(&self.table_name)?;
        Ok(())
    }
}

/// Check the `key=value;...` descriptor shape.
fn validate_connection_string(connection_string: &str) -> StorageResult<()> {
    if connection_string.is_empty() {
        return Err(StorageError::configuration("connection string is empty"));
    }
    if connection_string.len() > CONNECTION_STRING_BYTES_MAX {
        return Err(StorageError::configuration(format!(
            "connection string {} bytes exceeds max {}",
            connection_string.len(),
            CONNECTION_STRING_BYTES_MAX
        )));
    }

    let mut has_account_name = false;
    let mut has_development_shorthand = false;

    for pair in connection_string.split(';').filter(|p| !p.is_empty()) {
        let Some((key, value)) = pair.split_once('=') else {
            return Err(StorageError::configuration(format!(
                "malformed connection string segment: {pair}"
            )));
        };
        match key.trim() {
            "AccountName" if !value.is_empty() => has_account_name = true,
            "UseDevelopmentStorage" if value == "true" => has_development_shorthand = true,
            _ => {}
        }
    }

    if has_account_name || has_development_shorthand {
        Ok(())
    } else {
        Err(StorageError::configuration(
            "connection string names no AccountName",
        ))
    }
}

/// Check the storage service table naming rules: 3-63 bytes, ASCII
/// alphanumeric, first character a letter.
fn validate_table_name(table_name: &str) -> StorageResult<()> {
    if table_name.len() < TABLE_NAME_BYTES_MIN || table_name.len() > TABLE_NAME_BYTES_MAX {
        return Err(StorageError::configuration(format!(
            "table name {} bytes outside {}..={}",
            table_name.len(),
            TABLE_NAME_BYTES_MIN,
            TABLE_NAME_BYTES_MAX
        )));
    }
    if !table_name.chars().next().is_some_and(|c| c.is_ascii_alphabetic()) {
        return Err(StorageError::configuration(format!(
            "table name must start with a letter: {table_name}"
        )));
    }
    if !table_name.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(StorageError::configuration(format!(
            "table name must be ASCII alphanumeric: {table_name}"
        )));
    }
    Ok(())
}
