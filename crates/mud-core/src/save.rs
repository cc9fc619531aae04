//! Structured-node persistence.
//!
//! Everything serializes into `serde_json::Value` nodes so save files,
//! data files and wire snapshots share one format. Loaders validate
//! against the running effect catalog rather than trusting the file.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Save file format version.
pub const SAVE_VERSION: u32 = 1;

#[derive(Error, Debug)]
pub enum SaveError {
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("save version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },

    #[error("effect '{0}' is not in the catalog")]
    UnknownEffect(String),
}

/// Version-stamped envelope around a saved node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveFile {
    pub version: u32,
    pub body: serde_json::Value,
}

impl SaveFile {
    pub fn wrap<T: Serialize>(value: &T) -> Result<Self, SaveError> {
        Ok(Self {
            version: SAVE_VERSION,
            body: serde_json::to_value(value)?,
        })
    }

    /// Unwrap the body, rejecting envelopes from another format
    /// version.
    pub fn unwrap_body<T: DeserializeOwned>(self) -> Result<T, SaveError> {
        if self.version != SAVE_VERSION {
            return Err(SaveError::VersionMismatch {
                expected: SAVE_VERSION,
                found: self.version,
            });
        }
        Ok(serde_json::from_value(self.body)?)
    }

    pub fn to_string_pretty(&self) -> Result<String, SaveError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_str(s: &str) -> Result<Self, SaveError> {
        Ok(serde_json::from_str(s)?)
    }
}
