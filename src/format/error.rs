//! Error types for region format operations.

use std::path::PathBuf;
use thiserror::Error;

use crate::format::handler::{OperationKind, TargetType};

/// Errors that can occur during region format operations.
#[derive(Error, Debug)]
pub enum RegionError {
    /// I/O error during file operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing or serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A handler is already registered under this key
    #[error("{operation} for {format} is already registered for {target}")]
    DuplicateRegistration {
        target: TargetType,
        operation: OperationKind,
        format: String,
    },

    /// No identify predicate accepted the input
    #[error(
        "Format could not be identified based on the file name or contents, \
         please provide a format argument.\n{formats}"
    )]
    FormatNotIdentified {
        target: TargetType,
        /// Rendered capability table for the target
        formats: String,
    },

    /// The format exists (or was named) but lacks this operation
    #[error("No {operation} handler defined for format \"{format}\" and target \"{target}\".\n{formats}")]
    UnregisteredHandler {
        target: TargetType,
        operation: OperationKind,
        format: String,
        /// Rendered capability table for the target
        formats: String,
    },

    /// Destination exists and overwriting was not requested
    #[error("{path:?} already exists")]
    AlreadyExists {
        /// The destination path
        path: PathBuf,
    },

    /// Sky region without any coordinate to take the frame from
    #[error("Unable to determine frame name for {region}")]
    UndeterminedFrame {
        /// Description of the region
        region: String,
    },

    /// A shape template placeholder had no rendered parameter
    #[error("Unable to get shape parameters for {region}: no value for '{placeholder}'")]
    MissingTemplateValue {
        /// Description of the region
        region: String,
        /// The unmatched placeholder name
        placeholder: String,
    },

    /// Marker code with no symbol in the target format
    #[error("No symbol for marker '{marker}' in format '{format}'")]
    UnknownMarker {
        /// The marker code
        marker: String,
        /// The target format
        format: String,
    },

    /// Malformed input text
    #[error("Parse error on line {line}: {message}")]
    Parse {
        /// 1-based line number
        line: usize,
        /// Description of the problem
        message: String,
    },

    /// Invalid document structure or content
    #[error("Invalid format: {message}")]
    InvalidFormat {
        /// Description of the format error
        message: String,
    },

    /// Version mismatch between expected and found
    #[error("Version mismatch: expected {expected}, found {found}")]
    VersionMismatch {
        /// Expected version string
        expected: String,
        /// Found version string
        found: String,
    },
}

impl RegionError {
    /// Create a parse error for a 1-based line number.
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            message: message.into(),
        }
    }

    /// Create an invalid format error with a message.
    pub fn invalid_format(message: impl Into<String>) -> Self {
        Self::InvalidFormat {
            message: message.into(),
        }
    }

    /// Create an already-exists error for a destination.
    pub fn already_exists(path: impl Into<PathBuf>) -> Self {
        Self::AlreadyExists { path: path.into() }
    }
}
