//! # Centralized Error Handling
//!
//! Unified error types for the entire crate using `thiserror`.
//!
//! Region-seek failures are intentionally absent: an unrecognized contig or a
//! malformed region string is non-fatal and is reported by
//! [`crate::io::vcf::VcfIndexedReader::seek`] as `false` instead of an error.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for strnovo operations
#[derive(Error, Debug)]
pub enum StrNovoError {
    /// I/O errors (read/write failures, permission denied)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failure to open a VCF or its positional index
    #[error("Failed to open {path}: {message}")]
    Open { path: PathBuf, message: String },

    /// Structurally invalid VCF record
    #[error("Malformed record: {message}")]
    MalformedRecord { message: String },

    /// Requested INFO/FORMAT field absent or of the wrong shape
    #[error("Field {field}: {message}")]
    MissingField { field: String, message: String },

    /// Invalid raw or length-rank allele index
    #[error("Index {index} out of range (limit {limit})")]
    IndexOutOfRange { index: usize, limit: usize },

    /// Configuration errors (invalid CLI arguments, missing inputs)
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Pedigree file errors (unparseable rows, unknown family)
    #[error("Pedigree error: {message}")]
    Pedigree { message: String },
}

/// Type alias for Results using StrNovoError
pub type Result<T> = std::result::Result<T, StrNovoError>;

impl StrNovoError {
    /// Create an open error for a path
    pub fn open(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self::Open {
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// Create a malformed-record error
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedRecord {
            message: message.into(),
        }
    }

    /// Create a missing-field error
    pub fn missing_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create an out-of-range index error
    pub fn index_out_of_range(index: usize, limit: usize) -> Self {
        Self::IndexOutOfRange { index, limit }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a pedigree error
    pub fn pedigree(message: impl Into<String>) -> Self {
        Self::Pedigree {
            message: message.into(),
        }
    }
}
