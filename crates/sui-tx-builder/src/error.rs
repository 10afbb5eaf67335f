//! Error types for the transaction builder.
//!
//! This module provides a unified error type [`SuiError`] that encompasses
//! every failure the codec, the builder and the resolution pipeline can
//! report.

use crate::types::SuiAddress;
use std::fmt;
use thiserror::Error;

/// A specialized Result type for transaction builder operations.
pub type SuiResult<T> = Result<T, SuiError>;

/// The main error type for the transaction builder.
#[derive(Error, Debug)]
pub enum SuiError {
    /// Bytes could not be decoded, or a value does not fit its shape
    #[error("Malformed encoding: {0}")]
    MalformedEncoding(String),

    /// A field required for the final encoding was never set
    #[error("Missing required field: {0}")]
    MissingRequiredField(String),

    /// More gas payment objects than the protocol allows
    #[error("Too many gas objects: {count} provided, at most {max} allowed")]
    TooManyGasObjects {
        /// Number of payment objects that were provided
        count: usize,
        /// Maximum number of payment objects
        max: usize,
    },

    /// The gas owner has no coins left after excluding transaction inputs
    #[error("No valid gas coins found for {owner}")]
    NoGasCoins {
        /// The address whose coins were searched
        owner: SuiAddress,
    },

    /// A move call supplies a different number of arguments than its signature
    #[error("Incorrect number of arguments for {function}: expected {expected}, got {provided}")]
    ArgumentCountMismatch {
        /// Fully qualified function name
        function: String,
        /// Parameters in the normalized signature (without the context parameter)
        expected: usize,
        /// Arguments passed in the command
        provided: usize,
    },

    /// An object referenced by the transaction could not be resolved
    #[error("Unresolvable object {object_id}: {reason}")]
    UnresolvableObject {
        /// The object that could not be resolved
        object_id: SuiAddress,
        /// Why the object could not be used
        reason: String,
    },

    /// No pure encoding can be determined for an argument
    #[error("Unknown argument type: {0}")]
    UnknownArgumentType(String),

    /// A type name is not registered, or its aliases never reach a shape
    #[error("Unknown type: {0}")]
    UnknownType(String),

    /// Invalid address or object id
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Invalid type tag format
    #[error("Invalid type tag: {0}")]
    InvalidTypeTag(String),

    /// Invalid object digest
    #[error("Invalid digest: {0}")]
    InvalidDigest(String),

    /// A serialized builder snapshot could not be restored
    #[error("Invalid snapshot: {0}")]
    InvalidSnapshot(String),

    /// Error occurred during BCS serialization/deserialization
    #[error("BCS error: {0}")]
    Bcs(String),

    /// Error occurred during JSON serialization/deserialization
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error occurred during hex encoding/decoding
    #[error("Hex error: {0}")]
    Hex(#[from] hex::FromHexError),

    /// Error occurred during base64 decoding
    #[error("Base64 error: {0}")]
    Base64(#[from] base64::DecodeError),

    /// Transaction building error
    #[error("Transaction error: {0}")]
    Transaction(String),

    /// The dry run used for budget estimation reported a failure
    #[error("Dry run failed: {message}")]
    DryRunFailed {
        /// The execution error reported by the dry run
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error reported by an external resolver or executor
    #[error("Resolver error: {0}")]
    Resolver(#[from] anyhow::Error),
}

impl SuiError {
    /// Creates a new BCS error
    pub fn bcs<E: fmt::Display>(err: E) -> Self {
        Self::Bcs(err.to_string())
    }

    /// Creates a new malformed encoding error
    pub fn malformed<S: Into<String>>(msg: S) -> Self {
        Self::MalformedEncoding(msg.into())
    }

    /// Creates a new missing field error
    pub fn missing<S: Into<String>>(field: S) -> Self {
        Self::MissingRequiredField(field.into())
    }

    /// Creates a new transaction error
    pub fn transaction<S: Into<String>>(msg: S) -> Self {
        Self::Transaction(msg.into())
    }

    /// Creates a new unresolvable object error
    pub fn unresolvable(object_id: SuiAddress, reason: impl Into<String>) -> Self {
        Self::UnresolvableObject {
            object_id,
            reason: reason.into(),
        }
    }

    /// Returns true if this error came from encoding or decoding bytes
    pub fn is_codec_error(&self) -> bool {
        matches!(
            self,
            Self::MalformedEncoding(_) | Self::UnknownType(_) | Self::Bcs(_)
        )
    }

    /// Returns true if a required field was absent at build time
    pub fn is_missing_field(&self) -> bool {
        matches!(self, Self::MissingRequiredField(_))
    }

    /// Returns true if this error was raised while resolving against ledger state
    pub fn is_resolution_error(&self) -> bool {
        matches!(
            self,
            Self::NoGasCoins { .. }
                | Self::ArgumentCountMismatch { .. }
                | Self::UnresolvableObject { .. }
                | Self::UnknownArgumentType(_)
                | Self::DryRunFailed { .. }
                | Self::Resolver(_)
        )
    }

    /// Returns the error message suitable for display to end users.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::MalformedEncoding(_) | Self::Bcs(_) => "Failed to process transaction bytes",
            Self::MissingRequiredField(_) => "Transaction is incomplete",
            Self::TooManyGasObjects { .. } => "Too many gas payment objects",
            Self::NoGasCoins { .. } => "No gas coins available",
            Self::ArgumentCountMismatch { .. } => "Wrong number of arguments",
            Self::UnresolvableObject { .. } => "Object not found",
            Self::UnknownArgumentType(_) => "Unsupported argument type",
            Self::UnknownType(_) => "Unknown type",
            Self::InvalidAddress(_) => "Invalid address",
            Self::InvalidTypeTag(_) => "Invalid type format",
            Self::InvalidDigest(_) => "Invalid digest",
            Self::InvalidSnapshot(_) => "Invalid transaction snapshot",
            Self::Json(_) => "Failed to process JSON",
            Self::Hex(_) => "Invalid hex format",
            Self::Base64(_) => "Invalid base64 format",
            Self::Transaction(_) => "Transaction error",
            Self::DryRunFailed { .. } => "Transaction dry run failed",
            Self::Config(_) => "Configuration error",
            Self::Resolver(_) => "Failed to query ledger state",
        }
    }
}
