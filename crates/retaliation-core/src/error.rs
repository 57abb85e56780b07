//! Error types for the core crate.

use std::path::PathBuf;

use thiserror::Error;

use retaliation_models::DeviceSlot;
use retaliation_usb::DeviceError;

use crate::cancel::Cancelled;

/// Errors that can occur while executing a single command.
#[derive(Debug, Error)]
pub enum InterpretError {
    /// The launcher rejected a transfer.
    #[error(transparent)]
    Transfer(#[from] DeviceError),

    /// A wait was interrupted.
    #[error(transparent)]
    Cancelled(#[from] Cancelled),
}

/// Errors raised while loading the targeting table.
#[derive(Debug, Error)]
pub enum TargetError {
    /// The same identifier appears twice (compared case-insensitively).
    #[error("target '{key}' is defined twice ({first} and {second})")]
    DuplicateTarget {
        key: String,
        first: DeviceSlot,
        second: DeviceSlot,
    },

    /// The targets file could not be read.
    #[error("failed to read targets file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The targets file is not valid JSON.
    #[error("invalid targets file {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors in environment-provided configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required setting is not set.
    #[error("{0} is not set")]
    Missing(&'static str),

    /// The server URL does not parse.
    #[error("invalid URL '{value}' in {name}: {source}")]
    InvalidUrl {
        name: &'static str,
        value: String,
        #[source]
        source: url::ParseError,
    },

    /// A numeric setting does not parse.
    #[error("invalid number '{value}' in {name}")]
    InvalidNumber { name: &'static str, value: String },
}
