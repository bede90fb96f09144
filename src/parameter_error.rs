//! Error handling for the configuration loader

use std::io;

use thiserror::Error;

/// Failure to build a topology from a configuration document.
#[derive(Error, Debug)]
pub enum ParameterError {
    #[error("IO Error: {0}")]
    IoError(#[from] io::Error),

    #[error("Parse Error: {0}")]
    ParseError(String),

    #[error("Missing Field: {0}")]
    MissingField(String),

    #[error("Invalid Length: expected {expected}, found {found}")]
    InvalidLength { expected: usize, found: usize },

    /// Present but not usable, e.g. a string where a number is expected.
    #[error("Invalid Value: {0}")]
    InvalidValue(String),

    #[error("Unknown kinematics: {0}")]
    UnknownKinematics(String),
}
