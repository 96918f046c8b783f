//! Error types for pitch-cv.

use thiserror::Error;

use crate::params::ParameterId;

/// Errors raised on the control path. Audio processing itself never fails.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Invalid detector settings: {0}")]
    InvalidDetectorSettings(String),

    #[error("Parameter {0:?} is a read-only output")]
    ReadOnlyParameter(ParameterId),

    #[error("Unknown parameter index {0}")]
    UnknownParameter(u32),
}

pub type Result<T> = std::result::Result<T, Error>;
