use std::fmt;

use crate::model::Side;

#[derive(Debug)]
pub enum ReconError {
    /// The same id appears twice within one input collection. Ambiguous
    /// identity would undermine the consumed-at-most-once invariant, so
    /// the run fails instead of guessing.
    DuplicateId { side: Side, id: String },
    /// A mapped column is absent from the input header row.
    MissingColumn { side: Side, column: String },
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (unknown phase, bad column mapping, etc.).
    ConfigValidation(String),
    /// IO error (file read, CSV decode, etc.).
    Io(String),
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateId { side, id } => {
                write!(f, "duplicate {side} record id: '{id}'")
            }
            Self::MissingColumn { side, column } => {
                write!(f, "{side} input: missing column '{column}'")
            }
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::Io(msg) => write!(f, "IO error: {msg}"),
        }
    }
}

impl std::error::Error for ReconError {}
