//! Registry error types.

use thiserror::Error;

pub type RegistryResult<T> = Result<T, RegistryError>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("metric {0} registered twice with different definitions")]
    Conflict(&'static str),

    #[error("metric {0} is not registered")]
    Unknown(&'static str),

    #[error("metric {name} expects {expected} label values, got {actual}")]
    LabelArity {
        name: &'static str,
        expected: usize,
        actual: usize,
    },
}
