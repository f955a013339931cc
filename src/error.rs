//! Error type shared by the solver, the instance reader and the configuration loader.

use std::fmt;
use std::io;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong outside of the genetic operators themselves.
#[derive(Debug)]
pub enum Error {
    /// Reading or writing a file failed.
    Io(io::Error),
    /// The instance file is malformed.
    Parse { line: usize, message: String },
    /// A JSON configuration or report could not be (de)serialized.
    Json(serde_json::Error),
    /// A YAML configuration could not be read.
    Yaml(serde_yaml::Error),
    /// The configuration cannot be used, even after normalization.
    InvalidConfig(String),
    /// The final population contains no chromosome within the vehicle limit.
    NoLegalSolution { population_size: usize },
    /// The worker pool could not be created.
    ThreadPool(rayon::ThreadPoolBuildError),
}

impl Error {
    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        Error::Parse {
            line,
            message: message.into(),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(err) => write!(f, "i/o error: {}", err),
            Error::Parse { line, message } => {
                write!(f, "malformed instance at line {}: {}", line, message)
            }
            Error::Json(err) => write!(f, "json error: {}", err),
            Error::Yaml(err) => write!(f, "yaml error: {}", err),
            Error::InvalidConfig(message) => write!(f, "invalid configuration: {}", message),
            Error::NoLegalSolution { population_size } => write!(
                f,
                "none of the {} chromosomes respects the vehicle limit",
                population_size
            ),
            Error::ThreadPool(err) => write!(f, "cannot build worker pool: {}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::Json(err) => Some(err),
            Error::Yaml(err) => Some(err),
            Error::ThreadPool(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json(err)
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::Yaml(err)
    }
}

impl From<rayon::ThreadPoolBuildError> for Error {
    fn from(err: rayon::ThreadPoolBuildError) -> Self {
        Error::ThreadPool(err)
    }
}
