//! Definition of errors.

use std::error::Error;
use std::fmt;

pub type Result<T, E = CategorizerError> = std::result::Result<T, E>;

#[derive(Debug)]
pub enum CategorizerError {
    InvalidModel(InvalidModelError),
    InvalidArgument(InvalidArgumentError),
    FormatMismatch(FormatMismatchError),
    DecodeError(bincode::error::DecodeError),
    EncodeError(bincode::error::EncodeError),
    IOError(std::io::Error),
}

impl CategorizerError {
    pub(crate) fn invalid_model<S>(msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::InvalidModel(InvalidModelError { msg: msg.into() })
    }

    pub(crate) fn invalid_argument<S>(arg: &'static str, msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::InvalidArgument(InvalidArgumentError {
            arg,
            msg: msg.into(),
        })
    }

    pub(crate) fn format_mismatch<S>(expected: &'static str, found: S) -> Self
    where
        S: Into<String>,
    {
        Self::FormatMismatch(FormatMismatchError {
            expected,
            found: found.into(),
        })
    }
}

impl fmt::Display for CategorizerError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::InvalidModel(e) => e.fmt(f),
            Self::InvalidArgument(e) => e.fmt(f),
            Self::FormatMismatch(e) => e.fmt(f),
            Self::DecodeError(e) => e.fmt(f),
            Self::EncodeError(e) => e.fmt(f),
            Self::IOError(e) => e.fmt(f),
        }
    }
}

impl Error for CategorizerError {}

/// Error used when the model is invalid.
#[derive(Debug)]
pub struct InvalidModelError {
    /// Error message.
    pub(crate) msg: String,
}

impl fmt::Display for InvalidModelError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "InvalidModelError: {}", self.msg)
    }
}

impl Error for InvalidModelError {}

/// Error used when the argument is invalid.
#[derive(Debug)]
pub struct InvalidArgumentError {
    /// Name of the argument.
    pub(crate) arg: &'static str,

    /// Error message.
    pub(crate) msg: String,
}

impl fmt::Display for InvalidArgumentError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "InvalidArgumentError: {}: {}", self.arg, self.msg)
    }
}

impl Error for InvalidArgumentError {}

/// Error used when a stored artifact carries an unexpected format tag.
#[derive(Debug)]
pub struct FormatMismatchError {
    /// The tag this reader accepts.
    pub(crate) expected: &'static str,

    /// The tag found at the head of the stream.
    pub(crate) found: String,
}

impl FormatMismatchError {
    /// Gets the tag found in the artifact.
    pub fn found(&self) -> &str {
        &self.found
    }
}

impl fmt::Display for FormatMismatchError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "FormatMismatchError: this file does not contain a {}. Contained: {}",
            self.expected, self.found
        )
    }
}

impl Error for FormatMismatchError {}

impl From<bincode::error::DecodeError> for CategorizerError {
    fn from(error: bincode::error::DecodeError) -> Self {
        Self::DecodeError(error)
    }
}

impl From<bincode::error::EncodeError> for CategorizerError {
    fn from(error: bincode::error::EncodeError) -> Self {
        Self::EncodeError(error)
    }
}

impl From<std::io::Error> for CategorizerError {
    fn from(error: std::io::Error) -> Self {
        Self::IOError(error)
    }
}
