use std::path::PathBuf;

use thiserror::Error;

/// Failures raised while reading a Doxyfile, resolving its output directory or
/// running the generate step.
#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration error: {message}")]
    Config { message: String },

    #[error("Doxyfile is incorrect. Included file '{reference}' doesn't exist (included from {})", .from.display())]
    IncludeResolution { reference: String, from: PathBuf },

    #[error("the tag GENERATE_HTML is not set to 'YES'; only HTML documentation can be published")]
    HtmlDisabled,

    #[error("the directory '{}' doesn't exist", .path.display())]
    DirectoryNotFound { path: PathBuf },

    #[error("interrupted: {reason}")]
    Interrupted { reason: String },

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("error occurred in Doxygen processing: rc = {code}")]
    ProcessFailed { code: i32 },
}

/// Fieldless discriminant of [`Error`], for callers that branch on the kind of
/// failure rather than its message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Config,
    IncludeResolution,
    HtmlDisabled,
    DirectoryNotFound,
    Interrupted,
    Io,
    ProcessFailed,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Config { .. } => ErrorKind::Config,
            Self::IncludeResolution { .. } => ErrorKind::IncludeResolution,
            Self::HtmlDisabled => ErrorKind::HtmlDisabled,
            Self::DirectoryNotFound { .. } => ErrorKind::DirectoryNotFound,
            Self::Interrupted { .. } => ErrorKind::Interrupted,
            Self::Io { .. } => ErrorKind::Io,
            Self::ProcessFailed { .. } => ErrorKind::ProcessFailed,
        }
    }

    pub(crate) fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Wrap an I/O failure on `path`, keeping host cancellation distinct.
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::Interrupted {
            return Self::Interrupted {
                reason: format!("{}: {source}", path.display()),
            };
        }
        Self::Io { path, source }
    }
}
