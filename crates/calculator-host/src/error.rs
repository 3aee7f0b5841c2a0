//! Host-side errors.

use std::path::PathBuf;

use calculator_core::error::{AppError, ErrorKind};
use thiserror::Error;

/// Errors raised while loading the plugin or calling into it.
#[derive(Debug, Error)]
pub enum HostError {
    /// A function call named no function.
    #[error("Function name must not be empty")]
    EmptyFunctionName,

    /// A function call carried more argument bytes than the ABI allows.
    #[error("Function arguments are {size} bytes, exceeding limit of {limit}")]
    ArgumentsTooLarge {
        /// Bytes supplied.
        size: usize,
        /// Maximum allowed bytes.
        limit: usize,
    },

    /// The plugin does not export the requested symbol.
    #[error("Plugin does not export '{symbol}'")]
    SymbolNotFound {
        /// The symbol that was looked up.
        symbol: String,
    },

    /// The shared library could not be opened or a symbol lookup failed.
    #[error("Failed to load plugin library '{path}': {source}")]
    LibraryLoad {
        /// Library path.
        path: PathBuf,
        /// Loader error.
        #[source]
        source: libloading::Error,
    },

    /// The plugin reports a different ABI version than this host speaks.
    #[error("Plugin ABI version {found} does not match host ABI version {expected}")]
    AbiMismatch {
        /// Version the host was built against.
        expected: u32,
        /// Version the plugin reported.
        found: u32,
    },

    /// A plugin export panicked.
    #[error("{symbol} failed: {message}")]
    OperationFailed {
        /// The export that panicked.
        symbol: String,
        /// The panic message.
        message: String,
    },
}

impl HostError {
    /// Category this error maps to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyFunctionName | Self::ArgumentsTooLarge { .. } => ErrorKind::InvalidArgument,
            Self::SymbolNotFound { .. } => ErrorKind::NotFound,
            Self::LibraryLoad { .. } | Self::AbiMismatch { .. } => ErrorKind::Plugin,
            Self::OperationFailed { .. } => ErrorKind::Arithmetic,
        }
    }
}

impl From<HostError> for AppError {
    fn from(err: HostError) -> Self {
        let kind = err.kind();
        let message = err.to_string();
        AppError::with_source(kind, message, err)
    }
}
