use thiserror::Error;

/// Result type for treeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for treeline operations
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed path, e.g. `..` climbing past the root
    #[error("Invalid path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    /// Contract violation by the caller
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Query string not valid for the language, or the language is unknown
    #[error("Query syntax error ({language}): {message}")]
    QuerySyntax { language: String, message: String },

    /// Failure reported by the backing store or a query executor
    #[error("Resolution failed: {context}: {source}")]
    Resolution {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Configuration related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O related errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Any other error
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Creates an invalid path error
    pub fn invalid_path(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPath {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Creates an invalid argument error
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Creates a query syntax error
    pub fn query_syntax(language: impl Into<String>, message: impl Into<String>) -> Self {
        Self::QuerySyntax {
            language: language.into(),
            message: message.into(),
        }
    }

    /// Creates a resolution error from a plain message
    pub fn resolution(context: impl Into<String>, message: impl Into<String>) -> Self {
        let message: String = message.into();
        Self::Resolution {
            context: context.into(),
            source: message.into(),
        }
    }

    /// Wraps a backing failure as a resolution error
    pub fn with_context<E>(context: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Resolution {
            context: context.into(),
            source: Box::new(source),
        }
    }

    /// Creates a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether the failure was caused by the caller rather than the backend.
    ///
    /// Front-ends use this to pick a client-fault (4xx) or server-fault (5xx)
    /// style response.
    pub fn is_client_fault(&self) -> bool {
        matches!(
            self,
            Self::InvalidPath { .. } | Self::InvalidArgument(_) | Self::QuerySyntax { .. }
        )
    }
}

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Wrap the error as a resolution failure with context
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::with_context(context, e))
    }
}
