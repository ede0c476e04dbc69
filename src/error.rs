use std::path::PathBuf;

/// Result type alias for the documentation engine
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the documentation engine
#[derive(Debug)]
pub enum Error {
    IoError(std::io::Error),
    ParseError { file: PathBuf, message: String },
    InvalidArgument(String),
    InvalidRoute(String),
    /// A handler identifier names a type or method that does not exist in the
    /// indexed sources. Fatal for the whole run.
    HandlerResolution { handler: String, reason: String },
    /// Whatever the application kernel returned while serving a simulated request.
    Simulation(anyhow::Error),
    SerializationError(String),
}

impl Error {
    pub(crate) fn handler_resolution(handler: &str, reason: impl Into<String>) -> Self {
        Error::HandlerResolution {
            handler: handler.to_string(),
            reason: reason.into(),
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::IoError(e) => write!(f, "IO error: {}", e),
            Error::ParseError { file, message } => {
                write!(f, "Parse error in {}: {}", file.display(), message)
            }
            Error::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            Error::InvalidRoute(msg) => write!(f, "Invalid route: {}", msg),
            Error::HandlerResolution { handler, reason } => {
                write!(f, "Cannot resolve handler {}: {}", handler, reason)
            }
            Error::Simulation(e) => write!(f, "Simulated request failed: {:#}", e),
            Error::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::IoError(e) => Some(e),
            Error::Simulation(e) => Some(&**e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::IoError(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::SerializationError(format!("JSON serialization error: {}", err))
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::SerializationError(format!("YAML serialization error: {}", err))
    }
}
