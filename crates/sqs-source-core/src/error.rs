//! Error types surfaced at the connector boundary.
//!
//! Only configuration and startup failures reach the caller. Failures inside
//! the poll loop are logged and never escalate.

use std::fmt;

#[derive(Debug)]
pub enum ConfigError {
    /// A required key is absent (or `null`).
    MissingField(&'static str),
    /// A key is present but carries an empty value.
    EmptyField(&'static str),
    /// The same queue name was configured twice.
    DuplicateQueue(String),
    /// The document could not be decoded as JSON or YAML.
    Parse(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MissingField(key) => write!(f, "missing required config key `{}`", key),
            ConfigError::EmptyField(key) => write!(f, "config key `{}` must not be empty", key),
            ConfigError::DuplicateQueue(name) => {
                write!(f, "queue `{}` is configured more than once", name)
            }
            ConfigError::Parse(msg) => write!(f, "failed to parse config document: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug)]
pub enum SourceError {
    Config(ConfigError),
    /// A configured queue name could not be turned into a queue URL.
    QueueResolution {
        queue_name: String,
        source: anyhow::Error,
    },
    /// The receiver was stopped and its client released; it cannot run again.
    ReceiverClosed,
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceError::Config(e) => write!(f, "invalid configuration: {}", e),
            SourceError::QueueResolution { queue_name, source } => {
                write!(f, "failed to resolve queue `{}`: {:#}", queue_name, source)
            }
            SourceError::ReceiverClosed => write!(f, "receiver has been stopped"),
        }
    }
}

impl std::error::Error for SourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SourceError::Config(e) => Some(e),
            SourceError::QueueResolution { source, .. } => Some(&**source),
            SourceError::ReceiverClosed => None,
        }
    }
}

impl From<ConfigError> for SourceError {
    fn from(e: ConfigError) -> Self {
        SourceError::Config(e)
    }
}
