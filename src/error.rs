use std::io;
use std::string::FromUtf8Error;

/// The error type for throughput sampling operations.
///
/// Only the I/O seams (route queries, statistics sources, settings parsing and
/// scheduler start-up) return this type. A sampling cycle never does.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// I/O error occurred while reading a system resource
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Failed to parse UTF-8 output of an external command
    #[error("UTF-8 parse error: {0}")]
    Utf8Parse(#[from] FromUtf8Error),

    /// External command exited unsuccessfully
    #[error("Command '{command}' failed with code {code}")]
    CommandFailed { command: String, code: i32 },

    /// Failed to access system file or resource
    #[error("Failed to access {resource}: {reason}")]
    ResourceAccess { resource: String, reason: String },

    /// Invalid data format encountered
    #[error("Invalid data format in {0}: {1}")]
    InvalidFormat(String, String),

    /// Network interface not found in the statistics table
    #[error("Network interface '{name}' not found")]
    InterfaceNotFound { name: String },

    /// Setting value rejected
    #[error("Configuration error: {details}")]
    ConfigError { details: String },
}

impl Error {
    /// Create a new command failure error
    pub fn command_failed(command: impl Into<String>, code: i32) -> Self {
        Self::CommandFailed {
            command: command.into(),
            code,
        }
    }

    /// Create a new resource access error
    pub fn resource_access(resource: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ResourceAccess {
            resource: resource.into(),
            reason: reason.into(),
        }
    }

    /// Create a new invalid format error
    pub fn invalid_format(source: impl Into<String>, details: impl Into<String>) -> Self {
        Self::InvalidFormat(source.into(), details.into())
    }

    /// Create a new interface not found error
    pub fn interface_not_found(name: impl Into<String>) -> Self {
        Self::InterfaceNotFound { name: name.into() }
    }

    /// Create a new configuration error
    pub fn config_error(details: impl Into<String>) -> Self {
        Self::ConfigError {
            details: details.into(),
        }
    }
}

/// A specialized `Result` type for throughput sampling operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = Error::command_failed("ip route get 1", 2);
        assert_eq!(err.to_string(), "Command 'ip route get 1' failed with code 2");

        let err = Error::interface_not_found("eth9");
        assert_eq!(err.to_string(), "Network interface 'eth9' not found");

        let err = Error::config_error("update-interval must be positive");
        assert_eq!(
            err.to_string(),
            "Configuration error: update-interval must be positive"
        );
    }

    #[test]
    fn test_from_io_error() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "ip: not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
        assert_eq!(err.to_string(), "I/O error: ip: not found");
    }
}
