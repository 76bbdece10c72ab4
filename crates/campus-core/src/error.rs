//! Error types for campus operations.
//!
//! This module defines [`CampusError`], the application-level error enum used
//! by the host binary, the configuration loader, and the terminal UI. Page
//! interaction itself never produces a `CampusError`: a missing widget library
//! or DOM target degrades the page instead of failing it.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using [`CampusError`].
pub type Result<T> = std::result::Result<T, CampusError>;

/// Application-level error type.
#[derive(Debug, Error)]
pub enum CampusError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Configuration file not found
    #[error("Configuration not found at {path}")]
    ConfigNotFound {
        path: PathBuf,
        #[source]
        source: Option<std::io::Error>,
    },

    /// Configuration file is invalid YAML
    #[error("Invalid configuration at {path}: {message}")]
    ConfigInvalid { path: PathBuf, message: String },

    /// Configuration validation failed
    #[error("Configuration validation failed: {message}")]
    ConfigValidation { message: String },

    // =========================================================================
    // I/O Errors
    // =========================================================================
    /// Generic I/O error with context
    #[error("I/O error {operation}: {path}")]
    Io {
        operation: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Directory creation failed
    #[error("Failed to create directory: {path}")]
    DirectoryCreation {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // =========================================================================
    // Page Errors
    // =========================================================================
    /// Page description could not be parsed
    #[error("Invalid page {path}: {message}")]
    PageInvalid { path: PathBuf, message: String },

    /// The form controller rejected its configuration
    #[error("Form controller setup failed: {message}")]
    ControllerSetup { message: String },

    // =========================================================================
    // TUI Errors
    // =========================================================================
    /// Terminal initialization failed
    #[error("Terminal initialization failed: {message}")]
    TerminalInit { message: String },

    /// Terminal restore failed
    #[error("Failed to restore terminal: {message}")]
    TerminalRestore { message: String },

    // =========================================================================
    // Internal Errors
    // =========================================================================
    /// Internal error (bug in campus)
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl CampusError {
    /// Create a ConfigNotFound error
    pub fn config_not_found(path: impl Into<PathBuf>) -> Self {
        Self::ConfigNotFound {
            path: path.into(),
            source: None,
        }
    }

    /// Create a ConfigNotFound error with source
    pub fn config_not_found_with_source(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ConfigNotFound {
            path: path.into(),
            source: Some(source),
        }
    }

    /// Create an I/O error
    pub fn io(operation: impl Into<String>, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            operation: operation.into(),
            path: path.into(),
            source,
        }
    }

    /// Create a PageInvalid error
    pub fn page_invalid(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::PageInvalid {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a controller setup error
    pub fn controller_setup(message: impl Into<String>) -> Self {
        Self::ControllerSetup {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns true if this is a configuration error
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::ConfigNotFound { .. } | Self::ConfigInvalid { .. } | Self::ConfigValidation { .. }
        )
    }

    /// Returns actionable guidance for the user
    pub fn guidance(&self) -> Option<&'static str> {
        match self {
            Self::ConfigNotFound { .. } => {
                Some("Pass --config with an existing file, or omit it to use defaults")
            }
            Self::ConfigInvalid { .. } => Some("Check YAML syntax in the forms configuration"),
            Self::ConfigValidation { .. } => {
                Some("Fix the reported field in the forms configuration")
            }
            Self::PageInvalid { .. } => Some("Check the page file against the page format"),
            Self::ControllerSetup { .. } => Some("A marker selector in the configuration is malformed"),
            Self::TerminalInit { .. } => Some("Try running in a different terminal, or use --check"),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_not_found_error() {
        let err = CampusError::config_not_found("/home/user/.campus/forms.yaml");
        assert!(err.to_string().contains("Configuration not found"));
        assert!(err.is_config_error());
        assert!(err.guidance().is_some());
    }

    #[test]
    fn test_page_invalid_error() {
        let err = CampusError::page_invalid("admission.yaml", "missing field `tag`");
        assert!(err.to_string().contains("admission.yaml"));
        assert!(err.to_string().contains("missing field"));
        assert!(!err.is_config_error());
    }
}
