// Error Handling
//
// *La Gestion des Erreurs* (The Error Management) - Error taxonomy of the LeRegard facade

use legraphe::{GraphError, VertexId};
use lelexique::IndexError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for LeRegard operations
pub type Result<T> = std::result::Result<T, LeRegardError>;

/// LeRegard error types
#[derive(Debug, Error)]
pub enum LeRegardError {
    /// A keyed lookup missed
    #[error("Not found: {id}")]
    NotFound {
        /// Missing vertex
        id: VertexId,
    },

    /// The graph store or text index could not answer
    #[error("Store unavailable: {message}")]
    StoreUnavailable {
        /// Underlying failure
        message: String,
    },

    /// A polygon or coordinate pair is malformed
    #[error("Invalid geometry: {message}")]
    InvalidGeometry {
        /// Offending geometry
        message: String,
    },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config {
        /// What is wrong
        message: String,

        /// How to fix it
        suggestion: Option<String>,
    },

    /// I/O errors with context
    #[error("I/O error: {context} (path: {path:?})")]
    Io {
        /// Operation that failed
        context: String,

        /// Path involved
        path: Option<PathBuf>,

        /// Source error
        #[source]
        source: std::io::Error,
    },

    /// A graph snapshot could not be read or written
    #[error("Snapshot error: {message}")]
    Snapshot {
        /// Underlying failure
        message: String,
    },

    /// A blocking query task panicked or was cancelled
    #[error("Query task failed: {message}")]
    Task {
        /// Join failure
        message: String,
    },
}

impl LeRegardError {
    /// Create a store-unavailable error
    pub fn store_unavailable(message: impl Into<String>) -> Self {
        LeRegardError::StoreUnavailable {
            message: message.into(),
        }
    }

    /// Create a configuration error with an optional suggestion
    pub fn config_error(message: impl Into<String>, suggestion: Option<String>) -> Self {
        LeRegardError::Config {
            message: message.into(),
            suggestion,
        }
    }

    /// Whether the caller can carry on after this error
    ///
    /// Missing vertices and bad geometry only affect one result.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            LeRegardError::NotFound { .. } | LeRegardError::InvalidGeometry { .. }
        )
    }

    /// Get a suggestion for fixing the error
    pub fn suggestion(&self) -> Option<String> {
        match self {
            LeRegardError::Config { suggestion, .. } => suggestion.clone(),
            LeRegardError::NotFound { id } => {
                Some(format!("Check that {} exists in the loaded snapshot.", id))
            }
            LeRegardError::StoreUnavailable { .. } => {
                Some("Reload the graph snapshot and retry the query.".to_string())
            }
            LeRegardError::Snapshot { .. } => Some(format!(
                "Pass --snapshot <FILE> or set {} to a valid snapshot.",
                crate::config::SNAPSHOT_ENV
            )),
            _ => None,
        }
    }
}

impl From<GraphError> for LeRegardError {
    fn from(error: GraphError) -> Self {
        match error {
            GraphError::NotFound(id) => LeRegardError::NotFound { id },
            GraphError::Snapshot(message) => LeRegardError::Snapshot { message },
            other => LeRegardError::store_unavailable(other.to_string()),
        }
    }
}

impl From<IndexError> for LeRegardError {
    fn from(error: IndexError) -> Self {
        match error {
            IndexError::Store(inner) => inner.into(),
            other => LeRegardError::store_unavailable(other.to_string()),
        }
    }
}

impl From<lerecherche::Error> for LeRegardError {
    fn from(error: lerecherche::Error) -> Self {
        match error {
            lerecherche::Error::Store(inner) => inner.into(),
            lerecherche::Error::Index(inner) => inner.into(),
        }
    }
}

impl From<ledecouverte::Error> for LeRegardError {
    fn from(error: ledecouverte::Error) -> Self {
        match error {
            ledecouverte::Error::Store(inner) => inner.into(),
        }
    }
}

impl From<ledecouverte::GeometryError> for LeRegardError {
    fn from(error: ledecouverte::GeometryError) -> Self {
        match error {
            ledecouverte::GeometryError::InvalidGeometry(message) => {
                LeRegardError::InvalidGeometry { message }
            }
        }
    }
}

impl From<levue::Error> for LeRegardError {
    fn from(error: levue::Error) -> Self {
        match error {
            levue::Error::Store(inner) => inner.into(),
        }
    }
}

impl From<tokio::task::JoinError> for LeRegardError {
    fn from(error: tokio::task::JoinError) -> Self {
        LeRegardError::Task {
            message: error.to_string(),
        }
    }
}

/// Format an error with its suggestion for terminal output
pub fn format_error(error: &LeRegardError) -> String {
    match error.suggestion() {
        Some(suggestion) => format!("Error: {}\n  Suggestion: {}", error, suggestion),
        None => format!("Error: {}", error),
    }
}
