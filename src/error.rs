//! Error types for livecheck.

use std::fmt;
use std::io;

use crate::annotation::AnnotationId;
use crate::provider::ProviderError;

/// Result type alias for livecheck operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for livecheck operations.
///
/// None of these are fatal to editing: the engine degrades to "no
/// suggestion offered" and only surfaces errors from calls the host made
/// explicitly.
#[derive(Debug)]
pub enum Error {
    /// I/O error from the persistence layer.
    Io(io::Error),
    /// Malformed JSON (options or persisted dictionary).
    Json(serde_json::Error),
    /// A provider could not produce a result.
    Provider(ProviderError),
    /// No annotation with this id is currently live.
    UnknownAnnotation(AnnotationId),
    /// A range is inverted or outside the document.
    InvalidRange { from: usize, to: usize, len: usize },
    /// The annotation was never applied, so there is nothing to revert.
    NotApplied(AnnotationId),
    /// The document no longer holds the annotated text.
    TextChanged(AnnotationId),
    /// There is no prediction to accept.
    NoPrediction,
    /// The engine has been torn down.
    EngineDestroyed,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Json(e) => write!(f, "invalid JSON: {e}"),
            Self::Provider(e) => write!(f, "provider error: {e}"),
            Self::UnknownAnnotation(id) => write!(f, "unknown annotation {id}"),
            Self::InvalidRange { from, to, len } => {
                write!(
                    f,
                    "range {from}..{to} is invalid for a document of {len} chars"
                )
            }
            Self::NotApplied(id) => write!(f, "annotation {id} was not applied"),
            Self::TextChanged(id) => write!(f, "text under annotation {id} has changed"),
            Self::NoPrediction => write!(f, "no active prediction"),
            Self::EngineDestroyed => write!(f, "engine has been destroyed"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Json(e) => Some(e),
            Self::Provider(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

impl From<ProviderError> for Error {
    fn from(e: ProviderError) -> Self {
        Self::Provider(e)
    }
}
