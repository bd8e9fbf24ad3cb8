//! `livecheck` - live spelling, grammar and prediction annotations
//!
//! An asynchronous annotation engine over a mutable text buffer: corrections
//! and completions are computed out of band, and every result is validated
//! against the document as it is when the result arrives.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use std::time::Instant;
//! use livecheck::{
//!     Dictionary, DocumentBuffer, Engine, EngineOptions, InlineExecutor, ProviderPolicy,
//!     ProviderService, TextHost, WordListBackend,
//! };
//!
//! let providers = ProviderService::new(ProviderPolicy::OfflineOnly)
//!     .with_local(Arc::new(WordListBackend::from_list("the 100\ncat 20")));
//! let mut engine = Engine::new(
//!     EngineOptions::default(),
//!     providers,
//!     Dictionary::in_memory(),
//!     InlineExecutor::new(),
//! );
//!
//! let mut doc = DocumentBuffer::new();
//! for edit in doc.type_text("Teh ") {
//!     engine.on_edit(&doc, &edit);
//! }
//! engine.poll(&mut doc, Instant::now());
//!
//! assert_eq!(doc.text(0, 4), "The ");
//! assert_eq!(doc.cursor(), 4);
//! ```

// Crate-level lint configuration
#![allow(clippy::cast_possible_truncation)] // Char offsets fit comfortably
#![allow(clippy::cast_precision_loss)] // Frequencies to float scores
#![allow(clippy::cast_possible_wrap)] // Length deltas
#![allow(clippy::module_name_repetitions)] // Allow annotation::AnnotationStore etc
#![allow(clippy::missing_errors_doc)] // Docs WIP
#![allow(clippy::missing_panics_doc)] // Docs WIP
#![allow(clippy::missing_const_for_fn)] // Many functions could be const, not critical
#![allow(clippy::doc_markdown)] // Allow technical names without backticks
#![allow(clippy::use_self)] // Allow explicit type names in impl blocks
#![allow(clippy::needless_pass_by_value)] // Allow pass by value for small Copy types
#![allow(clippy::inherent_to_string)] // to_string methods are convenient
#![allow(clippy::should_implement_trait)] // from_str naming is intentional
#![allow(clippy::collapsible_if)] // Sometimes nested ifs are clearer
#![allow(clippy::items_after_statements)] // Common pattern in tests

pub mod annotation;
pub mod applier;
pub mod boundary;
pub mod config;
pub mod coordinator;
pub mod dictionary;
pub mod engine;
pub mod error;
pub mod provider;
pub mod text;
pub mod unicode;

// Re-export core types at crate root
pub use annotation::{
    AnnotationId, AnnotationStore, CorrectionEntry, CorrectionKind, CorrectionSource,
    PredictionEntry,
};
pub use config::{EngineOptions, ProviderPolicy};
pub use engine::{Engine, EngineStats};
pub use error::{Error, Result};

// Re-export provider types
pub use provider::{
    Backend, CheckReason, CheckRequest, Completion, Correction, Domain, ProviderError,
    ProviderService, Suggestion, WordListBackend,
};

// Re-export commonly used types
pub use coordinator::{Executor, InlineExecutor, ThreadedExecutor};
pub use dictionary::{Dictionary, JsonFileStore, KeyValueStore, MemoryStore};
pub use text::{Bias, DocumentBuffer, Edit, ReplaceOptions, Selection, TextHost};
