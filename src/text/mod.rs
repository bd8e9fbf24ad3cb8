//! The live document: edits, position mapping and the host interface.
//!
//! Key types:
//!
//! - [`Edit`]: one replacement, with [`Edit::map`] for carrying positions
//! - [`TextHost`]: what the engine needs from an editor surface
//! - [`DocumentBuffer`]: rope-backed reference host with undo/redo
//!
//! # Examples
//!
//! ```
//! use livecheck::text::{DocumentBuffer, TextHost};
//!
//! let mut doc = DocumentBuffer::new();
//! let edits = doc.type_text("Hi there");
//! assert_eq!(edits.len(), 8);
//! assert_eq!(doc.text(3, 8), "there");
//! assert_eq!(doc.cursor(), 8);
//! ```

mod document;
mod edit;
mod host;
mod rope;

pub use document::DocumentBuffer;
pub use edit::{Bias, Edit};
pub use host::{ReplaceOptions, Selection, TextHost};
pub use rope::RopeWrapper;
