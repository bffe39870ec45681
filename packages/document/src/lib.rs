//! # Quire Document
//!
//! In-memory block tree for the editor: the block model, the arena-backed
//! [`Document`] with O(1) lookup, its structural mutations, and the
//! validation pipeline that turns untrusted JSON into a tree.
//!
//! Canonical JSON (`Document::to_json`) is the snapshot format used by the
//! history log and by persistence, so its byte layout is stable.

mod block;
mod document;
mod error;
mod mutations;
mod validate;

pub use block::{
    Block, BlockKind, BlockType, CalloutData, CodeData, DividerData, DocumentRoot, HeadingData,
    HeadingLevel, KindData, TextData, TodoData, ToggleData, ROOT_ID,
};
pub use document::{BlockRef, Document, SwapSource};
pub use error::DocumentError;
pub use mutations::{ChildrenStrategy, MoveStrategy};
pub use validate::{document_from_value, parse_document};

pub type Result<T> = std::result::Result<T, DocumentError>;
