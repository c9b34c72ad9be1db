//! # Jotter Editor
//!
//! Document model for Jotter notes with custom decorator nodes (images,
//! tags, file attachments).
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ registry: node type tag → handlers          │
//! │  - factory, JSON import/export              │
//! │  - priority-ordered DOM import, DOM export  │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ document: arena tree of NodeKey → node      │
//! │  - load/save versioned JSON records         │
//! │  - HTML import/export                       │
//! │  - edits only through a Transaction         │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ session: command interface for the UI       │
//! │  - insertion protocol, selection state      │
//! │  - undo/redo snapshots, deferred updates    │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Closed node set**: decorators are one enum, matched exhaustively
//! 2. **Persisted shape is the contract**: `{type, version, ...attributes}`
//! 3. **Recover, don't crash**: unknown types load as unknown attachments
//! 4. **UI state is not document state**: selection never enters history
//!
//! ## Usage
//!
//! ```rust,ignore
//! use jotter_editor::{Document, EditingSession, InsertContext, Registry};
//! use jotter_editor::nodes::{Dimension, ImageNode};
//! use std::sync::Arc;
//!
//! let registry = Arc::new(Registry::with_builtin_nodes());
//! let document = Document::from_json(&saved, &registry)?;
//! let mut session = EditingSession::new("main", document, registry);
//!
//! let key = session.insert_node(
//!     || ImageNode::new("https://x/y.png", "cat").into(),
//!     InsertContext::append(),
//! )?;
//! session.set_selected(key, true)?;
//! session.set_width_and_height(key, Dimension::px(300), Dimension::Inherit)?;
//!
//! let saved = session.document().to_json()?;
//! ```

pub mod codec;
mod document;
pub mod dom;
mod errors;
pub mod import;
mod insertion;
mod interaction;
mod key;
mod loader;
pub mod nodes;
pub mod registry;
mod session;
mod transaction;
mod undo_stack;

pub use codec::SerializedNode;
pub use document::{Document, NodeKind, TreeNode};
pub use dom::HtmlOptions;
pub use errors::{EditorError, EditorResult};
pub use insertion::{InsertContext, InsertTarget, PlacementPolicy};
pub use interaction::{InteractionFlags, InteractionState};
pub use key::NodeKey;
pub use loader::{load_note, load_note_file, NoteLoad};
pub use nodes::{DecoratorNode, NodeTypeTag};
pub use registry::Registry;
pub use session::{EditingSession, SessionOptions};
pub use transaction::Transaction;
pub use undo_stack::{HistoryEntry, UndoStack};
