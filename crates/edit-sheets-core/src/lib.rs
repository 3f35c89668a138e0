//! # edit-sheets-core
//!
//! Core data structures for the edit-sheets client.
//!
//! This crate has no I/O. It provides:
//! - [`CellAddress`] - 1-based cell addressing and A1 formatting
//! - [`CellValue`] - the number/text values the service stores
//! - [`EntryBook`] - accumulation of pending cell updates with a name table
//! - [`reference`] - `{{name}}` / `{{r,c}}` placeholders and R1C1 translation
//!
//! ## Example
//!
//! ```rust
//! use edit_sheets_core::{CellInput, EntryBook};
//!
//! let mut book = EntryBook::new();
//! book.add_value(1, 1, CellInput::named("total", 42)).unwrap();
//! book.add_value(2, 1, CellInput::from("={{ total }} * 2")).unwrap();
//!
//! let batch = book.compile().unwrap();
//! assert_eq!(batch.entries[1].input, "=A1 * 2");
//! ```

pub mod address;
pub mod entry;
pub mod error;
pub mod reference;
pub mod value;

pub use address::CellAddress;
pub use entry::{CellEntry, CellInput, CompiledBatch, CompiledEntry, EntryBook};
pub use error::{Error, Result};
pub use reference::NameLookup;
pub use value::CellValue;

/// Maximum number of rows the service accepts in a worksheet
pub const MAX_ROWS: u32 = 1_048_576;

/// Maximum number of columns the service accepts in a worksheet
pub const MAX_COLS: u32 = 18_278;
