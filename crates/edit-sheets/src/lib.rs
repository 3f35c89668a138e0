//! Client for the GData spreadsheet service.
//!
//! It authenticates, queues cell updates locally, sends them as one batch
//! request, and reads a worksheet's cells feed back into row/column maps.
//!
//! # Architecture
//!
//! ```text
//! create(options)
//!     └── Spreadsheet (this crate)
//!           ├── EntryBook (edit-sheets-core): queued cells + name table
//!           ├── Templates: batch XML rendering
//!           ├── feed / metadata: response parsing
//!           └── HttpTransport: one request at a time (reqwest by default)
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use edit_sheets::{SendOptions, SheetOptions};
//! use serde_json::json;
//!
//! # async fn example() -> edit_sheets::Result<()> {
//! let options = SheetOptions::from_path("sheet.json")?;
//! let mut sheet = edit_sheets::create(options).await?;
//!
//! sheet.add(&json!({
//!     "1": { "1": { "name": "price", "val": 12.5 }, "2": "={{ price }} * 2" },
//!     "3": [["a", "b"], ["c", "d"]],
//! }))?;
//! sheet.send(SendOptions { auto_size: true }).await?;
//!
//! let (rows, info) = sheet.receive().await?;
//! println!("{} rows, next free row {}", rows.len(), info.next_row);
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod documents;
pub mod error;
pub mod feed;
pub mod metadata;
pub mod options;
pub mod spreadsheet;
pub mod templates;
pub mod transport;

pub use edit_sheets_core::{CellAddress, CellInput, CellValue, EntryBook};

pub use auth::{AuthToken, Credentials, OAuthCredentials, Service};
pub use error::{Result, SheetError};
pub use feed::{Author, Rows, SheetInfo};
pub use metadata::{Metadata, MetadataUpdate};
pub use options::{SheetOptions, SheetRef, TemplateOptions};
pub use spreadsheet::{SendOptions, SendOutcome, Spreadsheet};
pub use templates::Templates;
pub use transport::{HttpRequest, HttpResponse, HttpTransport, Method, ReqwestTransport};

/// Validate `options`, authenticate and resolve the worksheet, using the
/// default HTTP transport.
pub async fn create(options: SheetOptions) -> Result<Spreadsheet> {
    options.validate()?;
    let transport = ReqwestTransport::new(options.timeout())?;
    create_with_transport(options, transport).await
}

/// Like [`create`], over a caller-provided transport.
pub async fn create_with_transport<T: HttpTransport>(
    options: SheetOptions,
    transport: T,
) -> Result<Spreadsheet<T>> {
    let mut sheet = Spreadsheet::new(options, transport)?;
    sheet.open().await?;
    Ok(sheet)
}
