//! Error types for the spreadsheet client.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SheetError {
    #[error("Missing authentication information")]
    MissingAuth,

    #[error("Missing 'spreadsheetId' or 'spreadsheetName'")]
    MissingSpreadsheet,

    #[error("Missing 'worksheetId' or 'worksheetName'")]
    MissingWorksheet,

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("No authorization token. Use auth() first.")]
    NoToken,

    #[error("Spreadsheet and worksheet ids are not resolved. Use init() first.")]
    NotInitialized,

    #[error("Authentication failed ({status}): {body}")]
    AuthFailed { status: u16, body: String },

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    #[error("Unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("JSON Parse Error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Error Updating Spreadsheet")]
    BatchFailed { response: String },

    #[error("Error Reading Spreadsheet")]
    ReadFailed { response: String },

    #[error("The {kind} '{name}' was not found")]
    SheetNotFound { kind: &'static str, name: String },

    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    #[error(transparent)]
    Cells(#[from] edit_sheets_core::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for SheetError {
    fn from(e: reqwest::Error) -> Self {
        SheetError::Http(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SheetError>;
