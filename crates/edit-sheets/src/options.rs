//! Client configuration.
//!
//! Options are usually loaded from a JSON object using the service's
//! camelCase keys:
//!
//! ```json
//! {
//!   "username": "me@example.com",
//!   "password": "secret",
//!   "spreadsheetName": "Budget",
//!   "worksheetName": "Sheet1"
//! }
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::auth::{Credentials, OAuthCredentials};
use crate::error::{Result, SheetError};

/// Default host of the spreadsheet feeds.
pub const DEFAULT_HOST: &str = "spreadsheets.google.com";

/// Options for [`crate::create`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SheetOptions {
    pub username: Option<String>,
    pub password: Option<String>,
    pub oauth: Option<OAuthCredentials>,
    pub spreadsheet_id: Option<String>,
    pub spreadsheet_name: Option<String>,
    pub worksheet_id: Option<String>,
    pub worksheet_name: Option<String>,
    /// Use `https` for feed URLs. Default: true.
    #[serde(alias = "useHTTPS")]
    pub use_https: bool,
    /// Create the spreadsheet named `spreadsheetName` before opening it.
    pub spreadsheet_create: bool,
    /// Feed host. Default: [`DEFAULT_HOST`].
    pub host: String,
    /// Per-request timeout in seconds. Default: 30.
    pub timeout_secs: u64,
    /// Replacement batch templates.
    pub templates: Option<TemplateOptions>,
}

/// User-supplied batch templates; see [`crate::templates`] for the slots.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateOptions {
    pub body: Option<String>,
    pub entry: Option<String>,
}

/// How a spreadsheet or worksheet is identified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SheetRef {
    Id(String),
    Name(String),
}

impl Default for SheetOptions {
    fn default() -> Self {
        Self {
            username: None,
            password: None,
            oauth: None,
            spreadsheet_id: None,
            spreadsheet_name: None,
            worksheet_id: None,
            worksheet_name: None,
            use_https: true,
            spreadsheet_create: false,
            host: DEFAULT_HOST.to_string(),
            timeout_secs: 30,
            templates: None,
        }
    }
}

impl SheetOptions {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Check that credentials and both sheet identifiers are present.
    pub fn validate(&self) -> Result<()> {
        self.credentials()?;
        self.spreadsheet_ref()?;
        self.worksheet_ref()?;
        if self.host.trim().is_empty() {
            return Err(SheetError::Config("'host' must not be empty".into()));
        }
        if self.timeout_secs == 0 {
            return Err(SheetError::Config("'timeoutSecs' must be positive".into()));
        }
        Ok(())
    }

    /// OAuth credentials take precedence over username/password.
    pub fn credentials(&self) -> Result<Credentials> {
        if let Some(oauth) = &self.oauth {
            return Ok(Credentials::OAuth(oauth.clone()));
        }
        match (non_empty(&self.username), non_empty(&self.password)) {
            (Some(username), Some(password)) => Ok(Credentials::Password {
                username: username.to_string(),
                password: password.to_string(),
            }),
            _ => Err(SheetError::MissingAuth),
        }
    }

    pub fn spreadsheet_ref(&self) -> Result<SheetRef> {
        sheet_ref(&self.spreadsheet_id, &self.spreadsheet_name).ok_or(SheetError::MissingSpreadsheet)
    }

    pub fn worksheet_ref(&self) -> Result<SheetRef> {
        sheet_ref(&self.worksheet_id, &self.worksheet_name).ok_or(SheetError::MissingWorksheet)
    }

    pub fn scheme(&self) -> &'static str {
        if self.use_https {
            "https"
        } else {
            "http"
        }
    }

    /// `<scheme>://<host>/feeds`
    pub fn feed_root(&self) -> String {
        format!("{}://{}/feeds", self.scheme(), self.host.trim_end_matches('/'))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

fn sheet_ref(id: &Option<String>, name: &Option<String>) -> Option<SheetRef> {
    if let Some(id) = non_empty(id) {
        return Some(SheetRef::Id(id.to_string()));
    }
    non_empty(name).map(|name| SheetRef::Name(name.to_string()))
}
