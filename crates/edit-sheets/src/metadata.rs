//! Worksheet metadata: title, last update and dimensions.

use chrono::{DateTime, Utc};
use quick_xml::escape::escape;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SheetError};
use crate::feed::{self, AtomEntry, Text};
use crate::transport::{HttpRequest, HttpTransport};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    pub title: String,
    pub updated: Option<DateTime<Utc>>,
    pub row_count: u32,
    pub col_count: u32,
}

/// A partial change; unset fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataUpdate {
    pub title: Option<String>,
    pub row_count: Option<u32>,
    pub col_count: Option<u32>,
}

impl MetadataUpdate {
    pub fn resize(row_count: u32, col_count: u32) -> Self {
        Self {
            title: None,
            row_count: Some(row_count),
            col_count: Some(col_count),
        }
    }

    fn is_complete(&self) -> bool {
        self.title.is_some() && self.row_count.is_some() && self.col_count.is_some()
    }

    fn apply_to(self, current: Option<&Metadata>) -> Metadata {
        Metadata {
            title: self
                .title
                .or_else(|| current.map(|m| m.title.clone()))
                .unwrap_or_default(),
            updated: current.and_then(|m| m.updated),
            row_count: self.row_count.or(current.map(|m| m.row_count)).unwrap_or(0),
            col_count: self.col_count.or(current.map(|m| m.col_count)).unwrap_or(0),
        }
    }
}

impl Metadata {
    fn from_atom(entry: AtomEntry) -> Result<Self> {
        let count = |value: Option<String>, what: &str| {
            value
                .ok_or_else(|| SheetError::UnexpectedResponse(format!("entry has no {}", what)))
                .and_then(|v| feed::parse_count(&v, what))
        };
        Ok(Self {
            row_count: count(entry.row_count, "rowCount")?,
            col_count: count(entry.col_count, "colCount")?,
            title: entry.title.unwrap_or_default(),
            updated: entry.updated.as_deref().and_then(feed::parse_timestamp),
        })
    }

    /// Atom entry body for a PUT to the worksheet entry.
    pub fn to_entry_xml(&self) -> String {
        format!(
            concat!(
                "<entry xmlns=\"http://www.w3.org/2005/Atom\"\n",
                "  xmlns:gs=\"http://schemas.google.com/spreadsheets/2006\">\n",
                "  <title type=\"text\">{}</title>\n",
                "  <gs:rowCount>{}</gs:rowCount>\n",
                "  <gs:colCount>{}</gs:colCount>\n",
                "</entry>\n"
            ),
            escape(self.title.as_str()),
            self.row_count,
            self.col_count
        )
    }
}

#[derive(Debug, Deserialize)]
struct WorksheetDocument {
    entry: Option<WorksheetEntry>,
}

#[derive(Debug, Deserialize)]
struct WorksheetEntry {
    #[serde(default)]
    title: Text,
    updated: Option<Text>,
    #[serde(rename = "gs$rowCount")]
    row_count: Text,
    #[serde(rename = "gs$colCount")]
    col_count: Text,
}

/// Parse the JSON form of a worksheet entry.
pub fn parse_worksheet_entry(body: &str) -> Result<Metadata> {
    let document: WorksheetDocument = serde_json::from_str(body)?;
    let entry = document
        .entry
        .ok_or_else(|| SheetError::UnexpectedResponse("worksheet response has no entry".into()))?;

    Ok(Metadata {
        title: entry.title.t,
        updated: entry.updated.as_ref().and_then(|t| feed::parse_timestamp(&t.t)),
        row_count: feed::parse_count(&entry.row_count.t, "rowCount")?,
        col_count: feed::parse_count(&entry.col_count.t, "colCount")?,
    })
}

/// Reads and writes one worksheet's entry.
pub struct WorksheetMetadata<'a, T> {
    transport: &'a T,
    url: String,
    headers: &'a [(String, String)],
}

impl<'a, T: HttpTransport> WorksheetMetadata<'a, T> {
    /// `url` is the worksheet entry URL (`.../worksheets/<key>/private/full/<id>`).
    pub fn new(transport: &'a T, url: String, headers: &'a [(String, String)]) -> Self {
        Self {
            transport,
            url,
            headers,
        }
    }

    pub async fn get(&self) -> Result<Metadata> {
        let request = HttpRequest::get(format!("{}?alt=json", self.url))
            .headers(self.headers.iter().cloned());
        let response = self.transport.execute(request).await?;

        if response.status != 200 {
            return Err(SheetError::Status {
                status: response.status,
                body: response.body,
            });
        }
        parse_worksheet_entry(&response.body)
    }

    /// Apply `update`, fetching the current entry first unless every field
    /// is given.
    pub async fn set(&self, update: MetadataUpdate) -> Result<Metadata> {
        let target = if update.is_complete() {
            update.apply_to(None)
        } else {
            let current = self.get().await?;
            update.apply_to(Some(&current))
        };

        tracing::info!(
            title = %target.title,
            rows = target.row_count,
            cols = target.col_count,
            "updating worksheet metadata"
        );

        let request = HttpRequest::put(self.url.clone(), target.to_entry_xml())
            .headers(self.headers.iter().cloned());
        let response = self.transport.execute(request).await?;

        if !response.is_success() {
            return Err(SheetError::Status {
                status: response.status,
                body: response.body,
            });
        }
        Metadata::from_atom(feed::parse_atom_entry(&response.body)?)
    }
}
