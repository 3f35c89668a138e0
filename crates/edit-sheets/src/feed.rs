//! Feed parsing.
//!
//! The service answers reads with JSON (`?alt=json`) in which every text node
//! is wrapped as `{ "$t": "..." }` and namespaced elements keep their prefix
//! (`gs$cell`). Writes are answered with Atom XML entries.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use edit_sheets_core::reference::r1c1_to_a1;
use edit_sheets_core::{CellAddress, CellValue};
use quick_xml::events::Event;
use quick_xml::reader::Reader;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SheetError};

/// Cell values keyed by row, then column (both 1-based).
pub type Rows = BTreeMap<u32, BTreeMap<u32, CellValue>>;

/// Worksheet details returned alongside [`Rows`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetInfo {
    pub spreadsheet_id: String,
    pub worksheet_id: String,
    pub worksheet_title: Option<String>,
    pub worksheet_updated: Option<DateTime<Utc>>,
    pub authors: Vec<Author>,
    pub total_cells: usize,
    pub total_rows: usize,
    /// Last row holding a cell; 1 for an empty sheet.
    pub last_row: u32,
    /// First row after `last_row`; 1 for an empty sheet.
    pub next_row: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Author {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct Text {
    #[serde(rename = "$t", default)]
    pub t: String,
}

#[derive(Debug, Deserialize)]
struct CellsDocument {
    feed: Option<CellsFeed>,
}

#[derive(Debug, Deserialize)]
struct CellsFeed {
    title: Option<Text>,
    updated: Option<Text>,
    #[serde(default)]
    author: Vec<AuthorJson>,
    #[serde(default)]
    entry: Vec<CellEntryJson>,
}

#[derive(Debug, Deserialize)]
struct AuthorJson {
    #[serde(default)]
    name: Text,
    #[serde(default)]
    email: Text,
}

#[derive(Debug, Deserialize)]
struct CellEntryJson {
    #[serde(rename = "gs$cell")]
    cell: GsCell,
}

/// The `gs$cell` element of a cells feed entry.
#[derive(Debug, Clone, Deserialize)]
pub struct GsCell {
    pub row: String,
    pub col: String,
    #[serde(rename = "inputValue", default)]
    pub input_value: String,
    #[serde(rename = "numericValue")]
    pub numeric_value: Option<String>,
}

impl GsCell {
    pub fn address(&self) -> Result<CellAddress> {
        let parse = |s: &str| {
            s.trim().parse::<i64>().map_err(|_| {
                SheetError::UnexpectedResponse(format!("invalid cell coordinate '{}'", s))
            })
        };
        Ok(CellAddress::checked(parse(&self.row)?, parse(&self.col)?)?)
    }

    /// The value as the caller should see it.
    ///
    /// Formulas come back in R1C1 notation and are rewritten to A1 relative
    /// to this cell. Other cells yield their numeric value when the service
    /// reports one, and their input text otherwise.
    pub fn value(&self) -> Result<CellValue> {
        let address = self.address()?;
        let input = CellValue::Text(self.input_value.clone());

        if input.is_formula() {
            return Ok(match r1c1_to_a1(&self.input_value, address) {
                Ok(formula) => CellValue::Text(formula),
                Err(e) => {
                    tracing::warn!(cell = %address, error = %e, "keeping untranslated formula");
                    input
                }
            });
        }

        Ok(match self.numeric_value.as_deref().map(CellValue::parse) {
            Some(number @ CellValue::Number(_)) => number,
            _ => input,
        })
    }
}

/// Parse a worksheet's cells feed into rows and sheet details.
pub fn parse_cells_feed(
    body: &str,
    spreadsheet_id: &str,
    worksheet_id: &str,
) -> Result<(Rows, SheetInfo)> {
    let document: CellsDocument = serde_json::from_str(body)?;
    let feed = document.feed.ok_or_else(|| SheetError::ReadFailed {
        response: body.to_string(),
    })?;

    let mut rows = Rows::new();
    let mut last_row = 1;

    for entry in &feed.entry {
        let address = entry.cell.address()?;
        rows.entry(address.row)
            .or_default()
            .insert(address.col, entry.cell.value()?);
        last_row = last_row.max(address.row);
    }

    let info = SheetInfo {
        spreadsheet_id: spreadsheet_id.to_string(),
        worksheet_id: worksheet_id.to_string(),
        worksheet_title: feed.title.map(|t| t.t).filter(|t| !t.is_empty()),
        worksheet_updated: feed.updated.as_ref().and_then(|t| parse_timestamp(&t.t)),
        authors: feed
            .author
            .into_iter()
            .map(|a| Author {
                name: a.name.t,
                email: a.email.t,
            })
            .collect(),
        total_cells: feed.entry.len(),
        total_rows: rows.len(),
        last_row,
        next_row: if feed.entry.is_empty() { 1 } else { last_row + 1 },
    };

    Ok((rows, info))
}

#[derive(Debug, Deserialize)]
struct ListingDocument {
    feed: Option<ListingFeed>,
}

#[derive(Debug, Deserialize)]
struct ListingFeed {
    #[serde(default)]
    entry: Vec<ListingEntry>,
}

#[derive(Debug, Deserialize)]
struct ListingEntry {
    id: Text,
    title: Text,
}

/// Find the id of the entry titled `name` in a spreadsheets or worksheets
/// listing feed. The id is the last path segment of the entry's `id` URL.
pub fn find_listing_id(body: &str, name: &str) -> Result<Option<String>> {
    let document: ListingDocument = serde_json::from_str(body)?;
    let feed = document
        .feed
        .ok_or_else(|| SheetError::UnexpectedResponse("listing has no feed".into()))?;

    Ok(feed
        .entry
        .into_iter()
        .find(|entry| entry.title.t == name)
        .and_then(|entry| last_segment(&entry.id.t)))
}

fn last_segment(url: &str) -> Option<String> {
    url.trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// The fields of an Atom entry the client cares about.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AtomEntry {
    pub id: Option<String>,
    pub title: Option<String>,
    pub updated: Option<String>,
    pub resource_id: Option<String>,
    pub row_count: Option<String>,
    pub col_count: Option<String>,
}

/// Parse the direct children of a single Atom `<entry>`.
pub fn parse_atom_entry(xml: &str) -> Result<AtomEntry> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut entry = AtomEntry::default();
    let mut depth = 0usize;
    let mut current: Option<Vec<u8>> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                depth += 1;
                current = (depth == 2).then(|| e.local_name().as_ref().to_vec());
            }
            Event::End(_) => {
                depth = depth.saturating_sub(1);
                current = None;
            }
            Event::Text(t) => {
                let Some(name) = &current else { continue };
                let text = t.unescape()?.into_owned();
                let slot = match name.as_slice() {
                    b"id" => &mut entry.id,
                    b"title" => &mut entry.title,
                    b"updated" => &mut entry.updated,
                    b"resourceId" => &mut entry.resource_id,
                    b"rowCount" => &mut entry.row_count,
                    b"colCount" => &mut entry.col_count,
                    _ => continue,
                };
                *slot = Some(text);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if depth != 0 {
        return Err(SheetError::UnexpectedResponse("truncated Atom entry".into()));
    }
    Ok(entry)
}

pub(crate) fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    if text.is_empty() {
        return None;
    }
    match DateTime::parse_from_rfc3339(text) {
        Ok(t) => Some(t.with_timezone(&Utc)),
        Err(e) => {
            tracing::warn!(timestamp = text, error = %e, "unparseable timestamp");
            None
        }
    }
}

pub(crate) fn parse_count(text: &str, what: &str) -> Result<u32> {
    text.trim()
        .parse()
        .map_err(|_| SheetError::UnexpectedResponse(format!("invalid {}: '{}'", what, text)))
}
