//! Pending cell updates
//!
//! An [`EntryBook`] accumulates the cells to write in one batch together with
//! the table of names that `{{ name }}` placeholders resolve against. It is
//! compiled into [`CompiledBatch`] right before sending and cleared once the
//! service accepted the batch.

use std::collections::{BTreeMap, HashMap};

use serde_json::Value as JsonValue;

use crate::address::CellAddress;
use crate::error::{Error, Result};
use crate::reference::{self, NameLookup};
use crate::value::CellValue;

/// What a caller places at one cell slot
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CellInput {
    /// Value to write; `None` only makes sense together with `name`
    pub value: Option<CellValue>,
    /// Alias other cells can refer to with `{{ name }}`
    pub name: Option<String>,
    /// Names an existing cell without writing to it
    pub is_ref: bool,
}

impl CellInput {
    pub fn value(value: impl Into<CellValue>) -> Self {
        Self {
            value: Some(value.into()),
            ..Default::default()
        }
    }

    /// A value that can be referenced as `{{ name }}`
    pub fn named(name: impl Into<String>, value: impl Into<CellValue>) -> Self {
        Self {
            value: Some(value.into()),
            name: Some(name.into()),
            is_ref: false,
        }
    }

    /// Give an existing cell a name without overwriting its contents
    pub fn reference(name: impl Into<String>) -> Self {
        Self {
            value: None,
            name: Some(name.into()),
            is_ref: true,
        }
    }

    /// Interpret one JSON leaf: a number, a string, or `{ "val", "name", "ref" }`
    pub fn from_json(json: &JsonValue) -> Result<Self> {
        match json {
            JsonValue::Number(n) => n
                .as_f64()
                .map(|n| Self::value(n))
                .ok_or_else(|| Error::InvalidInput(format!("number out of range: {}", n))),
            JsonValue::String(s) => Ok(Self::value(s.as_str())),
            JsonValue::Bool(b) => Ok(Self::value(if *b { "TRUE" } else { "FALSE" })),
            JsonValue::Null => Ok(Self::default()),
            JsonValue::Object(map) => {
                let value = match map.get("val") {
                    None | Some(JsonValue::Null) => None,
                    Some(v) => Self::from_json(v)?.value,
                };
                let name = match map.get("name") {
                    None | Some(JsonValue::Null) => None,
                    Some(JsonValue::String(s)) => Some(s.clone()),
                    Some(other) => {
                        return Err(Error::InvalidInput(format!(
                            "cell name must be a string, got {}",
                            other
                        )))
                    }
                };
                let is_ref = match map.get("ref") {
                    None | Some(JsonValue::Null) => false,
                    Some(JsonValue::Bool(b)) => *b,
                    Some(_) => true,
                };
                Ok(Self {
                    value,
                    name,
                    is_ref,
                })
            }
            JsonValue::Array(_) => Err(Error::InvalidInput(
                "nested arrays are not allowed inside a row".into(),
            )),
        }
    }
}

macro_rules! impl_from_for_input {
    ($($t:ty),*) => {
        $(
            impl From<$t> for CellInput {
                fn from(v: $t) -> Self {
                    CellInput::value(v)
                }
            }
        )*
    };
}

impl_from_for_input!(CellValue, f64, i32, i64, u32, &str, String);

/// A cell slot held by an [`EntryBook`]
#[derive(Debug, Clone, PartialEq)]
pub struct CellEntry {
    pub address: CellAddress,
    pub value: Option<CellValue>,
    pub name: Option<String>,
    pub is_ref: bool,
}

/// One cell ready for serialization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledEntry {
    pub address: CellAddress,
    /// Text for the cell's `inputValue`, placeholders already expanded
    pub input: String,
}

/// Output of [`EntryBook::compile`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompiledBatch {
    /// Entries in row-major order
    pub entries: Vec<CompiledEntry>,
    /// Largest row of any slot, including reference-only slots
    pub max_row: u32,
    /// Largest column of any slot, including reference-only slots
    pub max_col: u32,
}

impl CompiledBatch {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Accumulated cell updates and their name table
#[derive(Debug, Clone, Default)]
pub struct EntryBook {
    entries: BTreeMap<CellAddress, CellEntry>,
    names: HashMap<String, CellAddress>,
}

impl EntryBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place a value at (row, col), both 1-based
    ///
    /// Overwriting an occupied slot is allowed but logged. Registering a name
    /// that is already taken fails and leaves the book unchanged.
    pub fn add_value(&mut self, row: u32, col: u32, input: impl Into<CellInput>) -> Result<()> {
        let input = input.into();
        let address = CellAddress::checked(row as i64, col as i64)?;

        if self.entries.contains_key(&address) {
            tracing::warn!(cell = %address.to_r1c1_key(), "cell already exists, overwriting");
        }

        if let Some(name) = &input.name {
            if self.names.contains_key(name) {
                return Err(Error::DuplicateName(name.clone()));
            }
            self.names.insert(name.clone(), address);
        }

        if input.value.is_none() && !input.is_ref {
            tracing::warn!(cell = %address.to_r1c1_key(), "missing value");
        }

        self.entries.insert(
            address,
            CellEntry {
                address,
                value: input.value,
                name: input.name,
                is_ref: input.is_ref,
            },
        );
        Ok(())
    }

    /// Place a grid of values with its top-left corner at `origin`
    pub fn add_grid<R, I>(&mut self, rows: R, origin: CellAddress) -> Result<()>
    where
        R: IntoIterator,
        R::Item: IntoIterator<Item = I>,
        I: Into<CellInput>,
    {
        for (i, row) in rows.into_iter().enumerate() {
            for (j, input) in row.into_iter().enumerate() {
                let address = origin.offset(i as i64, j as i64)?;
                self.add_value(address.row, address.col, input)?;
            }
        }
        Ok(())
    }

    /// Add cells described as JSON
    ///
    /// - an array is a grid anchored at A1 (a flat array is a single row);
    /// - an object maps row numbers to objects mapping column numbers to
    ///   values, where an array value is a grid anchored at that cell;
    /// - an array directly under a row number is a grid anchored at column 1.
    ///
    /// `null` grid cells are skipped.
    ///
    /// ```
    /// use edit_sheets_core::{CellAddress, EntryBook};
    /// use serde_json::json;
    ///
    /// let mut book = EntryBook::new();
    /// book.add(&json!({ "3": { "2": "x", "5": [[1, 2], [3, 4]] } })).unwrap();
    /// assert_eq!(book.len(), 5);
    /// assert!(book.get(CellAddress::new(4, 6)).is_some());
    /// ```
    pub fn add(&mut self, cells: &JsonValue) -> Result<()> {
        match cells {
            JsonValue::Array(items) => self.add_json_grid(items, CellAddress::new(1, 1)),
            JsonValue::Object(rows) => {
                for (row_key, row_value) in rows {
                    let row = parse_index(row_key)?;
                    match row_value {
                        JsonValue::Object(cols) => {
                            for (col_key, cell) in cols {
                                let col = parse_index(col_key)?;
                                match cell {
                                    JsonValue::Array(items) => self.add_json_grid(
                                        items,
                                        CellAddress::checked(row as i64, col as i64)?,
                                    )?,
                                    other => {
                                        self.add_value(row, col, CellInput::from_json(other)?)?
                                    }
                                }
                            }
                        }
                        JsonValue::Array(items) => self
                            .add_json_grid(items, CellAddress::checked(row as i64, 1)?)?,
                        other => {
                            return Err(Error::InvalidInput(format!(
                                "row {} must be an object or array, got {}",
                                row_key, other
                            )))
                        }
                    }
                }
                Ok(())
            }
            other => Err(Error::InvalidInput(format!(
                "cells must be an object or array, got {}",
                other
            ))),
        }
    }

    fn add_json_grid(&mut self, items: &[JsonValue], origin: CellAddress) -> Result<()> {
        let two_dimensional = matches!(items.first(), Some(JsonValue::Array(_)));

        let rows: Vec<&[JsonValue]> = if two_dimensional {
            items
                .iter()
                .map(|row| match row {
                    JsonValue::Array(cells) => cells.as_slice(),
                    single => std::slice::from_ref(single),
                })
                .collect()
        } else {
            vec![items]
        };

        for (i, row) in rows.into_iter().enumerate() {
            for (j, cell) in row.iter().enumerate() {
                if cell.is_null() {
                    continue;
                }
                let address = origin.offset(i as i64, j as i64)?;
                self.add_value(address.row, address.col, CellInput::from_json(cell)?)?;
            }
        }
        Ok(())
    }

    /// Expand placeholders and produce the entries to send
    ///
    /// Slots without a value are not sent but still count towards `max_row`
    /// / `max_col`. A `ref` slot is sent only when it also carries a value.
    pub fn compile(&self) -> Result<CompiledBatch> {
        let mut batch = CompiledBatch::default();

        for entry in self.entries.values() {
            batch.max_row = batch.max_row.max(entry.address.row);
            batch.max_col = batch.max_col.max(entry.address.col);

            let input = match &entry.value {
                None => continue,
                Some(CellValue::Text(text)) => {
                    reference::expand_placeholders(text, entry.address, &self.names)?.text
                }
                Some(value) => value.to_input_string(),
            };

            batch.entries.push(CompiledEntry {
                address: entry.address,
                input,
            });
        }

        Ok(batch)
    }

    pub fn get(&self, address: CellAddress) -> Option<&CellEntry> {
        self.entries.get(&address)
    }

    /// Entries in row-major order
    pub fn iter(&self) -> impl Iterator<Item = &CellEntry> {
        self.entries.values()
    }

    pub fn names(&self) -> &HashMap<String, CellAddress> {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop all entries and names
    pub fn clear(&mut self) {
        self.entries.clear();
        self.names.clear();
    }
}

impl NameLookup for EntryBook {
    fn lookup(&self, name: &str) -> Option<CellAddress> {
        self.names.get(name).copied()
    }
}

fn parse_index(key: &str) -> Result<u32> {
    key.trim()
        .parse::<u32>()
        .ok()
        .filter(|n| *n >= 1)
        .ok_or_else(|| Error::InvalidInput(format!("'{}' is not a row or column number", key)))
}
