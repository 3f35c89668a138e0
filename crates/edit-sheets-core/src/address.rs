//! Cell addresses
//!
//! The cells feed addresses everything with 1-based row and column numbers
//! (`R3C2`). Formulas and placeholders need the A1 form (`B3`).

use crate::error::{Error, Result};
use crate::{MAX_COLS, MAX_ROWS};
use std::fmt;
use std::str::FromStr;

/// A cell address, 1-based in both dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellAddress {
    /// Row number (1 = first row)
    pub row: u32,
    /// Column number (1 = column A)
    pub col: u32,
}

impl CellAddress {
    /// Create a new cell address
    pub fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// Create a cell address, checking both coordinates against the sheet limits
    pub fn checked(row: i64, col: i64) -> Result<Self> {
        if row < 1 || row > MAX_ROWS as i64 {
            return Err(Error::RowOutOfBounds(row, MAX_ROWS));
        }
        if col < 1 || col > MAX_COLS as i64 {
            return Err(Error::ColumnOutOfBounds(col, MAX_COLS));
        }
        Ok(Self::new(row as u32, col as u32))
    }

    /// Parse a cell address from A1-style notation
    ///
    /// `$` markers are accepted and dropped; the batch API has no notion of
    /// absolute references.
    ///
    /// # Examples
    /// ```
    /// use edit_sheets_core::CellAddress;
    ///
    /// let addr = CellAddress::parse("B7").unwrap();
    /// assert_eq!((addr.row, addr.col), (7, 2));
    ///
    /// let addr = CellAddress::parse("$AA$3").unwrap();
    /// assert_eq!((addr.row, addr.col), (3, 27));
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(Error::InvalidAddress("empty address".into()));
        }

        let bytes = s.as_bytes();
        let mut pos = 0;

        if bytes.get(pos) == Some(&b'$') {
            pos += 1;
        }

        let col_start = pos;
        while pos < bytes.len() && bytes[pos].is_ascii_alphabetic() {
            pos += 1;
        }
        if pos == col_start {
            return Err(Error::InvalidAddress(format!("no column letters in '{}'", s)));
        }
        let col = Self::letters_to_column(&s[col_start..pos])?;

        if bytes.get(pos) == Some(&b'$') {
            pos += 1;
        }

        let row_str = &s[pos..];
        if row_str.is_empty() {
            return Err(Error::InvalidAddress(format!("no row number in '{}'", s)));
        }
        let row: i64 = row_str
            .parse()
            .map_err(|_| Error::InvalidAddress(format!("invalid row number in '{}'", s)))?;

        Self::checked(row, col as i64)
    }

    /// Convert a 1-based column number to letters (1 = A, 26 = Z, 27 = AA)
    pub fn column_to_letters(col: u32) -> String {
        let mut result = String::new();
        let mut n = col;

        while n > 0 {
            n -= 1;
            let c = ((n % 26) as u8 + b'A') as char;
            result.insert(0, c);
            n /= 26;
        }

        result
    }

    /// Convert column letters to a 1-based column number (A = 1, AA = 27)
    pub fn letters_to_column(letters: &str) -> Result<u32> {
        if letters.is_empty() {
            return Err(Error::InvalidAddress("empty column letters".into()));
        }

        let mut col: u64 = 0;
        for c in letters.chars() {
            if !c.is_ascii_alphabetic() {
                return Err(Error::InvalidAddress(format!(
                    "invalid column letter '{}'",
                    c
                )));
            }
            col = col * 26 + (c.to_ascii_uppercase() as u64 - 'A' as u64 + 1);
            if col > MAX_COLS as u64 {
                return Err(Error::ColumnOutOfBounds(col as i64, MAX_COLS));
            }
        }

        Ok(col as u32)
    }

    /// Move by a relative offset
    ///
    /// Leaving the sheet (row or column below 1) is an error.
    pub fn offset(&self, d_row: i64, d_col: i64) -> Result<Self> {
        Self::checked(self.row as i64 + d_row, self.col as i64 + d_col)
    }

    /// Format as A1-style string
    pub fn to_a1_string(&self) -> String {
        let mut result = Self::column_to_letters(self.col);
        result.push_str(&self.row.to_string());
        result
    }

    /// Format as the service's `R<row>C<col>` cell key
    pub fn to_r1c1_key(&self) -> String {
        format!("R{}C{}", self.row, self.col)
    }
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_a1_string())
    }
}

impl FromStr for CellAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
