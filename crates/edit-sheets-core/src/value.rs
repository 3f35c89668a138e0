//! Cell values

use serde::{Deserialize, Serialize};
use std::fmt;

/// A value stored in a worksheet cell
///
/// The cells feed only distinguishes numbers from text; formulas are text
/// starting with `=`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    /// Numeric value
    Number(f64),
    /// Text value (including formulas)
    Text(String),
}

impl CellValue {
    /// Interpret feed text, keeping it as text when it is not a number
    ///
    /// ```
    /// use edit_sheets_core::CellValue;
    ///
    /// assert_eq!(CellValue::parse("3.5"), CellValue::Number(3.5));
    /// assert_eq!(CellValue::parse("abc"), CellValue::Text("abc".into()));
    /// ```
    pub fn parse(s: &str) -> Self {
        let trimmed = s.trim();
        match trimmed.parse::<f64>() {
            Ok(n) if !trimmed.is_empty() && n.is_finite() => CellValue::Number(n),
            _ => CellValue::Text(s.to_string()),
        }
    }

    /// The text sent as a cell's `inputValue`
    pub fn to_input_string(&self) -> String {
        match self {
            CellValue::Number(n) => n.to_string(),
            CellValue::Text(s) => s.clone(),
        }
    }

    /// Whether this is formula text
    pub fn is_formula(&self) -> bool {
        matches!(self, CellValue::Text(s) if s.starts_with('='))
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_input_string())
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<i32> for CellValue {
    fn from(n: i32) -> Self {
        CellValue::Number(n as f64)
    }
}

impl From<i64> for CellValue {
    fn from(n: i64) -> Self {
        CellValue::Number(n as f64)
    }
}

impl From<u32> for CellValue {
    fn from(n: u32) -> Self {
        CellValue::Number(n as f64)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}
