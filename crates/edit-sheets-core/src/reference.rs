//! Cell reference rewriting
//!
//! Two text transforms run over cell contents:
//!
//! - Outgoing values may contain placeholders. `{{ name }}` resolves to the
//!   A1 address of the cell registered under that name, `{{ r, c }}` to the
//!   address offset from the cell being written.
//! - Incoming formulas arrive in R1C1 notation (`=RC[-2]+R[3]C[-1]`) and are
//!   rewritten to A1 relative to the cell they were read from.

use std::collections::{BTreeMap, HashMap};

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::address::CellAddress;
use crate::error::{Error, Result};

static NAME_PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{\s*([\-\w\s]*?)\s*\}\}").expect("valid regex"));

static OFFSET_PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{\s*(-?\d+)\s*,\s*(-?\d+)\s*\}\}").expect("valid regex"));

// R, R[n] or Rn followed by C, C[n] or Cn
static R1C1_REFERENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\bR(?:\[(-?\d+)\]|(\d+))?C(?:\[(-?\d+)\]|(\d+))?").expect("valid regex")
});

/// Resolves placeholder names to cell addresses
pub trait NameLookup {
    fn lookup(&self, name: &str) -> Option<CellAddress>;
}

impl NameLookup for HashMap<String, CellAddress> {
    fn lookup(&self, name: &str) -> Option<CellAddress> {
        self.get(name).copied()
    }
}

impl NameLookup for BTreeMap<String, CellAddress> {
    fn lookup(&self, name: &str) -> Option<CellAddress> {
        self.get(name).copied()
    }
}

/// Result of [`expand_placeholders`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expansion {
    pub text: String,
    /// Names that had no entry in the lookup table, left in the text verbatim
    pub unresolved: Vec<String>,
}

/// Substitute `{{ name }}` and `{{ r, c }}` placeholders
///
/// Named placeholders are substituted first. An offset that leaves the sheet
/// is an error.
///
/// ```
/// use std::collections::HashMap;
/// use edit_sheets_core::CellAddress;
/// use edit_sheets_core::reference::expand_placeholders;
///
/// let mut names = HashMap::new();
/// names.insert("rate".to_string(), CellAddress::new(1, 2));
///
/// let out = expand_placeholders("={{ rate }} * {{ 0, -1 }}", CellAddress::new(4, 3), &names).unwrap();
/// assert_eq!(out.text, "=B1 * B4");
/// ```
pub fn expand_placeholders<L: NameLookup + ?Sized>(
    text: &str,
    origin: CellAddress,
    names: &L,
) -> Result<Expansion> {
    let mut unresolved = Vec::new();

    let named = NAME_PLACEHOLDER.replace_all(text, |caps: &Captures<'_>| {
        let name = &caps[1];
        match names.lookup(name) {
            Some(addr) => addr.to_a1_string(),
            None => {
                tracing::warn!(name, cell = %origin, "could not find placeholder name");
                unresolved.push(name.to_string());
                caps[0].to_string()
            }
        }
    });

    let mut failure = None;
    let expanded = OFFSET_PLACEHOLDER.replace_all(&named, |caps: &Captures<'_>| {
        match offset_from_captures(origin, &caps[1], &caps[2]) {
            Ok(addr) => addr.to_a1_string(),
            Err(e) => {
                if failure.is_none() {
                    failure = Some(e);
                }
                caps[0].to_string()
            }
        }
    });

    if let Some(e) = failure {
        return Err(e);
    }

    Ok(Expansion {
        text: expanded.into_owned(),
        unresolved,
    })
}

fn offset_from_captures(origin: CellAddress, d_row: &str, d_col: &str) -> Result<CellAddress> {
    let parse = |s: &str| {
        s.parse::<i64>()
            .map_err(|_| Error::InvalidAddress(format!("invalid offset '{}'", s)))
    };
    origin.offset(parse(d_row)?, parse(d_col)?)
}

/// Rewrite R1C1 references in a formula to A1 relative to `origin`
///
/// Text that is not a formula is returned unchanged.
///
/// ```
/// use edit_sheets_core::CellAddress;
/// use edit_sheets_core::reference::r1c1_to_a1;
///
/// let a1 = r1c1_to_a1("=RC[-2]+R[3]C[-1]", CellAddress::new(5, 4)).unwrap();
/// assert_eq!(a1, "=B5+C8");
/// ```
pub fn r1c1_to_a1(formula: &str, origin: CellAddress) -> Result<String> {
    if !formula.starts_with('=') {
        return Ok(formula.to_string());
    }

    let mut failure = None;
    let rewritten = R1C1_REFERENCE.replace_all(formula, |caps: &Captures<'_>| {
        match reference_from_captures(origin, caps) {
            Ok(addr) => addr.to_a1_string(),
            Err(e) => {
                if failure.is_none() {
                    failure = Some(e);
                }
                caps[0].to_string()
            }
        }
    });

    match failure {
        Some(e) => Err(e),
        None => Ok(rewritten.into_owned()),
    }
}

fn reference_from_captures(origin: CellAddress, caps: &Captures<'_>) -> Result<CellAddress> {
    let row = reference_part(caps, 1, origin.row)?;
    let col = reference_part(caps, 3, origin.col)?;
    CellAddress::checked(row, col)
}

// Group `first` holds the bracketed relative offset, `first + 1` the absolute number.
fn reference_part(caps: &Captures<'_>, first: usize, base: u32) -> Result<i64> {
    let parse = |s: &str| -> Result<i64> {
        s.parse::<i64>()
            .map_err(|_| Error::InvalidAddress(format!("invalid reference '{}'", &caps[0])))
    };
    match (caps.get(first), caps.get(first + 1)) {
        (Some(m), _) => Ok(base as i64 + parse(m.as_str())?),
        (None, Some(m)) => parse(m.as_str()),
        (None, None) => Ok(base as i64),
    }
}
