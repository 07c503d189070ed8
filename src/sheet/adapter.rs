//! Row adapters
//!
//! Column keys are derived once per tab from the frozen header rows. Each
//! record type maps column keys to setters that convert one cell into an
//! attribute value.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use thiserror::Error;

use crate::domain::{Model, Namer};

use super::source::CellValue;

#[derive(Debug, Error, PartialEq)]
pub enum CellError {
    #[error("no field for column key '{0}'")]
    UnknownKey(String),

    #[error("expected {expected}, got '{value}'")]
    Invalid { expected: &'static str, value: String },
}

impl CellError {
    fn invalid(expected: &'static str, cell: &CellValue) -> Self {
        CellError::Invalid {
            expected,
            value: cell.to_string(),
        }
    }
}

/// Sheet decoding for one record type
pub trait SheetRow: Model {
    /// Applies one cell; unknown keys are an error
    fn set_cell(&mut self, key: &str, cell: &CellValue) -> Result<(), CellError>;
}

/// Derives column keys from the frozen header rows
///
/// Walking columns left to right, a non-blank header cell replaces the text
/// remembered for its row, so a blank cell inherits from the left.
pub fn column_keys(headers: &[Vec<CellValue>], column_count: usize, namer: &Namer) -> Vec<String> {
    let mut last_in_row: Vec<Option<String>> = vec![None; headers.len()];
    (0..column_count)
        .map(|col| {
            for (row_num, row) in headers.iter().enumerate() {
                if let Some(text) = row.get(col).and_then(CellValue::as_text) {
                    last_in_row[row_num] = Some(text);
                }
            }
            let texts: Vec<&str> = last_in_row.iter().flatten().map(String::as_str).collect();
            namer.field_label(&texts)
        })
        .collect()
}

/// Decodes one data row; `Ok(None)` for rows with no content
///
/// Errors carry the index of the offending column.
pub fn decode_row<M: SheetRow>(keys: &[String], cells: &[CellValue]) -> Result<Option<M>, (usize, CellError)> {
    if cells.iter().all(CellValue::is_blank) {
        return Ok(None);
    }

    let mut model = M::default();
    for (col, cell) in cells.iter().enumerate() {
        let key = keys.get(col).map(String::as_str).unwrap_or("");
        if key.is_empty() {
            // Columns without a header carry no field
            continue;
        }
        model.set_cell(key, cell).map_err(|e| (col, e))?;
    }
    Ok(Some(model))
}

pub fn cell_text(cell: &CellValue) -> Option<String> {
    cell.as_text().map(|s| s.trim().to_string())
}

/// Integer cell; commas are stripped and `-` reads as absent
pub fn cell_int(cell: &CellValue) -> Result<Option<i64>, CellError> {
    match cell {
        CellValue::Empty => Ok(None),
        CellValue::Number(n) if n.fract() == 0.0 => Ok(Some(*n as i64)),
        CellValue::Text(s) => {
            let s = s.trim();
            if s.is_empty() || s == "-" {
                return Ok(None);
            }
            s.replace(',', "")
                .parse()
                .map(Some)
                .map_err(|_| CellError::invalid("an integer", cell))
        }
        _ => Err(CellError::invalid("an integer", cell)),
    }
}

/// Float cell; a `%` suffix divides by 100
///
/// `NaN` and infinities are rejected: they do not survive a JSON round trip.
pub fn cell_float(cell: &CellValue) -> Result<Option<f64>, CellError> {
    let value = match cell {
        CellValue::Empty => return Ok(None),
        CellValue::Number(n) => *n,
        CellValue::Text(s) => {
            let s = s.trim();
            if s.is_empty() || s == "-" {
                return Ok(None);
            }
            let (digits, divisor) = match s.strip_suffix('%') {
                Some(digits) => (digits.trim(), 100.0),
                None => (s, 1.0),
            };
            digits
                .replace(',', "")
                .parse::<f64>()
                .map(|v| v / divisor)
                .map_err(|_| CellError::invalid("a number", cell))?
        }
        CellValue::Bool(_) => return Err(CellError::invalid("a number", cell)),
    };
    if value.is_finite() {
        Ok(Some(value))
    } else {
        Err(CellError::invalid("a number", cell))
    }
}

/// ISO `YYYY-MM-DD` date cell
pub fn cell_date(cell: &CellValue) -> Result<Option<NaiveDate>, CellError> {
    match cell {
        CellValue::Empty => Ok(None),
        CellValue::Text(s) if s.trim().is_empty() => Ok(None),
        CellValue::Text(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map(Some)
            .map_err(|_| CellError::invalid("an ISO date", cell)),
        _ => Err(CellError::invalid("an ISO date", cell)),
    }
}

pub fn cell_bool(cell: &CellValue) -> Result<Option<bool>, CellError> {
    match cell {
        CellValue::Empty => Ok(None),
        CellValue::Bool(b) => Ok(Some(*b)),
        CellValue::Number(n) if *n == 1.0 => Ok(Some(true)),
        CellValue::Number(n) if *n == 0.0 => Ok(Some(false)),
        CellValue::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
            "" => Ok(None),
            "yes" | "y" | "true" | "x" | "1" => Ok(Some(true)),
            "no" | "n" | "false" | "0" => Ok(Some(false)),
            _ => Err(CellError::invalid("yes or no", cell)),
        },
        _ => Err(CellError::invalid("yes or no", cell)),
    }
}

/// Comma-separated list cell
pub fn cell_list(cell: &CellValue) -> BTreeSet<String> {
    cell.as_text()
        .map(|s| {
            s.split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
