//! Workbook reading via calamine.
//!
//! Only the first worksheet is read. Sheet row 1 is the header, so a sheet
//! whose used range starts lower has no header at all. Row numbers are
//! reported 1-based.

use crate::source::{SourceError, SourceTable};
use calamine::{open_workbook_auto, Data, Reader};
use log::{info, warn};
use std::path::Path;

/// Reads and validates the faculty sheet at `path`.
///
/// # Errors
/// - `Open`/`Read` when calamine cannot load the workbook or its first sheet.
/// - `NoWorksheet` when the workbook has no sheets.
/// - `MissingColumn` when the header lacks a required column.
pub fn read_source(path: impl AsRef<Path>) -> Result<SourceTable, SourceError> {
    let path = path.as_ref();
    info!(
        "event=source_read module=source status=start path={}",
        path.display()
    );

    let mut workbook = open_workbook_auto(path).map_err(|err| SourceError::Open {
        path: path.to_path_buf(),
        message: err.to_string(),
    })?;

    let range = match workbook.worksheet_range_at(0) {
        Some(Ok(range)) => range,
        Some(Err(err)) => {
            return Err(SourceError::Read {
                path: path.to_path_buf(),
                message: err.to_string(),
            })
        }
        None => {
            return Err(SourceError::NoWorksheet {
                path: path.to_path_buf(),
            })
        }
    };

    let first_row = range.start().map_or(0, |(row, _)| row);
    let mut rows = range.rows();
    let header: Vec<String> = if first_row == 0 {
        rows.next()
            .map(|cells| cells.iter().map(cell_text).collect())
            .unwrap_or_default()
    } else {
        warn!(
            "event=source_read module=source status=no_header first_used_row={}",
            first_row + 1
        );
        Vec::new()
    };
    let body = rows.zip(first_row + 2..).map(|(cells, sheet_row)| {
        let values: Vec<String> = cells.iter().map(cell_text).collect();
        (sheet_row, values)
    });

    let table = SourceTable::from_cells(&header, body)?;
    info!(
        "event=source_read module=source status=ok rows={} blank_rows={}",
        table.rows.len(),
        table.blank_rows
    );
    Ok(table)
}

/// Stringifies one cell; empty and error cells become `""`.
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty | Data::Error(_) => String::new(),
        Data::String(value) | Data::DateTimeIso(value) | Data::DurationIso(value) => {
            value.trim().to_string()
        }
        Data::Float(value) => {
            if value.fract() == 0.0 && value.abs() < 1e15 {
                format!("{}", *value as i64)
            } else {
                value.to_string()
            }
        }
        Data::Int(value) => value.to_string(),
        Data::Bool(value) => value.to_string(),
        Data::DateTime(value) => value.as_f64().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::cell_text;
    use calamine::{CellErrorType, Data};

    #[test]
    fn cells_stringify_like_sheet_text() {
        assert_eq!(cell_text(&Data::String("  Ada \n".to_string())), "Ada");
        assert_eq!(cell_text(&Data::Float(42.0)), "42");
        assert_eq!(cell_text(&Data::Float(1.5)), "1.5");
        assert_eq!(cell_text(&Data::Int(7)), "7");
        assert_eq!(cell_text(&Data::Bool(true)), "true");
        assert_eq!(cell_text(&Data::Empty), "");
        assert_eq!(cell_text(&Data::Error(CellErrorType::Div0)), "");
    }
}
