//! Source-sheet reading.
//!
//! # Responsibility
//! - Open the faculty workbook and expose its rows as plain text records.
//! - Validate the header before any row reaches reconciliation.
//!
//! # Invariants
//! - A table is only produced when all six logical columns are present.
//! - Rows whose six fields are all empty never appear in a table.
//! - Every row keeps its 1-based sheet row number.

pub mod header;
pub mod sheet;

use header::ColumnMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub use sheet::read_source;

/// The six logical columns of the faculty sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceColumn {
    Name = 0,
    Position = 1,
    ResearchInterest = 2,
    DepartmentalAffiliation = 3,
    Article = 4,
    ConferencePaper = 5,
}

impl SourceColumn {
    pub const ALL: [Self; 6] = [
        Self::Name,
        Self::Position,
        Self::ResearchInterest,
        Self::DepartmentalAffiliation,
        Self::Article,
        Self::ConferencePaper,
    ];

    /// Canonical header label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Name => "Name",
            Self::Position => "Position",
            Self::ResearchInterest => "Research Interest",
            Self::DepartmentalAffiliation => "Departmental Affiliation",
            Self::Article => "Article",
            Self::ConferencePaper => "Conference Paper",
        }
    }
}

/// Source-layer error.
#[derive(Debug)]
pub enum SourceError {
    Open {
        path: PathBuf,
        message: String,
    },
    Read {
        path: PathBuf,
        message: String,
    },
    NoWorksheet { path: PathBuf },
    MissingColumn {
        column: &'static str,
        available: Vec<String>,
    },
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open { path, message } => {
                write!(f, "cannot open workbook `{}`: {message}", path.display())
            }
            Self::Read { path, message } => write!(
                f,
                "cannot read worksheet in `{}`: {message}",
                path.display()
            ),
            Self::NoWorksheet { path } => {
                write!(f, "workbook `{}` has no worksheet", path.display())
            }
            Self::MissingColumn { column, available } => write!(
                f,
                "missing column `{column}`; available headers: [{}]",
                available.join(", ")
            ),
        }
    }
}

impl Error for SourceError {}

/// One faculty record as text, all fields trimmed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceRow {
    pub sheet_row: u32,
    pub name: String,
    pub position: String,
    pub research_interest: String,
    pub departmental_affiliation: String,
    pub article: String,
    pub conference_paper: String,
}

impl SourceRow {
    pub fn is_blank(&self) -> bool {
        SourceColumn::ALL
            .iter()
            .all(|column| self.field(*column).is_empty())
    }

    pub fn field(&self, column: SourceColumn) -> &str {
        match column {
            SourceColumn::Name => &self.name,
            SourceColumn::Position => &self.position,
            SourceColumn::ResearchInterest => &self.research_interest,
            SourceColumn::DepartmentalAffiliation => &self.departmental_affiliation,
            SourceColumn::Article => &self.article,
            SourceColumn::ConferencePaper => &self.conference_paper,
        }
    }

    /// `None` when the position cell is empty.
    pub fn position(&self) -> Option<&str> {
        if self.position.is_empty() {
            None
        } else {
            Some(&self.position)
        }
    }
}

/// Validated rows of one worksheet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceTable {
    pub rows: Vec<SourceRow>,
    /// Fully empty rows dropped while reading.
    pub blank_rows: usize,
}

impl SourceTable {
    /// Builds a table from a header row and `(sheet_row, cells)` pairs.
    ///
    /// Cells are trimmed here; short rows read as empty for missing cells.
    ///
    /// # Errors
    /// - `SourceError::MissingColumn` when the header is incomplete.
    pub fn from_cells<I>(header: &[String], body: I) -> Result<Self, SourceError>
    where
        I: IntoIterator<Item = (u32, Vec<String>)>,
    {
        let columns = ColumnMap::resolve(header)?;
        let mut table = Self::default();

        for (sheet_row, cells) in body {
            let cell = |column: SourceColumn| {
                cells
                    .get(columns.index(column))
                    .map(|value| value.trim().to_string())
                    .unwrap_or_default()
            };
            let row = SourceRow {
                sheet_row,
                name: cell(SourceColumn::Name),
                position: cell(SourceColumn::Position),
                research_interest: cell(SourceColumn::ResearchInterest),
                departmental_affiliation: cell(SourceColumn::DepartmentalAffiliation),
                article: cell(SourceColumn::Article),
                conference_paper: cell(SourceColumn::ConferencePaper),
            };
            if row.is_blank() {
                table.blank_rows += 1;
                continue;
            }
            table.rows.push(row);
        }

        Ok(table)
    }

    /// Data rows seen in the sheet, blank ones included.
    pub fn rows_read(&self) -> usize {
        self.rows.len() + self.blank_rows
    }
}
