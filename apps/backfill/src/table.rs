//! Tabular I/O: whole-table CSV read and atomic whole-table write.
//!
//! Rows are kept as positional cells aligned to the header. Short rows are
//! accepted as-is and only padded when a value is written into them.

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::debug;

use crate::errors::AppError;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.header.iter().position(|h| h == name)
    }

    /// Returns the index of `name`, appending it to the header first if absent.
    /// Calling this repeatedly never duplicates the column.
    pub fn ensure_column(&mut self, name: &str) -> usize {
        match self.column_index(name) {
            Some(idx) => idx,
            None => {
                self.header.push(name.to_string());
                self.header.len() - 1
            }
        }
    }

    /// Pads the row to the header length with empty strings, then writes the
    /// cell. Out-of-range rows are ignored; callers validate indices first.
    pub fn set_cell(&mut self, row: usize, column: usize, value: String) {
        let width = self.header.len().max(column + 1);
        if let Some(cells) = self.rows.get_mut(row) {
            if cells.len() < width {
                cells.resize(width, String::new());
            }
            cells[column] = value;
        }
    }

    pub fn from_reader<R: std::io::Read>(reader: R) -> Result<Self, AppError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let header: Vec<String> = csv_reader.headers()?.iter().map(str::to_string).collect();
        if header.is_empty() || header.iter().all(|h| h.is_empty()) {
            return Err(AppError::Format("table has no header row".to_string()));
        }

        let mut rows = Vec::new();
        for result in csv_reader.records() {
            let record = result?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        Ok(Self { header, rows })
    }

    pub fn to_writer<W: Write>(&self, writer: W) -> Result<(), AppError> {
        let mut csv_writer = csv::WriterBuilder::new()
            .flexible(true)
            .from_writer(writer);
        csv_writer.write_record(&self.header)?;
        for row in &self.rows {
            csv_writer.write_record(row)?;
        }
        csv_writer.flush()?;
        Ok(())
    }
}

/// Reads the full table into memory. Any failure is a `Format` error.
pub fn read_table(path: &Path) -> Result<Table, AppError> {
    let file = std::fs::File::open(path)
        .map_err(|e| AppError::Format(format!("cannot open {}: {e}", path.display())))?;
    let table = Table::from_reader(file).map_err(|e| match e {
        AppError::Format(msg) => AppError::Format(format!("{}: {msg}", path.display())),
        other => other,
    })?;
    debug!(
        "Read {} rows x {} columns from {}",
        table.row_count(),
        table.header.len(),
        path.display()
    );
    Ok(table)
}

/// Writes the full table through a temporary file in the destination
/// directory, then renames it over `path`.
pub fn write_table(path: &Path, table: &Table) -> Result<(), AppError> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    table.to_writer(tmp.as_file_mut())?;
    tmp.as_file_mut().sync_all()?;
    tmp.persist(path).map_err(|e| AppError::Io(e.error))?;
    Ok(())
}
