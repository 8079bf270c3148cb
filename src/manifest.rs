//! Ordered CSV manifest of recordings and their derived-file columns.
//!
//! Each pipeline stage loads the previous stage's manifest, appends path
//! columns for the rows it processes, and saves the result under a new name.
//! Row identity, count, and order are never changed.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Column holding the recording filename every stage keys on.
pub const RECORDING_NAME_COLUMN: &str = "Recording Name";

/// Errors returned while loading or saving a manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("Manifest not found: {0}")]
    NotFound(PathBuf),
    #[error("Failed to read manifest {path}: {source}")]
    Read { path: PathBuf, source: csv::Error },
    #[error("Failed to write manifest {path}: {source}")]
    Write { path: PathBuf, source: csv::Error },
    #[error("Manifest {path} has no '{column}' column")]
    MissingColumn { path: PathBuf, column: String },
}

/// An ordered table of recording rows loaded from a CSV file.
#[derive(Debug, Clone)]
pub struct Manifest {
    path: PathBuf,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Manifest {
    /// Load a manifest, keeping rows in file order.
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        if !path.exists() {
            return Err(ManifestError::NotFound(path.to_path_buf()));
        }
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(path)
            .map_err(|source| ManifestError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        let headers: Vec<String> = reader
            .headers()
            .map_err(|source| ManifestError::Read {
                path: path.to_path_buf(),
                source,
            })?
            .iter()
            .map(str::to_string)
            .collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|source| ManifestError::Read {
                path: path.to_path_buf(),
                source,
            })?;
            let mut row: Vec<String> = record.iter().map(str::to_string).collect();
            // Short records are padded so every row spans all columns.
            row.resize(headers.len(), String::new());
            rows.push(row);
        }

        Ok(Self {
            path: path.to_path_buf(),
            headers,
            rows,
        })
    }

    /// Write the manifest (headers plus all rows, in order) to `path`.
    pub fn save(&self, path: &Path) -> Result<(), ManifestError> {
        let mut writer =
            csv::Writer::from_path(path).map_err(|source| ManifestError::Write {
                path: path.to_path_buf(),
                source,
            })?;
        writer
            .write_record(&self.headers)
            .map_err(|source| ManifestError::Write {
                path: path.to_path_buf(),
                source,
            })?;
        for row in &self.rows {
            writer
                .write_record(row)
                .map_err(|source| ManifestError::Write {
                    path: path.to_path_buf(),
                    source,
                })?;
        }
        writer.flush().map_err(|source| ManifestError::Write {
            path: path.to_path_buf(),
            source: csv::Error::from(source),
        })
    }

    /// Number of data rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when the manifest holds no data rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Column headers in file order.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Index of a column by header name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|header| header == name)
    }

    /// Index of the recording-name key column, required by every stage.
    pub fn recording_name_index(&self) -> Result<usize, ManifestError> {
        self.column_index(RECORDING_NAME_COLUMN)
            .ok_or_else(|| ManifestError::MissingColumn {
                path: self.path.clone(),
                column: RECORDING_NAME_COLUMN.to_string(),
            })
    }

    /// Ensure a column exists and blank every cell in it.
    ///
    /// Stages overwrite their output columns wholesale, so a manifest that
    /// already carries the column from an earlier run starts clean.
    pub fn reset_column(&mut self, name: &str) -> usize {
        let index = match self.column_index(name) {
            Some(index) => index,
            None => {
                self.headers.push(name.to_string());
                for row in &mut self.rows {
                    row.push(String::new());
                }
                return self.headers.len() - 1;
            }
        };
        for row in &mut self.rows {
            row[index].clear();
        }
        index
    }

    /// Cell value at (row, column).
    pub fn cell(&self, row: usize, column: usize) -> &str {
        &self.rows[row][column]
    }

    /// Overwrite the cell at (row, column).
    pub fn set_cell(&mut self, row: usize, column: usize, value: impl Into<String>) {
        self.rows[row][column] = value.into();
    }
}
