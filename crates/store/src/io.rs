//! CSV and JSON persistence of prospect records, chosen by file extension.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::records::ProspectRecord;

#[derive(Debug, Error)]
pub enum FileError {
    #[error("could not open `{path}`: {source}")]
    Io { path: PathBuf, source: std::io::Error },
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported file `{0}` (expected .csv or .json)")]
    UnsupportedFormat(PathBuf),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileFormat {
    Csv,
    Json,
}

impl FileFormat {
    pub fn from_path(path: &Path) -> Result<Self, FileError> {
        match path.extension().and_then(|ext| ext.to_str()).map(str::to_ascii_lowercase).as_deref() {
            Some("csv") => Ok(Self::Csv),
            Some("json") => Ok(Self::Json),
            _ => Err(FileError::UnsupportedFormat(path.to_path_buf())),
        }
    }
}

pub fn read_records(path: &Path) -> Result<Vec<ProspectRecord>, FileError> {
    let format = FileFormat::from_path(path)?;
    let file =
        File::open(path).map_err(|source| FileError::Io { path: path.to_path_buf(), source })?;
    let reader = BufReader::new(file);
    match format {
        FileFormat::Csv => read_csv(reader),
        FileFormat::Json => read_json(reader),
    }
}

pub fn write_records(path: &Path, records: &[ProspectRecord]) -> Result<(), FileError> {
    let format = FileFormat::from_path(path)?;
    let file =
        File::create(path).map_err(|source| FileError::Io { path: path.to_path_buf(), source })?;
    let mut writer = BufWriter::new(file);
    match format {
        FileFormat::Csv => write_csv(&mut writer, records)?,
        FileFormat::Json => write_json(&mut writer, records)?,
    }
    writer.flush().map_err(|source| FileError::Io { path: path.to_path_buf(), source })
}

/// Reads CSV with a header row. Columns are matched by name, so extra or reordered columns
/// are accepted and missing ones take their defaults.
pub fn read_csv<R: Read>(reader: R) -> Result<Vec<ProspectRecord>, FileError> {
    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::Headers).from_reader(reader);
    csv_reader.deserialize().map(|row| row.map_err(FileError::from)).collect()
}

pub fn write_csv<W: Write>(writer: W, records: &[ProspectRecord]) -> Result<(), FileError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for record in records {
        csv_writer.serialize(record)?;
    }
    csv_writer.flush().map_err(|source| FileError::Csv(csv::Error::from(source)))
}

/// Reads a JSON array of records.
pub fn read_json<R: Read>(reader: R) -> Result<Vec<ProspectRecord>, FileError> {
    Ok(serde_json::from_reader(reader)?)
}

pub fn write_json<W: Write>(writer: W, records: &[ProspectRecord]) -> Result<(), FileError> {
    Ok(serde_json::to_writer_pretty(writer, records)?)
}
