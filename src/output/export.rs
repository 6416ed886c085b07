//! Export file naming and writing

use crate::Result;
use chrono::{DateTime, Utc};
use std::io::Write;
use std::path::{Path, PathBuf};

/// MIME type of the produced file
pub const CSV_MIME_TYPE: &str = "text/csv;charset=UTF-8";

/// UTF-8 byte-order mark written before the CSV so spreadsheets pick the right encoding
pub const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

/// Builds `<prefix><YYYYMMDDHHMMSS>.csv` from a UTC timestamp
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use vndb_export::output::export_file_name;
///
/// let at = Utc.with_ymd_and_hms(2024, 2, 4, 12, 3, 35).unwrap();
/// assert_eq!(export_file_name("vndb-list-export-", at), "vndb-list-export-20240204120335.csv");
/// ```
pub fn export_file_name(prefix: &str, at: DateTime<Utc>) -> String {
    format!("{}{}.csv", prefix, at.format("%Y%m%d%H%M%S"))
}

/// Writes the BOM followed by the CSV text
pub fn write_export<W: Write>(mut writer: W, csv: &str) -> std::io::Result<()> {
    writer.write_all(&UTF8_BOM)?;
    writer.write_all(csv.as_bytes())?;
    writer.flush()
}

/// Writes an export file into `directory`, creating it if needed
///
/// # Returns
///
/// * `Ok(PathBuf)` - Path of the written file
/// * `Err(ExportError::Io)` - The directory or file could not be written
pub fn write_export_file(directory: &Path, file_name: &str, csv: &str) -> Result<PathBuf> {
    std::fs::create_dir_all(directory)?;
    let path = directory.join(file_name);
    let file = std::fs::File::create(&path)?;
    write_export(std::io::BufWriter::new(file), csv)?;
    tracing::info!(
        "Wrote {} bytes of {} to {}",
        csv.len() + UTF8_BOM.len(),
        CSV_MIME_TYPE,
        path.display()
    );
    Ok(path)
}
