//! Output module for delivering exports
//!
//! This module handles:
//! - Naming export files with a UTC timestamp
//! - Writing the CSV with a UTF-8 byte-order mark
//! - Summarizing a finished crawl

mod export;
pub mod stats;

pub use export::{
    export_file_name, write_export, write_export_file, CSV_MIME_TYPE, UTF8_BOM,
};
pub use stats::{print_statistics, ExportStatistics};
