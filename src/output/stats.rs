//! Statistics for a finished export
//!
//! This module summarizes a crawl report for display on the command line.

use crate::crawler::CrawlReport;
use crate::state::CrawlState;
use std::path::PathBuf;

/// Export statistics summary
#[derive(Debug, Clone)]
pub struct ExportStatistics {
    /// Terminal crawl state
    pub state: CrawlState,

    /// Table pages fetched and extracted
    pub pages_fetched: u32,

    /// Body rows in the export
    pub rows_exported: usize,

    /// Size of the CSV text in bytes, without the BOM
    pub bytes: usize,

    /// Where the export was written, if it went to a file
    pub output_path: Option<PathBuf>,

    /// Why the crawl stopped early
    pub last_error: Option<String>,
}

impl ExportStatistics {
    pub fn from_report(report: &CrawlReport, output_path: Option<PathBuf>) -> Self {
        Self {
            state: report.state,
            pages_fetched: report.pages_fetched,
            rows_exported: report.rows_exported,
            bytes: report.export.len(),
            output_path,
            last_error: report.last_error.clone(),
        }
    }

    /// True when the export ended early and holds only part of the list
    pub fn is_partial(&self) -> bool {
        !self.state.is_success()
    }
}

/// Prints statistics to stderr in a formatted manner
///
/// Stderr keeps stdout clean when the CSV itself is written there.
pub fn print_statistics(stats: &ExportStatistics) {
    eprintln!("=== Export Statistics ===\n");

    eprintln!("  Final state: {}", stats.state);
    eprintln!("  Pages fetched: {}", stats.pages_fetched);
    eprintln!("  Rows exported: {}", stats.rows_exported);
    eprintln!("  CSV size: {} bytes", stats.bytes);

    if let Some(path) = &stats.output_path {
        eprintln!("  Output: {}", path.display());
    }

    if stats.is_partial() {
        eprintln!();
        eprintln!("Export is partial.");
        if let Some(error) = &stats.last_error {
            eprintln!("  Reason: {}", error);
        }
    }
}
