//! Table extraction and CSV fragment assembly
//!
//! This module turns one parsed listing page into a CSV fragment:
//! - header rows come from `thead tr`, body rows from `tbody tr`
//! - every cell is cleaned and double-quote wrapped
//! - a line-based cleanup pass removes blank and empty-cell artifacts

use crate::crawler::parser::{text_of, TableDocument};
use crate::{ExportError, Result, UrlError, UrlResult};
use std::fmt;
use url::Url;

/// Ideographic (full-width) space
const FULL_WIDTH_SPACE: char = '\u{3000}';

/// Sort and filter markers rendered inside header cells
const HEADER_MARKERS: &[&str] = &["▴", "▾", "Opt"];

/// Decorative glyphs rendered inside body cells
const BODY_MARKERS: &[&str] = &[" 👁", "▾"];

/// Which VNDB listing a table comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListKind {
    /// A user's VN list (`/u<id>/ulist`)
    UserList,
    /// A user's length votes (`/u<id>/lengthvotes`)
    LengthVotes,
}

impl ListKind {
    /// Picks the list kind from a location's path
    ///
    /// # Examples
    ///
    /// ```
    /// use url::Url;
    /// use vndb_export::crawler::ListKind;
    ///
    /// let url = Url::parse("https://vndb.org/u2/lengthvotes?p=4").unwrap();
    /// assert_eq!(ListKind::detect(&url).unwrap(), ListKind::LengthVotes);
    /// ```
    pub fn detect(url: &Url) -> UrlResult<Self> {
        let path = url.path();
        if path.contains("ulist") {
            Ok(Self::UserList)
        } else if path.contains("lengthvotes") {
            Ok(Self::LengthVotes)
        } else {
            Err(UrlError::UnsupportedList(url.to_string()))
        }
    }

    pub fn default_selector(&self) -> &'static str {
        match self {
            Self::UserList => ".ulist.browse > table",
            Self::LengthVotes => ".lengthlist.browse > table",
        }
    }

    /// Whether column 0 carries a `current/total` counter to strip
    pub fn strips_counter(&self) -> bool {
        matches!(self, Self::UserList)
    }

    pub fn file_prefix(&self) -> &'static str {
        match self {
            Self::UserList => "vndb-list-export-",
            Self::LengthVotes => "vndb-lengthvotes-export-",
        }
    }
}

impl fmt::Display for ListKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UserList => write!(f, "user list"),
            Self::LengthVotes => write!(f, "length votes"),
        }
    }
}

/// The table to extract on every page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableTarget {
    pub selector: String,
    pub kind: ListKind,
}

impl TableTarget {
    pub fn new(kind: ListKind) -> Self {
        Self {
            selector: kind.default_selector().to_string(),
            kind,
        }
    }

    /// Replaces the kind's default selector; cleaning rules still follow the kind
    pub fn with_selector(mut self, selector: impl Into<String>) -> Self {
        self.selector = selector.into();
        self
    }
}

/// The cleaned CSV lines taken from one page; the first line is the header
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CsvFragment {
    lines: Vec<String>,
}

impl CsvFragment {
    /// Runs the cleanup pass over raw fragment text
    pub fn from_raw(raw: &str) -> Self {
        let cleaned = cleanup_csv(raw);
        Self {
            lines: cleaned
                .split('\n')
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }

    pub fn header(&self) -> Option<&str> {
        self.lines.first().map(String::as_str)
    }

    /// Every line after the header
    pub fn body_lines(&self) -> &[String] {
        self.lines.get(1..).unwrap_or(&[])
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn row_count(&self) -> usize {
        self.body_lines().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl fmt::Display for CsvFragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.lines.join("\n"))
    }
}

/// Extracts the target table from a parsed page
///
/// # Returns
///
/// * `Ok(CsvFragment)` - header line followed by body lines
/// * `Err(ExportError::NotFound)` - no element matches the table selector
/// * `Err(ExportError::Selector)` - the table selector does not parse
pub fn extract_table(target: &TableTarget, document: &TableDocument) -> Result<CsvFragment> {
    let table = document
        .select_one(&target.selector)?
        .ok_or_else(|| ExportError::NotFound {
            what: format!("table '{}'", target.selector),
        })?;

    let mut raw = String::new();

    for row in document.select_within(table, "thead tr")? {
        let cells: Vec<String> = document
            .select_within(row, "td, th")?
            .into_iter()
            .map(|cell| quote_cell(&clean_header_cell(&text_of(cell))))
            .collect();
        raw.push_str(&cells.join(","));
        raw.push('\n');
    }

    for row in document.select_within(table, "tbody tr")? {
        let cells: Vec<String> = document
            .select_within(row, "td, th")?
            .into_iter()
            .enumerate()
            .map(|(column, cell)| quote_cell(&clean_body_cell(&text_of(cell), column, target.kind)))
            .collect();
        raw.push_str(&cells.join(","));
        raw.push('\n');
    }

    Ok(CsvFragment::from_raw(&raw))
}

/// Cleans a header cell: trim, drop sort/filter markers, trim what they left
pub fn clean_header_cell(text: &str) -> String {
    let mut cell = trim_cell(text).to_string();
    for marker in HEADER_MARKERS {
        cell = cell.replace(marker, "");
    }
    trim_cell(&cell).to_string()
}

/// Cleans a body cell
///
/// Steps, in order: trim, drop decorative glyphs, full-width spaces to ASCII,
/// strip the column-0 counter (user lists only), newlines to spaces.
pub fn clean_body_cell(text: &str, column: usize, kind: ListKind) -> String {
    let mut cell = trim_cell(text).to_string();
    for marker in BODY_MARKERS {
        cell = cell.replace(marker, "");
    }

    cell = cell.replace(FULL_WIDTH_SPACE, " ");

    if column == 0 && kind.strips_counter() {
        cell = strip_counter(&cell).to_string();
    }

    cell.replace("\r\n", " ")
        .replace(|c: char| c == '\r' || c == '\n', " ")
}

/// Wraps a cell in double quotes, doubling any embedded quotes
///
/// # Examples
///
/// ```
/// use vndb_export::crawler::quote_cell;
///
/// assert_eq!(quote_cell(r#"say "hi""#), r#""say ""hi""""#);
/// assert_eq!(quote_cell(""), r#""""#);
/// ```
pub fn quote_cell(cell: &str) -> String {
    format!("\"{}\"", cell.replace('"', "\"\""))
}

/// Cleans up assembled fragment text
///
/// The header rule runs once, on the first line as extracted, so a body row
/// moved up by a pruned header is never treated as a header. The remaining
/// rules repeat until the text stops changing.
pub fn cleanup_csv(text: &str) -> String {
    let text = match text.split_once('\n') {
        Some((header, rest)) => format!("{}\n{}", strip_separator_spaces(header), rest),
        None => strip_separator_spaces(text),
    };

    let mut current = cleanup_pass(&text);
    loop {
        let next = cleanup_pass(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

/// One pass of the line cleanup rules
fn cleanup_pass(text: &str) -> String {
    let mut lines: Vec<String> = Vec::new();

    for line in text.split('\n') {
        let mut line = line.trim_end();

        while let Some(rest) = line.trim_start().strip_prefix(',') {
            line = rest;
        }

        if line == "\"\"," || line == "\"\"" || line.is_empty() {
            continue;
        }

        lines.push(line.to_string());
    }

    lines.join("\n")
}

/// Drops spaces before a separator comma; text inside quoted cells is kept
fn strip_separator_spaces(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut quoted = false;

    for c in line.chars() {
        match c {
            '"' => quoted = !quoted,
            ',' if !quoted => {
                let kept = out.trim_end_matches(' ').len();
                out.truncate(kept);
            }
            _ => {}
        }
        out.push(c);
    }

    out
}

/// Trims surrounding whitespace but keeps full-width spaces for normalization
fn trim_cell(text: &str) -> &str {
    text.trim_matches(|c: char| c.is_whitespace() && c != FULL_WIDTH_SPACE)
}

/// Removes a leading `digits/digits` counter
fn strip_counter(cell: &str) -> &str {
    let digits = |s: &str| s.bytes().take_while(u8::is_ascii_digit).count();

    let numerator = digits(cell);
    if numerator == 0 {
        return cell;
    }
    let Some(rest) = cell[numerator..].strip_prefix('/') else {
        return cell;
    };
    let denominator = digits(rest);
    if denominator == 0 {
        return cell;
    }
    &rest[denominator..]
}
