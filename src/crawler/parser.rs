//! HTML parsing capability
//!
//! This module wraps the HTML parser behind a small interface the extractor
//! and walker need:
//! - parse text into a queryable document
//! - query one element / all elements within a root
//! - text content of an element
//! - attribute lookup for pagination links

use crate::{ExportError, Result};
use scraper::{ElementRef, Html, Selector};

/// Turns fetched text into a queryable document
pub trait HtmlParser: Send + Sync {
    fn parse(&self, html: &str) -> TableDocument;
}

/// Default parser backed by `scraper`
#[derive(Debug, Clone, Copy, Default)]
pub struct ScraperParser;

impl HtmlParser for ScraperParser {
    fn parse(&self, html: &str) -> TableDocument {
        TableDocument::parse(html)
    }
}

/// A parsed page, alive only while one page is processed
pub struct TableDocument {
    html: Html,
}

impl TableDocument {
    /// Parses a full HTML document
    ///
    /// # Example
    ///
    /// ```
    /// use vndb_export::crawler::TableDocument;
    ///
    /// let doc = TableDocument::parse(r#"<div class="browsetabs"><a rel="next" href="?p=2">next</a></div>"#);
    /// assert_eq!(doc.attr_of(r#".browsetabs a[rel="next"]"#, "href").unwrap(), Some("?p=2".to_string()));
    /// ```
    pub fn parse(html: &str) -> Self {
        Self {
            html: Html::parse_document(html),
        }
    }

    /// First element matching `css`, in document order
    pub fn select_one(&self, css: &str) -> Result<Option<ElementRef<'_>>> {
        let selector = parse_selector(css)?;
        let first = self.html.select(&selector).next();
        Ok(first)
    }

    /// Every element below `root` matching `css`, in document order
    pub fn select_within<'a>(&self, root: ElementRef<'a>, css: &str) -> Result<Vec<ElementRef<'a>>> {
        let selector = parse_selector(css)?;
        let elements = root.select(&selector).collect();
        Ok(elements)
    }

    /// Whether any element matches `css`
    pub fn exists(&self, css: &str) -> Result<bool> {
        Ok(self.select_one(css)?.is_some())
    }

    /// Attribute `name` of the first element matching `css`
    pub fn attr_of(&self, css: &str, name: &str) -> Result<Option<String>> {
        Ok(self
            .select_one(css)?
            .and_then(|element| element.value().attr(name))
            .map(str::to_string))
    }
}

/// Concatenated text of an element and all its descendants
pub fn text_of(element: ElementRef<'_>) -> String {
    element.text().collect()
}

/// Compiles a CSS selector, mapping failures to [`ExportError::Selector`]
pub fn parse_selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| ExportError::Selector {
        selector: css.to_string(),
        message: format!("{:?}", e),
    })
}
