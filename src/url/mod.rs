//! URL handling module for vndb-export
//!
//! This module provides the mutable page reference the pagination walker
//! rewrites between pages, and resolution of hrefs found in fetched documents
//! against the target host.

mod page_ref;
mod resolve;

// Re-export main types and functions
pub use page_ref::PageRef;
pub use resolve::{lengthvotes_url, parse_location, resolve_href};
