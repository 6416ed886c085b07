//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `CrawlState`: where the pagination walker is in its state machine

mod crawl_state;

// Re-export main types
pub use crawl_state::CrawlState;
