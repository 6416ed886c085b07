//! Crawler coordinator - pagination walk over a listing
//!
//! This module contains the crawl loop that coordinates:
//! - Detecting a fake starting URL and redirecting to the real first page
//! - Fetching each page in order through the retrying fetcher
//! - Extracting the table fragment and appending it to the export
//! - Following the next-page link until it disappears or a page fails

use crate::config::{Config, PaginationConfig};
use crate::crawler::fetcher::{HttpFetcher, PageFetcher};
use crate::crawler::parser::{parse_selector, HtmlParser, ScraperParser};
use crate::crawler::retry::{fetch_with_retry, RetryPolicy};
use crate::crawler::table::{extract_table, CsvFragment, TableTarget};
use crate::state::CrawlState;
use crate::url::{resolve_href, PageRef};
use crate::{ExportError, Result};
use std::sync::Arc;
use url::Url;

/// Result of a finished crawl
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlReport {
    /// The accumulated CSV: one header line, then body rows, each ending in `\n`
    pub export: String,

    /// Terminal state the crawl ended in
    pub state: CrawlState,

    /// Table pages that were fetched and extracted
    pub pages_fetched: u32,

    /// Body rows written to the export
    pub rows_exported: usize,

    /// Why the crawl stopped early, if it did
    pub last_error: Option<String>,
}

impl CrawlReport {
    /// True when the crawl reached the last page
    pub fn is_complete(&self) -> bool {
        self.state.is_success()
    }
}

/// Mutable state of one crawl
#[derive(Debug)]
pub struct CrawlSession {
    page: PageRef,
    state: CrawlState,
    export: String,
    header_written: bool,
    has_next: bool,
    pages_fetched: u32,
    rows_exported: usize,
    last_error: Option<String>,
}

impl CrawlSession {
    /// Starts a session at `location`, dropping any page number it carries
    pub fn new(location: &Url, page_param: &str) -> Self {
        let mut page = PageRef::from_url(location);
        page.remove(page_param);

        Self {
            page,
            state: CrawlState::DetectingFakeUrl,
            export: String::new(),
            header_written: false,
            has_next: false,
            pages_fetched: 0,
            rows_exported: 0,
            last_error: None,
        }
    }

    pub fn state(&self) -> CrawlState {
        self.state
    }

    pub fn page(&self) -> &PageRef {
        &self.page
    }

    pub fn export(&self) -> &str {
        &self.export
    }

    /// Moves to `next`, rejecting moves the state machine does not allow
    fn transition(&mut self, next: CrawlState) -> Result<()> {
        if !self.state.can_transition_to(&next) {
            return Err(ExportError::InvalidTransition {
                from: self.state,
                to: next,
            });
        }
        tracing::debug!("Crawl state: {} -> {}", self.state, next);
        self.state = next;
        Ok(())
    }

    /// Ends the crawl in `Failed`, keeping what has been accumulated
    fn fail(&mut self, error: ExportError) -> Result<()> {
        tracing::error!("Export stopped: {}", error);
        self.last_error = Some(error.to_string());
        self.transition(CrawlState::Failed)
    }

    /// Appends a page's fragment, keeping the header only the first time
    fn append(&mut self, fragment: &CsvFragment) {
        let lines = if self.header_written {
            fragment.body_lines()
        } else {
            self.header_written = !fragment.is_empty();
            fragment.lines()
        };

        for line in lines {
            self.export.push_str(line);
            self.export.push('\n');
        }
        self.rows_exported += fragment.row_count();
    }

    /// Points the session at the first page found through redirection
    fn rebase(&mut self, first_page: &Url, page_param: &str) {
        self.page = PageRef::from_url(first_page);
        self.page.remove(page_param);
    }

    fn into_report(self) -> CrawlReport {
        CrawlReport {
            export: self.export,
            state: self.state,
            pages_fetched: self.pages_fetched,
            rows_exported: self.rows_exported,
            last_error: self.last_error,
        }
    }
}

/// What one page contributed, extracted before the document is dropped
struct PageExtract {
    fragment: Option<CsvFragment>,
    has_next: bool,
}

/// Main crawler coordinator structure
pub struct Coordinator {
    fetcher: Arc<dyn PageFetcher>,
    parser: Arc<dyn HtmlParser>,
    retry: RetryPolicy,
    pagination: PaginationConfig,
    host: Url,
}

impl Coordinator {
    /// Creates a coordinator that fetches over HTTP
    pub fn new(config: &Config) -> Result<Self> {
        let fetcher = HttpFetcher::new(config)?;
        Self::with_fetcher(config, Arc::new(fetcher))
    }

    /// Creates a coordinator around a caller-supplied fetcher
    pub fn with_fetcher(config: &Config, fetcher: Arc<dyn PageFetcher>) -> Result<Self> {
        Ok(Self {
            fetcher,
            parser: Arc::new(ScraperParser),
            retry: RetryPolicy::from_config(&config.fetch),
            pagination: config.pagination.clone(),
            host: Url::parse(&config.target.host)?,
        })
    }

    /// Swaps the HTML parser
    pub fn with_parser(mut self, parser: Arc<dyn HtmlParser>) -> Self {
        self.parser = parser;
        self
    }

    /// Runs the crawl from `location` and returns the accumulated export
    ///
    /// Page failures never surface as errors: the report carries whatever
    /// was collected and a `Failed` state. Errors are returned only for
    /// invalid selectors or an internal state-machine violation.
    pub async fn run(&self, location: &Url, target: &TableTarget) -> Result<CrawlReport> {
        parse_selector(&target.selector)?;

        let mut session = CrawlSession::new(location, &self.pagination.page_param);
        tracing::info!("Starting {} export from {}", target.kind, location);

        if session.page.has(&self.pagination.fake_url_marker) {
            session.transition(CrawlState::RedirectingToFirstPage)?;
            self.redirect_to_first_page(&mut session, location, target)
                .await?;
        } else {
            session.transition(CrawlState::FetchingPage(1))?;
        }

        loop {
            match session.state() {
                CrawlState::FetchingPage(n) => self.process_page(&mut session, target, n).await?,
                CrawlState::CheckingNextPage(n) => {
                    if session.has_next {
                        session.transition(CrawlState::FetchingPage(n + 1))?;
                    } else {
                        tracing::info!("No next page after page {}", n);
                        session.transition(CrawlState::Done)?;
                    }
                }
                _ => break,
            }
        }

        tracing::info!(
            "Export {}: {} pages, {} rows",
            session.state,
            session.pages_fetched,
            session.rows_exported
        );

        Ok(session.into_report())
    }

    /// Locates and processes the real first page of a fake listing URL
    ///
    /// On success the session is left in `CheckingNextPage(1)` with its page
    /// reference rebased onto the first page.
    async fn redirect_to_first_page(
        &self,
        session: &mut CrawlSession,
        location: &Url,
        target: &TableTarget,
    ) -> Result<()> {
        tracing::info!("Detected fake URL: {}", location);

        let current = match fetch_with_retry(self.fetcher.as_ref(), location.as_str(), &self.retry).await {
            Ok(body) => body,
            Err(e) => return session.fail(e),
        };

        let href = self
            .parser
            .parse(&current)
            .attr_of(&self.pagination.first_tab_selector, "href")?;

        let Some(href) = href else {
            return session.fail(ExportError::NotFound {
                what: format!("first page link '{}'", self.pagination.first_tab_selector),
            });
        };

        let first_page = match resolve_href(&self.host, &href) {
            Ok(url) => url,
            Err(e) => return session.fail(e.into()),
        };
        tracing::info!("Redirecting to first page: {}", first_page);

        let body = match fetch_with_retry(self.fetcher.as_ref(), first_page.as_str(), &self.retry).await {
            Ok(body) => body,
            Err(e) => return session.fail(e),
        };

        let extract = self.extract_page(&body, target)?;
        session.pages_fetched += 1;
        session.rebase(&first_page, &self.pagination.page_param);

        match extract.fragment {
            Some(fragment) => session.append(&fragment),
            None => return session.transition(CrawlState::Done),
        }

        session.has_next = extract.has_next;
        session.transition(CrawlState::CheckingNextPage(1))
    }

    /// Fetches page `n`, appends its rows and records whether a next page exists
    async fn process_page(
        &self,
        session: &mut CrawlSession,
        target: &TableTarget,
        n: u32,
    ) -> Result<()> {
        session.page.set(&self.pagination.page_param, n.to_string());
        let url = session.page.to_url(&self.host);
        tracing::info!("Fetching data from page {}: {}", n, url);

        let body = match fetch_with_retry(self.fetcher.as_ref(), url.as_str(), &self.retry).await {
            Ok(body) => body,
            Err(e) => return session.fail(e),
        };

        let extract = self.extract_page(&body, target)?;
        session.pages_fetched += 1;

        match extract.fragment {
            Some(fragment) => {
                tracing::debug!("Page {} yielded {} rows", n, fragment.row_count());
                session.append(&fragment);
            }
            None => return session.transition(CrawlState::Done),
        }

        session.has_next = extract.has_next;
        session.transition(CrawlState::CheckingNextPage(n))
    }

    /// Parses a page and pulls out everything the walker needs from it
    ///
    /// A missing table is reported as `None`, meaning no more data.
    fn extract_page(&self, body: &str, target: &TableTarget) -> Result<PageExtract> {
        let document = self.parser.parse(body);

        let fragment = match extract_table(target, &document) {
            Ok(fragment) => Some(fragment),
            Err(ExportError::NotFound { what }) => {
                tracing::warn!("No {} on page, treating as end of data", what);
                None
            }
            Err(e) => return Err(e),
        };

        let has_next = document.exists(&self.pagination.next_selector)?;

        Ok(PageExtract { fragment, has_next })
    }
}

/// Runs a complete crawl over HTTP
///
/// # Example
///
/// ```no_run
/// use vndb_export::config::Config;
/// use vndb_export::crawler::{run_crawl, ListKind, TableTarget};
/// use url::Url;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let location = Url::parse("https://vndb.org/u2/ulist?vnlist=1")?;
/// let report = run_crawl(&Config::default(), &location, &TableTarget::new(ListKind::UserList)).await?;
/// println!("{}", report.export);
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: &Config, location: &Url, target: &TableTarget) -> Result<CrawlReport> {
    let coordinator = Coordinator::new(config)?;
    coordinator.run(location, target).await
}
