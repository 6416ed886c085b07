/// Crawl state definitions for the pagination walker
///
/// A crawl starts in `DetectingFakeUrl`, optionally passes through
/// `RedirectingToFirstPage`, then alternates between fetching a page and
/// checking it for a next-page link until it lands in `Done` or `Failed`.
use std::fmt;

/// Represents where a crawl currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlState {
    // ===== Setup =====
    /// Inspecting the starting location for the fake-URL marker
    DetectingFakeUrl,

    /// Fetching the real first page named by the tab navigation
    RedirectingToFirstPage,

    // ===== Pagination loop =====
    /// Fetching and extracting page `n`
    FetchingPage(u32),

    /// Looking for a next-page link on page `n`
    CheckingNextPage(u32),

    // ===== Terminal =====
    /// No next page remained
    Done,

    /// A page could not be fetched, or the first page could not be located
    Failed,
}

impl CrawlState {
    /// Returns true if the crawl has stopped
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    /// Returns true if this represents a successful completion
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// Page number this state refers to, if any
    pub fn page(&self) -> Option<u32> {
        match self {
            Self::FetchingPage(n) | Self::CheckingNextPage(n) => Some(*n),
            _ => None,
        }
    }

    /// Checks whether the walker may move from this state to `next`
    ///
    /// `Failed` is reachable from every non-terminal state; terminal states
    /// never transition.
    pub fn can_transition_to(&self, next: &CrawlState) -> bool {
        use CrawlState::*;

        match (self, next) {
            (Done | Failed, _) => false,
            (_, Failed) => true,

            (DetectingFakeUrl, RedirectingToFirstPage) => true,
            (DetectingFakeUrl, FetchingPage(1)) => true,

            (RedirectingToFirstPage, CheckingNextPage(1)) => true,

            (FetchingPage(n), CheckingNextPage(m)) => n == m,
            // A page whose table is gone ends the crawl without a next-page check
            (FetchingPage(_) | RedirectingToFirstPage, Done) => true,

            (CheckingNextPage(n), FetchingPage(m)) => *m == n + 1,
            (CheckingNextPage(_), Done) => true,

            _ => false,
        }
    }
}

impl fmt::Display for CrawlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DetectingFakeUrl => write!(f, "detecting fake url"),
            Self::RedirectingToFirstPage => write!(f, "redirecting to first page"),
            Self::FetchingPage(n) => write!(f, "fetching page {}", n),
            Self::CheckingNextPage(n) => write!(f, "checking for page {}", n + 1),
            Self::Done => write!(f, "done"),
            Self::Failed => write!(f, "failed"),
        }
    }
}
