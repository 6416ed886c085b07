//! In-memory fetcher used by the crawler unit tests

use crate::crawler::PageFetcher;
use crate::{ExportError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

/// Serves canned bodies by exact URL and records every request
#[derive(Default)]
pub(crate) struct ScriptedFetcher {
    pages: HashMap<String, String>,
    failures: Mutex<HashMap<String, u32>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedFetcher {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn page(mut self, url: &str, body: impl Into<String>) -> Self {
        self.pages.insert(url.to_string(), body.into());
        self
    }

    /// Makes the next `times` requests for `url` fail with a transport error
    pub(crate) fn fail(self, url: &str, times: u32) -> Self {
        self.failures
            .lock()
            .unwrap()
            .insert(url.to_string(), times);
        self
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn call_count(&self, url: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| *c == url).count()
    }
}

#[async_trait]
impl PageFetcher for ScriptedFetcher {
    async fn fetch_page(&self, url: &str) -> Result<String> {
        self.calls.lock().unwrap().push(url.to_string());

        {
            let mut failures = self.failures.lock().unwrap();
            if let Some(remaining) = failures.get_mut(url) {
                if *remaining > 0 {
                    *remaining -= 1;
                    return Err(ExportError::Transport {
                        url: url.to_string(),
                        message: "scripted failure".to_string(),
                    });
                }
            }
        }

        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| ExportError::Transport {
                url: url.to_string(),
                message: "no route".to_string(),
            })
    }
}
