//! ListRecords pagination loop with rate-limit backoff.

use std::time::Duration;

use anyhow::Result;
use chrono::NaiveDate;

use crate::parser::{self, ListPage};
use crate::record::Record;
use crate::request::HarvestRequest;
use crate::transport::{ListResponse, Transport};

/// Pause between successive page requests, independent of any Retry-After
/// directive the server sends.
pub const PAGE_DELAY: Duration = Duration::from_secs(20);

/// Why the harvest stopped producing pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Server signalled the end of the list.
    Complete,
    /// Too many consecutive 503 responses.
    RetriesExhausted,
    /// Transport or decode failure, reported through the final item.
    Failed,
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Complete => write!(f, "complete"),
            Self::RetriesExhausted => write!(f, "retries exhausted"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Sequential pagination engine over a [`Transport`].
///
/// Yields one decoded page per successful round trip. A 503 with a retry
/// directive is absorbed by sleeping and reissuing the same request, up to
/// `max_retries` consecutive times. One request is in flight at a time;
/// the consumer finishes with a page before the next request goes out.
pub struct Harvester<T> {
    transport: T,
    request: HarvestRequest,
    failures: u32,
    max_retries: u32,
    page_delay: Duration,
    pending_delay: bool,
    outcome: Option<Outcome>,
}

impl<T: Transport> Harvester<T> {
    pub fn new(transport: T, from: Option<NaiveDate>, max_retries: u32) -> Self {
        Self {
            transport,
            request: HarvestRequest::initial(from),
            failures: 0,
            max_retries,
            page_delay: PAGE_DELAY,
            pending_delay: false,
            outcome: None,
        }
    }

    /// Override the politeness pause between pages (tests use zero).
    pub fn with_page_delay(mut self, delay: Duration) -> Self {
        self.page_delay = delay;
        self
    }

    /// Why iteration ended; `None` while pages may still arrive.
    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    fn fetch_page(&mut self) -> Option<Result<Vec<Record>>> {
        loop {
            match self.transport.list_records(&self.request) {
                Err(e) => {
                    self.outcome = Some(Outcome::Failed);
                    return Some(Err(
                        anyhow::Error::new(e).context("ListRecords request failed")
                    ));
                }
                Ok(ListResponse::RetryAfter(wait)) => {
                    log::info!("Got 503, retrying after {}s", wait.as_secs());
                    std::thread::sleep(wait);
                    self.failures += 1;
                    if self.failures >= self.max_retries {
                        log::warn!(
                            "Giving up after {} consecutive 503 responses",
                            self.failures
                        );
                        self.outcome = Some(Outcome::RetriesExhausted);
                        return None;
                    }
                    // loop around and reissue the same request
                }
                Ok(ListResponse::Page(body)) => {
                    self.failures = 0;
                    let page = match parser::parse_list_records(&body) {
                        Ok(page) => page,
                        Err(e) => {
                            self.outcome = Some(Outcome::Failed);
                            return Some(Err(e));
                        }
                    };
                    self.advance(&page);
                    return Some(Ok(page.records));
                }
            }
        }
    }

    /// Move to the continuation request, or mark the run complete.
    fn advance(&mut self, page: &ListPage) {
        match page.continuation() {
            Some(token) => {
                log::debug!("Resumption token: {token}");
                self.request = HarvestRequest::resume(token);
                self.pending_delay = true;
            }
            None => {
                log::info!("Reached the end of the list");
                self.outcome = Some(Outcome::Complete);
            }
        }
    }
}

impl<T: Transport> Iterator for Harvester<T> {
    type Item = Result<Vec<Record>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.outcome.is_some() {
            return None;
        }
        // The politeness pause belongs between requests, not between a
        // response and its consumer; it runs when the next page is asked for.
        if std::mem::take(&mut self.pending_delay) {
            std::thread::sleep(self.page_delay);
        }
        self.fetch_page()
    }
}
