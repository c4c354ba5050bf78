//! Continuation-token pagination
//!
//! Drives a fetch function across successive pages, threading each page's
//! continuation token into the next request. The sequence is lazy, finite,
//! and non-restartable; tokens are never reused across filter parameters
//! because each `Pager` owns exactly one (endpoint, filter) combination via
//! its fetch closure.

use std::future::Future;

use crate::error::ApiError;
use crate::models::Page;

/// Lazily yields batches of records from a paginated endpoint.
///
/// The first fetch runs without a token. Pagination ends on a page without
/// a continuation token, or on the first error; an error truncates the
/// sequence, and records from earlier pages remain valid partial data.
pub struct Pager<F> {
    fetch: F,
    next_token: Option<String>,
    started: bool,
    done: bool,
}

impl<T, F, Fut> Pager<F>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<Page<T>, ApiError>>,
{
    pub fn new(fetch: F) -> Self {
        Self {
            fetch,
            next_token: None,
            started: false,
            done: false,
        }
    }

    /// Fetch the next batch of records, or `None` once exhausted.
    pub async fn next_page(&mut self) -> Option<Result<Vec<T>, ApiError>> {
        if self.done {
            return None;
        }
        let token = if self.started {
            // A started pager with no stored token already yielded its
            // final page.
            match self.next_token.take() {
                Some(token) => Some(token),
                None => {
                    self.done = true;
                    return None;
                }
            }
        } else {
            self.started = true;
            None
        };

        match (self.fetch)(token).await {
            Ok(page) => {
                self.next_token = page.next_token().map(String::from);
                if self.next_token.is_none() {
                    self.done = true;
                }
                Some(Ok(page.records))
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}
