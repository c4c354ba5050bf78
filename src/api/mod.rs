//! Provider API layer for RingCentral Glip
//!
//! `GlipClient` performs single authenticated GETs with rate-limit
//! classification; `retry` wraps them in bounded backoff; `Pager` drives
//! paginated endpoints. The `GlipApi` trait is the seam the aggregation
//! engine consumes, so tests can substitute a fake provider.

pub mod client;
pub mod pager;
pub mod retry;

pub use client::GlipClient;
pub use pager::Pager;
pub use retry::{with_backoff, RetryPolicy};

use crate::error::ApiError;
use crate::models::{DateRange, Page, Person, Post, Room};

/// The provider operations the aggregation engine depends on.
///
/// Implemented by `GlipClient` over HTTP and by in-memory fakes in tests.
#[allow(async_fn_in_trait)]
pub trait GlipApi {
    /// One page of the authenticated user's groups.
    async fn groups_page(&self, page_token: Option<String>) -> Result<Page<Room>, ApiError>;

    /// One page of a room's posts within a date range.
    async fn posts_page(
        &self,
        room_id: &str,
        range: &DateRange,
        page_token: Option<String>,
    ) -> Result<Page<Post>, ApiError>;

    /// Look up a user record for display-name resolution.
    async fn person(&self, person_id: &str) -> Result<Person, ApiError>;
}
