//! chatcount - per-user post activity across Glip team rooms
//!
//! The core is a session-scoped, rate-limited aggregation engine: it keeps
//! an access/refresh-token lifecycle per session, pages through the
//! provider's group and post endpoints under backoff, memoizes results
//! behind a TTL cache, and folds post records into per-room, per-user
//! counts. The CLI in main.rs is a thin shell over `engine::Engine`.

pub mod api;
pub mod auth;
pub mod cache;
pub mod config;
pub mod engine;
pub mod error;
pub mod models;
