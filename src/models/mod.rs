//! Data models for Glip entities

mod page;
mod post;
mod range;
mod room;

pub use page::*;
pub use post::*;
pub use range::*;
pub use room::*;
