pub mod client;
pub mod seed;

pub use client::{FeedError, FeedSource, HttpFeedSource};
pub use seed::seed_snapshot;
