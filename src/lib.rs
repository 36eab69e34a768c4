//! Discover the RSS, Atom and OPML feeds a web page advertises.
//!
//! A [`FeedFinder`] fetches the page, scans its `<link>` markers and returns
//! absolute, deduplicated feed URLs. By default it first consults the site's
//! robots.txt and returns nothing for a disallowed page.
//!
//! Every failure degrades to an empty result: invalid URLs, unreachable hosts
//! and malformed markup never surface as errors.

pub mod config;
pub mod feed;
pub mod fetcher;
pub mod robots;
pub mod util;

pub use feed::{DiscoveredFeed, FeedFinder, FeedKind, DEFAULT_USER_AGENT};
pub use fetcher::{Fetcher, HttpFetcher};
