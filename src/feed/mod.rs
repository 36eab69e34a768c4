//! Feed discovery from HTML `<link>` markers.
//!
//! The pipeline runs one marker at a time, in document order:
//!
//! - [`links`] - tolerant tokenizer yielding the attributes of each `<link>`
//! - [`classify`](mod@classify) - decides whether a marker advertises an RSS, Atom or OPML feed
//! - [`resolve`] - turns the marker's href into an absolute URL
//! - [`discovery`] - [`FeedFinder`], which adds robots.txt checks, fetching and
//!   deduplication on top
//!
//! # Example
//!
//! ```
//! use feedscout::feed::find_feeds_in_html;
//!
//! let html = r#"<head>
//!     <link rel="alternate" type="application/rss+xml" href="/feed.xml">
//!     <link rel="alternate" type="application/rss+xml" href="/feed.xml">
//! </head>"#;
//!
//! let feeds = find_feeds_in_html(html, "https://example.com/blog/post");
//! assert_eq!(feeds.len(), 1);
//! assert_eq!(feeds[0].url, "https://example.com/feed.xml");
//! ```

pub mod classify;
pub mod discovery;
pub mod links;
pub mod resolve;

pub use classify::{classify, FeedCandidate, FeedKind};
pub use discovery::{find_feeds_in_html, DiscoveredFeed, FeedFinder, DEFAULT_USER_AGENT};
pub use links::{extract_links, LinkAttributes, LinkTags};
pub use resolve::resolve_url;
