use serde::Serialize;
use std::collections::HashSet;
use url::Url;

use super::classify::{classify, FeedKind};
use super::links::extract_links;
use super::resolve::resolve_url;
use crate::fetcher::{Fetcher, HttpFetcher};
use crate::robots;
use crate::util::{validate_public_url, validate_url};

/// Agent identity used for robots evaluation and fetching unless overridden.
pub const DEFAULT_USER_AGENT: &str = "Googlebot";

/// A feed advertised by a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscoveredFeed {
    /// Absolute URL of the feed
    pub url: String,
    /// Type check the advertising marker satisfied
    pub kind: FeedKind,
}

/// Discovers the feeds a page advertises through `<link>` markers.
///
/// Holds the target page, the agent identity and whether robots.txt is
/// honored. Setters chain and ignore empty strings, so a finder can be built
/// up from optional inputs without clobbering defaults.
///
/// Nothing here returns an error. An invalid target yields no feeds (and a
/// `false` robots verdict), and fetch failures count as empty documents.
///
/// # Example
///
/// ```no_run
/// use feedscout::FeedFinder;
///
/// # async fn run() {
/// let mut finder = FeedFinder::new("https://example.com/blog/");
/// finder.set_user_agent("MyReader/1.0").set_obey_robots(true);
///
/// for url in finder.get_feeds().await {
///     println!("{url}");
/// }
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct FeedFinder<F = HttpFetcher> {
    url: String,
    user_agent: String,
    obey_robots: bool,
    block_private_hosts: bool,
    fetcher: F,
}

impl FeedFinder<HttpFetcher> {
    /// Creates a finder backed by an [`HttpFetcher`] with default limits.
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_fetcher(url, HttpFetcher::default())
    }
}

impl<F: Fetcher> FeedFinder<F> {
    /// Creates a finder that retrieves documents through `fetcher`.
    pub fn with_fetcher(url: impl Into<String>, fetcher: F) -> Self {
        Self {
            url: url.into(),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            obey_robots: true,
            block_private_hosts: false,
            fetcher,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub fn obey_robots(&self) -> bool {
        self.obey_robots
    }

    pub fn block_private_hosts(&self) -> bool {
        self.block_private_hosts
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Sets the target page. An empty string leaves the current value.
    pub fn set_url(&mut self, url: impl Into<String>) -> &mut Self {
        let url = url.into();
        if !url.is_empty() {
            self.url = url;
        }
        self
    }

    /// Sets the agent identity. An empty string leaves the current value.
    pub fn set_user_agent(&mut self, user_agent: impl Into<String>) -> &mut Self {
        let user_agent = user_agent.into();
        if !user_agent.is_empty() {
            self.user_agent = user_agent;
        }
        self
    }

    pub fn set_obey_robots(&mut self, obey_robots: bool) -> &mut Self {
        self.obey_robots = obey_robots;
        self
    }

    /// When set, targets on localhost or private networks count as invalid.
    pub fn set_block_private_hosts(&mut self, block: bool) -> &mut Self {
        self.block_private_hosts = block;
        self
    }

    /// Checks robots.txt for the target page, whether or not robots are obeyed.
    ///
    /// Returns `false` for a missing or invalid target URL and `true` when no
    /// robots policy can be retrieved.
    pub async fn robots_allowed(&self) -> bool {
        match self.target() {
            Some(target) => robots::check_allowed(&self.fetcher, &target, &self.user_agent).await,
            None => false,
        }
    }

    /// Lists the feed URLs the target page advertises.
    ///
    /// URLs are absolute, unique and in order of first appearance.
    pub async fn get_feeds(&self) -> Vec<String> {
        self.discover()
            .await
            .into_iter()
            .map(|feed| feed.url)
            .collect()
    }

    /// Like [`get_feeds`](Self::get_feeds), keeping the kind of each feed.
    pub async fn discover(&self) -> Vec<DiscoveredFeed> {
        let Some(target) = self.target() else {
            return Vec::new();
        };

        if self.obey_robots
            && !robots::check_allowed(&self.fetcher, &target, &self.user_agent).await
        {
            tracing::debug!(
                url = %target,
                user_agent = %self.user_agent,
                "Page disallowed by robots.txt, skipping"
            );
            return Vec::new();
        }

        let html = self.fetcher.fetch(target.as_str(), &self.user_agent).await;
        if html.is_empty() {
            tracing::debug!(url = %target, "Page is empty or unreachable");
            return Vec::new();
        }

        let feeds = find_feeds_in_html(&html, target.as_str());
        tracing::debug!(url = %target, count = feeds.len(), "Discovered feeds");
        feeds
    }

    fn target(&self) -> Option<Url> {
        let result = if self.block_private_hosts {
            validate_public_url(&self.url)
        } else {
            validate_url(&self.url)
        };

        match result {
            Ok(url) => Some(url),
            Err(e) => {
                tracing::debug!(url = %self.url, error = %e, "Rejecting target URL");
                None
            }
        }
    }
}

/// Runs extraction, classification and resolution over an HTML document.
///
/// Entries are unique by resolved URL; when two markers resolve to the same
/// URL the first one's kind is kept.
///
/// ```
/// use feedscout::feed::{find_feeds_in_html, FeedKind};
///
/// let html = r#"<link rel="alternate" type="application/rss+xml" href="feed.xml">"#;
/// let feeds = find_feeds_in_html(html, "https://example.com/blog/post");
/// assert_eq!(feeds[0].url, "https://example.com/blog/feed.xml");
/// assert_eq!(feeds[0].kind, FeedKind::Rss);
/// ```
pub fn find_feeds_in_html(html: &str, base_url: &str) -> Vec<DiscoveredFeed> {
    let mut seen = HashSet::new();

    extract_links(html)
        .filter_map(|attrs| classify(&attrs))
        .filter_map(|candidate| {
            let url = resolve_url(&candidate.href, base_url);
            seen.insert(url.clone()).then_some(DiscoveredFeed {
                url,
                kind: candidate.kind,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use std::collections::HashMap;
    use std::future::Future;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// In-memory fetcher: unknown URLs are empty, like a failed request.
    #[derive(Default)]
    struct StaticFetcher {
        pages: HashMap<String, String>,
        calls: AtomicUsize,
    }

    impl StaticFetcher {
        fn with(mut self, url: &str, body: &str) -> Self {
            self.pages.insert(url.to_owned(), body.to_owned());
            self
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl Fetcher for StaticFetcher {
        fn fetch(&self, url: &str, _user_agent: &str) -> impl Future<Output = String> + Send {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let body = self.pages.get(url).cloned().unwrap_or_default();
            async move { body }
        }
    }

    const PAGE_URL: &str = "https://example.com/blog/post";
    const ROBOTS_URL: &str = "https://example.com/robots.txt";

    const PAGE: &str = r#"<html><head>
        <link rel="stylesheet" href="/style.css">
        <link rel="alternate" type="application/rss+xml" href="a.xml" title="RSS">
        <link rel="alternate" type="application/atom+xml" href="b.xml">
    </head><body></body></html>"#;

    fn finder(fetcher: StaticFetcher) -> FeedFinder<StaticFetcher> {
        FeedFinder::with_fetcher(PAGE_URL, fetcher)
    }

    #[test]
    fn test_defaults() {
        let f = finder(StaticFetcher::default());
        assert_eq!(f.url(), PAGE_URL);
        assert_eq!(f.user_agent(), "Googlebot");
        assert!(f.obey_robots());
        assert!(!f.block_private_hosts());
    }

    #[test]
    fn test_setters_chain_and_ignore_empty() {
        let mut f = finder(StaticFetcher::default());
        f.set_user_agent("FeedBot/1.0")
            .set_url("https://example.org/")
            .set_obey_robots(false);
        assert_eq!(f.user_agent(), "FeedBot/1.0");
        assert_eq!(f.url(), "https://example.org/");
        assert!(!f.obey_robots());

        f.set_user_agent("").set_url("");
        assert_eq!(f.user_agent(), "FeedBot/1.0");
        assert_eq!(f.url(), "https://example.org/");
    }

    #[tokio::test]
    async fn test_get_feeds_resolves_each_marker() {
        let f = finder(StaticFetcher::default().with(PAGE_URL, PAGE));
        assert_eq!(
            f.get_feeds().await,
            vec![
                "https://example.com/blog/a.xml".to_string(),
                "https://example.com/blog/b.xml".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_discover_reports_kinds() {
        let f = finder(StaticFetcher::default().with(PAGE_URL, PAGE));
        let kinds: Vec<FeedKind> = f.discover().await.into_iter().map(|d| d.kind).collect();
        assert_eq!(kinds, vec![FeedKind::Rss, FeedKind::Atom]);
    }

    #[tokio::test]
    async fn test_invalid_targets_yield_nothing() {
        for url in ["", "not a url", "/relative", "ftp://example.com/"] {
            let f = FeedFinder::with_fetcher(url, StaticFetcher::default().with(PAGE_URL, PAGE));
            assert!(f.get_feeds().await.is_empty(), "feeds for {url:?}");
            assert!(!f.robots_allowed().await, "robots for {url:?}");
            assert_eq!(f.fetcher().calls(), 0);
        }
    }

    #[tokio::test]
    async fn test_missing_robots_allows() {
        let f = finder(StaticFetcher::default());
        assert!(f.robots_allowed().await);
    }

    #[tokio::test]
    async fn test_disallowed_page_is_not_fetched() {
        let fetcher = StaticFetcher::default()
            .with(ROBOTS_URL, "User-agent: *\nDisallow: /blog")
            .with(PAGE_URL, PAGE);
        let f = finder(fetcher);

        assert!(!f.robots_allowed().await);
        assert!(f.get_feeds().await.is_empty());
        // robots_allowed + discover each fetched robots.txt only
        assert_eq!(f.fetcher().calls(), 2);
    }

    #[tokio::test]
    async fn test_ignoring_robots_skips_robots_fetch() {
        let fetcher = StaticFetcher::default()
            .with(ROBOTS_URL, "User-agent: *\nDisallow: /")
            .with(PAGE_URL, PAGE);
        let mut f = finder(fetcher);
        f.set_obey_robots(false);

        assert_eq!(f.get_feeds().await.len(), 2);
        assert_eq!(f.fetcher().calls(), 1);
        // The standalone check still answers truthfully
        assert!(!f.robots_allowed().await);
    }

    #[tokio::test]
    async fn test_robots_rules_for_other_agents_do_not_block() {
        let fetcher = StaticFetcher::default()
            .with(ROBOTS_URL, "User-agent: Bingbot\nDisallow: /")
            .with(PAGE_URL, PAGE);
        let f = finder(fetcher);
        assert_eq!(f.get_feeds().await.len(), 2);
    }

    #[tokio::test]
    async fn test_configured_agent_is_used_for_robots() {
        let fetcher = StaticFetcher::default()
            .with(ROBOTS_URL, "User-agent: FeedBot\nDisallow: /blog/")
            .with(PAGE_URL, PAGE);
        let mut f = finder(fetcher);
        assert!(f.robots_allowed().await);

        f.set_user_agent("feedbot");
        assert!(!f.robots_allowed().await);
        assert!(f.get_feeds().await.is_empty());
    }

    #[tokio::test]
    async fn test_empty_page_yields_nothing() {
        let f = finder(StaticFetcher::default());
        assert!(f.get_feeds().await.is_empty());
    }

    #[tokio::test]
    async fn test_block_private_hosts() {
        let page_url = "http://127.0.0.1:8080/";
        let fetcher = StaticFetcher::default().with(page_url, PAGE);
        let mut f = FeedFinder::with_fetcher(page_url, fetcher);
        f.set_obey_robots(false);
        assert_eq!(f.get_feeds().await.len(), 2);

        f.set_block_private_hosts(true);
        assert!(f.get_feeds().await.is_empty());
        assert!(!f.robots_allowed().await);
    }

    #[test]
    fn test_duplicates_collapse_to_first() {
        let html = r#"
            <link rel="alternate" type="application/rss+xml" href="/feed.xml">
            <link rel="alternate" type="text/xml" href="https://example.com/feed.xml">
            <link rel="alternate" type="application/atom+xml" href="/atom.xml">
            <link rel="alternate" type="application/rss+xml" href="../blog/../feed.xml">
        "#;
        assert_eq!(
            find_feeds_in_html(html, PAGE_URL),
            vec![
                DiscoveredFeed {
                    url: "https://example.com/feed.xml".to_string(),
                    kind: FeedKind::Rss,
                },
                DiscoveredFeed {
                    url: "https://example.com/atom.xml".to_string(),
                    kind: FeedKind::Atom,
                },
                DiscoveredFeed {
                    url: "https://example.com/blog/../blog/../feed.xml".to_string(),
                    kind: FeedKind::Rss,
                },
            ]
        );
    }

    #[test]
    fn test_opml_and_legacy_types() {
        let html = r#"
            <link rel="outline" type="text/x-opml" href="/subs.opml">
            <link rel="alternate" type="text/xml" href="/legacy">
            <link rel="alternate" type="application/xml" href="/not-a-feed.xml">
        "#;
        let feeds = find_feeds_in_html(html, "https://example.com/");
        assert_eq!(
            feeds,
            vec![
                DiscoveredFeed {
                    url: "https://example.com/subs.opml".to_string(),
                    kind: FeedKind::Opml,
                },
                DiscoveredFeed {
                    url: "https://example.com/legacy".to_string(),
                    kind: FeedKind::RssLegacyXml,
                },
            ]
        );
    }

    #[test]
    fn test_malformed_markers_are_skipped() {
        let html = r#"
            <link rel="alternate">
            <link type="application/rss+xml" href="/no-rel">
            <link rel="alternate" type="application/rss+xml">
            <link>
            <link rel="alternate" type="application/rss+xml" href="/good">
        "#;
        let feeds = find_feeds_in_html(html, "https://example.com/");
        assert_eq!(feeds.len(), 1);
        assert_eq!(feeds[0].url, "https://example.com/good");
    }

    proptest! {
        #[test]
        fn prop_results_are_unique(
            hrefs in proptest::collection::vec("(/)?[a-c]{1,2}(\\.xml)?", 0..12)
        ) {
            let html: String = hrefs
                .iter()
                .map(|h| format!(r#"<link rel="alternate" type="application/rss+xml" href="{h}">"#))
                .collect();
            let feeds = find_feeds_in_html(&html, PAGE_URL);
            let unique: HashSet<_> = feeds.iter().map(|f| f.url.as_str()).collect();
            prop_assert_eq!(unique.len(), feeds.len());
        }
    }
}
