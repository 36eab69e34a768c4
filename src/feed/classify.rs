use serde::Serialize;
use std::fmt;

use super::links::LinkAttributes;

/// MIME types accepted for OPML outlines, given an `.opml` href.
const OPML_TYPES: [&str; 3] = ["text/x-opml", "application/xml", "text/xml"];

/// Which type check a feed marker satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FeedKind {
    /// `application/rss+xml`
    Rss,
    /// `text/xml`, the legacy alias for RSS
    RssLegacyXml,
    /// `application/atom+xml`
    Atom,
    /// An OPML type with an `.opml` href
    Opml,
}

impl FeedKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FeedKind::Rss => "rss",
            FeedKind::RssLegacyXml => "rss-legacy-xml",
            FeedKind::Atom => "atom",
            FeedKind::Opml => "opml",
        }
    }
}

impl fmt::Display for FeedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A link marker identified as a feed, before URL resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedCandidate {
    pub href: String,
    pub kind: FeedKind,
}

/// Decides whether a link marker advertises a feed.
///
/// The marker needs `rel` equal to `alternate` or `outline` (any case), a
/// `type`, and a non-empty `href`. Types are tried in a fixed order and the
/// first match wins:
///
/// 1. `application/rss+xml`
/// 2. `text/xml`
/// 3. `application/atom+xml`
/// 4. `text/x-opml`, `application/xml` or `text/xml`, with an href ending in `.opml`
///
/// Because `text/xml` is claimed by step 2, a `text/xml` marker pointing at an
/// `.opml` file is reported as [`FeedKind::RssLegacyXml`].
///
/// ```
/// use feedscout::feed::{classify, FeedKind, LinkAttributes};
///
/// let attrs: LinkAttributes = [
///     ("rel", "alternate"),
///     ("type", "application/atom+xml"),
///     ("href", "/atom.xml"),
/// ]
/// .into_iter()
/// .collect();
///
/// let candidate = classify(&attrs).unwrap();
/// assert_eq!(candidate.kind, FeedKind::Atom);
/// assert_eq!(candidate.href, "/atom.xml");
/// ```
pub fn classify(attrs: &LinkAttributes) -> Option<FeedCandidate> {
    let rel = attrs.get("rel")?.trim();
    if !(rel.eq_ignore_ascii_case("alternate") || rel.eq_ignore_ascii_case("outline")) {
        return None;
    }

    let mime = attrs.get("type")?.trim();
    let href = attrs.get("href").map(str::trim).filter(|h| !h.is_empty());

    let kind = if mime.eq_ignore_ascii_case("application/rss+xml") {
        FeedKind::Rss
    } else if mime.eq_ignore_ascii_case("text/xml") {
        FeedKind::RssLegacyXml
    } else if mime.eq_ignore_ascii_case("application/atom+xml") {
        FeedKind::Atom
    } else if OPML_TYPES.iter().any(|t| mime.eq_ignore_ascii_case(t))
        && href.is_some_and(|h| h.ends_with(".opml"))
    {
        FeedKind::Opml
    } else {
        return None;
    };

    Some(FeedCandidate {
        href: href?.to_owned(),
        kind,
    })
}
