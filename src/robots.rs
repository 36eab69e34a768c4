//! Simplified robots.txt evaluation.
//!
//! Supports `User-agent` and `Disallow` lines only, evaluated in one sequential
//! pass. This is not the full exclusion standard: there is no `Allow`, no
//! wildcards or `$` anchors, and no most-specific-match precedence. A
//! `User-agent` line simply switches collection on or off for the lines that
//! follow it.

use url::Url;

use crate::fetcher::Fetcher;

/// Disallow rules collected from robots.txt for one agent identity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RobotsRules {
    disallowed: Vec<String>,
    allow_all: bool,
}

impl RobotsRules {
    /// Parses robots.txt text for `user_agent`.
    ///
    /// A block applies when its `User-agent` value is `*` or contains the agent
    /// identity (ASCII case-insensitive). While a block applies, every
    /// `Disallow` path is collected. Once a non-matching `User-agent` line
    /// switches collection off, the next applying block starts a fresh rule
    /// set, so only the last applying block's rules are kept. Consecutive
    /// matching `User-agent` lines share one rule set. An empty `Disallow` in
    /// an applying block means everything is allowed and stops parsing at that
    /// line, discarding rules collected so far.
    pub fn parse(text: &str, user_agent: &str) -> Self {
        let agent = user_agent.trim().to_ascii_lowercase();
        let mut rule_applies = false;
        let mut disallowed = Vec::new();

        for line in text.lines() {
            // Comments run to end of line
            let line = line.split('#').next().unwrap_or_default().trim();
            if line.is_empty() {
                continue;
            }

            let Some((name, value)) = line.split_once(':') else {
                continue;
            };
            let name = name.trim();
            let value = value.trim();

            if name.eq_ignore_ascii_case("user-agent") {
                let matches = agent_matches(value, &agent);
                if matches && !rule_applies {
                    disallowed.clear();
                }
                rule_applies = matches;
            } else if rule_applies && name.eq_ignore_ascii_case("disallow") {
                if value.is_empty() {
                    return Self {
                        disallowed: Vec::new(),
                        allow_all: true,
                    };
                }
                disallowed.push(value.to_owned());
            }
        }

        Self {
            disallowed,
            allow_all: false,
        }
    }

    /// Returns `false` if `path` starts with any collected rule.
    pub fn is_allowed(&self, path: &str) -> bool {
        if self.allow_all {
            return true;
        }
        match self.disallowed.iter().find(|rule| path.starts_with(rule.as_str())) {
            Some(rule) => {
                tracing::debug!(path = %path, rule = %rule, "robots.txt disallows path");
                false
            }
            None => true,
        }
    }

    /// Collected disallow prefixes, in file order.
    pub fn disallowed(&self) -> &[String] {
        &self.disallowed
    }

    /// True when an empty `Disallow` short-circuited parsing.
    pub fn allows_everything(&self) -> bool {
        self.allow_all
    }
}

fn agent_matches(value: &str, agent: &str) -> bool {
    if value == "*" {
        return true;
    }
    !agent.is_empty() && value.to_ascii_lowercase().contains(agent)
}

/// Evaluates robots.txt text against a path for one agent.
///
/// Empty text is permissive.
///
/// ```
/// use feedscout::robots::is_allowed;
///
/// let robots = "User-agent: *\nDisallow: /private";
/// assert!(!is_allowed(robots, "/private/x", "Googlebot"));
/// assert!(is_allowed(robots, "/public", "Googlebot"));
/// assert!(is_allowed("", "/anything", "Googlebot"));
/// ```
pub fn is_allowed(robots_txt: &str, path: &str, user_agent: &str) -> bool {
    RobotsRules::parse(robots_txt, user_agent).is_allowed(path)
}

/// Location of the robots file for a target: `scheme://host[:port]/robots.txt`.
pub fn robots_url(target: &Url) -> String {
    let scheme = target.scheme();
    let host = target.host_str().unwrap_or_default();
    match target.port() {
        Some(port) => format!("{scheme}://{host}:{port}/robots.txt"),
        None => format!("{scheme}://{host}/robots.txt"),
    }
}

/// Path of the target URL that rules are matched against (`/` for a bare origin).
pub fn target_path(target: &Url) -> &str {
    match target.path() {
        "" => "/",
        path => path,
    }
}

/// Fetches the target's robots.txt and decides whether the target may be crawled.
///
/// The target must already be validated. A fetch failure yields an empty body
/// and therefore `true`.
pub async fn check_allowed<F: Fetcher>(fetcher: &F, target: &Url, user_agent: &str) -> bool {
    let robots_location = robots_url(target);
    let body = fetcher.fetch(&robots_location, user_agent).await;

    if body.trim().is_empty() {
        tracing::debug!(robots = %robots_location, "No robots policy found, allowing");
        return true;
    }

    let allowed = is_allowed(&body, target_path(target), user_agent);
    tracing::debug!(
        robots = %robots_location,
        path = %target_path(target),
        user_agent = %user_agent,
        allowed = allowed,
        "Evaluated robots policy"
    );
    allowed
}
