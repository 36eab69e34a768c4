use std::collections::HashMap;

/// Attributes of one `<link>` marker, keyed by lower-cased name.
///
/// Values are kept raw (no entity decoding, no trimming). Lookups never fail
/// on a missing key; they return `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkAttributes {
    attrs: HashMap<String, String>,
}

impl LinkAttributes {
    /// Looks up an attribute by name, ignoring ASCII case.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.attrs
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.attrs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }

    // First occurrence wins, as in HTML
    fn insert(&mut self, name: &str, value: &str) {
        self.attrs
            .entry(name.to_ascii_lowercase())
            .or_insert_with(|| value.to_owned());
    }
}

impl<'a> FromIterator<(&'a str, &'a str)> for LinkAttributes {
    fn from_iter<I: IntoIterator<Item = (&'a str, &'a str)>>(iter: I) -> Self {
        let mut attrs = LinkAttributes::default();
        for (name, value) in iter {
            attrs.insert(name, value);
        }
        attrs
    }
}

/// Lazy scan over the `<link>` markers of an HTML document.
///
/// Created by [`extract_links`].
#[derive(Debug, Clone)]
pub struct LinkTags<'a> {
    html: &'a str,
    pos: usize,
}

/// Scans raw HTML for `<link ...>` / `<link .../>` markers, in document order.
///
/// The scan is case-insensitive and spans lines. Markup is not validated:
/// broken markers produce partial attribute sets and a marker cut off by the
/// end of input is dropped.
///
/// ```
/// use feedscout::feed::extract_links;
///
/// let html = r#"<head><LINK Rel="alternate" href='/feed.xml'></head>"#;
/// let links: Vec<_> = extract_links(html).collect();
/// assert_eq!(links.len(), 1);
/// assert_eq!(links[0].get("rel"), Some("alternate"));
/// assert_eq!(links[0].get("href"), Some("/feed.xml"));
/// ```
pub fn extract_links(html: &str) -> LinkTags<'_> {
    LinkTags { html, pos: 0 }
}

impl Iterator for LinkTags<'_> {
    type Item = LinkAttributes;

    fn next(&mut self) -> Option<LinkAttributes> {
        let bytes = self.html.as_bytes();

        while self.pos < bytes.len() {
            let start = find_ascii_ci(bytes, b"<link", self.pos)?;
            let after = start + b"<link".len();

            // `<linkage>` and friends are not link markers
            match bytes.get(after) {
                Some(b) if b.is_ascii_whitespace() || *b == b'/' || *b == b'>' => {}
                Some(_) => {
                    self.pos = after;
                    continue;
                }
                None => {
                    self.pos = bytes.len();
                    return None;
                }
            }

            return match lex_attributes(self.html, after) {
                Some((attrs, end)) => {
                    self.pos = end;
                    Some(attrs)
                }
                None => {
                    self.pos = bytes.len();
                    None
                }
            };
        }

        None
    }
}

/// Tokenizes attributes from `from` up to the closing `>`.
///
/// Returns the attributes and the byte offset just past the marker, or `None`
/// when input ends before the marker closes. All delimiters are ASCII, so every
/// slice boundary falls on a char boundary.
fn lex_attributes(html: &str, from: usize) -> Option<(LinkAttributes, usize)> {
    let bytes = html.as_bytes();
    let mut attrs = LinkAttributes::default();
    let mut i = from;

    loop {
        while i < bytes.len() && (bytes[i].is_ascii_whitespace() || bytes[i] == b'/') {
            i += 1;
        }
        match bytes.get(i) {
            None => return None,
            Some(b'>') => return Some((attrs, i + 1)),
            Some(_) => {}
        }

        let name_start = i;
        while i < bytes.len() && !is_name_terminator(bytes[i]) {
            i += 1;
        }
        let name = &html[name_start..i];

        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }

        let value = if bytes.get(i) == Some(&b'=') {
            i += 1;
            while i < bytes.len() && bytes[i].is_ascii_whitespace() {
                i += 1;
            }
            match bytes.get(i) {
                None => return None,
                Some(&quote) if quote == b'"' || quote == b'\'' => {
                    let value_start = i + 1;
                    match html[value_start..].find(quote as char) {
                        Some(len) => {
                            i = value_start + len + 1;
                            &html[value_start..value_start + len]
                        }
                        None => {
                            // Unterminated quote: the value runs to the next `>`
                            let len = html[value_start..].find('>')?;
                            i = value_start + len;
                            &html[value_start..i]
                        }
                    }
                }
                Some(_) => {
                    let value_start = i;
                    while i < bytes.len() && !bytes[i].is_ascii_whitespace() && bytes[i] != b'>' {
                        i += 1;
                    }
                    &html[value_start..i]
                }
            }
        } else {
            ""
        };

        if !name.is_empty() {
            attrs.insert(name, value);
        }
    }
}

fn is_name_terminator(b: u8) -> bool {
    b.is_ascii_whitespace() || b == b'=' || b == b'>' || b == b'/'
}

fn find_ascii_ci(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    if from >= haystack.len() {
        return None;
    }
    haystack[from..]
        .windows(needle.len())
        .position(|window| window.eq_ignore_ascii_case(needle))
        .map(|offset| from + offset)
}
