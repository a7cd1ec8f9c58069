use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Characters left unescaped when a URL is embedded as a relay parameter.
///
/// Matches `encodeURIComponent`: alphanumerics plus `- _ . ! ~ * ' ( )`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Placeholder substituted with the percent-encoded target URL.
pub const URL_PLACEHOLDER: &str = "{url}";

/// Relays tried after the direct path, in priority order.
pub const DEFAULT_RELAYS: [&str; 4] = [
    "https://corsproxy.io/?url={url}",
    "https://corsproxy.org/?{url}",
    "https://api.allorigins.win/raw?url={url}",
    "https://api.cors.lol/?url={url}",
];

/// A relay URL pattern. The encoded target replaces [`URL_PLACEHOLDER`], or is appended when the
/// pattern has no placeholder.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RelayTemplate(String);

impl RelayTemplate {
    /// Wrap a relay pattern.
    pub fn new(pattern: impl Into<String>) -> Self {
        Self(pattern.into())
    }

    /// The raw pattern.
    pub fn pattern(&self) -> &str {
        &self.0
    }

    /// Expand the pattern for an already-encoded target.
    fn expand(&self, encoded: &str) -> String {
        if self.0.contains(URL_PLACEHOLDER) {
            self.0.replace(URL_PLACEHOLDER, encoded)
        } else {
            format!("{}{encoded}", self.0)
        }
    }
}

/// How a candidate reaches the image host.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccessKind {
    /// The canonical URL, unmodified.
    Direct,
    /// The canonical URL wrapped by the relay at this index.
    Relay(usize),
}

/// One candidate URI for fetching an image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccessPath {
    /// Direct or relayed.
    pub kind: AccessKind,
    /// Fully-formed URI to request.
    pub uri: String,
}

/// Maps a canonical image URL to its ordered list of access paths.
///
/// Planning is pure: no I/O, no randomness. The output is never empty (the direct path is always
/// first) and is not deduplicated.
#[derive(Clone, Debug)]
pub struct AccessPathPlanner {
    relays: Vec<RelayTemplate>,
}

impl Default for AccessPathPlanner {
    fn default() -> Self {
        Self::new(DEFAULT_RELAYS.iter().map(|p| RelayTemplate::new(*p)))
    }
}

impl AccessPathPlanner {
    /// Planner with a custom relay list (tried in iteration order after the direct path).
    pub fn new(relays: impl IntoIterator<Item = RelayTemplate>) -> Self {
        Self {
            relays: relays.into_iter().collect(),
        }
    }

    /// Planner that only ever yields the direct path.
    pub fn direct_only() -> Self {
        Self { relays: Vec::new() }
    }

    /// Configured relays.
    pub fn relays(&self) -> &[RelayTemplate] {
        &self.relays
    }

    /// Build the candidate list for `url`.
    pub fn plan(&self, url: &str) -> Vec<AccessPath> {
        let encoded = encode_uri_component(url);
        let mut out = Vec::with_capacity(1 + self.relays.len());
        out.push(AccessPath {
            kind: AccessKind::Direct,
            uri: url.to_string(),
        });
        out.extend(self.relays.iter().enumerate().map(|(i, relay)| AccessPath {
            kind: AccessKind::Relay(i),
            uri: relay.expand(&encoded),
        }));
        out
    }
}

/// Percent-encode `s` for use as a single URI component.
pub fn encode_uri_component(s: &str) -> String {
    utf8_percent_encode(s, URI_COMPONENT).to_string()
}

#[cfg(test)]
#[path = "../../tests/unit/acquire/plan.rs"]
mod tests;
