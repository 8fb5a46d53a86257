use crate::{ThemeSource, DEFAULT_THEME_ID};
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};

pub const PLAY_PAGE: &str = "play.html";
pub const HOST_PAGE: &str = "host.html";

/// Everything a player needs to rebuild the game locally.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ShareLink {
    pub game: String,
    pub theme: String,
    #[serde(default)]
    pub pattern: Option<String>,
    #[serde(default)]
    pub custom_items: Option<String>,
    #[serde(default)]
    pub url_items: Option<String>,
    #[serde(default)]
    pub url_prefix: Option<String>,
}

impl ShareLink {
    pub fn new(game: impl Into<String>, theme: impl Into<String>) -> Self {
        Self {
            game: game.into(),
            theme: theme.into(),
            ..Self::default()
        }
    }

    pub fn to_query(&self) -> String {
        let mut pairs = vec![("game", self.game.as_str()), ("theme", self.theme.as_str())];
        let optional = [
            ("pattern", &self.pattern),
            ("citems", &self.custom_items),
            ("uitems", &self.url_items),
            ("uprefix", &self.url_prefix),
        ];
        for (key, value) in optional {
            if let Some(value) = value.as_deref().filter(|value| !value.is_empty()) {
                pairs.push((key, value));
            }
        }
        pairs
            .into_iter()
            .map(|(key, value)| format!("{key}={}", encode_uri_component(value)))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Parses a query string (with or without a leading `?`). Unknown keys
    /// are ignored; the last occurrence of a key wins.
    pub fn from_query(query: &str) -> Self {
        let mut link = Self::default();
        let query = query.strip_prefix('?').unwrap_or(query);
        for pair in query.split('&').filter(|pair| !pair.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            let value = decode_query_value(value);
            match key {
                "game" => link.game = value,
                "theme" => link.theme = value,
                "pattern" => link.pattern = Some(value),
                "citems" => link.custom_items = Some(value),
                "uitems" => link.url_items = Some(value),
                "uprefix" => link.url_prefix = Some(value),
                _ => {}
            }
        }
        link
    }

    /// Inline item lists take precedence over the theme id.
    pub fn theme_source(&self) -> ThemeSource {
        if let Some(items) = self.custom_items.clone().filter(|items| !items.is_empty()) {
            return ThemeSource::Custom { items };
        }
        if let Some(items) = self.url_items.clone().filter(|items| !items.is_empty()) {
            return ThemeSource::UrlScrape {
                items,
                prefix: self.url_prefix.clone().unwrap_or_default(),
            };
        }
        if self.theme.is_empty() {
            return ThemeSource::Builtin(DEFAULT_THEME_ID.to_string());
        }
        ThemeSource::Builtin(self.theme.clone())
    }

    pub fn play_url(&self, current_url: &str) -> String {
        format!("{}?{}", page_url(current_url, PLAY_PAGE), self.to_query())
    }

    pub fn host_url(&self, current_url: &str) -> String {
        format!("{}?{}", page_url(current_url, HOST_PAGE), self.to_query())
    }
}

/// Replaces the last path segment of `current_url` with `page`.
pub fn page_url(current_url: &str, page: &str) -> String {
    let base = current_url.split(['?', '#']).next().unwrap_or(current_url);
    match base.rfind('/') {
        Some(slash) => format!("{}{page}", &base[..=slash]),
        None => page.to_string(),
    }
}

/// Bytes left as-is by a browser's `encodeURIComponent`.
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

pub fn encode_uri_component(text: &str) -> String {
    utf8_percent_encode(text, URI_COMPONENT).to_string()
}

/// Malformed escapes are kept literally and invalid UTF-8 is replaced.
pub fn decode_uri_component(text: &str) -> String {
    percent_decode_str(text).decode_utf8_lossy().into_owned()
}

fn decode_query_value(value: &str) -> String {
    decode_uri_component(&value.replace('+', " "))
}
