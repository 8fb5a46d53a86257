use crate::{decode_items, decode_url_items, encode_uri_component, CodecError, Item};
use serde::{Deserialize, Serialize};

/// Image sentinel asking for a generated placeholder.
pub const AUTO_IMAGE: &str = "auto";
pub const DEFAULT_THEME_ID: &str = "default";
pub const CUSTOM_THEME_ID: &str = "custom";
pub const URL_SCRAPE_THEME_ID: &str = "urlscrape";

pub const PALETTE: [&str; 20] = [
    "#e74c3c", "#e67e22", "#f1c40f", "#2ecc71", "#1abc9c", "#3498db", "#9b59b6", "#e84393",
    "#00cec9", "#6c5ce7", "#fd79a8", "#00b894", "#fdcb6e", "#74b9ff", "#a29bfe", "#fab1a0",
    "#55efc4", "#81ecec", "#dfe6e9", "#ffeaa7",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemeInfo {
    pub id: &'static str,
    pub title: &'static str,
}

pub const BUILTIN_THEMES: &[ThemeInfo] = &[
    ThemeInfo { id: "default", title: "Default" },
    ThemeInfo { id: "biscuitneopets", title: "Biscuit Neopets" },
    ThemeInfo { id: "candyneopets", title: "Candy Neopets" },
    ThemeInfo { id: "greenneopets", title: "Green Neopets" },
    ThemeInfo { id: "woodlandneopets", title: "Woodland Neopets" },
    ThemeInfo { id: "paintbrushes", title: "Paint Brushes" },
];

pub fn builtin_theme(id: &str) -> Option<&'static ThemeInfo> {
    BUILTIN_THEMES.iter().find(|info| info.id == id)
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ThemeItem {
    pub name: String,
    #[serde(default = "auto_image")]
    pub image: String,
}

fn auto_image() -> String {
    AUTO_IMAGE.to_string()
}

/// Theme file as stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RawTheme {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub items: Vec<ThemeItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Theme {
    pub id: String,
    pub title: String,
    pub items: Vec<Item>,
}

impl Theme {
    pub fn names(&self) -> Vec<&str> {
        self.items.iter().map(|item| item.name.as_str()).collect()
    }

    pub fn item_names(&self, indices: &[usize]) -> Vec<&str> {
        indices
            .iter()
            .filter_map(|&index| self.items.get(index))
            .map(|item| item.name.as_str())
            .collect()
    }
}

/// Where a game's item list comes from, as carried by a share link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThemeSource {
    Builtin(String),
    Custom { items: String },
    UrlScrape { items: String, prefix: String },
}

impl ThemeSource {
    pub fn id(&self) -> &str {
        match self {
            Self::Builtin(id) => id,
            Self::Custom { .. } => CUSTOM_THEME_ID,
            Self::UrlScrape { .. } => URL_SCRAPE_THEME_ID,
        }
    }

    /// Decodes themes carried entirely in the link. Builtin themes need a
    /// catalog lookup and return `None`.
    pub fn decode_inline(&self) -> Option<Result<Theme, CodecError>> {
        match self {
            Self::Builtin(_) => None,
            Self::Custom { items } => Some(decode_items(items).map(|names| build_custom_theme(&names))),
            Self::UrlScrape { items, prefix } => {
                Some(decode_url_items(items, prefix).map(build_url_scrape_theme))
            }
        }
    }
}

pub fn luma(hex: &str) -> f64 {
    let hex = hex.trim_start_matches('#');
    let channel = |range: std::ops::Range<usize>| {
        hex.get(range)
            .and_then(|digits| u8::from_str_radix(digits, 16).ok())
            .map_or(0.0, |value| f64::from(value) / 255.0)
    };
    0.299 * channel(0..2) + 0.587 * channel(2..4) + 0.114 * channel(4..6)
}

pub fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Coloured tile with the item name, as an SVG data URI.
pub fn placeholder_svg(name: &str, index: usize) -> String {
    let background = PALETTE[index % PALETTE.len()];
    let text = if luma(background) > 0.5 { "#222" } else { "#fff" };
    let svg = format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" viewBox=\"0 0 120 120\">\
         <rect width=\"120\" height=\"120\" rx=\"12\" fill=\"{background}\"/>\
         <text x=\"60\" y=\"66\" text-anchor=\"middle\" font-family=\"system-ui,sans-serif\" \
         font-size=\"16\" font-weight=\"600\" fill=\"{text}\">{}</text>\
         </svg>",
        escape_xml(name)
    );
    format!("data:image/svg+xml,{}", encode_uri_component(&svg))
}

/// Resolves `auto` images to placeholders.
pub fn process_theme(raw: RawTheme) -> Theme {
    let items = raw
        .items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            let image = if item.image == AUTO_IMAGE {
                placeholder_svg(&item.name, index)
            } else {
                item.image
            };
            Item {
                name: item.name,
                image,
            }
        })
        .collect();
    Theme {
        id: raw.id,
        title: raw.title,
        items,
    }
}

pub fn build_custom_theme<S: AsRef<str>>(names: &[S]) -> Theme {
    let items = names
        .iter()
        .enumerate()
        .map(|(index, name)| Item::new(name.as_ref(), placeholder_svg(name.as_ref(), index)))
        .collect();
    Theme {
        id: CUSTOM_THEME_ID.to_string(),
        title: "Custom (Text)".to_string(),
        items,
    }
}

pub fn build_url_scrape_theme(items: Vec<Item>) -> Theme {
    Theme {
        id: URL_SCRAPE_THEME_ID.to_string(),
        title: "Custom (Images)".to_string(),
        items,
    }
}
