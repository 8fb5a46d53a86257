use bingo_core::{builtin_theme, RawTheme, ThemeItem, AUTO_IMAGE};
use serde::{Deserialize, Serialize};

pub use bingo_core::{GameRules, Theme, ThemeSource};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ThemeEntry {
    pub id: String,
    pub title: String,
    pub available: bool,
}

const DEFAULT_ITEMS: [&str; 30] = [
    "Sun", "Moon", "Star", "Cloud", "Rain", "Snow", "Wind", "Tree", "Leaf", "Flower", "River",
    "Mountain", "Ocean", "Island", "Desert", "Forest", "Bridge", "Castle", "Lantern", "Compass",
    "Anchor", "Kite", "Drum", "Bell", "Feather", "Shell", "Acorn", "Comet", "Rainbow", "Volcano",
];

/// Copy compiled into the binary, used when the theme file cannot be read.
pub fn inline_theme(id: &str) -> Option<RawTheme> {
    let info = builtin_theme(id)?;
    let items = match id {
        "default" => DEFAULT_ITEMS
            .iter()
            .map(|name| ThemeItem {
                name: (*name).to_string(),
                image: AUTO_IMAGE.to_string(),
            })
            .collect(),
        _ => Vec::new(),
    };
    Some(RawTheme {
        id: info.id.to_string(),
        title: info.title.to_string(),
        items,
    })
}
