use crate::schema::{inline_theme, ThemeEntry};
use anyhow::{bail, Context};
use bingo_core::{
    builtin_theme, process_theme, GameRules, RawTheme, Theme, ThemeSource, BUILTIN_THEMES,
};
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

pub const THEMES_DIR: &str = "themes";
pub const RULES_FILE: &str = "rules.json";

pub fn load_rules(dir: &Path) -> anyhow::Result<GameRules> {
    let path = dir.join(RULES_FILE);
    if !path.exists() {
        return Ok(GameRules::default());
    }
    load_json(path)
}

pub fn theme_path(dir: &Path, id: &str) -> anyhow::Result<std::path::PathBuf> {
    let valid = !id.is_empty()
        && id
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_');
    if !valid {
        bail!("invalid theme id {id:?}");
    }
    Ok(dir.join(THEMES_DIR).join(format!("{id}.json")))
}

pub fn load_raw_theme(dir: &Path, id: &str) -> anyhow::Result<RawTheme> {
    load_json(theme_path(dir, id)?)
}

/// Reads `themes/<id>.json`, falling back to the inline copy when the file
/// is missing or unreadable.
pub fn load_theme(dir: &Path, id: &str) -> anyhow::Result<Theme> {
    if builtin_theme(id).is_none() {
        log::warn!("theme {id} is not a built-in theme");
    }
    match load_raw_theme(dir, id) {
        Ok(raw) => Ok(process_theme(raw)),
        Err(err) => {
            log::debug!("theme file for {id} unavailable: {err:#}");
            match inline_theme(id) {
                Some(raw) if !raw.items.is_empty() => Ok(process_theme(raw)),
                _ => Err(err.context(format!("theme not found: {id}"))),
            }
        }
    }
}

pub fn resolve_theme(dir: &Path, source: &ThemeSource) -> anyhow::Result<Theme> {
    match source.decode_inline() {
        Some(decoded) => {
            decoded.with_context(|| format!("decode {} theme items", source.id()))
        }
        None => load_theme(dir, source.id()),
    }
}

/// Rejects themes that would produce broken cards.
pub fn validate_theme(theme: &Theme, rules: &GameRules) -> anyhow::Result<()> {
    rules
        .check_item_count(theme.items.len())
        .with_context(|| format!("theme {}", theme.id))?;
    let mut seen = HashSet::new();
    for item in &theme.items {
        if item.name.trim().is_empty() {
            bail!("theme {} has an empty item name", theme.id);
        }
        if item.name.chars().count() > rules.max_name_chars {
            bail!("theme {} item {:?} is too long", theme.id, item.name);
        }
        if !seen.insert(item.name.as_str()) {
            bail!("theme {} has duplicate item {:?}", theme.id, item.name);
        }
    }
    Ok(())
}

/// Built-in themes with whether a file or inline copy backs them.
pub fn list_themes(dir: &Path) -> Vec<ThemeEntry> {
    BUILTIN_THEMES
        .iter()
        .map(|info| {
            let on_disk = theme_path(dir, info.id).map_or(false, |path| path.exists());
            let inline = inline_theme(info.id).map_or(false, |raw| !raw.items.is_empty());
            ThemeEntry {
                id: info.id.to_string(),
                title: info.title.to_string(),
                available: on_disk || inline,
            }
        })
        .collect()
}

pub(crate) fn load_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> anyhow::Result<T> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let value = serde_json::from_str(&raw).with_context(|| format!("parse {}", path.display()))?;
    Ok(value)
}
