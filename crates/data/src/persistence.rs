use crate::load::load_json;
use anyhow::{bail, Context};
use bingo_core::{normalize_code, HostGame, Theme};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const SAVE_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SavedHostSession {
    pub version: u32,
    #[serde(default)]
    pub theme_signature: String,
    #[serde(flatten)]
    pub game: HostGame,
}

impl SavedHostSession {
    /// Fails when `theme` no longer lists the items the game was started with.
    /// Sessions saved without a signature are accepted.
    pub fn check_theme(&self, theme: &Theme) -> anyhow::Result<()> {
        if self.theme_signature.is_empty() || self.theme_signature == theme_signature(theme) {
            return Ok(());
        }
        bail!(
            "theme {} changed since game {} started",
            theme.id,
            self.game.game_code
        )
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlayerSave {
    #[serde(default)]
    pub seed: Option<String>,
    #[serde(default)]
    pub marks: Vec<usize>,
}

impl PlayerSave {
    /// Marks made on the card for `seed`. Saves for another seed, or without
    /// one, start from a clean card.
    pub fn marks_for(&self, seed: &str) -> Vec<usize> {
        if self.seed.as_deref() == Some(seed) {
            self.marks.clone()
        } else {
            Vec::new()
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum PlayerSavePayload {
    Current(PlayerSave),
    Legacy(Vec<usize>),
}

pub fn default_session_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os("BINGO_SESSION") {
        return Some(PathBuf::from(path));
    }
    std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".bingo_host.json"))
}

pub fn default_player_dir() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os("BINGO_PLAYER_DIR") {
        return Some(PathBuf::from(path));
    }
    std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".bingo_players"))
}

#[derive(Clone, Copy)]
struct Fnv64(u64);

impl Fnv64 {
    fn new() -> Self {
        Self(0xcbf29ce484222325)
    }

    fn update(&mut self, bytes: &[u8]) {
        for byte in bytes {
            self.0 ^= u64::from(*byte);
            self.0 = self.0.wrapping_mul(0x100000001b3);
        }
    }

    fn finish(self) -> u64 {
        self.0
    }
}

/// Cards depend on item order, so the signature covers names in order.
pub fn theme_signature(theme: &Theme) -> String {
    let mut hasher = Fnv64::new();
    hasher.update(b"bingo-theme-signature-v1");
    hasher.update(theme.id.as_bytes());
    for item in &theme.items {
        hasher.update(&[0]);
        hasher.update(item.name.as_bytes());
    }
    format!("{:016x}", hasher.finish())
}

pub fn save_host_session(game: &HostGame, theme: &Theme, path: &Path) -> anyhow::Result<()> {
    let payload = SavedHostSession {
        version: SAVE_SCHEMA_VERSION,
        theme_signature: theme_signature(theme),
        game: game.clone(),
    };
    let body = serde_json::to_string_pretty(&payload)?;
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    fs::write(path, body).with_context(|| format!("write {}", path.display()))
}

pub fn load_host_session(path: &Path) -> anyhow::Result<SavedHostSession> {
    let payload: SavedHostSession = load_json(path)?;
    if payload.version != SAVE_SCHEMA_VERSION {
        bail!(
            "unsupported session version {} (expected {})",
            payload.version,
            SAVE_SCHEMA_VERSION
        );
    }
    Ok(payload)
}

/// Returns the saved session unless it belongs to a different game or theme
/// than the one requested.
pub fn restore_host_session(
    path: &Path,
    game_code: Option<&str>,
    theme_id: Option<&str>,
) -> anyhow::Result<Option<SavedHostSession>> {
    if !path.exists() {
        return Ok(None);
    }
    let saved = load_host_session(path)?;
    if game_code.is_some_and(|code| normalize_code(code) != saved.game.game_code) {
        log::debug!("session {} is for another game", saved.game.game_code);
        return Ok(None);
    }
    if theme_id.is_some_and(|id| id != saved.game.theme_id) {
        log::debug!("session theme {} does not match", saved.game.theme_id);
        return Ok(None);
    }
    Ok(Some(saved))
}

pub fn clear_host_session(path: &Path) -> anyhow::Result<()> {
    if path.exists() {
        fs::remove_file(path).with_context(|| format!("remove {}", path.display()))?;
    }
    Ok(())
}

fn file_component(text: &str) -> String {
    text.trim()
        .to_lowercase()
        .chars()
        .map(|ch| if ch.is_alphanumeric() { ch } else { '_' })
        .collect()
}

pub fn player_save_path(dir: &Path, game_code: &str, player_name: &str) -> PathBuf {
    dir.join(format!(
        "bingo_{}_{}.json",
        file_component(&normalize_code(game_code)),
        file_component(player_name)
    ))
}

pub fn save_player(
    dir: &Path,
    game_code: &str,
    player_name: &str,
    save: &PlayerSave,
) -> anyhow::Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    let path = player_save_path(dir, game_code, player_name);
    let body = serde_json::to_string_pretty(save)?;
    fs::write(&path, body).with_context(|| format!("write {}", path.display()))
}

/// Loads a player's save. Older saves were a bare list of marks; those come
/// back without a seed.
pub fn load_player(dir: &Path, game_code: &str, player_name: &str) -> anyhow::Result<Option<PlayerSave>> {
    let path = player_save_path(dir, game_code, player_name);
    if !path.exists() {
        return Ok(None);
    }
    let payload: PlayerSavePayload = load_json(&path)?;
    let save = match payload {
        PlayerSavePayload::Current(save) => save,
        PlayerSavePayload::Legacy(marks) => {
            log::warn!("{} uses the legacy mark list format", path.display());
            PlayerSave { seed: None, marks }
        }
    };
    Ok(Some(save))
}
