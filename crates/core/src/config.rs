use crate::{CARD_PICKS, CARD_SEED_LEN, GAME_CODE_LEN, MAX_NAME_CHARS};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GameRules {
    pub game_code_len: usize,
    pub card_seed_len: usize,
    pub min_items: usize,
    pub max_name_chars: usize,
    pub default_pattern: String,
}

impl Default for GameRules {
    fn default() -> Self {
        Self {
            game_code_len: GAME_CODE_LEN,
            card_seed_len: CARD_SEED_LEN,
            min_items: CARD_PICKS,
            max_name_chars: MAX_NAME_CHARS,
            default_pattern: "line".to_string(),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SetupError {
    #[error("need at least {need} unique items, have {have}")]
    TooFewItems { have: usize, need: usize },
    #[error("invalid {kind} {value:?}")]
    InvalidCode { kind: &'static str, value: String },
}

impl GameRules {
    /// Front ends run this before building cards; the card builder itself
    /// trusts its input.
    pub fn check_item_count(&self, have: usize) -> Result<(), SetupError> {
        let need = self.min_items.max(CARD_PICKS);
        if have < need {
            return Err(SetupError::TooFewItems { have, need });
        }
        Ok(())
    }

    pub fn check_game_code(&self, code: &str) -> Result<(), SetupError> {
        check_code("game code", code, self.game_code_len)
    }

    pub fn check_card_seed(&self, seed: &str) -> Result<(), SetupError> {
        check_code("card seed", seed, self.card_seed_len)
    }
}

fn check_code(kind: &'static str, value: &str, len: usize) -> Result<(), SetupError> {
    if crate::is_valid_code(value, len) {
        Ok(())
    } else {
        Err(SetupError::InvalidCode {
            kind,
            value: value.to_string(),
        })
    }
}
