use crate::{
    check_pattern, generate_card, get_pattern, goal_cells, marked_from_drawn, normalize_marks,
    winning_cells, Card, DrawError, DrawPool, Event, EventBus, Item, Marks, ShareLink, Theme,
    ThemeSource, FREE_INDEX,
};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Host side of one game. Field names follow the browser session format.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HostGame {
    pub game_code: String,
    pub theme_id: String,
    #[serde(default = "default_pattern_id")]
    pub pattern_id: String,
    #[serde(flatten)]
    pub draws: DrawPool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_items: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_items: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_prefix: Option<String>,
}

fn default_pattern_id() -> String {
    "line".to_string()
}

impl HostGame {
    pub fn new<R: Rng + ?Sized>(
        game_code: String,
        source: &ThemeSource,
        pattern_id: String,
        item_count: usize,
        rng: &mut R,
        events: &mut EventBus,
    ) -> Self {
        let (custom_items, url_items, url_prefix) = match source {
            ThemeSource::Builtin(_) => (None, None, None),
            ThemeSource::Custom { items } => (Some(items.clone()), None, None),
            ThemeSource::UrlScrape { items, prefix } => {
                (None, Some(items.clone()), Some(prefix.clone()))
            }
        };
        let game = Self {
            game_code,
            theme_id: source.id().to_string(),
            pattern_id,
            draws: DrawPool::shuffled(item_count, rng),
            custom_items,
            url_items,
            url_prefix,
        };
        events.push(Event::GameCreated {
            game_code: game.game_code.clone(),
            theme_id: game.theme_id.clone(),
            pattern_id: game.pattern_id.clone(),
            items: item_count,
        });
        game
    }

    pub fn theme_source(&self) -> ThemeSource {
        self.share_link().theme_source()
    }

    pub fn share_link(&self) -> ShareLink {
        ShareLink {
            game: self.game_code.clone(),
            theme: self.theme_id.clone(),
            pattern: Some(self.pattern_id.clone()),
            custom_items: self.custom_items.clone(),
            url_items: self.url_items.clone(),
            url_prefix: self.url_prefix.clone(),
        }
    }

    pub fn draw(&mut self, events: &mut EventBus) -> Result<usize, DrawError> {
        self.draws.draw(events)
    }

    pub fn drawn_names<'t>(&self, theme: &'t Theme) -> Vec<&'t str> {
        theme.item_names(&self.draws.drawn)
    }

    /// Rebuilds a player's card from its seed and checks it against the
    /// draw history.
    pub fn verify(&self, theme: &Theme, card_seed: &str, events: &mut EventBus) -> Verification {
        let verification = verify_card(
            &theme.items,
            &self.game_code,
            card_seed,
            &self.drawn_names(theme),
            &self.pattern_id,
        );
        events.push(Event::CardVerified {
            card_seed: verification.card_seed.clone(),
            winner: verification.winner.clone(),
        });
        verification
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Verification {
    pub card_seed: String,
    pub card: Card,
    pub marked: Marks,
    pub winner: Option<String>,
    pub win_cells: Marks,
    pub goal_cells: Marks,
}

pub fn verify_card<S: AsRef<str>>(
    items: &[Item],
    game_code: &str,
    card_seed: &str,
    drawn_names: &[S],
    pattern_id: &str,
) -> Verification {
    let card = generate_card(items, game_code, card_seed);
    let marked = marked_from_drawn(&card, drawn_names);
    let pattern = get_pattern(pattern_id);
    let winner = check_pattern(&marked, &pattern).map(str::to_string);
    let win_cells = winning_cells(&marked, &pattern);
    Verification {
        card_seed: card_seed.to_string(),
        goal_cells: goal_cells(&pattern),
        card,
        marked,
        winner,
        win_cells,
    }
}

/// Player side: a card plus the cells the player has tapped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerCard {
    pub game_code: String,
    pub player_name: String,
    pub card_seed: String,
    pub pattern_id: String,
    pub card: Card,
    pub marked: Marks,
}

impl PlayerCard {
    pub fn new(
        items: &[Item],
        game_code: &str,
        player_name: &str,
        card_seed: &str,
        pattern_id: &str,
        marks: impl IntoIterator<Item = usize>,
    ) -> Self {
        Self {
            game_code: game_code.to_string(),
            player_name: player_name.trim().to_lowercase(),
            card_seed: card_seed.to_string(),
            pattern_id: pattern_id.to_string(),
            card: generate_card(items, game_code, card_seed),
            marked: normalize_marks(marks),
        }
    }

    /// Flips a cell; the FREE cell stays marked.
    pub fn toggle(&mut self, index: usize) -> bool {
        if index == FREE_INDEX || self.card.cell(index).is_none() {
            return self.marked.contains(&index);
        }
        if !self.marked.remove(&index) {
            self.marked.insert(index);
        }
        self.marked.contains(&index)
    }

    pub fn winner(&self) -> Option<String> {
        crate::check_win(&self.marked, &self.pattern_id)
    }
}
