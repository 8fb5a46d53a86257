use crate::SeededRng;
use serde::{Deserialize, Serialize};

pub const GRID_SIDE: usize = 5;
pub const CELL_COUNT: usize = GRID_SIDE * GRID_SIDE;
pub const FREE_INDEX: usize = 12;
pub const FREE_NAME: &str = "FREE";
pub const CARD_PICKS: usize = CELL_COUNT - 1;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Item {
    pub name: String,
    pub image: String,
}

impl Item {
    pub fn new(name: impl Into<String>, image: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            image: image.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Cell {
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub free: bool,
}

impl Cell {
    pub fn free() -> Self {
        Self {
            name: FREE_NAME.to_string(),
            image: None,
            free: true,
        }
    }

    pub fn from_item(item: &Item) -> Self {
        Self {
            name: item.name.clone(),
            image: Some(item.image.clone()),
            free: false,
        }
    }
}

/// A player's 5x5 grid, row-major, FREE at index 12.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Card {
    cells: Vec<Cell>,
}

impl Card {
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cell(&self, index: usize) -> Option<&Cell> {
        self.cells.get(index)
    }

    pub fn names(&self) -> Vec<&str> {
        self.cells.iter().map(|cell| cell.name.as_str()).collect()
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.cells
            .iter()
            .position(|cell| !cell.free && cell.name == name)
    }
}

/// Generator key for a card. Codes never contain `:`, so distinct
/// `(game, seed)` pairs cannot collide.
pub fn card_key(game_code: &str, card_seed: &str) -> String {
    format!("{game_code}:{card_seed}")
}

/// Fisher-Yates from the last index down to 1 with `j = floor(rng * (i + 1))`.
pub fn seeded_shuffle<T>(items: &mut [T], rng: &mut SeededRng) {
    for i in (1..items.len()).rev() {
        let j = rng.below(i + 1);
        items.swap(i, j);
    }
}

/// Builds the card for `(items, game_code, card_seed)`.
///
/// Callers must supply at least 24 items with unique names. With fewer items
/// the missing cells come back with an empty name instead of a panic.
pub fn generate_card(items: &[Item], game_code: &str, card_seed: &str) -> Card {
    let mut rng = SeededRng::from_key(&card_key(game_code, card_seed));
    let mut pool: Vec<&Item> = items.iter().collect();
    seeded_shuffle(&mut pool, &mut rng);

    let mut picks = pool.into_iter().take(CARD_PICKS);
    let cells = (0..CELL_COUNT)
        .map(|index| {
            if index == FREE_INDEX {
                return Cell::free();
            }
            match picks.next() {
                Some(item) => Cell::from_item(item),
                None => Cell {
                    name: String::new(),
                    image: None,
                    free: false,
                },
            }
        })
        .collect();
    Card { cells }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn items(count: usize) -> Vec<Item> {
        (0..count)
            .map(|i| Item::new(format!("Item{i}"), format!("img{i}.png")))
            .collect()
    }

    #[test]
    fn card_matches_browser_layout() {
        let card = generate_card(&items(30), "ABCDEF", "XY12");
        let expected = [
            "Item0", "Item13", "Item25", "Item29", "Item17", "Item18", "Item3", "Item11", "Item5",
            "Item26", "Item23", "Item10", "FREE", "Item1", "Item20", "Item14", "Item6", "Item4",
            "Item21", "Item16", "Item8", "Item19", "Item28", "Item2", "Item15",
        ];
        assert_eq!(card.names(), expected);
    }

    #[test]
    fn card_is_deterministic() {
        let pool = items(30);
        let first = generate_card(&pool, "ABCDEF", "XY12");
        let second = generate_card(&pool, "ABCDEF", "XY12");
        assert_eq!(first, second);
        assert_eq!(first.cells().len(), CELL_COUNT);
    }

    #[test]
    fn center_is_free_and_names_are_unique() {
        let pool = items(30);
        let card = generate_card(&pool, "ABCDEF", "XY12");
        assert_eq!(card.cell(FREE_INDEX), Some(&Cell::free()));

        let known: HashSet<&str> = pool.iter().map(|item| item.name.as_str()).collect();
        let names: HashSet<&str> = card
            .cells()
            .iter()
            .filter(|cell| !cell.free)
            .map(|cell| cell.name.as_str())
            .collect();
        assert_eq!(names.len(), CARD_PICKS);
        assert!(names.is_subset(&known));
    }

    #[test]
    fn source_items_are_not_mutated() {
        let pool = items(30);
        let before = pool.clone();
        let _ = generate_card(&pool, "ABCDEF", "XY12");
        assert_eq!(pool, before);
    }

    #[test]
    fn seed_and_game_code_change_layout() {
        let pool = items(30);
        assert_ne!(
            generate_card(&pool, "ABCDEF", "AAAA").names(),
            generate_card(&pool, "ABCDEF", "BBBB").names()
        );
        assert_ne!(
            generate_card(&pool, "GAME01", "SEED").names(),
            generate_card(&pool, "GAME02", "SEED").names()
        );
    }

    #[test]
    fn separator_keeps_split_points_apart() {
        assert_ne!(card_key("AB", "CD"), card_key("A", "BCD"));
        let pool = items(30);
        assert_ne!(
            generate_card(&pool, "AB", "CD").names(),
            generate_card(&pool, "A", "BCD").names()
        );
    }

    #[test]
    fn exactly_twenty_four_items_use_every_item() {
        let pool = items(24);
        let card = generate_card(&pool, "EXACT", "FULL");
        let names: HashSet<&str> = card.names().into_iter().collect();
        assert_eq!(names.len(), CELL_COUNT);
    }

    #[test]
    fn short_pool_does_not_panic() {
        let card = generate_card(&items(3), "SHORT", "POOL");
        assert_eq!(card.cells().len(), CELL_COUNT);
        assert!(card.cells()[24].name.is_empty());
    }

    #[test]
    fn index_of_skips_free_cell() {
        let card = generate_card(&items(30), "ABCDEF", "XY12");
        assert_eq!(card.index_of("Item0"), Some(0));
        assert_eq!(card.index_of(FREE_NAME), None);
    }
}
