use crate::{decode_custom_pattern, CELL_COUNT, GRID_SIDE};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::sync::OnceLock;

pub const CUSTOM_PATTERN_TAG: &str = "c_";
pub const CUSTOM_PATTERN_NAME: &str = "Custom";

pub type PreviewGrid = [u8; CELL_COUNT];

/// A win shape. Satisfied when any one of `sets` is fully marked.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Pattern {
    pub id: String,
    pub name: String,
    pub sets: Vec<Vec<usize>>,
    pub grid: PreviewGrid,
}

impl Pattern {
    fn single(id: &str, name: &str, cells: Vec<usize>) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            grid: grid_from(&cells),
            sets: vec![cells],
        }
    }

    pub fn is_custom(&self) -> bool {
        self.id.starts_with(CUSTOM_PATTERN_TAG)
    }

    pub fn is_single_set(&self) -> bool {
        self.sets.len() == 1
    }
}

pub fn grid_from(cells: &[usize]) -> PreviewGrid {
    let mut grid = [0u8; CELL_COUNT];
    for &cell in cells {
        if let Some(slot) = grid.get_mut(cell) {
            *slot = 1;
        }
    }
    grid
}

pub fn row(r: usize) -> Vec<usize> {
    (0..GRID_SIDE).map(|c| r * GRID_SIDE + c).collect()
}

pub fn column(c: usize) -> Vec<usize> {
    (0..GRID_SIDE).map(|r| r * GRID_SIDE + c).collect()
}

pub fn main_diagonal() -> Vec<usize> {
    (0..GRID_SIDE).map(|i| i * GRID_SIDE + i).collect()
}

pub fn anti_diagonal() -> Vec<usize> {
    (0..GRID_SIDE).map(|i| i * GRID_SIDE + (GRID_SIDE - 1 - i)).collect()
}

fn union(parts: &[Vec<usize>]) -> Vec<usize> {
    let mut cells: Vec<usize> = parts.iter().flatten().copied().collect();
    cells.sort_unstable();
    cells.dedup();
    cells
}

fn build_catalog() -> Vec<Pattern> {
    let mut lines: Vec<Vec<usize>> = (0..GRID_SIDE).map(row).collect();
    lines.extend((0..GRID_SIDE).map(column));
    lines.push(main_diagonal());
    lines.push(anti_diagonal());
    let diagonals = [main_diagonal(), anti_diagonal()];

    vec![
        Pattern {
            id: "line".to_string(),
            name: "Any Line".to_string(),
            sets: lines,
            // Illustrative only: the X hints at "lines".
            grid: grid_from(&union(&diagonals)),
        },
        Pattern::single("corners", "Four Corners", vec![0, 4, 20, 24]),
        Pattern::single("x", "X Pattern", union(&diagonals)),
        Pattern::single("plus", "Plus", union(&[row(2), column(2)])),
        Pattern::single(
            "diamond",
            "Diamond",
            vec![2, 6, 7, 8, 10, 11, 12, 13, 14, 16, 17, 18, 22],
        ),
        Pattern::single(
            "heart",
            "Heart",
            vec![1, 3, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 16, 18, 22],
        ),
        Pattern::single(
            "frame",
            "Frame",
            vec![0, 1, 2, 3, 4, 5, 9, 10, 14, 15, 19, 20, 21, 22, 23, 24],
        ),
        Pattern::single("arrow", "Arrow", vec![2, 8, 10, 11, 12, 13, 14, 18, 22]),
        Pattern::single("stamp", "Postage Stamp", vec![0, 1, 5, 6]),
        Pattern::single("letter-t", "Letter T", union(&[row(0), column(2)])),
        Pattern::single("letter-l", "Letter L", union(&[column(0), row(GRID_SIDE - 1)])),
        Pattern::single("blackout", "Blackout", (0..CELL_COUNT).collect()),
    ]
}

/// The fixed, ordered pattern catalog. Built once, never mutated.
pub fn catalog() -> &'static [Pattern] {
    static CATALOG: OnceLock<Vec<Pattern>> = OnceLock::new();
    CATALOG.get_or_init(build_catalog)
}

pub fn catalog_ids() -> impl Iterator<Item = &'static str> {
    catalog().iter().map(|pattern| pattern.id.as_str())
}

/// Resolves a pattern id. Custom tokens are decoded; unknown catalog ids fall
/// back to the first catalog entry.
pub fn get_pattern(id: &str) -> Cow<'static, Pattern> {
    if id.starts_with(CUSTOM_PATTERN_TAG) {
        return Cow::Owned(decode_custom_pattern(id));
    }
    let patterns = catalog();
    match patterns.iter().find(|pattern| pattern.id == id) {
        Some(pattern) => Cow::Borrowed(pattern),
        None => {
            log::debug!("unknown pattern id {id:?}, using {:?}", patterns[0].id);
            Cow::Borrowed(&patterns[0])
        }
    }
}
