use crate::{get_pattern, Card, Pattern, PreviewGrid, CELL_COUNT, FREE_INDEX, GRID_SIDE};
use std::collections::{BTreeSet, HashSet};

/// Marked cell indices on one card.
pub type Marks = BTreeSet<usize>;

fn set_satisfied(marked: &Marks, set: &[usize]) -> bool {
    set.iter().all(|cell| marked.contains(cell))
}

/// Name of `pattern` if any one of its sets is fully marked.
pub fn check_pattern<'p>(marked: &Marks, pattern: &'p Pattern) -> Option<&'p str> {
    pattern
        .sets
        .iter()
        .any(|set| set_satisfied(marked, set))
        .then_some(pattern.name.as_str())
}

/// Resolves `pattern_id` and reports the winning pattern name, or `None`.
/// Callers pre-mark the FREE cell.
pub fn check_win(marked: &Marks, pattern_id: &str) -> Option<String> {
    let pattern = get_pattern(pattern_id);
    check_pattern(marked, &pattern).map(str::to_string)
}

/// Every satisfied set, for highlighting simultaneous lines.
pub fn winning_sets<'p>(marked: &Marks, pattern: &'p Pattern) -> Vec<&'p [usize]> {
    pattern
        .sets
        .iter()
        .filter(|set| set_satisfied(marked, set))
        .map(Vec::as_slice)
        .collect()
}

pub fn winning_cells(marked: &Marks, pattern: &Pattern) -> Marks {
    winning_sets(marked, pattern)
        .into_iter()
        .flatten()
        .copied()
        .collect()
}

/// Cells a player should aim for. Multi-set patterns are ambiguous, so they
/// have none.
pub fn goal_cells(pattern: &Pattern) -> Marks {
    match pattern.sets.as_slice() {
        [only] => only.iter().copied().collect(),
        _ => Marks::new(),
    }
}

/// Marks derived from the host's draw history: the FREE cell plus every cell
/// whose name was drawn. Matching is by name, never by position.
pub fn marked_from_drawn<S: AsRef<str>>(card: &Card, drawn_names: &[S]) -> Marks {
    let drawn: HashSet<&str> = drawn_names.iter().map(AsRef::as_ref).collect();
    card.cells()
        .iter()
        .enumerate()
        .filter(|(_, cell)| cell.free || drawn.contains(cell.name.as_str()))
        .map(|(index, _)| index)
        .collect()
}

/// Marks restored from a player save, always including the FREE cell and
/// dropping anything off the grid.
pub fn normalize_marks(marks: impl IntoIterator<Item = usize>) -> Marks {
    marks
        .into_iter()
        .filter(|&cell| cell < CELL_COUNT)
        .chain(std::iter::once(FREE_INDEX))
        .collect()
}

/// Either a finished pattern or an in-progress custom grid.
#[derive(Debug, Clone, Copy)]
pub enum PatternPreview<'a> {
    Pattern(&'a Pattern),
    Grid(&'a PreviewGrid),
}

impl PatternPreview<'_> {
    pub fn grid(&self) -> &PreviewGrid {
        match self {
            Self::Pattern(pattern) => &pattern.grid,
            Self::Grid(grid) => grid,
        }
    }
}

impl<'a> From<&'a Pattern> for PatternPreview<'a> {
    fn from(pattern: &'a Pattern) -> Self {
        Self::Pattern(pattern)
    }
}

impl<'a> From<&'a PreviewGrid> for PatternPreview<'a> {
    fn from(grid: &'a PreviewGrid) -> Self {
        Self::Grid(grid)
    }
}

/// Five text rows, `#` for on and `.` for off.
pub fn render_preview<'a>(preview: impl Into<PatternPreview<'a>>) -> String {
    let preview = preview.into();
    preview
        .grid()
        .chunks(GRID_SIDE)
        .map(|row| {
            row.iter()
                .map(|on| if *on != 0 { '#' } else { '.' })
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{decode_custom_pattern, encode_custom_pattern, generate_card, grid_from, Item};

    fn marks(cells: &[usize]) -> Marks {
        cells.iter().copied().collect()
    }

    #[test]
    fn check_pattern_borrows_name() {
        let pattern = get_pattern("stamp");
        assert_eq!(check_pattern(&marks(&[0, 1, 5, 6]), &pattern), Some("Postage Stamp"));
        assert_eq!(check_pattern(&marks(&[0, 1, 5]), &pattern), None);
    }

    #[test]
    fn custom_pattern_wins_only_when_complete() {
        let id = encode_custom_pattern(&grid_from(&[0, 1, 2]));
        assert_eq!(check_win(&marks(&[0, 1, 2, 12]), &id).as_deref(), Some("Custom"));
        assert_eq!(check_win(&marks(&[0, 1, 12]), &id), None);
    }

    #[test]
    fn empty_custom_pattern_wins_immediately() {
        assert_eq!(check_win(&marks(&[12]), "c_0").as_deref(), Some("Custom"));
    }

    #[test]
    fn winning_sets_reports_every_line() {
        let line = get_pattern("line");
        let marked = marks(&[0, 1, 2, 3, 4, 6, 12, 18, 24]);
        let sets = winning_sets(&marked, &line);
        assert_eq!(sets, vec![&[0, 1, 2, 3, 4][..], &[0, 6, 12, 18, 24][..]]);
        assert_eq!(
            winning_cells(&marked, &line),
            marks(&[0, 1, 2, 3, 4, 6, 12, 18, 24])
        );
    }

    #[test]
    fn goal_cells_only_for_single_set_patterns() {
        assert!(goal_cells(&get_pattern("line")).is_empty());
        assert_eq!(goal_cells(&get_pattern("corners")), marks(&[0, 4, 20, 24]));
    }

    #[test]
    fn drawn_names_mark_matching_cells() {
        let items: Vec<Item> = (0..30)
            .map(|i| Item::new(format!("Item{i}"), format!("img{i}.png")))
            .collect();
        let card = generate_card(&items, "TESTGM", "AB12");
        let top_row: Vec<&str> = (0..5).map(|i| card.cells()[i].name.as_str()).collect();
        let marked = marked_from_drawn(&card, &top_row);
        assert_eq!(marked, marks(&[0, 1, 2, 3, 4, 12]));
        assert_eq!(check_win(&marked, "line").as_deref(), Some("Any Line"));

        let partial = marked_from_drawn(&card, &top_row[..3]);
        assert_eq!(check_win(&partial, "line"), None);
    }

    #[test]
    fn drawn_names_not_on_card_are_ignored() {
        let items: Vec<Item> = (0..24)
            .map(|i| Item::new(format!("Item{i}"), String::new()))
            .collect();
        let card = generate_card(&items, "TESTGM", "AB12");
        assert_eq!(marked_from_drawn(&card, &["Nope", "FREE"]), marks(&[12]));
    }

    #[test]
    fn normalize_marks_adds_free_and_drops_out_of_range() {
        assert_eq!(normalize_marks([3, 99, 25, 24]), marks(&[3, 12, 24]));
    }

    #[test]
    fn preview_accepts_pattern_or_grid() {
        let corners = get_pattern("corners");
        let expected = "#...#\n.....\n.....\n.....\n#...#";
        assert_eq!(render_preview(&*corners), expected);
        assert_eq!(render_preview(&corners.grid), expected);

        let in_progress = decode_custom_pattern("c_1").grid;
        assert!(render_preview(&in_progress).starts_with("#...."));
    }
}
