//! Compact text encodings carried in share links: custom win shapes and
//! custom/scraped item lists.

use crate::{Item, Pattern, PreviewGrid, CELL_COUNT, CUSTOM_PATTERN_NAME, CUSTOM_PATTERN_TAG};
use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::Engine as _;
use thiserror::Error;

/// Reserved between item names; names must be stripped of it upstream.
pub const ITEM_SEPARATOR: char = '|';
/// Splits a scraped item's name from its image suffix.
pub const PAIR_SEPARATOR: char = '\t';

const BASE36_DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

const TOKEN_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    #[error("invalid base64url token: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("token is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

pub fn encode_custom_pattern(grid: &PreviewGrid) -> String {
    let bits = grid
        .iter()
        .enumerate()
        .filter(|(_, on)| **on != 0)
        .fold(0u32, |bits, (index, _)| bits | (1 << index));
    format!("{CUSTOM_PATTERN_TAG}{}", to_base36(bits))
}

/// Never fails: malformed digits decode to whatever bits the parsable
/// leading digits represent, and no digits at all decode to an empty grid.
pub fn decode_custom_pattern(id: &str) -> Pattern {
    let body = id.strip_prefix(CUSTOM_PATTERN_TAG).unwrap_or(id);
    let bits = parse_base36_prefix(body);
    let mut grid = [0u8; CELL_COUNT];
    let mut on = Vec::new();
    for (index, slot) in grid.iter_mut().enumerate() {
        if (bits >> index) & 1 == 1 {
            *slot = 1;
            on.push(index);
        }
    }
    Pattern {
        id: id.to_string(),
        name: CUSTOM_PATTERN_NAME.to_string(),
        sets: vec![on],
        grid,
    }
}

fn to_base36(mut value: u32) -> String {
    if value == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while value > 0 {
        digits.push(char::from(BASE36_DIGITS[(value % 36) as usize]));
        value /= 36;
    }
    digits.iter().rev().collect()
}

/// Leading-digit base-36 parse: optional whitespace and sign, then digits up
/// to the first non-digit. Arithmetic wraps modulo 2^32.
fn parse_base36_prefix(text: &str) -> u32 {
    let text = text.trim_start();
    let (negative, digits) = if let Some(rest) = text.strip_prefix('-') {
        (true, rest)
    } else {
        (false, text.strip_prefix('+').unwrap_or(text))
    };
    let mut value: u32 = 0;
    for ch in digits.chars() {
        let Some(digit) = ch.to_digit(36) else {
            break;
        };
        value = value.wrapping_mul(36).wrapping_add(digit);
    }
    if negative {
        value.wrapping_neg()
    } else {
        value
    }
}

fn encode_text(text: &str) -> String {
    TOKEN_ENGINE.encode(text.as_bytes())
}

fn decode_text(token: &str) -> Result<String, CodecError> {
    let bytes = TOKEN_ENGINE.decode(token.trim())?;
    Ok(String::from_utf8(bytes)?)
}

pub fn encode_items<S: AsRef<str>>(names: &[S]) -> String {
    let joined = names
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<&str>>()
        .join(ITEM_SEPARATOR.to_string().as_str());
    encode_text(&joined)
}

pub fn decode_items(token: &str) -> Result<Vec<String>, CodecError> {
    let joined = decode_text(token)?;
    if joined.is_empty() {
        return Ok(Vec::new());
    }
    Ok(joined.split(ITEM_SEPARATOR).map(str::to_string).collect())
}

/// Scraped items are stored as `name<TAB>suffix`, where the suffix is the
/// image URL with the shared `prefix` removed.
pub fn encode_url_items(items: &[Item], prefix: &str) -> String {
    let pairs: Vec<String> = items
        .iter()
        .map(|item| {
            let suffix = item.image.strip_prefix(prefix).unwrap_or(&item.image);
            format!("{}{PAIR_SEPARATOR}{suffix}", item.name)
        })
        .collect();
    encode_text(&pairs.join(ITEM_SEPARATOR.to_string().as_str()))
}

pub fn decode_url_items(token: &str, prefix: &str) -> Result<Vec<Item>, CodecError> {
    let joined = decode_text(token)?;
    if joined.is_empty() {
        return Ok(Vec::new());
    }
    Ok(joined
        .split(ITEM_SEPARATOR)
        .map(|pair| {
            let (name, suffix) = pair.split_once(PAIR_SEPARATOR).unwrap_or((pair, ""));
            Item::new(name, format!("{prefix}{suffix}"))
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_of(cells: &[usize]) -> PreviewGrid {
        crate::grid_from(cells)
    }

    fn grid_from_mask(mask: u32) -> PreviewGrid {
        let mut grid = [0u8; CELL_COUNT];
        for (index, slot) in grid.iter_mut().enumerate() {
            *slot = ((mask >> index) & 1) as u8;
        }
        grid
    }

    #[test]
    fn custom_pattern_matches_browser_tokens() {
        let grid = [
            1, 0, 1, 0, 0, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 0, 0, 1, 0, 1,
        ];
        assert_eq!(encode_custom_pattern(&grid), "c_cozet");
        assert_eq!(encode_custom_pattern(&[1; CELL_COUNT]), "c_jz6rj");
        assert_eq!(encode_custom_pattern(&grid_of(&[0, 4, 20, 24])), "c_am2hd");
        assert_eq!(encode_custom_pattern(&[0; CELL_COUNT]), "c_0");
    }

    #[test]
    fn custom_pattern_roundtrip_over_mask_space() {
        let full = (1u32 << CELL_COUNT) - 1;
        let masks = (0..=full).step_by(4099).chain([0, full, 1, 1 << 24]);
        for mask in masks {
            let grid = grid_from_mask(mask);
            let id = encode_custom_pattern(&grid);
            assert!(id.starts_with(CUSTOM_PATTERN_TAG));
            assert_eq!(decode_custom_pattern(&id).grid, grid, "mask {mask}");
        }
    }

    #[test]
    fn decoded_custom_pattern_has_sorted_single_set() {
        let pattern = decode_custom_pattern(&encode_custom_pattern(&grid_of(&[24, 0, 20, 4])));
        assert_eq!(pattern.name, "Custom");
        assert_eq!(pattern.sets, vec![vec![0, 4, 20, 24]]);
    }

    #[test]
    fn non_zero_cells_count_as_selected() {
        let mut grid = [0u8; CELL_COUNT];
        grid[3] = 7;
        assert_eq!(decode_custom_pattern(&encode_custom_pattern(&grid)).sets[0], vec![3]);
    }

    #[test]
    fn malformed_custom_tokens_still_decode() {
        assert_eq!(decode_custom_pattern("c_").grid, [0; CELL_COUNT]);
        assert_eq!(decode_custom_pattern("c_!!").grid, [0; CELL_COUNT]);
        assert_eq!(decode_custom_pattern("c_-1").grid, [1; CELL_COUNT]);
        assert_eq!(decode_custom_pattern("c_AM2HD"), Pattern {
            id: "c_AM2HD".to_string(),
            ..decode_custom_pattern("c_am2hd")
        });
        // "zz" parses, "!" stops the scan.
        assert_eq!(
            decode_custom_pattern("c_zz!").grid,
            grid_from_mask(35 * 36 + 35)
        );
    }

    #[test]
    fn items_match_browser_tokens() {
        let names = ["Apple", "Banana", "Cherry", "Dragonfruit"];
        assert_eq!(encode_items(&names), "QXBwbGV8QmFuYW5hfENoZXJyeXxEcmFnb25mcnVpdA");
        let unicode = ["Caf\u{e9}", "\u{65e5}\u{672c}\u{8a9e}", "\u{1f389} Party"];
        assert_eq!(encode_items(&unicode), "Q2Fmw6l85pel5pys6KqefPCfjokgUGFydHk");
    }

    #[test]
    fn items_roundtrip_with_unicode() {
        let names = vec![
            "Caf\u{e9}".to_string(),
            "Na\u{ef}ve".to_string(),
            "\u{65e5}\u{672c}\u{8a9e}".to_string(),
            "\u{d1}o\u{f1}o".to_string(),
            "\u{1f389} Party".to_string(),
        ];
        assert_eq!(decode_items(&encode_items(&names)), Ok(names));
    }

    #[test]
    fn item_tokens_are_url_safe() {
        let token = encode_items(&["test", "??>>", "\u{ff}\u{fe}"]);
        assert!(token
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_'));
        assert!(!token.ends_with('='));
    }

    #[test]
    fn padded_tokens_are_accepted() {
        assert_eq!(decode_items("dGVzdA=="), Ok(vec!["test".to_string()]));
        assert_eq!(decode_items("dGVzdA"), Ok(vec!["test".to_string()]));
    }

    #[test]
    fn empty_token_is_empty_list() {
        assert_eq!(encode_items::<&str>(&[]), "");
        assert_eq!(decode_items(""), Ok(Vec::new()));
    }

    #[test]
    fn bad_tokens_are_errors() {
        assert!(matches!(decode_items("***"), Err(CodecError::Base64(_))));
        let not_utf8 = TOKEN_ENGINE.encode([0xff, 0xfe, 0xfd]);
        assert!(matches!(decode_items(&not_utf8), Err(CodecError::Utf8(_))));
    }

    #[test]
    fn url_items_roundtrip_through_prefix() {
        let prefix = "https://img.example.com/pets/";
        let items = vec![
            Item::new("Blue Cat", format!("{prefix}blue_cat.png")),
            Item::new("Gr\u{fc}n", format!("{prefix}sub/gruen.png")),
        ];
        let token = encode_url_items(&items, prefix);
        let raw = decode_items(&token).expect("decode");
        assert_eq!(raw[0], "Blue Cat\tblue_cat.png");
        assert_eq!(decode_url_items(&token, prefix), Ok(items));
    }

    #[test]
    fn url_items_without_prefix_keep_full_urls() {
        let items = vec![Item::new("a", "https://x.test/a.png")];
        let token = encode_url_items(&items, "");
        assert_eq!(decode_url_items(&token, ""), Ok(items));
    }

    #[test]
    fn url_item_missing_suffix_gets_prefix_only() {
        let token = encode_items(&["lonely"]);
        assert_eq!(
            decode_url_items(&token, "https://x.test/"),
            Ok(vec![Item::new("lonely", "https://x.test/")])
        );
    }
}
