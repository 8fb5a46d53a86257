//! Item-name hygiene applied before names reach the card builder or codecs.

use crate::{Item, ITEM_SEPARATOR};
use scraper::{Html, Selector};
use std::collections::{HashMap, HashSet};

pub const MAX_NAME_CHARS: usize = 40;
pub const FALLBACK_URL_NAME: &str = "item";

/// One name per line: trimmed, separator removed, truncated, non-empty and
/// unique ignoring case (first spelling wins).
pub fn parse_custom_item_names(raw: &str, max_chars: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    raw.split('\n')
        .map(|line| {
            line.trim()
                .chars()
                .filter(|ch| *ch != ITEM_SEPARATOR)
                .take(max_chars)
                .collect::<String>()
        })
        .filter(|line| !line.is_empty())
        .filter(|line| seen.insert(line.to_lowercase()))
        .collect()
}

/// Display name guessed from an image URL's file name.
pub fn name_from_url(url: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let file = path.rsplit('/').next().unwrap_or(path);
    let stem = match file.rfind('.') {
        Some(dot) if dot + 1 < file.len() => &file[..dot],
        _ => file,
    };

    let mut name = String::with_capacity(stem.len());
    let mut in_run = false;
    for ch in stem.chars() {
        if ch == '-' || ch == '_' {
            if !in_run {
                name.push(' ');
            }
            in_run = true;
        } else {
            name.push(ch);
            in_run = false;
        }
    }
    let name = name.trim();
    if name.is_empty() {
        FALLBACK_URL_NAME.to_string()
    } else {
        name.to_string()
    }
}

/// Names shared (ignoring case) by several items get ` 1`, ` 2`, ... in
/// order of appearance.
pub fn ensure_unique_names(items: Vec<Item>) -> Vec<Item> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for item in &items {
        *counts.entry(item.name.to_lowercase()).or_default() += 1;
    }
    let mut seen: HashMap<String, usize> = HashMap::new();
    items
        .into_iter()
        .map(|mut item| {
            let key = item.name.to_lowercase();
            if counts.get(&key).copied().unwrap_or(0) > 1 {
                let nth = seen.entry(key).or_default();
                *nth += 1;
                item.name = format!("{} {}", item.name, nth);
            }
            item
        })
        .collect()
}

/// Longest prefix shared by every URL, cut back to its last `/`.
pub fn common_url_prefix<S: AsRef<str>>(urls: &[S]) -> String {
    let Some((first, rest)) = urls.split_first() else {
        return String::new();
    };
    let mut prefix = first.as_ref();
    for url in rest {
        let url = url.as_ref();
        let shared = prefix
            .char_indices()
            .zip(url.chars())
            .find(|((_, left), right)| left != right)
            .map(|((index, _), _)| index)
            .unwrap_or_else(|| prefix.len().min(url.len()));
        prefix = &prefix[..shared];
        if prefix.is_empty() {
            return String::new();
        }
    }
    match prefix.rfind('/') {
        Some(slash) => prefix[..=slash].to_string(),
        None => String::new(),
    }
}

/// Items from a pasted list of image URLs: http(s) lines only, optionally
/// restricted to `prefix`, duplicates dropped, names derived from the URL.
pub fn parse_image_list(raw: &str, prefix: &str, max_chars: usize) -> Vec<Item> {
    let mut seen = HashSet::new();
    let items = raw
        .split('\n')
        .map(str::trim)
        .filter(|line| line.starts_with("http://") || line.starts_with("https://"))
        .filter(|line| prefix.is_empty() || line.starts_with(prefix))
        .filter(|line| seen.insert(*line))
        .map(|line| {
            let name: String = name_from_url(line).chars().take(max_chars).collect();
            Item::new(name, line)
        })
        .collect();
    ensure_unique_names(items)
}

/// Items from the `<img>` tags of a pasted HTML snippet. The `alt` text
/// names the item when present, otherwise the name comes from `src`.
pub fn parse_image_html(html: &str, prefix: &str, max_chars: usize) -> Vec<Item> {
    let Ok(selector) = Selector::parse("img") else {
        return Vec::new();
    };
    let document = Html::parse_fragment(html);
    let mut seen = HashSet::new();
    let mut items = Vec::new();
    for element in document.select(&selector) {
        let Some(src) = element.value().attr("src").map(str::trim) else {
            continue;
        };
        if src.is_empty() || !(prefix.is_empty() || src.starts_with(prefix)) {
            continue;
        }
        if !seen.insert(src.to_string()) {
            continue;
        }
        let alt: String = element
            .value()
            .attr("alt")
            .unwrap_or("")
            .trim()
            .chars()
            .filter(|ch| *ch != ITEM_SEPARATOR)
            .collect();
        let name = if alt.is_empty() { name_from_url(src) } else { alt };
        items.push(Item::new(name.chars().take(max_chars).collect::<String>(), src));
    }
    ensure_unique_names(items)
}
