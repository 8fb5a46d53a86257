use bingo_core::{
    check_win, encode_items, generate_card, marked_from_drawn, EventBus, HostGame, ThemeSource,
    BUILTIN_THEMES,
};
use bingo_data::{list_themes, load_rules, load_theme, resolve_theme, validate_theme};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;

fn assets_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("assets")
}

#[test]
fn shipped_themes_are_valid() {
    let rules = load_rules(&assets_root()).expect("rules");
    for entry in list_themes(&assets_root()) {
        if !entry.available {
            continue;
        }
        let theme = load_theme(&assets_root(), &entry.id).expect("load theme");
        assert_eq!(theme.id, entry.id);
        validate_theme(&theme, &rules).expect("valid theme");
    }
}

#[test]
fn listing_covers_every_builtin() {
    let entries = list_themes(&assets_root());
    assert_eq!(entries.len(), BUILTIN_THEMES.len());
    let ids: Vec<&str> = entries.iter().map(|entry| entry.id.as_str()).collect();
    assert_eq!(ids[0], "default");
    assert!(entries.iter().any(|entry| entry.id == "paintbrushes" && entry.available));
}

#[test]
fn hosted_game_draws_to_blackout() {
    let theme = load_theme(&assets_root(), "default").expect("theme");
    let mut rng = StdRng::seed_from_u64(42);
    let mut events = EventBus::default();
    let mut game = HostGame::new(
        "HOSTED".to_string(),
        &ThemeSource::Builtin(theme.id.clone()),
        "blackout".to_string(),
        theme.items.len(),
        &mut rng,
        &mut events,
    );
    while game.draw(&mut events).is_ok() {}
    assert!(game.draws.is_exhausted());

    let verification = game.verify(&theme, "PLAY", &mut events);
    assert_eq!(verification.winner.as_deref(), Some("Blackout"));
    assert_eq!(verification.marked.len(), 25);
    assert!(!events.is_empty());
}

#[test]
fn custom_source_matches_direct_card() {
    let names: Vec<String> = (1..=26).map(|i| format!("Word {i}")).collect();
    let source = ThemeSource::Custom {
        items: encode_items(&names),
    };
    let theme = resolve_theme(&assets_root(), &source).expect("custom theme");
    let card = generate_card(&theme.items, "CUSTOM", "SEED");
    let drawn: Vec<&str> = card.names().into_iter().take(5).collect();
    let marked = marked_from_drawn(&card, &drawn);
    assert_eq!(check_win(&marked, "line").as_deref(), Some("Any Line"));
}
