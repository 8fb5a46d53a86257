use anyhow::{anyhow, bail, Context};
use bingo_core::{
    catalog, catalog_ids, common_url_prefix, encode_custom_pattern, encode_items,
    encode_url_items, generate_card_seed, generate_game_code, get_pattern, normalize_code,
    parse_custom_item_names, parse_image_html, parse_image_list, render_preview, Card, EventBus,
    GameRules, HostGame, Item, Marks, PlayerCard, PreviewGrid, ShareLink, Theme, ThemeSource,
    CELL_COUNT, CUSTOM_PATTERN_TAG, GRID_SIDE,
};
use bingo_data::{
    clear_host_session, default_player_dir, default_session_path, list_themes, load_host_session,
    load_player, load_rules, resolve_theme, restore_host_session, save_host_session, save_player,
    validate_theme, PlayerSave,
};
use std::path::{Path, PathBuf};

const DEFAULT_BASE_URL: &str = "http://localhost:7878/";
const CELL_WIDTH: usize = 14;

#[derive(Debug, Clone, Default)]
struct CliOptions {
    command: Option<String>,
    positional: Vec<String>,
    theme: Option<String>,
    pattern: Option<String>,
    game: Option<String>,
    seed: Option<String>,
    name: Option<String>,
    items_file: Option<PathBuf>,
    images_file: Option<PathBuf>,
    html_file: Option<PathBuf>,
    prefix: Option<String>,
    link: Option<String>,
    base: Option<String>,
    json: bool,
}

fn parse_cli_options(args: &[String]) -> CliOptions {
    let mut options = CliOptions::default();
    let mut idx = 0usize;
    while idx < args.len() {
        let arg = args[idx].as_str();
        let value = args.get(idx + 1).cloned();
        let mut take = |slot: &mut Option<String>| {
            if value.is_some() {
                *slot = value.clone();
                idx += 1;
            }
        };
        match arg {
            "--theme" | "-t" => take(&mut options.theme),
            "--pattern" | "-p" => take(&mut options.pattern),
            "--game" | "-g" => take(&mut options.game),
            "--seed" | "-s" => take(&mut options.seed),
            "--name" | "-n" => take(&mut options.name),
            "--link" => take(&mut options.link),
            "--prefix" => take(&mut options.prefix),
            "--base" => take(&mut options.base),
            "--items" => {
                let mut path = None;
                take(&mut path);
                options.items_file = path.map(PathBuf::from);
            }
            "--images" => {
                let mut path = None;
                take(&mut path);
                options.images_file = path.map(PathBuf::from);
            }
            "--html" => {
                let mut path = None;
                take(&mut path);
                options.html_file = path.map(PathBuf::from);
            }
            "--json" => options.json = true,
            _ if options.command.is_none() => options.command = Some(arg.to_string()),
            _ => options.positional.push(arg.to_string()),
        }
        idx += 1;
    }
    options
}

fn main() {
    env_logger::init();
    let args: Vec<String> = std::env::args().skip(1).collect();
    let options = parse_cli_options(&args);
    if let Err(err) = run(&options) {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn run(options: &CliOptions) -> anyhow::Result<()> {
    match options.command.as_deref() {
        Some("new") => cmd_new(options),
        Some("draw") => cmd_draw(),
        Some("status") => cmd_status(),
        Some("link") => cmd_link(options),
        Some("verify") => cmd_verify(options),
        Some("end") => cmd_end(),
        Some("card") => cmd_card(options),
        Some("mark") => cmd_mark(options),
        Some("patterns") => cmd_patterns(),
        Some("pattern-encode") => cmd_pattern_encode(options),
        Some("encode-items") => cmd_encode_items(options),
        Some("themes") => cmd_themes(),
        Some("help") | None => {
            print_help();
            Ok(())
        }
        Some(other) => bail!("unknown command {other:?} (try `help`)"),
    }
}

fn print_help() {
    println!("bingo-cli <command> [options]");
    println!();
    println!("host:");
    println!("  new [--theme ID | --items FILE | --images FILE | --html FILE]");
    println!("      [--prefix URL] [--pattern ID]");
    println!("  draw                       draw the next item");
    println!("  status                     show drawn items");
    println!("  link [--base URL]          print host and player links");
    println!("  verify SEED [--json]       rebuild a player's card and check it");
    println!("  end                        forget the saved game");
    println!("player:");
    println!("  card --seed SEED (--link URL | --game CODE [--theme ID]) [--json]");
    println!("  mark CELL|ITEM --name NAME (--link URL | --game CODE [--theme ID])");
    println!("tools:");
    println!("  patterns | themes");
    println!("  pattern ids: {}", catalog_ids().collect::<Vec<_>>().join(", "));
    println!("  pattern-encode ROWS        e.g. 10001/00000/00100/00000/10001");
    println!("  encode-items FILE          one name per line");
    println!();
    println!("env: BINGO_ASSETS, BINGO_SESSION, BINGO_PLAYER_DIR, RUST_LOG");
}

fn assets_dir() -> PathBuf {
    std::env::var_os("BINGO_ASSETS")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("assets"))
}

fn session_path() -> anyhow::Result<PathBuf> {
    default_session_path().ok_or_else(|| anyhow!("set BINGO_SESSION or HOME"))
}

fn load_theme_checked(assets: &Path, source: &ThemeSource, rules: &GameRules) -> anyhow::Result<Theme> {
    let theme = resolve_theme(assets, source)?;
    validate_theme(&theme, rules)?;
    Ok(theme)
}

fn source_from_files(options: &CliOptions, rules: &GameRules) -> anyhow::Result<ThemeSource> {
    if let Some(path) = &options.items_file {
        let raw = read_text(path)?;
        let names = parse_custom_item_names(&raw, rules.max_name_chars);
        return Ok(ThemeSource::Custom {
            items: encode_items(&names),
        });
    }
    let filter = options.prefix.as_deref().unwrap_or("");
    if let Some(path) = &options.images_file {
        let items = parse_image_list(&read_text(path)?, filter, rules.max_name_chars);
        return Ok(url_scrape_source(&items));
    }
    if let Some(path) = &options.html_file {
        let items = parse_image_html(&read_text(path)?, filter, rules.max_name_chars);
        return Ok(url_scrape_source(&items));
    }
    let theme = options.theme.clone().unwrap_or_else(|| "default".to_string());
    Ok(ThemeSource::Builtin(theme))
}

/// Scraped items travel with their shared URL prefix stripped.
fn url_scrape_source(items: &[Item]) -> ThemeSource {
    let images: Vec<&str> = items.iter().map(|item| item.image.as_str()).collect();
    let prefix = common_url_prefix(&images);
    ThemeSource::UrlScrape {
        items: encode_url_items(items, &prefix),
        prefix,
    }
}

fn known_pattern(id: &str) -> bool {
    id.starts_with(CUSTOM_PATTERN_TAG) || catalog_ids().any(|known| known == id)
}

fn read_text(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("read {}", path.display()))
}

fn log_events(events: &mut EventBus) {
    for event in events.drain() {
        log::info!("{event:?}");
    }
}

fn cmd_new(options: &CliOptions) -> anyhow::Result<()> {
    let assets = assets_dir();
    let rules = load_rules(&assets)?;
    if let Some(id) = options.pattern.as_deref().filter(|id| !known_pattern(id)) {
        bail!("unknown pattern {id:?} (see `patterns`)");
    }
    let source = source_from_files(options, &rules)?;
    let theme = load_theme_checked(&assets, &source, &rules)?;
    let mut rng = rand::thread_rng();
    let game_code = match &options.game {
        Some(code) => {
            let code = normalize_code(code);
            rules.check_game_code(&code)?;
            let path = session_path()?;
            if let Some(saved) = restore_host_session(&path, Some(&code), Some(source.id()))? {
                saved.check_theme(&theme)?;
                println!("resuming game {} ({} drawn)", code, saved.game.draws.drawn.len());
                print_links(&saved.game.share_link(), options.base.as_deref());
                return Ok(());
            }
            code
        }
        None => generate_game_code(&mut rng),
    };
    let pattern = get_pattern(options.pattern.as_deref().unwrap_or(&rules.default_pattern));
    let mut events = EventBus::default();
    let game = HostGame::new(
        game_code,
        &source,
        pattern.id.clone(),
        theme.items.len(),
        &mut rng,
        &mut events,
    );
    save_host_session(&game, &theme, &session_path()?)?;
    log_events(&mut events);
    println!("game {} | theme {} | {} items", game.game_code, theme.title, theme.items.len());
    println!("pattern {} ({})", pattern.name, pattern.id);
    println!("{}", render_preview(&*pattern));
    print_links(&game.share_link(), options.base.as_deref());
    Ok(())
}

fn load_session(assets: &Path) -> anyhow::Result<(HostGame, Theme, GameRules)> {
    let rules = load_rules(assets)?;
    let saved = load_host_session(&session_path()?).context("no game in progress (run `new`)")?;
    let theme = load_theme_checked(assets, &saved.game.theme_source(), &rules)?;
    saved.check_theme(&theme)?;
    if !saved.game.draws.is_consistent(theme.items.len()) {
        bail!("saved draws do not fit theme {}", theme.id);
    }
    Ok((saved.game, theme, rules))
}

fn cmd_draw() -> anyhow::Result<()> {
    let assets = assets_dir();
    let (mut game, theme, _) = load_session(&assets)?;
    let mut events = EventBus::default();
    let index = game.draw(&mut events)?;
    save_host_session(&game, &theme, &session_path()?)?;
    log_events(&mut events);
    println!(
        "#{} {} ({} left)",
        game.draws.drawn.len(),
        theme.items[index].name,
        game.draws.remaining()
    );
    Ok(())
}

fn cmd_status() -> anyhow::Result<()> {
    let assets = assets_dir();
    let (game, theme, _) = load_session(&assets)?;
    let pattern = get_pattern(&game.pattern_id);
    println!("game {} | theme {} | pattern {}", game.game_code, theme.title, pattern.name);
    println!("drawn {}/{}", game.draws.drawn.len(), game.draws.total());
    for (turn, name) in game.drawn_names(&theme).iter().enumerate() {
        println!("{:>3}. {name}", turn + 1);
    }
    Ok(())
}

fn print_links(link: &ShareLink, base: Option<&str>) {
    let base = base.unwrap_or(DEFAULT_BASE_URL);
    println!("host:   {}", link.host_url(base));
    println!("player: {}", link.play_url(base));
}

fn cmd_link(options: &CliOptions) -> anyhow::Result<()> {
    let saved = load_host_session(&session_path()?)?;
    print_links(&saved.game.share_link(), options.base.as_deref());
    Ok(())
}

fn cmd_verify(options: &CliOptions) -> anyhow::Result<()> {
    let assets = assets_dir();
    let (game, theme, rules) = load_session(&assets)?;
    let seed = options
        .positional
        .first()
        .or(options.seed.as_ref())
        .map(|seed| normalize_code(seed))
        .ok_or_else(|| anyhow!("verify needs a card seed"))?;
    rules.check_card_seed(&seed)?;
    let mut events = EventBus::default();
    let verification = game.verify(&theme, &seed, &mut events);
    log_events(&mut events);
    if options.json {
        println!("{}", serde_json::to_string_pretty(&verification)?);
        return Ok(());
    }
    print_card(&verification.card, &verification.marked);
    match &verification.winner {
        Some(name) => println!("VALID: card {seed} has {name}"),
        None => println!("NOT YET: card {seed} has no win"),
    }
    Ok(())
}

fn cmd_end() -> anyhow::Result<()> {
    clear_host_session(&session_path()?)?;
    println!("game cleared");
    Ok(())
}

/// Game parameters a player knows: either a pasted link or explicit flags.
fn player_link(options: &CliOptions) -> anyhow::Result<ShareLink> {
    let mut link = match &options.link {
        Some(url) => {
            let query = url.split_once('?').map_or(url.as_str(), |(_, query)| query);
            ShareLink::from_query(query)
        }
        None => ShareLink::new(
            options.game.clone().unwrap_or_default(),
            options.theme.clone().unwrap_or_else(|| "default".to_string()),
        ),
    };
    if options.pattern.is_some() {
        link.pattern = options.pattern.clone();
    }
    link.game = normalize_code(&link.game);
    if link.game.is_empty() {
        bail!("need --game CODE or --link URL");
    }
    Ok(link)
}

fn player_dir() -> anyhow::Result<PathBuf> {
    default_player_dir().ok_or_else(|| anyhow!("set BINGO_PLAYER_DIR or HOME"))
}

fn open_player_card(options: &CliOptions) -> anyhow::Result<(PlayerCard, PathBuf)> {
    let assets = assets_dir();
    let rules = load_rules(&assets)?;
    let link = player_link(options)?;
    rules.check_game_code(&link.game)?;
    let theme = load_theme_checked(&assets, &link.theme_source(), &rules)?;
    let name = options.name.clone().unwrap_or_else(|| "player".to_string());
    let dir = player_dir()?;
    let saved = load_player(&dir, &link.game, &name)?.unwrap_or_default();
    let seed = match options.seed.as_deref().map(normalize_code).or_else(|| saved.seed.clone()) {
        Some(seed) => seed,
        None => generate_card_seed(&mut rand::thread_rng()),
    };
    rules.check_card_seed(&seed)?;
    let marks = saved.marks_for(&seed);
    let pattern = link
        .pattern
        .clone()
        .unwrap_or_else(|| rules.default_pattern.clone());
    let card = PlayerCard::new(&theme.items, &link.game, &name, &seed, &pattern, marks);
    Ok((card, dir))
}

fn store_player_card(card: &PlayerCard, dir: &Path) -> anyhow::Result<()> {
    let save = PlayerSave {
        seed: Some(card.card_seed.clone()),
        marks: card.marked.iter().copied().collect(),
    };
    save_player(dir, &card.game_code, &card.player_name, &save)
}

fn cmd_card(options: &CliOptions) -> anyhow::Result<()> {
    let (card, dir) = open_player_card(options)?;
    store_player_card(&card, &dir)?;
    if options.json {
        println!("{}", serde_json::to_string_pretty(&card.card)?);
        return Ok(());
    }
    println!("game {} | card {}", card.game_code, card.card_seed);
    print_card(&card.card, &card.marked);
    Ok(())
}

/// A cell index (0-24) or the name of an item on the card.
fn resolve_cell(card: &Card, target: &str) -> anyhow::Result<usize> {
    match target.parse::<usize>() {
        Ok(index) if index < CELL_COUNT => Ok(index),
        Ok(index) => bail!("cell index {index} out of range"),
        Err(_) => card
            .index_of(target)
            .ok_or_else(|| anyhow!("no item named {target:?} on this card")),
    }
}

fn cmd_mark(options: &CliOptions) -> anyhow::Result<()> {
    let target = options.positional.join(" ");
    if target.is_empty() {
        bail!("mark needs a cell index (0-24) or an item name");
    }
    let (mut card, dir) = open_player_card(options)?;
    let cell = resolve_cell(&card.card, &target)?;
    let marked = card.toggle(cell);
    store_player_card(&card, &dir)?;
    print_card(&card.card, &card.marked);
    let label = card.card.cell(cell).map_or("", |cell| cell.name.as_str());
    println!("{} {label}", if marked { "marked" } else { "cleared" });
    if let Some(name) = card.winner() {
        println!("BINGO! {name} (show card {} to the host)", card.card_seed);
    }
    Ok(())
}

fn print_card(card: &Card, marked: &Marks) {
    let border = format!("+{}", format!("{}+", "-".repeat(CELL_WIDTH)).repeat(GRID_SIDE));
    println!("{border}");
    for (r, cells) in card.cells().chunks(GRID_SIDE).enumerate() {
        let line: String = cells
            .iter()
            .enumerate()
            .map(|(c, cell)| {
                let tick = if marked.contains(&(r * GRID_SIDE + c)) { '*' } else { ' ' };
                let name: String = cell.name.chars().take(CELL_WIDTH - 2).collect();
                format!("{tick}{name:<width$} |", width = CELL_WIDTH - 2)
            })
            .collect();
        println!("|{line}");
        println!("{border}");
    }
}

fn cmd_patterns() -> anyhow::Result<()> {
    for pattern in catalog() {
        println!("{} ({}, {} sets)", pattern.name, pattern.id, pattern.sets.len());
        println!("{}", render_preview(pattern));
        println!();
    }
    Ok(())
}

/// Accepts `/`-separated rows of `1`/`#` (on) and `0`/`.` (off), or a
/// comma-separated list of cell indices. A lone one- or two-digit number is
/// a single index.
fn parse_grid(text: &str) -> anyhow::Result<PreviewGrid> {
    let mut grid: PreviewGrid = [0; CELL_COUNT];
    let single_index =
        !text.is_empty() && text.len() <= 2 && text.chars().all(|ch| ch.is_ascii_digit());
    if text.contains(',') || single_index {
        for part in text.split(',').map(str::trim).filter(|part| !part.is_empty()) {
            let index: usize = part.parse().with_context(|| format!("cell {part:?}"))?;
            let slot = grid
                .get_mut(index)
                .ok_or_else(|| anyhow!("cell {index} out of range"))?;
            *slot = 1;
        }
        return Ok(grid);
    }
    let cells: Vec<char> = text.chars().filter(|ch| !matches!(ch, '/' | ' ')).collect();
    if cells.len() != CELL_COUNT {
        bail!("expected {CELL_COUNT} cells, got {}", cells.len());
    }
    for (slot, ch) in grid.iter_mut().zip(cells) {
        *slot = match ch {
            '1' | '#' | 'x' | 'X' => 1,
            '0' | '.' | '-' => 0,
            other => bail!("unexpected cell {other:?}"),
        };
    }
    Ok(grid)
}

fn cmd_pattern_encode(options: &CliOptions) -> anyhow::Result<()> {
    let text = options.positional.join("/");
    let grid = parse_grid(&text)?;
    if grid.iter().all(|on| *on == 0) {
        bail!("select at least one cell");
    }
    let id = encode_custom_pattern(&grid);
    println!("{id}");
    println!("{}", render_preview(&*get_pattern(&id)));
    Ok(())
}

fn cmd_encode_items(options: &CliOptions) -> anyhow::Result<()> {
    let path = options
        .positional
        .first()
        .map(PathBuf::from)
        .or_else(|| options.items_file.clone())
        .ok_or_else(|| anyhow!("encode-items needs a file"))?;
    let rules = load_rules(&assets_dir())?;
    let names = parse_custom_item_names(&read_text(&path)?, rules.max_name_chars);
    rules.check_item_count(names.len())?;
    println!("{}", encode_items(&names));
    Ok(())
}

fn cmd_themes() -> anyhow::Result<()> {
    for entry in list_themes(&assets_dir()) {
        let mark = if entry.available { ' ' } else { '!' };
        println!("{mark} {:<18} {}", entry.id, entry.title);
    }
    Ok(())
}
