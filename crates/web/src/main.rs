use bingo_core::{
    catalog, check_pattern, decode_uri_component, generate_card, get_pattern, goal_cells,
    normalize_code, normalize_marks, verify_card, winning_cells, Card, GameRules, Marks,
    PreviewGrid, ShareLink, Theme, ThemeSource,
};
use bingo_data::{list_themes, load_rules, resolve_theme, validate_theme, ThemeEntry};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::Read;
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, Mutex};
use tiny_http::{Header, Method, Response, Server, StatusCode};

const DEFAULT_ADDR: &str = "0.0.0.0:7878";

fn main() {
    env_logger::init();
    let addr = std::env::var("BINGO_ADDR").unwrap_or_else(|_| DEFAULT_ADDR.to_string());
    let state = match AppState::from_env() {
        Ok(state) => Arc::new(Mutex::new(state)),
        Err(err) => {
            eprintln!("startup error: {err:#}");
            std::process::exit(1);
        }
    };
    let server = match Server::http(&addr) {
        Ok(server) => server,
        Err(err) => {
            eprintln!("cannot listen on {addr}: {err}");
            std::process::exit(1);
        }
    };
    log::info!("bingo web server on http://{addr}");
    for request in server.incoming_requests() {
        let state = state.clone();
        if let Err(err) = handle_request(request, state) {
            log::warn!("request error: {err}");
        }
    }
}

struct AppState {
    assets: PathBuf,
    public: PathBuf,
    rules: GameRules,
    themes: HashMap<String, Theme>,
}

impl AppState {
    fn from_env() -> anyhow::Result<Self> {
        let assets = std::env::var_os("BINGO_ASSETS")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("assets"));
        let public = std::env::var_os("BINGO_PUBLIC")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("public"));
        Self::new(assets, public)
    }

    fn new(assets: PathBuf, public: PathBuf) -> anyhow::Result<Self> {
        let rules = load_rules(&assets)?;
        Ok(Self {
            assets,
            public,
            rules,
            themes: HashMap::new(),
        })
    }

    /// Built-in themes are read once; link-carried themes are decoded per
    /// request.
    fn theme(&mut self, source: &ThemeSource) -> anyhow::Result<Theme> {
        if let ThemeSource::Builtin(id) = source {
            if let Some(theme) = self.themes.get(id) {
                return Ok(theme.clone());
            }
        }
        let theme = resolve_theme(&self.assets, source)?;
        validate_theme(&theme, &self.rules)?;
        if let ThemeSource::Builtin(id) = source {
            self.themes.insert(id.clone(), theme.clone());
        }
        Ok(theme)
    }
}

#[derive(Serialize)]
struct ApiResponse<T: Serialize> {
    ok: bool,
    error: Option<String>,
    data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    fn from_result(result: anyhow::Result<T>) -> Self {
        match result {
            Ok(data) => Self {
                ok: true,
                error: None,
                data: Some(data),
            },
            Err(err) => Self {
                ok: false,
                error: Some(format!("{err:#}")),
                data: None,
            },
        }
    }
}

#[derive(Serialize)]
struct UiPattern {
    id: String,
    name: String,
    grid: PreviewGrid,
    sets: usize,
}

#[derive(Serialize)]
struct UiCard {
    game: String,
    seed: String,
    theme: String,
    pattern: String,
    pattern_name: String,
    card: Card,
    goal_cells: Marks,
}

#[derive(Serialize, PartialEq, Debug)]
struct UiCheck {
    winner: Option<String>,
    marked: Marks,
    win_cells: Marks,
}

/// Either the player's own marks or, for host verification, the drawn names.
#[derive(Deserialize)]
struct CheckRequest {
    #[serde(flatten)]
    link: ShareLink,
    seed: String,
    #[serde(default)]
    marks: Vec<usize>,
    #[serde(default)]
    drawn: Option<Vec<String>>,
}

fn handle_request(
    mut request: tiny_http::Request,
    state: Arc<Mutex<AppState>>,
) -> Result<(), Box<dyn std::error::Error>> {
    let url = request.url().to_string();
    let (path, query) = url.split_once('?').unwrap_or((url.as_str(), ""));
    let method = request.method().clone();
    log::debug!("{method} {path}");
    match (&method, path) {
        (&Method::Get, "/api/patterns") => {
            respond_json(request, &ApiResponse::from_result(Ok(api_patterns())))?;
        }
        (&Method::Get, "/api/themes") => {
            let guard = lock(&state)?;
            let response = ApiResponse::from_result(Ok(api_themes(&guard)));
            respond_json(request, &response)?;
        }
        (&Method::Get, "/api/card") => {
            let mut guard = lock(&state)?;
            let response = ApiResponse::from_result(api_card(&mut guard, query));
            respond_json(request, &response)?;
        }
        (&Method::Post, "/api/check") => {
            let mut body = String::new();
            request.as_reader().read_to_string(&mut body)?;
            let result = serde_json::from_str::<CheckRequest>(&body)
                .map_err(anyhow::Error::from)
                .and_then(|check| {
                    let mut guard = lock(&state)?;
                    api_check(&mut guard, check)
                });
            respond_json(request, &ApiResponse::from_result(result))?;
        }
        (&Method::Get, _) => {
            let public = lock(&state)?.public.clone();
            match static_path(&public, path) {
                Some(file) if file.is_file() => {
                    let content_type = content_type(&file);
                    respond_with_file(request, file, content_type)?;
                }
                _ => request.respond(Response::empty(StatusCode(404)))?,
            }
        }
        _ => {
            let response = Response::empty(StatusCode(405));
            request.respond(response)?;
        }
    }
    Ok(())
}

fn lock(state: &Mutex<AppState>) -> anyhow::Result<std::sync::MutexGuard<'_, AppState>> {
    state
        .lock()
        .map_err(|_| anyhow::anyhow!("server state poisoned"))
}

fn api_patterns() -> Vec<UiPattern> {
    catalog()
        .iter()
        .map(|pattern| UiPattern {
            id: pattern.id.clone(),
            name: pattern.name.clone(),
            grid: pattern.grid,
            sets: pattern.sets.len(),
        })
        .collect()
}

fn api_themes(state: &AppState) -> Vec<ThemeEntry> {
    list_themes(&state.assets)
}

fn query_param(query: &str, key: &str) -> Option<String> {
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .filter(|(name, _)| *name == key)
        .last()
        .map(|(_, value)| decode_uri_component(&value.replace('+', " ")))
}

fn checked_codes(state: &AppState, game: &str, seed: &str) -> anyhow::Result<(String, String)> {
    let game = normalize_code(game);
    let seed = normalize_code(seed);
    state.rules.check_game_code(&game)?;
    state.rules.check_card_seed(&seed)?;
    Ok((game, seed))
}

fn api_card(state: &mut AppState, query: &str) -> anyhow::Result<UiCard> {
    let link = ShareLink::from_query(query);
    let seed = query_param(query, "seed").unwrap_or_default();
    let (game, seed) = checked_codes(state, &link.game, &seed)?;
    let theme = state.theme(&link.theme_source())?;
    let pattern_id = link
        .pattern
        .clone()
        .unwrap_or_else(|| state.rules.default_pattern.clone());
    let pattern = get_pattern(&pattern_id);
    Ok(UiCard {
        card: generate_card(&theme.items, &game, &seed),
        game,
        seed,
        theme: theme.id,
        pattern: pattern.id.clone(),
        pattern_name: pattern.name.clone(),
        goal_cells: goal_cells(&pattern),
    })
}

fn api_check(state: &mut AppState, check: CheckRequest) -> anyhow::Result<UiCheck> {
    let (game, seed) = checked_codes(state, &check.link.game, &check.seed)?;
    let theme = state.theme(&check.link.theme_source())?;
    let pattern_id = check
        .link
        .pattern
        .clone()
        .unwrap_or_else(|| state.rules.default_pattern.clone());
    if let Some(drawn) = check.drawn {
        let verification = verify_card(&theme.items, &game, &seed, &drawn, &pattern_id);
        return Ok(UiCheck {
            winner: verification.winner,
            marked: verification.marked,
            win_cells: verification.win_cells,
        });
    }
    let pattern = get_pattern(&pattern_id);
    let marked = normalize_marks(check.marks);
    Ok(UiCheck {
        winner: check_pattern(&marked, &pattern).map(str::to_string),
        win_cells: winning_cells(&marked, &pattern),
        marked,
    })
}

/// Maps a request path into the public directory; `..` and absolute
/// components are refused.
fn static_path(public: &Path, path: &str) -> Option<PathBuf> {
    let relative = decode_uri_component(path.trim_start_matches('/'));
    let relative = if relative.is_empty() {
        "index.html".to_string()
    } else {
        relative
    };
    let relative = Path::new(&relative);
    if !relative
        .components()
        .all(|component| matches!(component, Component::Normal(_)))
    {
        return None;
    }
    Some(public.join(relative))
}

fn content_type(path: &Path) -> &'static str {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("html") => "text/html; charset=utf-8",
        Some("js") => "application/javascript",
        Some("css") => "text/css; charset=utf-8",
        Some("json") => "application/json",
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        _ => "application/octet-stream",
    }
}

fn content_type_header(value: &str) -> Result<Header, Box<dyn std::error::Error>> {
    Header::from_bytes(&b"Content-Type"[..], value.as_bytes())
        .map_err(|()| format!("invalid content type {value:?}").into())
}

fn respond_with_file(
    request: tiny_http::Request,
    path: PathBuf,
    content_type: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut file = std::fs::File::open(path)?;
    let mut content = Vec::new();
    file.read_to_end(&mut content)?;
    let header = content_type_header(content_type)?;
    let response = Response::from_data(content).with_header(header);
    request.respond(response)?;
    Ok(())
}

fn respond_json<T: Serialize>(
    request: tiny_http::Request,
    response: &ApiResponse<T>,
) -> Result<(), Box<dyn std::error::Error>> {
    let body = serde_json::to_vec_pretty(response)?;
    let header = content_type_header("application/json")?;
    let status = if response.ok { 200 } else { 400 };
    let response = Response::from_data(body)
        .with_header(header)
        .with_status_code(StatusCode(status));
    request.respond(response)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bingo_core::encode_items;

    fn test_state() -> AppState {
        let root = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("..").join("..");
        AppState::new(root.join("assets"), root.join("public")).expect("state")
    }

    #[test]
    fn card_endpoint_builds_shared_card() {
        let mut state = test_state();
        let card = api_card(&mut state, "game=abcdef&theme=default&seed=xy23&pattern=corners")
            .expect("card");
        assert_eq!(card.game, "ABCDEF");
        assert_eq!(card.seed, "XY23");
        assert_eq!(card.pattern_name, "Four Corners");
        assert_eq!(card.goal_cells, [0, 4, 20, 24].into_iter().collect());
        let theme = state.theme(&ThemeSource::Builtin("default".into())).expect("theme");
        assert_eq!(card.card, generate_card(&theme.items, "ABCDEF", "XY23"));
    }

    #[test]
    fn card_endpoint_rejects_bad_codes() {
        let mut state = test_state();
        assert!(api_card(&mut state, "game=ABC&seed=XY23").is_err());
        assert!(api_card(&mut state, "game=ABCDEF&seed=IO10").is_err());
    }

    #[test]
    fn check_uses_marks_or_drawn_names() {
        let mut state = test_state();
        let names: Vec<String> = (0..24).map(|i| format!("Word{i}")).collect();
        let mut link = ShareLink::new("ABCDEF", "custom");
        link.custom_items = Some(encode_items(&names));

        let by_marks = CheckRequest {
            link: link.clone(),
            seed: "XY23".to_string(),
            marks: vec![0, 1, 2, 3, 4],
            drawn: None,
        };
        let result = api_check(&mut state, by_marks).expect("marks");
        assert_eq!(result.winner.as_deref(), Some("Any Line"));
        assert_eq!(result.win_cells, (0..5).collect());

        let by_draws = CheckRequest {
            link,
            seed: "XY23".to_string(),
            marks: Vec::new(),
            drawn: Some(names),
        };
        let result = api_check(&mut state, by_draws).expect("drawn");
        assert_eq!(result.winner.as_deref(), Some("Any Line"));
        assert_eq!(result.marked.len(), 25);
    }

    #[test]
    fn check_request_reads_share_fields() {
        let check: CheckRequest =
            serde_json::from_str(r#"{"game":"ABCDEF","theme":"default","seed":"XY23","marks":[12]}"#)
                .expect("parse");
        assert_eq!(check.link.game, "ABCDEF");
        assert_eq!(check.marks, [12]);
        assert!(check.drawn.is_none());
    }

    #[test]
    fn static_paths_stay_inside_public() {
        let public = Path::new("public");
        assert_eq!(static_path(public, "/"), Some(public.join("index.html")));
        assert_eq!(
            static_path(public, "/play.html"),
            Some(public.join("play.html"))
        );
        assert_eq!(static_path(public, "/../Cargo.toml"), None);
        assert_eq!(static_path(public, "/%2e%2e/secret"), None);
        assert_eq!(content_type(Path::new("a/app.js")), "application/javascript");
    }

    #[test]
    fn query_param_decodes_values() {
        assert_eq!(query_param("a=1&seed=X%59+2", "seed").as_deref(), Some("XY 2"));
        assert_eq!(query_param("a=1", "seed"), None);
        assert_eq!(api_patterns().len(), catalog().len());
    }

    #[test]
    fn content_type_header_accepts_ascii_only() {
        let header = content_type_header("application/json").expect("header");
        assert!(header.field.equiv("content-type"));
        assert_eq!(header.value.as_str(), "application/json");
        let err = content_type_header("text/caf\u{e9}").expect_err("non-ascii");
        assert!(err.to_string().contains("invalid content type"));
    }
}
