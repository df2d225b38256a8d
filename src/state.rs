use serde::{Deserialize, Serialize};

pub const PLACEHOLDER_IMAGE_BASE: &str = "https://picsum.photos/seed";
pub const DEFAULT_PLAYTIME: &str = "Varies";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameCategory {
    #[serde(rename = "Single Player")]
    SinglePlayer,
    #[serde(rename = "Multiplayer Online")]
    MultiplayerOnline,
    #[serde(rename = "Split-screen/Couch")]
    SplitscreenCouch,
}

impl GameCategory {
    pub const ALL: [GameCategory; 3] = [
        GameCategory::SinglePlayer,
        GameCategory::MultiplayerOnline,
        GameCategory::SplitscreenCouch,
    ];

    pub fn label(self) -> &'static str {
        match self {
            GameCategory::SinglePlayer => "Single Player",
            GameCategory::MultiplayerOnline => "Online Multiplayer",
            GameCategory::SplitscreenCouch => "Split-screen/Couch",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    pub id: String,
    pub title: String,
    pub category: GameCategory,
    pub rating: f64,
    #[serde(rename = "whyPlay")]
    pub why_play: String,
    #[serde(default)]
    pub playtime: Option<String>,
    pub genre: String,
    pub platform: Vec<String>,
    #[serde(default, rename = "imageUrl")]
    pub image_url: Option<String>,
}

impl Game {
    pub fn playtime_label(&self) -> &str {
        self.playtime
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .unwrap_or(DEFAULT_PLAYTIME)
    }

    /// Art URL for the card; empty/missing URLs fall back to a placeholder
    /// keyed by `id` so the same game always gets the same stand-in image.
    pub fn image_or_placeholder(&self) -> String {
        match self.image_url.as_deref() {
            Some(url) if !url.trim().is_empty() => url.to_string(),
            _ => format!("{PLACEHOLDER_IMAGE_BASE}/{}/400/225", self.id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRef {
    pub title: String,
    pub uri: String,
}

/// One day's normalized recommendation set. `date` is the cache key; two
/// snapshots belong to the same day iff the strings match exactly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySnapshot {
    pub date: String,
    pub games: Vec<Game>,
    pub sources: Vec<SourceRef>,
}

/// Pure projection for the category sections: order-preserving filter,
/// empty when nothing matches (the section is then omitted from the view).
pub fn games_by_category(games: &[Game], category: GameCategory) -> Vec<&Game> {
    games.iter().filter(|g| g.category == category).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Daily,
    Single,
    Multi,
    Couch,
}

impl Tab {
    pub fn category(self) -> Option<GameCategory> {
        match self {
            Tab::Daily => None,
            Tab::Single => Some(GameCategory::SinglePlayer),
            Tab::Multi => Some(GameCategory::MultiplayerOnline),
            Tab::Couch => Some(GameCategory::SplitscreenCouch),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Tab::Daily => "Feed",
            Tab::Single => "Single",
            Tab::Multi => "Online",
            Tab::Couch => "Couch",
        }
    }
}

const MAX_LOG_LINES: usize = 50;

pub struct AppState {
    pub snapshot: Option<DailySnapshot>,
    pub loading: bool,
    pub error: Option<String>,
    pub tab: Tab,
    pub selected: usize,
    pub help_overlay: bool,
    pub log: Vec<String>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            snapshot: None,
            loading: true,
            error: None,
            tab: Tab::Daily,
            selected: 0,
            help_overlay: false,
            log: Vec::new(),
        }
    }

    /// The active tab's game list. Daily shows every category in fixed
    /// section order; the other tabs show a single filtered section.
    pub fn visible_games(&self) -> Vec<&Game> {
        let Some(snapshot) = &self.snapshot else {
            return Vec::new();
        };
        match self.tab.category() {
            Some(category) => games_by_category(&snapshot.games, category),
            None => GameCategory::ALL
                .iter()
                .flat_map(|c| games_by_category(&snapshot.games, *c))
                .collect(),
        }
    }

    pub fn select_next(&mut self) {
        let len = self.visible_games().len();
        if len > 0 && self.selected + 1 < len {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn set_tab(&mut self, tab: Tab) {
        if self.tab != tab {
            self.tab = tab;
            self.selected = 0;
        }
    }

    pub fn push_log(&mut self, line: impl Into<String>) {
        self.log.push(line.into());
        if self.log.len() > MAX_LOG_LINES {
            let drop = self.log.len() - MAX_LOG_LINES;
            self.log.drain(..drop);
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

pub enum ProviderCommand {
    FetchPicks { force: bool },
}

pub enum Delta {
    FetchStarted,
    SetSnapshot(DailySnapshot),
    FetchFailed { message: String },
    Log(String),
}

pub fn apply_delta(state: &mut AppState, delta: Delta) {
    match delta {
        Delta::FetchStarted => {
            state.loading = true;
            state.error = None;
        }
        Delta::SetSnapshot(snapshot) => {
            state.snapshot = Some(snapshot);
            state.loading = false;
            let len = state.visible_games().len();
            if state.selected >= len {
                state.selected = len.saturating_sub(1);
            }
        }
        // A failed fetch leaves any previously loaded snapshot on screen;
        // the banner and stale data may coexist after a forced refresh.
        Delta::FetchFailed { message } => {
            state.error = Some(message);
            state.loading = false;
        }
        Delta::Log(line) => state.push_log(line),
    }
}
