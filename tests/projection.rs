use pspicks_terminal::state::{
    AppState, DailySnapshot, Delta, Game, GameCategory, SourceRef, Tab, apply_delta,
    games_by_category,
};

fn game(id: &str, category: GameCategory) -> Game {
    Game {
        id: id.to_string(),
        title: format!("Title {id}"),
        category,
        rating: 85.0,
        why_play: "A good fit.".to_string(),
        playtime: None,
        genre: "Action".to_string(),
        platform: vec!["PS5".to_string()],
        image_url: None,
    }
}

fn mixed_games() -> Vec<Game> {
    vec![
        game("m1", GameCategory::MultiplayerOnline),
        game("s1", GameCategory::SinglePlayer),
        game("c1", GameCategory::SplitscreenCouch),
        game("s2", GameCategory::SinglePlayer),
        game("m2", GameCategory::MultiplayerOnline),
    ]
}

fn snapshot(games: Vec<Game>) -> DailySnapshot {
    DailySnapshot {
        date: "11/6/2024".to_string(),
        games,
        sources: vec![SourceRef {
            title: "PS Plus Catalog".to_string(),
            uri: "https://www.playstation.com/en-in/ps-plus/games/".to_string(),
        }],
    }
}

#[test]
fn filter_returns_only_requested_category_in_order() {
    let games = mixed_games();
    let singles = games_by_category(&games, GameCategory::SinglePlayer);
    let ids: Vec<&str> = singles.iter().map(|g| g.id.as_str()).collect();
    assert_eq!(ids, vec!["s1", "s2"]);
    assert!(singles.iter().all(|g| g.category == GameCategory::SinglePlayer));
}

#[test]
fn filter_on_empty_input_is_empty() {
    let games: Vec<Game> = Vec::new();
    assert!(games_by_category(&games, GameCategory::SplitscreenCouch).is_empty());
}

#[test]
fn no_match_yields_empty_not_absent() {
    let games = vec![game("s1", GameCategory::SinglePlayer)];
    let couch = games_by_category(&games, GameCategory::SplitscreenCouch);
    assert_eq!(couch.len(), 0);
}

#[test]
fn daily_tab_groups_by_category_order() {
    let mut state = AppState::new();
    apply_delta(&mut state, Delta::SetSnapshot(snapshot(mixed_games())));
    let ids: Vec<&str> = state.visible_games().iter().map(|g| g.id.as_str()).collect();
    assert_eq!(ids, vec!["s1", "s2", "m1", "m2", "c1"]);
}

#[test]
fn category_tab_shows_single_section() {
    let mut state = AppState::new();
    apply_delta(&mut state, Delta::SetSnapshot(snapshot(mixed_games())));
    state.set_tab(Tab::Couch);
    let ids: Vec<&str> = state.visible_games().iter().map(|g| g.id.as_str()).collect();
    assert_eq!(ids, vec!["c1"]);
}

#[test]
fn fetch_failure_keeps_existing_snapshot_visible() {
    let mut state = AppState::new();
    apply_delta(&mut state, Delta::SetSnapshot(snapshot(mixed_games())));
    apply_delta(&mut state, Delta::FetchStarted);
    assert!(state.loading);
    assert!(state.error.is_none());

    apply_delta(
        &mut state,
        Delta::FetchFailed {
            message: "Sync failed. Please try again in a few minutes.".to_string(),
        },
    );
    assert!(!state.loading);
    assert!(state.error.is_some());
    // Banner and previously loaded data coexist.
    assert_eq!(state.visible_games().len(), 5);
}

#[test]
fn set_snapshot_clamps_selection() {
    let mut state = AppState::new();
    apply_delta(&mut state, Delta::SetSnapshot(snapshot(mixed_games())));
    state.selected = 4;
    apply_delta(
        &mut state,
        Delta::SetSnapshot(snapshot(vec![game("s1", GameCategory::SinglePlayer)])),
    );
    assert_eq!(state.selected, 0);
}
