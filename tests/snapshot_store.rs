use std::fs;
use std::path::PathBuf;

use pspicks_terminal::persist::SnapshotStore;
use pspicks_terminal::state::{DailySnapshot, Game, GameCategory, SourceRef};

fn temp_store(name: &str) -> (SnapshotStore, PathBuf) {
    let dir = std::env::temp_dir().join(format!("pspicks_store_{}_{name}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    let path = dir.join("ps_picks_v1.json");
    (SnapshotStore::at(path), dir)
}

fn snapshot(date: &str, title: &str) -> DailySnapshot {
    DailySnapshot {
        date: date.to_string(),
        games: vec![Game {
            id: "g1".to_string(),
            title: title.to_string(),
            category: GameCategory::SinglePlayer,
            rating: 92.0,
            why_play: "Cinematic action in your wheelhouse.".to_string(),
            playtime: Some("25 hrs".to_string()),
            genre: "Action".to_string(),
            platform: vec!["PS5".to_string()],
            image_url: None,
        }],
        sources: vec![SourceRef {
            title: "PS Plus Catalog".to_string(),
            uri: "https://www.playstation.com/en-in/ps-plus/games/".to_string(),
        }],
    }
}

#[test]
fn missing_file_reads_absent() {
    let (store, dir) = temp_store("missing");
    assert!(store.read().is_none());
    let _ = fs::remove_dir_all(dir);
}

#[test]
fn write_then_read_round_trips() {
    let (store, dir) = temp_store("roundtrip");
    let snap = snapshot("11/6/2024", "God of War");
    store.write(&snap);
    assert_eq!(store.read(), Some(snap));
    let _ = fs::remove_dir_all(dir);
}

#[test]
fn write_overwrites_previous_snapshot() {
    let (store, dir) = temp_store("overwrite");
    store.write(&snapshot("11/6/2024", "God of War"));
    store.write(&snapshot("12/6/2024", "Returnal"));
    let read = store.read().expect("slot should hold the latest snapshot");
    assert_eq!(read.date, "12/6/2024");
    assert_eq!(read.games[0].title, "Returnal");
    let _ = fs::remove_dir_all(dir);
}

#[test]
fn corrupt_file_reads_absent() {
    let (store, dir) = temp_store("corrupt");
    let path = dir.join("ps_picks_v1.json");
    fs::create_dir_all(&dir).expect("temp dir should be creatable");
    fs::write(&path, "{ not json").expect("write should succeed");
    assert!(store.read().is_none());
    let _ = fs::remove_dir_all(dir);
}

#[test]
fn version_mismatch_reads_absent() {
    let (store, dir) = temp_store("version");
    store.write(&snapshot("11/6/2024", "God of War"));
    let path = dir.join("ps_picks_v1.json");
    let raw = fs::read_to_string(&path).expect("cache file should exist");
    let bumped = raw.replace("\"version\":1", "\"version\":99");
    assert_ne!(raw, bumped);
    fs::write(&path, bumped).expect("write should succeed");
    assert!(store.read().is_none());
    let _ = fs::remove_dir_all(dir);
}

#[test]
fn persisted_shape_uses_wire_field_names() {
    let (store, dir) = temp_store("wire");
    store.write(&snapshot("11/6/2024", "God of War"));
    let raw = fs::read_to_string(dir.join("ps_picks_v1.json")).expect("cache file should exist");
    assert!(raw.contains("\"whyPlay\""));
    assert!(raw.contains("\"Single Player\""));
    let _ = fs::remove_dir_all(dir);
}
