use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::state::DailySnapshot;

const CACHE_DIR: &str = "pspicks_terminal";
const CACHE_FILE: &str = "ps_picks_v1.json";
const CACHE_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheFile {
    version: u32,
    snapshot: DailySnapshot,
}

/// Single-slot snapshot cache. Holds at most one day's snapshot; every write
/// replaces the previous one. The path is injected so tests can point it at
/// a temp dir instead of the real cache.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn at(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn default_location() -> Option<Self> {
        cache_path().map(Self::at)
    }

    /// Reads the persisted snapshot, if any. Unreadable, unparseable, or
    /// wrong-version files read as absent; the gate then forces a fresh fetch.
    pub fn read(&self) -> Option<DailySnapshot> {
        let raw = fs::read_to_string(&self.path).ok()?;
        let cache = serde_json::from_str::<CacheFile>(&raw).ok()?;
        if cache.version != CACHE_VERSION {
            return None;
        }
        Some(cache.snapshot)
    }

    /// Overwrites the slot unconditionally via tmp+rename, so a crash
    /// mid-write never leaves a partial snapshot behind. Best effort: a
    /// write failure costs a refetch tomorrow, nothing else.
    pub fn write(&self, snapshot: &DailySnapshot) {
        if let Some(dir) = self.path.parent() {
            let _ = fs::create_dir_all(dir);
        }
        let cache = CacheFile {
            version: CACHE_VERSION,
            snapshot: snapshot.clone(),
        };
        if let Ok(json) = serde_json::to_string(&cache) {
            let tmp = self.path.with_extension("json.tmp");
            if fs::write(&tmp, json).is_ok() {
                let _ = fs::rename(&tmp, &self.path);
            }
        }
    }
}

fn cache_path() -> Option<PathBuf> {
    // Prefer XDG cache.
    if let Ok(base) = std::env::var("XDG_CACHE_HOME") {
        if !base.trim().is_empty() {
            return Some(PathBuf::from(base).join(CACHE_DIR).join(CACHE_FILE));
        }
    }
    // Fallback to ~/.cache on linux-like systems.
    let home = std::env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(
        PathBuf::from(home)
            .join(".cache")
            .join(CACHE_DIR)
            .join(CACHE_FILE),
    )
}
