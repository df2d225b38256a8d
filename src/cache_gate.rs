use chrono::Local;

use crate::state::DailySnapshot;

/// Today's cache key: the local calendar date in en-IN day/month order,
/// e.g. "11/6/2024". Exact string equality is the only sameness test, so a
/// snapshot from another locale format simply reads as stale.
pub fn today_key() -> String {
    Local::now().format("%-d/%-m/%Y").to_string()
}

/// The daily gate: serve the cache iff not forced, a snapshot exists, and it
/// was taken today. Pure decision over its inputs.
pub fn should_fetch(persisted: Option<&DailySnapshot>, today: &str, force: bool) -> bool {
    if force {
        return true;
    }
    match persisted {
        Some(snapshot) => snapshot.date != today,
        None => true,
    }
}
