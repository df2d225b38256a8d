use std::collections::HashSet;

use serde_json::Value;

use crate::error::FetchError;
use crate::state::Game;

/// Result of normalizing a raw model payload. Malformed entries are dropped
/// rather than failing the whole snapshot; `dropped` is surfaced for logging.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedGames {
    pub games: Vec<Game>,
    pub dropped: usize,
}

/// Strips a leading/trailing markdown code fence (optionally tagged `json`)
/// so a fenced payload parses the same as a bare one. Idempotent: already
/// stripped text passes through untouched.
pub fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    rest.trim()
}

/// Parses the model's textual payload into validated games.
///
/// The remote schema nominally guarantees the `Game` shape, but the model is
/// untrusted input: each entry is validated individually and non-conforming
/// ones (missing fields, unknown category, blank id/title, duplicate id) are
/// dropped. An absent `games` array fails the whole payload; an empty one is
/// fine.
pub fn parse_games(raw: &str) -> Result<ParsedGames, FetchError> {
    let clean = strip_code_fence(raw);
    let root: Value =
        serde_json::from_str(clean).map_err(|err| FetchError::MalformedResponse {
            detail: err.to_string(),
            raw: raw.to_string(),
        })?;

    let entries = root
        .get("games")
        .and_then(Value::as_array)
        .ok_or_else(|| FetchError::Schema("missing games array".to_string()))?;

    let mut games = Vec::with_capacity(entries.len());
    let mut seen_ids = HashSet::new();
    let mut dropped = 0usize;
    for entry in entries {
        match serde_json::from_value::<Game>(entry.clone()) {
            Ok(game) if is_valid(&game) && seen_ids.insert(game.id.clone()) => {
                games.push(game);
            }
            _ => dropped += 1,
        }
    }

    Ok(ParsedGames { games, dropped })
}

fn is_valid(game: &Game) -> bool {
    !game.id.trim().is_empty() && !game.title.trim().is_empty() && game.rating.is_finite()
}
