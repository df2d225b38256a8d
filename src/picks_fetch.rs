use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::cache_gate::today_key;
use crate::config::GeminiConfig;
use crate::error::FetchError;
use crate::http_client::http_client;
use crate::normalize::{ParsedGames, parse_games};
use crate::state::{DailySnapshot, SourceRef};

pub const CATALOG_URL: &str = "https://www.playstation.com/en-in/ps-plus/games/";
const FALLBACK_SOURCE_TITLE: &str = "PS Plus Catalog";
const CHUNK_FALLBACK_TITLE: &str = "PlayStation Store India";

const SYSTEM_PROMPT: &str = "\
You are a PlayStation gaming expert specializing in the Indian market. Your task is to suggest 9 games (3 per category) currently available for PS Plus Extra/Deluxe subscribers in India.

User Context:
- Owns a PS5 in India.
- Played & Liked: Miles Morales, Spider-Man 2, RDR2, God of War, Ghost of Tsushima, TLOU 1/2, Uncharted, FIFA/FC, Mortal Kombat 1.
- Has PS Plus Extra/Deluxe.

Categories:
1. Single Player (Cinematic, narrative action)
2. Multiplayer Online (Competitive/Co-op)
3. Split-screen/Couch (Local play)

STRICT RULES:
- Use Google Search to verify the game is CURRENTLY in the PS Plus Extra/Deluxe catalog for India.
- Focus on high-quality titles (Metacritic 75+).
- The output MUST be a valid JSON object only. No markdown formatting, no extra text.
- Tailor 'whyPlay' to the user's history (e.g., \"Since you loved Ghost of Tsushima, you'll enjoy the combat here...\").";

const USER_PROMPT: &str = "Scout 9 games for PS Plus Extra in India. 3 Single Player, \
3 Multiplayer, 3 Couch Co-op. Focus on titles similar to Sony first-party hits and \
sports/fighters. Ensure they are available in the India store today.";

/// The textual payload plus any grounding citations pulled from one
/// `generateContent` response.
#[derive(Debug, Clone)]
pub struct ModelReply {
    pub text: String,
    pub sources: Vec<SourceRef>,
}

/// One fetch cycle: a single request to the completion endpoint, no retry.
/// Retry/backoff is deliberately a caller concern. The second value is the
/// number of entries the normalizer dropped, for the activity log.
pub fn fetch_daily_picks(cfg: &GeminiConfig) -> Result<(DailySnapshot, usize), FetchError> {
    let client = http_client().map_err(|err| FetchError::ClientInit(err.to_string()))?;
    let url = format!("{}/models/{}:generateContent", cfg.endpoint, cfg.model);

    let resp = client
        .post(&url)
        .header("x-goog-api-key", &cfg.api_key)
        .json(&request_body())
        .send()?;

    let status = resp.status();
    let body = resp.text()?;
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(FetchError::Auth(status));
    }
    if !status.is_success() {
        return Err(FetchError::Status { status, body });
    }

    let reply = parse_generate_content_response(&body)?;
    // Date is stamped at successful normalization time.
    build_snapshot(reply, today_key())
}

/// Pure assembly step: normalize the payload, apply the citation fallback,
/// stamp the date. Split out so fixture-driven tests can run it offline.
pub fn build_snapshot(
    reply: ModelReply,
    date: String,
) -> Result<(DailySnapshot, usize), FetchError> {
    let ParsedGames { games, dropped } = parse_games(&reply.text)?;

    let sources = if reply.sources.is_empty() {
        vec![SourceRef {
            title: FALLBACK_SOURCE_TITLE.to_string(),
            uri: CATALOG_URL.to_string(),
        }]
    } else {
        reply.sources
    };

    Ok((
        DailySnapshot {
            date,
            games,
            sources,
        },
        dropped,
    ))
}

fn request_body() -> Value {
    json!({
        "contents": [{ "role": "user", "parts": [{ "text": USER_PROMPT }] }],
        "systemInstruction": { "parts": [{ "text": SYSTEM_PROMPT }] },
        "tools": [{ "googleSearch": {} }],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": response_schema()
        }
    })
}

// Mirrors the Game shape; playtime stays optional, everything else required.
fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "games": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "id": { "type": "STRING" },
                        "title": { "type": "STRING" },
                        "category": {
                            "type": "STRING",
                            "enum": ["Single Player", "Multiplayer Online", "Split-screen/Couch"]
                        },
                        "rating": { "type": "NUMBER" },
                        "whyPlay": { "type": "STRING" },
                        "playtime": { "type": "STRING" },
                        "genre": { "type": "STRING" },
                        "platform": { "type": "ARRAY", "items": { "type": "STRING" } },
                        "imageUrl": { "type": "STRING" }
                    },
                    "required": ["id", "title", "category", "rating", "whyPlay", "genre", "platform", "imageUrl"]
                }
            }
        },
        "required": ["games"]
    })
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
    #[serde(rename = "groundingMetadata")]
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GroundingMetadata {
    #[serde(default, rename = "groundingChunks")]
    grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Debug, Deserialize)]
struct GroundingChunk {
    web: Option<WebSource>,
}

#[derive(Debug, Deserialize)]
struct WebSource {
    uri: Option<String>,
    title: Option<String>,
}

/// Pulls the concatenated candidate text and the grounding citations out of
/// the response envelope. An envelope with no text fails `EmptyResponse`.
pub fn parse_generate_content_response(raw: &str) -> Result<ModelReply, FetchError> {
    let envelope: GenerateContentResponse =
        serde_json::from_str(raw).map_err(|err| FetchError::MalformedResponse {
            detail: err.to_string(),
            raw: raw.to_string(),
        })?;

    let mut text = String::new();
    let mut sources = Vec::new();
    for candidate in &envelope.candidates {
        if let Some(content) = &candidate.content {
            for part in &content.parts {
                if let Some(t) = &part.text {
                    text.push_str(t);
                }
            }
        }
        if let Some(meta) = &candidate.grounding_metadata {
            for chunk in &meta.grounding_chunks {
                let web = chunk.web.as_ref();
                sources.push(SourceRef {
                    title: web
                        .and_then(|w| w.title.clone())
                        .unwrap_or_else(|| CHUNK_FALLBACK_TITLE.to_string()),
                    uri: web
                        .and_then(|w| w.uri.clone())
                        .unwrap_or_else(|| CATALOG_URL.to_string()),
                });
            }
        }
    }

    if text.trim().is_empty() {
        return Err(FetchError::EmptyResponse);
    }

    Ok(ModelReply { text, sources })
}
