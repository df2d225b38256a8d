use std::fs;
use std::path::PathBuf;

use pspicks_terminal::error::FetchError;
use pspicks_terminal::picks_fetch::{CATALOG_URL, build_snapshot, parse_generate_content_response};
use pspicks_terminal::state::{GameCategory, games_by_category};

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

#[test]
fn grounded_reply_extracts_text_and_citations() {
    let raw = read_fixture("gemini_grounded.json");
    let reply = parse_generate_content_response(&raw).expect("fixture should parse");
    assert!(reply.text.contains("Ghost of Tsushima"));
    assert_eq!(reply.sources.len(), 2);
    assert_eq!(reply.sources[0].title, "PlayStation Blog");
    assert_eq!(reply.sources[0].uri, "https://blog.playstation.com/catalog-june");
    // Chunk without a title falls back to the store label, keeps its uri.
    assert_eq!(reply.sources[1].title, "PlayStation Store India");
    assert_eq!(reply.sources[1].uri, "https://example.com/psplus-india");
}

#[test]
fn empty_parts_fail_empty_response() {
    let raw = read_fixture("gemini_empty.json");
    let err = parse_generate_content_response(&raw).unwrap_err();
    assert!(matches!(err, FetchError::EmptyResponse));
}

#[test]
fn garbage_envelope_fails_malformed() {
    let err = parse_generate_content_response("<html>503</html>").unwrap_err();
    assert!(matches!(err, FetchError::MalformedResponse { .. }));
}

#[test]
fn nine_game_reply_builds_full_snapshot_with_fallback_source() {
    let raw = read_fixture("gemini_nine_games.json");
    let reply = parse_generate_content_response(&raw).expect("fixture should parse");
    assert!(reply.sources.is_empty());

    let (snapshot, dropped) =
        build_snapshot(reply, "11/6/2024".to_string()).expect("payload should normalize");
    assert_eq!(dropped, 0);
    assert_eq!(snapshot.date, "11/6/2024");
    assert_eq!(snapshot.games.len(), 9);
    for category in GameCategory::ALL {
        assert_eq!(games_by_category(&snapshot.games, category).len(), 3);
    }
    // No citations in the reply: sources must still be non-empty.
    assert_eq!(snapshot.sources.len(), 1);
    assert_eq!(snapshot.sources[0].title, "PS Plus Catalog");
    assert_eq!(snapshot.sources[0].uri, CATALOG_URL);
}

#[test]
fn grounded_reply_keeps_its_citations() {
    let raw = read_fixture("gemini_grounded.json");
    let reply = parse_generate_content_response(&raw).expect("fixture should parse");
    let (snapshot, _) =
        build_snapshot(reply, "11/6/2024".to_string()).expect("payload should normalize");
    assert_eq!(snapshot.sources.len(), 2);
    assert_eq!(snapshot.games.len(), 2);
}

#[test]
fn unparseable_payload_propagates_malformed() {
    let reply = pspicks_terminal::picks_fetch::ModelReply {
        text: "sorry, I cannot help with that".to_string(),
        sources: Vec::new(),
    };
    let err = build_snapshot(reply, "11/6/2024".to_string()).unwrap_err();
    assert!(matches!(err, FetchError::MalformedResponse { .. }));
}
