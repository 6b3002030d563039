//! PGN parsing utilities: a lightweight regex-based parser.

use regex::Regex;
use thiserror::Error;

use crate::game_data::{GameData, GameMetadata};

const STANDARD_START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum PgnError {
    #[error("game starts from a custom position")]
    NonStandardStart,

    #[error("game has no moves")]
    NoMoves,

    #[error("invalid pattern: {0}")]
    Pattern(String),
}

/// Split a multi-game PGN file into one chunk per game.
///
/// A new game starts at the first header line that follows movetext.
pub fn split_games(text: &str) -> Vec<String> {
    let mut games = Vec::new();
    let mut current = String::new();
    let mut seen_movetext = false;

    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with('[') && seen_movetext {
            games.push(std::mem::take(&mut current));
            seen_movetext = false;
        }
        if !trimmed.is_empty() && !trimmed.starts_with('[') {
            seen_movetext = true;
        }
        current.push_str(line);
        current.push('\n');
    }

    if !current.trim().is_empty() {
        games.push(current);
    }
    games
}

/// Parse a single-game PGN string into a GameData struct.
pub fn parse_pgn(pgn: &str) -> Result<GameData, PgnError> {
    let header_re = Regex::new(r#"\[(\w+)\s+"([^"]*)"\]"#)
        .map_err(|e| PgnError::Pattern(e.to_string()))?;

    let mut white = "Unknown".to_string();
    let mut black = "Unknown".to_string();
    let mut result = "*".to_string();
    let mut date = None;
    let mut time_control = None;
    let mut eco = None;
    let mut event = None;
    let mut site = None;
    let mut setup = None;
    let mut fen = None;

    for cap in header_re.captures_iter(pgn) {
        let key = &cap[1];
        let value = cap[2].to_string();
        match key {
            "White" => white = value,
            "Black" => black = value,
            "Result" => result = value,
            "Date" => date = Some(value),
            "TimeControl" => time_control = Some(value),
            "ECO" => eco = Some(value),
            "Event" => event = Some(value),
            "Site" => site = Some(value),
            "SetUp" => setup = Some(value),
            "FEN" => fen = Some(value),
            _ => {}
        }
    }

    // Reviews always replay from the initial position
    if setup.as_deref() == Some("1") {
        if let Some(ref f) = fen {
            if f != STANDARD_START_FEN {
                return Err(PgnError::NonStandardStart);
            }
        }
    }

    let moves = extract_moves(pgn)?;
    if moves.is_empty() {
        return Err(PgnError::NoMoves);
    }

    Ok(GameData {
        metadata: GameMetadata {
            white,
            black,
            result,
            date,
            time_control,
            eco,
            event,
            site,
        },
        moves,
        pgn: pgn.to_string(),
    })
}

/// Extract SAN moves from PGN text (after removing headers, comments, variations).
fn extract_moves(pgn: &str) -> Result<Vec<String>, PgnError> {
    let compile = |pattern: &str| Regex::new(pattern).map_err(|e| PgnError::Pattern(e.to_string()));

    let no_headers = compile(r"\[[^\]]*\]")?.replace_all(pgn, "");
    let no_comments = compile(r"\{[^}]*\}|;[^\n]*")?.replace_all(&no_headers, "");

    // Variations can nest, so strip innermost groups until none remain
    let variation_re = compile(r"\([^()]*\)")?;
    let mut movetext = no_comments.into_owned();
    while variation_re.is_match(&movetext) {
        movetext = variation_re.replace_all(&movetext, "").into_owned();
    }

    let move_re = compile(r"[KQRBN]?[a-h]?[1-8]?x?[a-h][1-8](?:=[QRBN])?[+#]?|O-O-O|O-O")?;

    Ok(move_re
        .find_iter(&movetext)
        .map(|m| m.as_str().to_string())
        .collect())
}
