//! Node extraction: turns a (parent, node) pair of game states into the
//! before/after records the classifiers read.
//!
//! Extraction yields `None` whenever something the classifiers need is
//! missing (no engine line, unparseable move). Callers treat that as
//! "unclassified" rather than an error.

use chess_core::evaluation::{sibling_line, top_line, EngineLine, Evaluation};
use shakmaty::{san::San, uci::UciMove, Chess, Color, Move, Position, Role, Square};
use tracing::debug;

/// One position in a game, with the move that reached it and the engine
/// lines computed for it. The root has no move.
#[derive(Debug, Clone)]
pub struct StateNode {
    pub position: Chess,
    pub played_move: Option<String>,
    pub engine_lines: Vec<EngineLine>,
}

impl StateNode {
    pub fn root(position: Chess, engine_lines: Vec<EngineLine>) -> Self {
        Self {
            position,
            played_move: None,
            engine_lines,
        }
    }

    pub fn after_move(position: Chess, played_move: impl Into<String>, engine_lines: Vec<EngineLine>) -> Self {
        Self {
            position,
            played_move: Some(played_move.into()),
            engine_lines,
        }
    }
}

/// The position before the move, seen from the side about to play.
#[derive(Debug, Clone)]
pub struct ExtractedPrevious<'a> {
    pub position: &'a Chess,
    pub top_line: &'a EngineLine,
    pub top_move: Move,
    pub evaluation: Evaluation,
    pub subjective_evaluation: Evaluation,
    pub second_line: Option<&'a EngineLine>,
    pub second_move: Option<Move>,
    pub second_subjective_evaluation: Option<Evaluation>,
    pub played_move: Option<Move>,
    pub player_color: Color,
}

/// The position after the move, seen from the side that just played.
#[derive(Debug, Clone)]
pub struct ExtractedCurrent<'a> {
    pub position: &'a Chess,
    pub top_line: &'a EngineLine,
    /// None for positions with no continuation
    pub top_move: Option<Move>,
    pub evaluation: Evaluation,
    pub subjective_evaluation: Evaluation,
    pub played_move: Move,
    pub player_color: Color,
}

pub fn extract_previous<'a>(parent: &'a StateNode, node: &StateNode) -> Option<ExtractedPrevious<'a>> {
    let position = &parent.position;
    let player_color = position.turn();

    let top = top_line(&parent.engine_lines)?;
    let Some(top_move) = top.first_move().and_then(|mv| parse_move(position, mv)) else {
        debug!(line = ?top.moves.first(), "Top line has no playable first move");
        return None;
    };

    let second_line = sibling_line(&parent.engine_lines, top, 2);
    let second_move = second_line
        .and_then(EngineLine::first_move)
        .and_then(|mv| parse_move(position, mv));

    let played_move = node
        .played_move
        .as_deref()
        .and_then(|mv| parse_move(position, mv));

    Some(ExtractedPrevious {
        position,
        top_line: top,
        top_move,
        evaluation: top.evaluation,
        subjective_evaluation: top.evaluation.subjective(player_color),
        second_line,
        second_move,
        second_subjective_evaluation: second_line.map(|line| line.evaluation.subjective(player_color)),
        played_move,
        player_color,
    })
}

pub fn extract_current<'a>(parent: &StateNode, node: &'a StateNode) -> Option<ExtractedCurrent<'a>> {
    let notation = node.played_move.as_deref()?;
    let Some(played_move) = parse_move(&parent.position, notation) else {
        debug!(notation, "Played move does not parse against its position");
        return None;
    };

    let position = &node.position;
    let player_color = parent.position.turn();
    let top = top_line(&node.engine_lines)?;

    Some(ExtractedCurrent {
        position,
        top_line: top,
        top_move: top.first_move().and_then(|mv| parse_move(position, mv)),
        evaluation: top.evaluation,
        subjective_evaluation: top.evaluation.subjective(player_color),
        played_move,
        player_color,
    })
}

/// Parse a UCI or SAN move against `position`. Lichess-style castling
/// (king onto its own rook) is accepted.
pub fn parse_move(position: &Chess, notation: &str) -> Option<Move> {
    let notation = normalize_castling(position, notation.trim());

    if let Ok(uci) = notation.parse::<UciMove>() {
        if let Ok(mv) = uci.to_move(position) {
            return Some(mv);
        }
    }

    notation.parse::<San>().ok()?.to_move(position).ok()
}

fn normalize_castling<'a>(position: &Chess, notation: &'a str) -> &'a str {
    let (from, standard) = match notation {
        "e1h1" => (Square::E1, "e1g1"),
        "e1a1" => (Square::E1, "e1c1"),
        "e8h8" => (Square::E8, "e8g8"),
        "e8a8" => (Square::E8, "e8c8"),
        _ => return notation,
    };

    match position.board().piece_at(from) {
        Some(piece) if piece.role == Role::King => standard,
        _ => notation,
    }
}
