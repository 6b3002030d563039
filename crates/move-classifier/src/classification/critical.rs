//! Critical moves: the only move that keeps the advantage.

use chess_core::evaluation::Evaluation;
use shakmaty::{Move, Position, Role, Square};

use crate::board_utils::{piece_at, BoardMove};
use crate::expected_points::point_loss;
use crate::extraction::{ExtractedCurrent, ExtractedPrevious};
use crate::tactics::safety::is_piece_safe;

/// Subjective centipawn score from which a position counts as decided
const COMPLETELY_WINNING: i32 = 700;

/// Loss of the runner-up move needed for the top move to be critical
const CRITICAL_POINT_LOSS: f64 = 0.10;

/// Gate shared by critical and brilliant checks: the move has to matter.
pub fn is_critical_candidate(previous: &ExtractedPrevious, current: &ExtractedCurrent) -> bool {
    let Some(second) = previous.second_subjective_evaluation else {
        return false;
    };

    // Still decided without this move, or decided anyway after it
    if is_completely_winning(second) || is_completely_winning(current.subjective_evaluation) {
        return false;
    }

    if previous.subjective_evaluation.value() < 0 {
        return false;
    }

    if current.played_move.promotion() == Some(Role::Queen) {
        return false;
    }

    // Escaping check is not a choice
    !previous.position.is_check()
}

/// Called only when the played move was the engine's top move.
pub fn consider_critical(previous: &ExtractedPrevious, current: &ExtractedCurrent) -> bool {
    if !is_critical_candidate(previous, current) {
        return false;
    }

    // Finding a mate is never critical
    if matches!(current.subjective_evaluation, Evaluation::Mate(v) if v > 0) {
        return false;
    }

    if captures_free_material(previous, current) {
        return false;
    }

    let Some(second) = previous.second_line else {
        return false;
    };
    point_loss(previous.evaluation, second.evaluation, previous.player_color) >= CRITICAL_POINT_LOSS
}

fn is_completely_winning(subjective: Evaluation) -> bool {
    matches!(subjective, Evaluation::Centipawns(v) if v >= COMPLETELY_WINNING)
}

/// Did the move take a piece that was already hanging?
fn captures_free_material(previous: &ExtractedPrevious, current: &ExtractedCurrent) -> bool {
    let Some(mv) = BoardMove::from_move(&current.played_move, previous.player_color) else {
        return false;
    };
    if mv.capture.is_none() {
        return false;
    }

    let board = previous.position.board();
    // En passant takes a pawn that is not on the destination square
    let captured_square = match &current.played_move {
        Move::EnPassant { from, to } => Square::from_coords(to.file(), from.rank()),
        _ => mv.to,
    };

    piece_at(board, captured_square).is_some_and(|victim| !is_piece_safe(board, &victim, None))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::{extract_current, extract_previous, parse_move, StateNode};
    use chess_core::evaluation::EngineLine;
    use shakmaty::{fen::Fen, CastlingMode, Chess};

    fn position(fen: &str) -> Chess {
        fen.parse::<Fen>()
            .unwrap()
            .into_position(CastlingMode::Standard)
            .unwrap()
    }

    fn line(eval: Evaluation, rank: u32, mv: &str) -> EngineLine {
        EngineLine::new(eval, 20, rank, vec![mv.to_string()])
    }

    /// (parent, node) with the given top/second lines before and top line after
    fn nodes(fen: &str, played: &str, before: Vec<EngineLine>, after: Evaluation) -> (StateNode, StateNode) {
        let pos = position(fen);
        let mv = parse_move(&pos, played).unwrap();
        let next = pos.clone().play(mv).unwrap();
        let reply = next.legal_moves().first().map(|m| m.to_uci(CastlingMode::Standard).to_string());
        let after_lines = vec![line(after, 1, reply.as_deref().unwrap_or("0000"))];
        (StateNode::root(pos, before), StateNode::after_move(next, played, after_lines))
    }

    const START: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    #[test]
    fn test_only_move_is_critical() {
        let (parent, node) = nodes(
            START,
            "e2e4",
            vec![line(Evaluation::Centipawns(100), 1, "e2e4"), line(Evaluation::Centipawns(-194), 2, "d2d4")],
            Evaluation::Centipawns(100),
        );
        let previous = extract_previous(&parent, &node).unwrap();
        let current = extract_current(&parent, &node).unwrap();
        assert!(is_critical_candidate(&previous, &current));
        assert!(consider_critical(&previous, &current));
    }

    #[test]
    fn test_small_gap_is_not_critical() {
        let (parent, node) = nodes(
            START,
            "e2e4",
            vec![line(Evaluation::Centipawns(40), 1, "e2e4"), line(Evaluation::Centipawns(30), 2, "d2d4")],
            Evaluation::Centipawns(40),
        );
        let previous = extract_previous(&parent, &node).unwrap();
        let current = extract_current(&parent, &node).unwrap();
        assert!(is_critical_candidate(&previous, &current));
        assert!(!consider_critical(&previous, &current));
    }

    #[test]
    fn test_gate_rejects_decided_and_losing_positions() {
        let cases = [
            // Second line still completely winning
            (Evaluation::Centipawns(900), Evaluation::Centipawns(750), Evaluation::Centipawns(900)),
            // Winning anyway after the move
            (Evaluation::Centipawns(710), Evaluation::Centipawns(200), Evaluation::Centipawns(710)),
            // Already losing before the move
            (Evaluation::Centipawns(-50), Evaluation::Centipawns(-400), Evaluation::Centipawns(-50)),
        ];
        for (top, second, after) in cases {
            let (parent, node) = nodes(START, "e2e4", vec![line(top, 1, "e2e4"), line(second, 2, "d2d4")], after);
            let previous = extract_previous(&parent, &node).unwrap();
            let current = extract_current(&parent, &node).unwrap();
            assert!(!is_critical_candidate(&previous, &current), "{top:?} / {second:?}");
        }
    }

    #[test]
    fn test_no_second_line_is_not_candidate() {
        let (parent, node) = nodes(START, "e2e4", vec![line(Evaluation::Centipawns(30), 1, "e2e4")], Evaluation::Centipawns(30));
        let previous = extract_previous(&parent, &node).unwrap();
        let current = extract_current(&parent, &node).unwrap();
        assert!(!is_critical_candidate(&previous, &current));
    }

    #[test]
    fn test_escaping_check_is_not_candidate() {
        // White king in check from the e8 rook
        let fen = "4r1k1/8/8/8/8/8/3P1P2/4K3 w - - 0 1";
        let (parent, node) = nodes(
            fen,
            "e1d1",
            vec![line(Evaluation::Centipawns(0), 1, "e1d1"), line(Evaluation::Centipawns(-500), 2, "e1f1")],
            Evaluation::Centipawns(0),
        );
        let previous = extract_previous(&parent, &node).unwrap();
        let current = extract_current(&parent, &node).unwrap();
        assert!(!is_critical_candidate(&previous, &current));
    }

    #[test]
    fn test_taking_hanging_piece_is_not_critical() {
        // Black queen on d5 hangs to the e4 pawn
        let fen = "4k3/8/8/3q4/4P3/8/8/4K3 w - - 0 1";
        let (parent, node) = nodes(
            fen,
            "e4d5",
            vec![line(Evaluation::Centipawns(600), 1, "e4d5"), line(Evaluation::Centipawns(-300), 2, "e1e2")],
            Evaluation::Centipawns(600),
        );
        let previous = extract_previous(&parent, &node).unwrap();
        let current = extract_current(&parent, &node).unwrap();
        assert!(is_critical_candidate(&previous, &current));
        assert!(!consider_critical(&previous, &current));
    }
}
