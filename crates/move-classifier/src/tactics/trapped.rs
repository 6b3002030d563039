//! Trapped pieces: unsafe where they stand and with nowhere safe to go.

use shakmaty::{Board, Position, Role};

use crate::board_utils::{apply_move, pseudo_legal_destinations, with_turn, BoardMove, BoardPiece};
use crate::tactics::danger_levels::{has_danger_levels, ThreatMode};
use crate::tactics::safety::is_piece_safe;

/// Is `piece` trapped? A safe piece never is. Otherwise every destination
/// must either leave it unsafe or, with `danger_levels`, hang something at
/// least as valuable.
pub fn is_piece_trapped(board: &Board, piece: &BoardPiece, danger_levels: bool) -> bool {
    if is_piece_safe(board, piece, None) {
        return false;
    }

    for escape in escape_moves(board, piece) {
        if escape.capture == Some(Role::King) {
            return false;
        }

        if danger_levels && has_danger_levels(board, piece, &[escape], ThreatMode::Creates) {
            continue;
        }

        let after = apply_move(board, &escape);
        if is_piece_safe(&after, &escape.landed_piece(), Some(&escape)) {
            return false;
        }
    }

    true
}

/// Moves of `piece` as if its side were to move.
fn escape_moves(board: &Board, piece: &BoardPiece) -> Vec<BoardMove> {
    match with_turn(board, piece.color) {
        Some(pos) => pos
            .legal_moves()
            .iter()
            .filter(|mv| mv.from() == Some(piece.square))
            .filter_map(|mv| BoardMove::from_move(mv, piece.color))
            .collect(),
        None => pseudo_legal_destinations(board, piece),
    }
}
