//! Piece safety: could this piece be won by the opponent?

use shakmaty::{Board, Color, Role};

use crate::board_utils::{piece_value, pieces_of, BoardMove, BoardPiece};
use crate::tactics::attackers::{attacking_moves, direct_attacks};
use crate::tactics::defenders::defending_moves;

/// Is `piece` safe from being won on this board?
///
/// `played_move` is the move that produced the board, when known; a piece
/// that just won material may be worth giving back.
pub fn is_piece_safe(board: &Board, piece: &BoardPiece, played_move: Option<&BoardMove>) -> bool {
    let direct = direct_attacks(board, piece);
    let attackers = attacking_moves(board, piece, true);
    let defenders = defending_moves(board, piece, true);

    if is_favourable_trade(piece, played_move, &attackers, &defenders) {
        return true;
    }

    // Any cheaper attacker wins material outright
    if direct.iter().any(|attack| piece_value(attack.role) < piece.value()) {
        return false;
    }

    if attackers.len() <= defenders.len() {
        return true;
    }

    // Taking would cost the attacker more than the piece is worth
    if let Some(cheapest) = direct.iter().map(|attack| piece_value(attack.role)).min() {
        if piece.value() < cheapest
            && defenders.iter().any(|defender| piece_value(defender.role) < cheapest)
        {
            return true;
        }
    }

    defenders.iter().any(|defender| defender.role == Role::Pawn)
}

/// The piece already won a minor or major piece, can only be taken once,
/// by a non-pawn, and is defended: losing it still nets at least its value.
fn is_favourable_trade(
    piece: &BoardPiece,
    played_move: Option<&BoardMove>,
    attackers: &[BoardMove],
    defenders: &[BoardMove],
) -> bool {
    let Some(captured) = played_move.and_then(|mv| mv.capture) else {
        return false;
    };
    let [attacker] = attackers else {
        return false;
    };

    captured != Role::Pawn
        && !matches!(attacker.role, Role::Pawn | Role::King)
        && !defenders.is_empty()
        && piece_value(captured) + piece_value(attacker.role) >= piece.value()
}

/// `color`'s pieces that fail the safety test. Pawns and kings are never
/// counted, nor are pieces worth no more than what `played_move` captured.
pub fn unsafe_pieces(board: &Board, color: Color, played_move: Option<&BoardMove>) -> Vec<BoardPiece> {
    let captured_value = played_move
        .and_then(|mv| mv.capture)
        .map(piece_value)
        .unwrap_or(0);

    pieces_of(board, color)
        .into_iter()
        .filter(|piece| !matches!(piece.role, Role::Pawn | Role::King))
        .filter(|piece| piece.value() > captured_value)
        .filter(|piece| !is_piece_safe(board, piece, played_move))
        .collect()
}
