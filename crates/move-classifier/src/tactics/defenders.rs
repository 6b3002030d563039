//! Defenders of a piece, found by simulating the recapture.

use shakmaty::Board;

use crate::board_utils::{apply_move, BoardMove, BoardPiece};
use crate::tactics::attackers::{attacking_moves, direct_attacks};

/// Pieces that would recapture on `target`'s square.
///
/// When the piece is attacked, each capture is simulated and the smallest
/// set of recapturers wins (the attacker picks the capture that is hardest
/// to answer). When nothing attacks it, the piece is recoloured and its
/// attackers in that hypothetical position are its defenders.
pub fn defending_moves(board: &Board, target: &BoardPiece, transitive: bool) -> Vec<BoardMove> {
    let attacks = direct_attacks(board, target);

    if attacks.is_empty() {
        let as_enemy = BoardPiece {
            color: !target.color,
            ..*target
        };
        let mut flipped = board.clone();
        flipped.remove_piece_at(target.square);
        flipped.set_piece_at(target.square, as_enemy.piece());
        return attacking_moves(&flipped, &as_enemy, transitive);
    }

    attacks
        .iter()
        .map(|attack| {
            let captured = apply_move(board, attack);
            attacking_moves(&captured, &attack.landed_piece(), transitive)
        })
        .min_by_key(Vec::len)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board_utils::piece_at;
    use shakmaty::{fen::Fen, CastlingMode, Chess, Position, Role, Square};

    fn board(fen: &str) -> Board {
        let fen: Fen = fen.parse().unwrap();
        fen.into_position::<Chess>(CastlingMode::Standard)
            .unwrap()
            .board()
            .clone()
    }

    #[test]
    fn test_unattacked_piece_defenders() {
        // Knight on c3 guarded by the b2 and d2 pawns
        let b = board("4k3/8/8/8/8/2N5/1P1P4/4K3 w - - 0 1");
        let knight = piece_at(&b, Square::C3).unwrap();
        let defenders = defending_moves(&b, &knight, true);
        assert_eq!(defenders.len(), 2);
        assert!(defenders.iter().all(|d| d.role == Role::Pawn));
    }

    #[test]
    fn test_attacked_piece_recaptures() {
        // Black rook takes on d4; only the e3 pawn can take back
        let b = board("3rk3/8/8/8/3N4/4P3/8/4K3 w - - 0 1");
        let knight = piece_at(&b, Square::D4).unwrap();
        let defenders = defending_moves(&b, &knight, true);
        assert_eq!(defenders.len(), 1);
        assert_eq!(defenders[0].from, Square::E3);
    }

    #[test]
    fn test_battery_defender_is_transitive() {
        // Bishop on d4 defended by the queen on a1 only through the c3 bishop
        let b = board("4k3/8/8/8/3B4/2B5/8/Q3K3 w - - 0 1");
        let bishop = piece_at(&b, Square::D4).unwrap();
        assert_eq!(defending_moves(&b, &bishop, false).len(), 1);
        assert_eq!(defending_moves(&b, &bishop, true).len(), 2);
    }

    #[test]
    fn test_undefended_piece() {
        let b = board("4k3/8/8/8/3N4/8/8/K7 w - - 0 1");
        let knight = piece_at(&b, Square::D4).unwrap();
        assert!(defending_moves(&b, &knight, true).is_empty());
    }
}
