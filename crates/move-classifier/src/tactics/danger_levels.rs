//! Danger levels: counter-threats that make capturing a piece a bad idea.
//!
//! A capture is "protected" when making it leaves the capturing side with
//! an unsafe piece at least as valuable as the one it took, or lets the
//! other side mate straight away.

use shakmaty::{Board, Color};

use crate::board_utils::{apply_move, has_mate_in_one, with_turn, BoardMove, BoardPiece, QUEEN_VALUE};
use crate::tactics::attackers::direct_attacks;
use crate::tactics::safety::unsafe_pieces;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreatMode {
    /// The counter-threat must be new after the capture
    Creates,
    /// The counter-threat only has to exist after the capture
    Leaves,
}

/// True when every one of `acting_moves` runs into a counter-threat.
/// A single unprotected move is enough for the opponent.
pub fn has_danger_levels(
    board: &Board,
    threatened: &BoardPiece,
    acting_moves: &[BoardMove],
    mode: ThreatMode,
) -> bool {
    acting_moves.iter().all(|acting| match mode {
        ThreatMode::Creates => move_creates_greater_threat(board, threatened, acting),
        ThreatMode::Leaves => move_leaves_greater_threat(board, threatened, acting),
    })
}

/// Does `acting` expose a new attack on one of its own side's pieces worth
/// at least `threatened`?
pub fn move_creates_greater_threat(board: &Board, threatened: &BoardPiece, acting: &BoardMove) -> bool {
    let previous = relative_unsafe_attacks(board, threatened, acting.color, None);

    let after = apply_move(board, acting);
    let current = relative_unsafe_attacks(&after, threatened, acting.color, Some(acting));

    let new_threat = current
        .iter()
        .any(|attack| !previous.iter().any(|old| old.same_attack(attack)));

    new_threat || allows_mate(&after, threatened, acting.color)
}

/// Is one of `acting`'s own side's pieces worth at least `threatened`
/// left en prise after the move?
pub fn move_leaves_greater_threat(board: &Board, threatened: &BoardPiece, acting: &BoardMove) -> bool {
    let after = apply_move(board, acting);
    !relative_unsafe_attacks(&after, threatened, acting.color, None).is_empty()
        || allows_mate(&after, threatened, acting.color)
}

/// Attacks on `color`'s unsafe pieces valued at least as much as
/// `threatened`, not counting whatever stands on its square.
fn relative_unsafe_attacks(
    board: &Board,
    threatened: &BoardPiece,
    color: Color,
    played_move: Option<&BoardMove>,
) -> Vec<BoardMove> {
    unsafe_pieces(board, color, played_move)
        .into_iter()
        .filter(|piece| piece.square != threatened.square && piece.value() >= threatened.value())
        .flat_map(|piece| direct_attacks(board, &piece))
        .collect()
}

/// Grabbing a minor piece is not worth walking into mate.
fn allows_mate(after: &Board, threatened: &BoardPiece, acting_color: Color) -> bool {
    if threatened.value() >= QUEEN_VALUE {
        return false;
    }
    with_turn(after, !acting_color).is_some_and(|pos| has_mate_in_one(&pos))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board_utils::piece_at;
    use shakmaty::{fen::Fen, CastlingMode, Chess, Position, Square};

    fn board(fen: &str) -> Board {
        let fen: Fen = fen.parse().unwrap();
        fen.into_position::<Chess>(CastlingMode::Standard)
            .unwrap()
            .board()
            .clone()
    }

    #[test]
    fn test_capture_with_no_consequences() {
        // The e5 pawn takes the queen on d4 and nothing else happens
        let b = board("6k1/5ppp/8/4p3/3Q4/8/5PPP/6K1 b - - 0 1");
        let queen = piece_at(&b, Square::D4).unwrap();
        let captures = direct_attacks(&b, &queen);
        assert_eq!(captures.len(), 1);
        assert!(!has_danger_levels(&b, &queen, &captures, ThreatMode::Leaves));
        assert!(!has_danger_levels(&b, &queen, &captures, ThreatMode::Creates));
    }

    #[test]
    fn test_capture_into_back_rank_mate() {
        // The black rook can take the knight on d4, but leaving the back
        // rank lets Re8 mate
        let b = board("3r2k1/5ppp/8/8/3N4/8/5PPP/4R1K1 b - - 0 1");
        let knight = piece_at(&b, Square::D4).unwrap();
        let captures = direct_attacks(&b, &knight);
        assert_eq!(captures.len(), 1);
        assert!(has_danger_levels(&b, &knight, &captures, ThreatMode::Leaves));
    }

    #[test]
    fn test_capture_exposes_queen() {
        // Taking the bishop on e4 with the d6 knight uncovers the d-file:
        // the black queen on d8 is then hit by the white rook
        let b = board("3qk3/8/3n4/8/4B3/8/8/3RK3 b - - 0 1");
        let bishop = piece_at(&b, Square::E4).unwrap();
        let captures: Vec<BoardMove> = direct_attacks(&b, &bishop)
            .into_iter()
            .filter(|m| m.from == Square::D6)
            .collect();
        assert_eq!(captures.len(), 1);
        assert!(has_danger_levels(&b, &bishop, &captures, ThreatMode::Creates));
        assert!(has_danger_levels(&b, &bishop, &captures, ThreatMode::Leaves));
    }

    #[test]
    fn test_existing_threat_is_left_but_not_created() {
        // The d8 queen already hangs to the rook on d1 before Nxb4
        let b = board("3qk3/8/n7/8/1B6/8/8/3RK3 b - - 0 1");
        let bishop = piece_at(&b, Square::B4).unwrap();
        let captures: Vec<BoardMove> = direct_attacks(&b, &bishop)
            .into_iter()
            .filter(|m| m.from == Square::A6)
            .collect();
        assert_eq!(captures.len(), 1);
        assert!(has_danger_levels(&b, &bishop, &captures, ThreatMode::Leaves));
        assert!(!has_danger_levels(&b, &bishop, &captures, ThreatMode::Creates));
    }

    #[test]
    fn test_empty_acting_moves_are_vacuously_protected() {
        let b = board("4k3/8/8/8/3N4/8/8/K7 w - - 0 1");
        let knight = piece_at(&b, Square::D4).unwrap();
        assert!(has_danger_levels(&b, &knight, &[], ThreatMode::Leaves));
    }
}
