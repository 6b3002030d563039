//! Attack discovery, including x-ray attackers lined up behind the front ones.

use shakmaty::{Board, Color, Rank, Role, Square};

use crate::board_utils::{BoardMove, BoardPiece};

/// Opposing pieces that could capture `target` on this board right now.
pub fn direct_attacks(board: &Board, target: &BoardPiece) -> Vec<BoardMove> {
    board
        .attacks_to(target.square, !target.color, board.occupied())
        .into_iter()
        .filter_map(|from| {
            let attacker = board.piece_at(from)?;
            Some(BoardMove {
                color: attacker.color,
                role: attacker.role,
                from,
                to: target.square,
                capture: Some(target.role),
                promotion: promotes_on(attacker.role, attacker.color, target.square)
                    .then_some(Role::Queen),
            })
        })
        .collect()
}

/// Every attack on `target`. With `transitive`, pieces behind an attacker
/// (batteries, x-rays) are included too.
///
/// Worklist of (board, front attacker): lifting the front attacker off its
/// board and rescanning reveals whatever stood behind it, which then becomes
/// a new front. Every step removes a piece, so the search is bounded by the
/// piece count.
pub fn attacking_moves(board: &Board, target: &BoardPiece, transitive: bool) -> Vec<BoardMove> {
    let mut attacks = direct_attacks(board, target);
    if !transitive {
        return attacks;
    }

    let mut frontier: Vec<(Board, BoardMove)> =
        attacks.iter().map(|attack| (board.clone(), *attack)).collect();

    while let Some((front_board, front)) = frontier.pop() {
        // Nothing can stand behind a king in a battery
        if front.role == Role::King {
            continue;
        }

        let mut revealed_board = front_board.clone();
        revealed_board.remove_piece_at(front.from);

        for attack in direct_attacks(&revealed_board, target) {
            if attacks.iter().any(|known| known.from == attack.from) {
                continue;
            }
            attacks.push(attack);
            frontier.push((revealed_board.clone(), attack));
        }
    }

    attacks
}

fn promotes_on(role: Role, color: Color, square: Square) -> bool {
    let last_rank = match color {
        Color::White => Rank::Eighth,
        Color::Black => Rank::First,
    };
    role == Role::Pawn && square.rank() == last_rank
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board_utils::piece_at;
    use shakmaty::{fen::Fen, CastlingMode, Chess, Position};

    fn board(fen: &str) -> Board {
        let fen: Fen = fen.parse().unwrap();
        fen.into_position::<Chess>(CastlingMode::Standard)
            .unwrap()
            .board()
            .clone()
    }

    fn from_squares(moves: &[BoardMove]) -> Vec<Square> {
        let mut squares: Vec<Square> = moves.iter().map(|m| m.from).collect();
        squares.sort();
        squares
    }

    #[test]
    fn test_direct_attacks() {
        // Black knight on d5 attacked by the e4 pawn and the c3 knight
        let b = board("4k3/8/8/3n4/4P3/2N5/8/4K3 w - - 0 1");
        let target = piece_at(&b, Square::D5).unwrap();
        let attacks = direct_attacks(&b, &target);
        assert_eq!(from_squares(&attacks), vec![Square::C3, Square::E4]);
        assert!(attacks.iter().all(|a| a.capture == Some(Role::Knight)));
    }

    #[test]
    fn test_rook_battery_is_transitive() {
        // Doubled rooks on the d-file against the d7 knight
        let b = board("4k3/3n4/8/8/8/8/3R4/3RK3 w - - 0 1");
        let target = piece_at(&b, Square::D7).unwrap();

        assert_eq!(attacking_moves(&b, &target, false).len(), 1);
        assert_eq!(
            from_squares(&attacking_moves(&b, &target, true)),
            vec![Square::D1, Square::D2]
        );
    }

    #[test]
    fn test_queen_behind_bishop_and_pawn() {
        // Pawn e5 hits f6, bishop d4 behind it, queen c3 behind that
        let b = board("4k3/8/5n2/4P3/3B4/2Q5/8/4K3 w - - 0 1");
        let target = piece_at(&b, Square::F6).unwrap();
        let attacks = attacking_moves(&b, &target, true);
        assert_eq!(from_squares(&attacks), vec![Square::C3, Square::D4, Square::E5]);
    }

    #[test]
    fn test_king_does_not_front_battery() {
        // White king on e2 attacks e3; the rook on e1 is behind the king
        let b = board("4k3/8/8/8/8/4n3/4K3/4R3 w - - 0 1");
        let target = piece_at(&b, Square::E3).unwrap();
        let attacks = attacking_moves(&b, &target, true);
        assert_eq!(from_squares(&attacks), vec![Square::E2]);
    }

    #[test]
    fn test_pawn_capture_onto_last_rank_promotes() {
        let b = board("3rk3/4P3/8/8/8/8/8/4K3 w - - 0 1");
        let target = piece_at(&b, Square::D8).unwrap();
        let attacks = direct_attacks(&b, &target);
        assert_eq!(attacks.len(), 1);
        assert_eq!(attacks[0].promotion, Some(Role::Queen));
    }
}
