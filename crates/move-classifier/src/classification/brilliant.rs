//! Brilliant moves: a real sacrifice the opponent cannot profitably accept
//! or decline.

use shakmaty::Position;

use super::critical::is_critical_candidate;
use crate::board_utils::BoardMove;
use crate::extraction::{ExtractedCurrent, ExtractedPrevious};
use crate::tactics::attackers::direct_attacks;
use crate::tactics::danger_levels::{has_danger_levels, ThreatMode};
use crate::tactics::safety::unsafe_pieces;
use crate::tactics::trapped::is_piece_trapped;

/// Called only when the move already rates Best or higher.
pub fn consider_brilliant(previous: &ExtractedPrevious, current: &ExtractedCurrent) -> bool {
    if !is_critical_candidate(previous, current) {
        return false;
    }
    if current.played_move.is_promotion() {
        return false;
    }
    let Some(played) = BoardMove::from_move(&current.played_move, previous.player_color) else {
        return false;
    };

    let before = previous.position.board();
    let after = current.position.board();

    let unsafe_before = unsafe_pieces(before, previous.player_color, None);
    let unsafe_after = unsafe_pieces(after, previous.player_color, Some(&played));

    if unsafe_after.is_empty() {
        return false;
    }

    // Moving a piece to safety; checks are exempt
    if !current.position.is_check() && unsafe_after.len() < unsafe_before.len() {
        return false;
    }

    // Every hanging piece is poisoned: nothing was really given up
    let all_protected = unsafe_after.iter().all(|piece| {
        let attacks = direct_attacks(after, piece);
        has_danger_levels(after, piece, &attacks, ThreatMode::Leaves)
    });
    if all_protected {
        return false;
    }

    let trapped_before: Vec<_> = unsafe_before
        .iter()
        .filter(|piece| is_piece_trapped(before, piece, true))
        .collect();
    let trapped_after = unsafe_after
        .iter()
        .filter(|piece| is_piece_trapped(after, piece, true))
        .count();

    let escaped_trap = trapped_before.iter().any(|piece| piece.square == played.from);

    !(trapped_after == unsafe_after.len() || escaped_trap || trapped_after < trapped_before.len())
}
