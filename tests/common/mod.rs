//! Shared fixtures for classification scenarios: positions from FEN and
//! hand-built engine lines, so no engine binary is needed.

#![allow(dead_code)]

use chess_core::evaluation::{EngineLine, Evaluation};
use move_classifier::extraction::{parse_move, StateNode};
use shakmaty::{fen::Fen, CastlingMode, Chess, Position};

pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

pub fn position(fen: &str) -> Chess {
    fen.parse::<Fen>()
        .expect("invalid FEN")
        .into_position(CastlingMode::Standard)
        .expect("illegal position")
}

pub fn cp(value: i32) -> Evaluation {
    Evaluation::Centipawns(value)
}

pub fn mate(plies: i32) -> Evaluation {
    Evaluation::Mate(plies)
}

/// Engine line at a fixed depth, first move only.
pub fn line(evaluation: Evaluation, rank: u32, first_move: &str) -> EngineLine {
    EngineLine::new(evaluation, 18, rank, vec![first_move.to_string()])
}

/// Play `played` from `fen` and return (parent, node). `after` is the top
/// evaluation of the resulting position; None leaves it without lines.
pub fn move_pair(
    fen: &str,
    played: &str,
    before: Vec<EngineLine>,
    after: Option<Evaluation>,
) -> (StateNode, StateNode) {
    let parent = position(fen);
    let mv = parse_move(&parent, played).expect("illegal move");
    let child = parent.clone().play(mv).expect("illegal move");

    let after_lines = match (after, child.legal_moves().first()) {
        (Some(evaluation), Some(reply)) => {
            let reply = reply.to_uci(CastlingMode::Standard).to_string();
            vec![line(evaluation, 1, &reply)]
        }
        _ => Vec::new(),
    };

    (
        StateNode::root(parent, before),
        StateNode::after_move(child, played, after_lines),
    )
}

/// Nodes for a line of play from the start position. `root` is the start
/// position's lines; each move then names the engine's reply and the
/// evaluation of the position it reached.
pub fn game_nodes(root: Vec<EngineLine>, moves: &[(&str, &str, Evaluation)]) -> Vec<StateNode> {
    let mut current = Chess::default();
    let mut nodes = vec![StateNode::root(current.clone(), root)];

    for (san, reply, evaluation) in moves {
        let mv = parse_move(&current, san).expect("illegal move");
        current.play_unchecked(mv);
        nodes.push(StateNode::after_move(
            current.clone(),
            *san,
            vec![line(*evaluation, 1, reply)],
        ));
    }

    nodes
}
