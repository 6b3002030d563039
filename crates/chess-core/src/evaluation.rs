//! Engine evaluations and ranked engine lines.
//!
//! Every evaluation is stored from White's point of view, whatever side the
//! engine was searching for. `subjective` re-signs it for one player.

use serde::{Deserialize, Serialize};
use shakmaty::Color;

/// Engine score from White's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Evaluation {
    /// Signed centipawns, positive favours White.
    Centipawns(i32),
    /// Plies to mate, positive when White mates. Zero means mate is on the board.
    Mate(i32),
}

impl Evaluation {
    pub fn value(self) -> i32 {
        match self {
            Evaluation::Centipawns(v) | Evaluation::Mate(v) => v,
        }
    }

    pub fn is_mate(self) -> bool {
        matches!(self, Evaluation::Mate(_))
    }

    /// Same evaluation re-signed from `color`'s point of view.
    pub fn subjective(self, color: Color) -> Evaluation {
        let sign = match color {
            Color::White => 1,
            Color::Black => -1,
        };
        match self {
            Evaluation::Centipawns(v) => Evaluation::Centipawns(v * sign),
            Evaluation::Mate(v) => Evaluation::Mate(v * sign),
        }
    }

    /// Convert a UCI score (side-to-move relative) to White reference.
    /// Mate takes priority over centipawns when both are present.
    pub fn from_side_to_move(cp: Option<i32>, mate: Option<i32>, turn: Color) -> Option<Evaluation> {
        let relative = match (mate, cp) {
            (Some(m), _) => Evaluation::Mate(m),
            (None, Some(c)) => Evaluation::Centipawns(c),
            (None, None) => return None,
        };
        Some(relative.subjective(turn))
    }
}

/// Where a line came from. Lines are only compared within one source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineSource {
    #[default]
    Local,
    External,
}

/// One ranked continuation reported by the engine for a position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineLine {
    pub evaluation: Evaluation,
    pub depth: u32,
    /// 1 = best, 2 = second best, ...
    pub rank: u32,
    #[serde(default)]
    pub source: EngineSource,
    /// Principal variation, UCI or SAN
    pub moves: Vec<String>,
}

impl EngineLine {
    pub fn new(evaluation: Evaluation, depth: u32, rank: u32, moves: Vec<String>) -> Self {
        Self {
            evaluation,
            depth,
            rank,
            source: EngineSource::Local,
            moves,
        }
    }

    pub fn first_move(&self) -> Option<&str> {
        self.moves.first().map(String::as_str)
    }
}

/// The authoritative line: greatest depth, ties broken by lowest rank.
pub fn top_line(lines: &[EngineLine]) -> Option<&EngineLine> {
    lines
        .iter()
        .min_by(|a, b| b.depth.cmp(&a.depth).then(a.rank.cmp(&b.rank)))
}

/// The line of `rank` from the same depth and source group as `reference`.
pub fn sibling_line<'a>(
    lines: &'a [EngineLine],
    reference: &EngineLine,
    rank: u32,
) -> Option<&'a EngineLine> {
    lines.iter().find(|line| {
        line.depth == reference.depth && line.source == reference.source && line.rank == rank
    })
}
