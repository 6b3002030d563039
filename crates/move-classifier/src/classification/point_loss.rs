/// Point-loss classification: how much did the move give away?
/// (No Board/Engine dependencies)

use chess_core::evaluation::Evaluation;
use shakmaty::Color;

use super::Classification;
use crate::expected_points::point_loss;

/// Expected-points loss thresholds (strict upper bounds)
const THRESHOLD_BEST: f64 = 0.01;
const THRESHOLD_EXCELLENT: f64 = 0.045;
const THRESHOLD_OKAY: f64 = 0.08;
const THRESHOLD_INACCURACY: f64 = 0.12;
const THRESHOLD_MISTAKE: f64 = 0.22;

/// Mate-length loss thresholds for mate -> mate
const MATE_LOSS_EXCELLENT: i32 = 2;
const MATE_LOSS_OKAY: i32 = 7;

/// Subjective centipawn floors after letting a mate slip
const MATE_TO_CP_EXCELLENT: i32 = 800;
const MATE_TO_CP_OKAY: i32 = 400;
const MATE_TO_CP_INACCURACY: i32 = 200;

/// Label for a move that was not the engine's top choice. `previous` is the
/// top evaluation before the move and `current` the one after, both in
/// White reference.
pub fn classify_by_point_loss(previous: Evaluation, current: Evaluation, mover: Color) -> Classification {
    let previous_subjective = previous.subjective(mover).value();
    let subjective = current.subjective(mover).value();

    match (previous, current) {
        (Evaluation::Mate(before), Evaluation::Mate(after)) => {
            // Had the mate, now getting mated
            if previous_subjective > 0 && subjective < 0 {
                return if subjective < -3 {
                    Classification::Mistake
                } else {
                    Classification::Blunder
                };
            }

            // The defending side is expected to hold the mate length, the
            // attacking side to shorten it by one
            let mate_loss = (after - before) * sign(mover);
            if mate_loss < 0 || (mate_loss == 0 && subjective < 0) {
                Classification::Best
            } else if mate_loss < MATE_LOSS_EXCELLENT {
                Classification::Excellent
            } else if mate_loss < MATE_LOSS_OKAY {
                Classification::Okay
            } else {
                Classification::Inaccuracy
            }
        }
        (Evaluation::Mate(_), Evaluation::Centipawns(_)) => {
            if subjective >= MATE_TO_CP_EXCELLENT {
                Classification::Excellent
            } else if subjective >= MATE_TO_CP_OKAY {
                Classification::Okay
            } else if subjective >= MATE_TO_CP_INACCURACY {
                Classification::Inaccuracy
            } else if subjective >= 0 {
                Classification::Mistake
            } else {
                Classification::Blunder
            }
        }
        (Evaluation::Centipawns(_), Evaluation::Mate(_)) => {
            if subjective > 0 {
                Classification::Best
            } else if subjective >= -2 {
                Classification::Blunder
            } else if subjective >= -5 {
                Classification::Mistake
            } else {
                Classification::Inaccuracy
            }
        }
        (Evaluation::Centipawns(_), Evaluation::Centipawns(_)) => {
            classify_loss(point_loss(previous, current, mover))
        }
    }
}

/// Smooth table over an expected-points loss.
pub fn classify_loss(loss: f64) -> Classification {
    if loss < THRESHOLD_BEST {
        Classification::Best
    } else if loss < THRESHOLD_EXCELLENT {
        Classification::Excellent
    } else if loss < THRESHOLD_OKAY {
        Classification::Okay
    } else if loss < THRESHOLD_INACCURACY {
        Classification::Inaccuracy
    } else if loss < THRESHOLD_MISTAKE {
        Classification::Mistake
    } else {
        Classification::Blunder
    }
}

fn sign(color: Color) -> i32 {
    match color {
        Color::White => 1,
        Color::Black => -1,
    }
}
