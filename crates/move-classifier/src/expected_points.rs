/// Evaluation arithmetic, pure functions only
/// (No Board/Engine dependencies)

use chess_core::evaluation::Evaluation;
use shakmaty::Color;

/// Sigmoid gradient applied to centipawn scores
const CENTIPAWN_GRADIENT: f64 = 0.0035;

/// Accuracy curve: ACCURACY_SCALE * e^(ACCURACY_DECAY * point_loss) + ACCURACY_OFFSET
const ACCURACY_SCALE: f64 = 103.16;
const ACCURACY_DECAY: f64 = -4.0;
const ACCURACY_OFFSET: f64 = -3.17;

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

/// White's expected points for an evaluation.
///
/// `just_moved` only matters for a delivered mate (`Mate(0)`): the side that
/// just moved is the side that mated. Unknown mover gives 0.5.
pub fn expected_points(eval: Evaluation, just_moved: Option<Color>) -> f64 {
    match eval {
        Evaluation::Centipawns(cp) => sigmoid(CENTIPAWN_GRADIENT * cp as f64),
        Evaluation::Mate(0) => match just_moved {
            Some(Color::White) => 1.0,
            Some(Color::Black) => 0.0,
            None => 0.5,
        },
        Evaluation::Mate(plies) if plies > 0 => 1.0,
        Evaluation::Mate(_) => 0.0,
    }
}

/// Expected points lost by `mover` going from `previous` to `current`.
/// Never negative.
pub fn point_loss(previous: Evaluation, current: Evaluation, mover: Color) -> f64 {
    let before = expected_points(previous, Some(!mover));
    let after = expected_points(current, Some(mover));
    let sign = match mover {
        Color::White => 1.0,
        Color::Black => -1.0,
    };
    ((before - after) * sign).max(0.0)
}

/// Move accuracy (0-100) for a point loss.
pub fn accuracy(point_loss: f64) -> f64 {
    let raw = ACCURACY_SCALE * (ACCURACY_DECAY * point_loss).exp() + ACCURACY_OFFSET;
    raw.clamp(0.0, 100.0)
}
