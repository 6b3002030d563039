//! Move classification waterfall.
//!
//! Stages run in order and the first to settle a label wins:
//! forced -> theory -> checkmate -> top move / point loss, then the
//! critical and brilliant refinements. Missed opportunities are folded in
//! afterwards, one game at a time.

pub mod basic;
pub mod brilliant;
pub mod critical;
pub mod point_loss;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::book_cache::OpeningBook;
use crate::expected_points::{accuracy, point_loss as expected_points_loss};
use crate::extraction::{extract_current, extract_previous, StateNode};

use self::basic::classify_basic;
use self::brilliant::consider_brilliant;
use self::critical::consider_critical;
use self::point_loss::classify_by_point_loss;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    Brilliant,
    Critical,
    Best,
    Excellent,
    Okay,
    Inaccuracy,
    Mistake,
    Blunder,
    Theory,
    Forced,
    /// Part of the label set, never produced by the waterfall
    Risky,
}

impl Classification {
    /// Ordinal strength, 0 (blunder) to 5.
    pub fn strength(self) -> u8 {
        match self {
            Classification::Blunder => 0,
            Classification::Mistake => 1,
            Classification::Inaccuracy => 2,
            Classification::Okay | Classification::Risky => 3,
            Classification::Excellent => 4,
            Classification::Best
            | Classification::Critical
            | Classification::Brilliant
            | Classification::Forced
            | Classification::Theory => 5,
        }
    }

    pub fn is_error(self) -> bool {
        matches!(
            self,
            Classification::Inaccuracy | Classification::Mistake | Classification::Blunder
        )
    }
}

/// Stage switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassifierOptions {
    pub include_theory: bool,
    pub include_critical: bool,
    pub include_brilliant: bool,
}

impl Default for ClassifierOptions {
    fn default() -> Self {
        Self {
            include_theory: true,
            include_critical: true,
            include_brilliant: true,
        }
    }
}

/// Everything the classifier says about one move.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveVerdict {
    /// None when the move could not be classified
    pub classification: Option<Classification>,
    pub missed_opportunity: bool,
    pub accuracy: Option<f64>,
    pub opening: Option<String>,
    pub point_loss: Option<f64>,
}

impl MoveVerdict {
    fn unclassified() -> Self {
        Self {
            classification: None,
            missed_opportunity: false,
            accuracy: None,
            opening: None,
            point_loss: None,
        }
    }

    fn labelled(classification: Classification, point_loss: f64, opening: Option<String>) -> Self {
        Self {
            classification: Some(classification),
            missed_opportunity: false,
            accuracy: Some(accuracy(point_loss)),
            opening,
            point_loss: Some(point_loss),
        }
    }
}

/// A move-quality label this turn after the opponent's mistake or
/// blunder on the previous one.
pub fn missed_opportunity(label: Option<Classification>, previous: Option<Classification>) -> bool {
    let punished_error = matches!(
        previous,
        Some(Classification::Mistake | Classification::Blunder)
    );
    punished_error && label.is_some_and(Classification::is_error)
}

#[derive(Debug, Clone, Default)]
pub struct MoveClassifier {
    book: Option<Arc<OpeningBook>>,
    options: ClassifierOptions,
}

impl MoveClassifier {
    pub fn new(book: Option<Arc<OpeningBook>>, options: ClassifierOptions) -> Self {
        Self { book, options }
    }

    /// Classify the move that led from `parent` to `node`. The missed
    /// opportunity flag is left unset; see [`MoveClassifier::classify_game`].
    pub fn classify(&self, parent: &StateNode, node: &StateNode) -> MoveVerdict {
        if node.played_move.is_none() {
            return MoveVerdict::unclassified();
        }

        let book = self.book.as_deref().filter(|_| self.options.include_theory);
        if let Some(basic) = classify_basic(parent, node, book) {
            return MoveVerdict::labelled(basic.classification, 0.0, basic.opening);
        }

        let (Some(previous), Some(current)) = (extract_previous(parent, node), extract_current(parent, node)) else {
            debug!(played = ?node.played_move, "Missing engine data, move left unclassified");
            return MoveVerdict::unclassified();
        };

        let top_move_played = previous.top_move == current.played_move;

        let (mut classification, loss) = if top_move_played {
            (Classification::Best, 0.0)
        } else {
            (
                classify_by_point_loss(previous.evaluation, current.evaluation, previous.player_color),
                expected_points_loss(previous.evaluation, current.evaluation, previous.player_color),
            )
        };

        if self.options.include_critical && top_move_played && consider_critical(&previous, &current) {
            classification = Classification::Critical;
        }

        if self.options.include_brilliant
            && classification.strength() >= Classification::Best.strength()
            && consider_brilliant(&previous, &current)
        {
            classification = Classification::Brilliant;
        }

        MoveVerdict::labelled(classification, loss, None)
    }

    /// Classify every move of a game. `nodes[0]` is the starting position;
    /// the result has one verdict per following node.
    pub fn classify_game(&self, nodes: &[StateNode]) -> Vec<MoveVerdict> {
        nodes
            .windows(2)
            .scan(None, |previous_label, pair| {
                let mut verdict = self.classify(&pair[0], &pair[1]);
                verdict.missed_opportunity = missed_opportunity(verdict.classification, *previous_label);
                *previous_label = verdict.classification;
                Some(verdict)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strength_order() {
        assert_eq!(Classification::Blunder.strength(), 0);
        assert_eq!(Classification::Risky.strength(), Classification::Okay.strength());
        for top in [
            Classification::Best,
            Classification::Critical,
            Classification::Brilliant,
            Classification::Forced,
            Classification::Theory,
        ] {
            assert_eq!(top.strength(), 5);
        }
        assert!(Classification::Excellent.strength() < Classification::Best.strength());
    }

    #[test]
    fn test_missed_opportunity() {
        use Classification::*;
        assert!(missed_opportunity(Some(Inaccuracy), Some(Blunder)));
        assert!(missed_opportunity(Some(Mistake), Some(Mistake)));
        assert!(!missed_opportunity(Some(Okay), Some(Blunder)));
        assert!(!missed_opportunity(Some(Blunder), Some(Inaccuracy)));
        assert!(!missed_opportunity(Some(Blunder), None));
        assert!(!missed_opportunity(None, Some(Blunder)));
    }

    #[test]
    fn test_serde_labels() {
        assert_eq!(serde_json::to_string(&Classification::Theory).unwrap(), "\"theory\"");
        let parsed: Classification = serde_json::from_str("\"inaccuracy\"").unwrap();
        assert_eq!(parsed, Classification::Inaccuracy);
    }

    #[test]
    fn test_root_is_unclassified() {
        let root = StateNode::root(shakmaty::Chess::default(), vec![]);
        let verdict = MoveClassifier::default().classify(&root, &root);
        assert_eq!(verdict, MoveVerdict::unclassified());
    }
}
