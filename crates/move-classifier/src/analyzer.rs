//! Game review: walk a PGN game, collect engine lines for every position,
//! classify each move and summarise both sides.

use chess_core::evaluation::{top_line, EngineLine};
use chess_core::game_data::{GameData, GameMetadata};
use chess_core::pgn::{parse_pgn, split_games};
use serde::{Deserialize, Serialize};
use shakmaty::{CastlingMode, Chess, Color, Position};
use tracing::{debug, info, warn};

use crate::classification::{Classification, MoveClassifier, MoveVerdict};
use crate::cloud_eval::CloudEvaluator;
use crate::config::ReviewConfig;
use crate::error::ClassifierError;
use crate::extraction::{parse_move, StateNode};
use crate::stockfish::StockfishEngine;

/// Label counts for one side
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ClassificationsOutput {
    pub brilliant: u32,
    pub critical: u32,
    pub best: u32,
    pub excellent: u32,
    pub okay: u32,
    pub inaccuracy: u32,
    pub mistake: u32,
    pub blunder: u32,
    pub theory: u32,
    pub forced: u32,
    pub risky: u32,
    pub unclassified: u32,
    pub missed_opportunities: u32,
}

impl ClassificationsOutput {
    fn record(&mut self, verdict: &MoveVerdict) {
        let counter = match verdict.classification {
            Some(Classification::Brilliant) => &mut self.brilliant,
            Some(Classification::Critical) => &mut self.critical,
            Some(Classification::Best) => &mut self.best,
            Some(Classification::Excellent) => &mut self.excellent,
            Some(Classification::Okay) => &mut self.okay,
            Some(Classification::Inaccuracy) => &mut self.inaccuracy,
            Some(Classification::Mistake) => &mut self.mistake,
            Some(Classification::Blunder) => &mut self.blunder,
            Some(Classification::Theory) => &mut self.theory,
            Some(Classification::Forced) => &mut self.forced,
            Some(Classification::Risky) => &mut self.risky,
            None => &mut self.unclassified,
        };
        *counter += 1;
        if verdict.missed_opportunity {
            self.missed_opportunities += 1;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct SideStats {
    pub classifications: ClassificationsOutput,
    /// Mean accuracy over classified moves
    pub accuracy: Option<f64>,
}

/// Move output for JSON serialization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveOutput {
    pub move_number: u32,
    pub color: String,
    pub san: String,
    #[serde(rename = "move")]
    pub move_uci: String,
    /// Engine's first choice in the position before the move
    pub best_move: Option<String>,
    #[serde(flatten)]
    pub verdict: MoveVerdict,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameReport {
    pub metadata: GameMetadata,
    /// Last book position reached
    pub opening: Option<String>,
    pub moves: Vec<MoveOutput>,
    pub white: SideStats,
    pub black: SideStats,
}

/// A move that parsed and was played on the board.
#[derive(Debug, Clone)]
pub struct WalkedMove {
    pub san: String,
    pub uci: String,
    pub position: Chess,
}

/// Split a PGN file and parse every game in it, keeping each game's
/// failure next to its index.
pub fn parse_games(text: &str) -> Vec<Result<GameData, ClassifierError>> {
    split_games(text)
        .iter()
        .map(|pgn| parse_pgn(pgn).map_err(ClassifierError::from))
        .collect()
}

/// Play the SAN moves from the standard start. Stops at the first move that
/// does not parse; everything before it is kept.
pub fn walk_game(moves: &[String]) -> Vec<WalkedMove> {
    let mut position = Chess::default();
    let mut walked = Vec::with_capacity(moves.len());

    for (ply, san) in moves.iter().enumerate() {
        let Some(mv) = parse_move(&position, san) else {
            warn!(ply, san = %san, "Unparseable move, stopping game walk");
            break;
        };
        let uci = mv.to_uci(CastlingMode::Standard).to_string();
        position.play_unchecked(mv);
        walked.push(WalkedMove {
            san: san.clone(),
            uci,
            position: position.clone(),
        });
    }

    walked
}

/// Analyse and classify one game.
pub async fn review_game(
    engine: &mut StockfishEngine,
    cloud: Option<&CloudEvaluator>,
    game: &GameData,
    classifier: &MoveClassifier,
    config: &ReviewConfig,
) -> Result<GameReport, ClassifierError> {
    let walked = walk_game(&game.moves);
    if walked.is_empty() {
        return Err(ClassifierError::Analysis("no playable moves".into()));
    }
    info!(
        white = %game.metadata.white,
        black = %game.metadata.black,
        plies = walked.len(),
        "Reviewing game"
    );

    let ucis: Vec<String> = walked.iter().map(|m| m.uci.clone()).collect();

    let start = Chess::default();
    let root_lines = lines_for(engine, cloud, &[], &start, config).await;
    let mut nodes = vec![StateNode::root(start, root_lines)];

    for (ply, walked_move) in walked.iter().enumerate() {
        let lines = lines_for(engine, cloud, &ucis[..=ply], &walked_move.position, config).await;
        nodes.push(StateNode::after_move(
            walked_move.position.clone(),
            walked_move.uci.clone(),
            lines,
        ));
    }

    let (nodes, verdicts) = classify_blocking(classifier.clone(), nodes).await?;
    Ok(assemble_report(game.metadata.clone(), &walked, &nodes, verdicts))
}

/// Run the CPU-bound tactical classification on the blocking pool and hand
/// the nodes back with their verdicts.
pub async fn classify_blocking(
    classifier: MoveClassifier,
    nodes: Vec<StateNode>,
) -> Result<(Vec<StateNode>, Vec<MoveVerdict>), ClassifierError> {
    tokio::task::spawn_blocking(move || {
        let verdicts = classifier.classify_game(&nodes);
        (nodes, verdicts)
    })
    .await
    .map_err(|e| ClassifierError::Analysis(format!("classification task failed: {e}")))
}

/// Engine lines for one position: the cloud cache when enabled and it has
/// the position, else the local engine. A failure costs only this position.
async fn lines_for(
    engine: &mut StockfishEngine,
    cloud: Option<&CloudEvaluator>,
    moves: &[String],
    position: &Chess,
    config: &ReviewConfig,
) -> Vec<EngineLine> {
    if let Some(cloud) = cloud {
        match cloud.evaluate(position, config.engine_lines).await {
            Ok(lines) if !lines.is_empty() => return lines,
            Ok(_) => debug!(ply = moves.len(), "Position not in cloud cache"),
            Err(e) => debug!(ply = moves.len(), error = %e, "Cloud evaluation failed, using Stockfish"),
        }
    }

    match engine
        .analyse(moves, position, config.engine_depth, config.engine_lines)
        .await
    {
        Ok(lines) => lines,
        Err(e) => {
            warn!(ply = moves.len(), error = %e, "Engine analysis failed");
            Vec::new()
        }
    }
}

/// Build the report from walked moves, their nodes (root first) and one
/// verdict per move.
pub fn assemble_report(
    metadata: GameMetadata,
    walked: &[WalkedMove],
    nodes: &[StateNode],
    verdicts: Vec<MoveVerdict>,
) -> GameReport {
    let mut white = SideStats::default();
    let mut black = SideStats::default();
    let mut white_accuracy = Vec::new();
    let mut black_accuracy = Vec::new();
    let mut opening = None;

    let moves: Vec<MoveOutput> = walked
        .iter()
        .zip(verdicts)
        .enumerate()
        .map(|(ply, (walked_move, verdict))| {
            let color = if ply % 2 == 0 { Color::White } else { Color::Black };
            let (stats, accuracies) = match color {
                Color::White => (&mut white, &mut white_accuracy),
                Color::Black => (&mut black, &mut black_accuracy),
            };
            stats.classifications.record(&verdict);
            accuracies.extend(verdict.accuracy);
            if verdict.opening.is_some() {
                opening.clone_from(&verdict.opening);
            }

            let best_move = nodes
                .get(ply)
                .and_then(|parent| top_line(&parent.engine_lines))
                .and_then(|line| line.first_move())
                .map(str::to_string);

            MoveOutput {
                move_number: (ply / 2 + 1) as u32,
                color: color_name(color).to_string(),
                san: walked_move.san.clone(),
                move_uci: walked_move.uci.clone(),
                best_move,
                verdict,
            }
        })
        .collect();

    white.accuracy = mean(&white_accuracy);
    black.accuracy = mean(&black_accuracy);

    GameReport {
        metadata,
        opening,
        moves,
        white,
        black,
    }
}

fn color_name(color: Color) -> &'static str {
    match color {
        Color::White => "white",
        Color::Black => "black",
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classification::ClassifierOptions;
    use chess_core::evaluation::{EngineLine, Evaluation};

    fn sans(moves: &[&str]) -> Vec<String> {
        moves.iter().map(|m| m.to_string()).collect()
    }

    fn metadata() -> GameMetadata {
        GameMetadata {
            white: "White".into(),
            black: "Black".into(),
            result: "*".into(),
            date: None,
            time_control: None,
            eco: None,
            event: None,
            site: None,
        }
    }

    fn cp_line(cp: i32, mv: &str) -> EngineLine {
        EngineLine::new(Evaluation::Centipawns(cp), 12, 1, vec![mv.to_string()])
    }

    #[test]
    fn test_parse_games_reports_pgn_errors() {
        let text = "[White \"A\"]\n[Black \"B\"]\n\n1. e4 e5 *\n\n\
                    [White \"C\"]\n[Black \"D\"]\n[SetUp \"1\"]\n[FEN \"4k3/8/8/8/8/8/8/4K3 w - - 0 1\"]\n\n1. Kd2 *\n";
        let games = parse_games(text);
        assert_eq!(games.len(), 2);
        assert_eq!(games[0].as_ref().unwrap().moves, sans(&["e4", "e5"]));
        assert!(matches!(games[1], Err(ClassifierError::Pgn(_))));
    }

    #[test]
    fn test_walk_game_stops_at_bad_move() {
        let walked = walk_game(&sans(&["e4", "e5", "Nf3", "Ke3", "Nc6"]));
        assert_eq!(walked.len(), 3);
        assert_eq!(walked[2].uci, "g1f3");
    }

    #[test]
    fn test_walk_game_castling_uci() {
        let walked = walk_game(&sans(&["e4", "e5", "Nf3", "Nc6", "Bc4", "Bc5", "O-O"]));
        assert_eq!(walked.last().unwrap().uci, "e1g1");
    }

    #[test]
    fn test_assemble_report_stats() {
        let walked = walk_game(&sans(&["e4", "e5"]));
        let nodes = vec![
            StateNode::root(Chess::default(), vec![cp_line(30, "e2e4")]),
            StateNode::after_move(walked[0].position.clone(), "e2e4", vec![cp_line(30, "e7e5")]),
            StateNode::after_move(walked[1].position.clone(), "e7e5", vec![cp_line(35, "g1f3")]),
        ];
        let classifier = MoveClassifier::new(None, ClassifierOptions::default());
        let verdicts = classifier.classify_game(&nodes);

        let report = assemble_report(metadata(), &walked, &nodes, verdicts);
        assert_eq!(report.moves.len(), 2);
        assert_eq!(report.moves[0].best_move.as_deref(), Some("e2e4"));
        assert_eq!(report.moves[1].color, "black");
        assert_eq!(report.moves[1].move_number, 1);
        assert_eq!(report.white.classifications.best, 1);
        assert_eq!(report.black.classifications.best, 1);
        assert!(report.white.accuracy.unwrap() > 99.0);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["moves"][0]["move"], "e2e4");
        assert_eq!(json["moves"][0]["classification"], "best");
    }

    #[test]
    fn test_classify_blocking_keeps_node_order() {
        let walked = walk_game(&sans(&["e4"]));
        let nodes = vec![
            StateNode::root(Chess::default(), vec![cp_line(30, "e2e4")]),
            StateNode::after_move(walked[0].position.clone(), "e2e4", vec![cp_line(30, "e7e5")]),
        ];
        let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
        let (nodes, verdicts) = rt
            .block_on(classify_blocking(MoveClassifier::default(), nodes))
            .unwrap();
        assert_eq!(nodes.len(), 2);
        assert_eq!(verdicts.len(), 1);
        assert_eq!(verdicts[0].classification, Some(Classification::Best));
    }

    #[test]
    fn test_missing_lines_count_as_unclassified() {
        let walked = walk_game(&sans(&["d4"]));
        let nodes = vec![
            StateNode::root(Chess::default(), vec![]),
            StateNode::after_move(walked[0].position.clone(), "d2d4", vec![]),
        ];
        let verdicts = MoveClassifier::default().classify_game(&nodes);
        let report = assemble_report(metadata(), &walked, &nodes, verdicts);
        assert_eq!(report.white.classifications.unclassified, 1);
        assert_eq!(report.white.accuracy, None);
        assert!(report.moves[0].best_move.is_none());
    }
}
