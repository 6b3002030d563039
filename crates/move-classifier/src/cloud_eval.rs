//! Lichess cloud evaluation client.
//!
//! Cached cloud analyses come back in White reference already. Lines are
//! tagged `EngineSource::External`; castling inside them may use the
//! king-takes-rook form, which extraction normalises.

use std::time::Duration;

use chess_core::evaluation::{EngineLine, EngineSource, Evaluation};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use shakmaty::fen::Fen;
use shakmaty::{Chess, EnPassantMode, Position};

use crate::error::ClassifierError;

pub const DEFAULT_CLOUD_EVAL_URL: &str = "https://lichess.org";

#[derive(Debug, Deserialize)]
pub struct CloudEvalResponse {
    #[serde(default)]
    pub depth: u32,
    #[serde(default)]
    pub pvs: Vec<CloudPv>,
}

#[derive(Debug, Deserialize)]
pub struct CloudPv {
    #[serde(default)]
    pub moves: String,
    pub cp: Option<i32>,
    pub mate: Option<i32>,
}

pub struct CloudEvaluator {
    client: Client,
    base_url: String,
}

impl CloudEvaluator {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClassifierError> {
        let client = Client::builder()
            .user_agent("MoveClassifier/0.1")
            .timeout(timeout)
            .build()
            .map_err(|e| ClassifierError::CloudEval(format!("Client build error: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Cached cloud lines for `position`. An empty result means the
    /// position is not in the cloud cache.
    pub async fn evaluate(&self, position: &Chess, lines: u32) -> Result<Vec<EngineLine>, ClassifierError> {
        if position.is_game_over() {
            return Ok(Vec::new());
        }

        let fen = Fen::from_position(position, EnPassantMode::Legal).to_string();
        let url = format!("{}/api/cloud-eval", self.base_url);

        let resp = self
            .client
            .get(&url)
            .query(&[("fen", fen), ("multiPv", lines.max(1).to_string())])
            .send()
            .await
            .map_err(|e| ClassifierError::CloudEval(format!("Request error: {e}")))?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }

        if !resp.status().is_success() {
            return Err(ClassifierError::CloudEval(format!("HTTP {}", resp.status())));
        }

        let body: CloudEvalResponse = resp
            .json()
            .await
            .map_err(|e| ClassifierError::CloudEval(format!("Body parse error: {e}")))?;

        Ok(cloud_lines(body))
    }
}

/// Convert a cloud response into ranked lines. PVs with no moves or no
/// score are dropped; ranks follow response order.
pub fn cloud_lines(response: CloudEvalResponse) -> Vec<EngineLine> {
    let depth = response.depth;
    response
        .pvs
        .into_iter()
        .filter_map(|pv| {
            let evaluation = match (pv.mate, pv.cp) {
                (Some(mate), _) => Evaluation::Mate(mate),
                (None, Some(cp)) => Evaluation::Centipawns(cp),
                (None, None) => return None,
            };
            let moves: Vec<String> = pv.moves.split_whitespace().map(str::to_string).collect();
            (!moves.is_empty()).then_some((evaluation, moves))
        })
        .enumerate()
        .map(|(idx, (evaluation, moves))| EngineLine {
            evaluation,
            depth,
            rank: idx as u32 + 1,
            source: EngineSource::External,
            moves,
        })
        .collect()
}
