//! Classifier error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClassifierError {
    #[error("Configuration error: {0}")]
    Config(&'static str),

    #[error("Stockfish error: {0}")]
    Stockfish(String),

    #[error("Cloud evaluation error: {0}")]
    CloudEval(String),

    #[error("PGN error: {0}")]
    Pgn(#[from] chess_core::pgn::PgnError),

    #[error("Opening book error: {0}")]
    Book(String),

    #[error("Analysis error: {0}")]
    Analysis(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
