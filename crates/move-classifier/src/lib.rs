//! Chess move classification: engine lines in, move-quality labels out.

pub mod analyzer;
pub mod board_utils;
pub mod book_cache;
pub mod classification;
pub mod cloud_eval;
pub mod config;
pub mod error;
pub mod expected_points;
pub mod extraction;
pub mod stockfish;
pub mod tactics;

pub use classification::{Classification, ClassifierOptions, MoveClassifier, MoveVerdict};
pub use extraction::StateNode;
