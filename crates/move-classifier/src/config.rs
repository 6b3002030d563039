//! Review configuration from environment variables

use std::env;

use tracing::info;

use crate::classification::ClassifierOptions;
use crate::cloud_eval::DEFAULT_CLOUD_EVAL_URL;
use crate::error::ClassifierError;

#[derive(Clone, Debug)]
pub struct ReviewConfig {
    /// Path to Stockfish binary
    pub stockfish_path: String,

    /// Search depth per position
    pub engine_depth: u32,

    /// MultiPV line count (2 enables critical/brilliant checks)
    pub engine_lines: u32,

    /// Stockfish hash table size in MB
    pub engine_hash_mb: u32,

    /// Opening book file (JSON or bincode)
    pub opening_book_path: String,

    /// Games reviewed concurrently, one engine each
    pub workers: usize,

    /// Ask the Lichess cloud first, falling back to Stockfish
    pub cloud_eval: bool,
    pub cloud_eval_url: String,
    pub cloud_eval_timeout_secs: u64,

    pub include_theory: bool,
    pub include_critical: bool,
    pub include_brilliant: bool,
}

impl ReviewConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn load() -> Result<Self, ClassifierError> {
        let stockfish_path = env::var("STOCKFISH_PATH")
            .unwrap_or_else(|_| "/usr/local/bin/stockfish".to_string());

        let engine_depth = parse_var("ENGINE_DEPTH").unwrap_or(16);
        if engine_depth == 0 {
            return Err(ClassifierError::Config("ENGINE_DEPTH must be at least 1"));
        }

        let engine_lines = parse_var("ENGINE_LINES").unwrap_or(2).max(1);
        let engine_hash_mb = parse_var("ENGINE_HASH_MB").unwrap_or(128);

        let opening_book_path = env::var("OPENING_BOOK_PATH")
            .unwrap_or_else(|_| "data/openings.json".to_string());

        let workers = parse_var("REVIEW_WORKERS")
            .unwrap_or_else(num_cpus::get)
            .max(1);

        let config = Self {
            stockfish_path,
            engine_depth,
            engine_lines,
            engine_hash_mb,
            opening_book_path,
            workers,
            cloud_eval: parse_var("CLOUD_EVAL").unwrap_or(false),
            cloud_eval_url: env::var("CLOUD_EVAL_URL")
                .unwrap_or_else(|_| DEFAULT_CLOUD_EVAL_URL.to_string()),
            cloud_eval_timeout_secs: parse_var("CLOUD_EVAL_TIMEOUT_SECS").unwrap_or(10),
            include_theory: parse_var("INCLUDE_THEORY").unwrap_or(true),
            include_critical: parse_var("INCLUDE_CRITICAL").unwrap_or(true),
            include_brilliant: parse_var("INCLUDE_BRILLIANT").unwrap_or(true),
        };

        if config.engine_lines < 2 {
            info!("ENGINE_LINES < 2: critical and brilliant moves will not be detected");
        }

        Ok(config)
    }

    pub fn classifier_options(&self) -> ClassifierOptions {
        ClassifierOptions {
            include_theory: self.include_theory,
            include_critical: self.include_critical,
            include_brilliant: self.include_brilliant,
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}
