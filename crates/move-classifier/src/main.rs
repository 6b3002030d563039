//! Move classifier CLI
//!
//! Reviews every game of a PGN file with a pool of local Stockfish
//! processes, optionally asking the Lichess cloud first, and prints a JSON
//! report.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::sync::{Mutex, Semaphore};
use tracing::{error, info, warn};

use move_classifier::analyzer::{self, GameReport};
use move_classifier::book_cache::OpeningBook;
use move_classifier::classification::MoveClassifier;
use move_classifier::cloud_eval::CloudEvaluator;
use move_classifier::config::ReviewConfig;
use move_classifier::stockfish::StockfishEngine;

const USAGE: &str = "usage: move-classifier <games.pgn> [--out report.json]";

struct Args {
    input: PathBuf,
    out: Option<PathBuf>,
}

/// Parse `<games.pgn> [--out report.json]` from CLI args
fn parse_args() -> anyhow::Result<Args> {
    let mut input = None;
    let mut out = None;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--out" {
            let path = args.next().context(USAGE)?;
            out = Some(PathBuf::from(path));
        } else if input.is_none() {
            input = Some(PathBuf::from(arg));
        } else {
            anyhow::bail!("unexpected argument {arg}\n{USAGE}");
        }
    }

    Ok(Args {
        input: input.context(USAGE)?,
        out,
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    // Load .env file for local dev
    let _ = dotenvy::dotenv();

    let args = parse_args()?;
    let config = ReviewConfig::load()?;
    info!(
        stockfish_path = %config.stockfish_path,
        depth = config.engine_depth,
        lines = config.engine_lines,
        "Review config loaded"
    );

    let text = std::fs::read_to_string(&args.input)
        .with_context(|| format!("reading {}", args.input.display()))?;

    let games: Vec<_> = analyzer::parse_games(&text)
        .into_iter()
        .enumerate()
        .filter_map(|(idx, parsed)| match parsed {
            Ok(game) => Some(game),
            Err(e) => {
                warn!(game = idx, error = %e, "Skipping unparseable game");
                None
            }
        })
        .collect();
    info!(games = games.len(), "Parsed PGN");

    let book = config
        .include_theory
        .then(|| Arc::new(OpeningBook::load_or_empty(&config.opening_book_path)));
    let classifier = Arc::new(MoveClassifier::new(book, config.classifier_options()));

    let cloud = if config.cloud_eval {
        let evaluator = CloudEvaluator::new(
            &config.cloud_eval_url,
            Duration::from_secs(config.cloud_eval_timeout_secs),
        )?;
        info!(url = %config.cloud_eval_url, "Cloud evaluation enabled");
        Some(Arc::new(evaluator))
    } else {
        None
    };

    // One Stockfish process per worker
    let num_workers = config.workers.min(games.len()).max(1);
    let mut engines: Vec<Arc<Mutex<StockfishEngine>>> = Vec::with_capacity(num_workers);
    for i in 0..num_workers {
        let engine = StockfishEngine::new(&config.stockfish_path, config.engine_hash_mb).await?;
        info!(engine_id = i, "Stockfish engine ready");
        engines.push(Arc::new(Mutex::new(engine)));
    }

    let semaphore = Arc::new(Semaphore::new(num_workers));
    let config = Arc::new(config);
    let mut handles = Vec::with_capacity(games.len());

    for (idx, game) in games.into_iter().enumerate() {
        let permit = semaphore.clone().acquire_owned().await?;
        let engine = engines[idx % num_workers].clone();
        let classifier = classifier.clone();
        let config = config.clone();
        let cloud = cloud.clone();

        handles.push(tokio::spawn(async move {
            let _permit = permit; // Hold until done
            let mut engine = engine.lock().await;

            match analyzer::review_game(&mut engine, cloud.as_deref(), &game, &classifier, &config).await {
                Ok(report) => {
                    info!(game = idx, moves = report.moves.len(), "Review complete");
                    Some(report)
                }
                Err(e) => {
                    error!(game = idx, error = %e, "Review failed");
                    None
                }
            }
        }));
    }

    let mut reports: Vec<GameReport> = Vec::with_capacity(handles.len());
    for handle in handles {
        match handle.await {
            Ok(Some(report)) => reports.push(report),
            Ok(None) => {}
            Err(e) => error!(error = %e, "Review task panicked"),
        }
    }

    for engine in &engines {
        engine.lock().await.quit().await;
    }

    let json = serde_json::to_string_pretty(&reports)?;
    match args.out {
        Some(path) => {
            std::fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
            info!(path = %path.display(), games = reports.len(), "Report written");
        }
        None => println!("{json}"),
    }

    Ok(())
}
