//! Stockfish engine wrapper using UCI protocol (async I/O)

use chess_core::evaluation::{EngineLine, Evaluation};
use shakmaty::{Chess, Position};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};

use tracing::debug;

use crate::error::ClassifierError;

/// Latest report for one MultiPV slot
#[derive(Debug, Clone, Default)]
struct PvSlot {
    depth: u32,
    cp: Option<i32>,
    mate: Option<i32>,
    pv: Vec<String>,
}

/// Stockfish engine instance
pub struct StockfishEngine {
    process: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
    multipv: u32,
}

impl StockfishEngine {
    /// Spawn a new Stockfish process and initialize UCI
    pub async fn new(path: &str, hash_mb: u32) -> Result<Self, ClassifierError> {
        let mut process = Command::new(path)
            .stdin(std::process::Stdio::piped())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::null())
            .spawn()
            .map_err(|e| ClassifierError::Stockfish(format!("Failed to spawn Stockfish: {e}")))?;

        let stdin = process
            .stdin
            .take()
            .ok_or_else(|| ClassifierError::Stockfish("Stockfish stdin unavailable".into()))?;
        let stdout = process
            .stdout
            .take()
            .map(BufReader::new)
            .ok_or_else(|| ClassifierError::Stockfish("Stockfish stdout unavailable".into()))?;

        let mut engine = Self {
            process,
            stdin,
            stdout,
            multipv: 1,
        };

        // Initialize UCI
        engine.send("uci").await?;
        engine.wait_for("uciok").await?;

        // Configure for analysis
        engine.send("setoption name Threads value 1").await?;
        engine.send(&format!("setoption name Hash value {hash_mb}")).await?;
        engine.send("setoption name UCI_AnalyseMode value true").await?;
        engine.send("isready").await?;
        engine.wait_for("readyok").await?;

        Ok(engine)
    }

    /// Send a command to Stockfish
    async fn send(&mut self, cmd: &str) -> Result<(), ClassifierError> {
        debug!(cmd, "SF <");
        self.stdin
            .write_all(format!("{cmd}\n").as_bytes())
            .await
            .map_err(|e| ClassifierError::Stockfish(format!("Failed to write to Stockfish: {e}")))?;
        self.stdin
            .flush()
            .await
            .map_err(|e| ClassifierError::Stockfish(format!("Failed to flush stdin: {e}")))?;
        Ok(())
    }

    /// Read one line; EOF means the engine died
    async fn read_line(&mut self, line: &mut String) -> Result<(), ClassifierError> {
        line.clear();
        let read = self
            .stdout
            .read_line(line)
            .await
            .map_err(|e| ClassifierError::Stockfish(format!("Failed to read from Stockfish: {e}")))?;
        if read == 0 {
            return Err(ClassifierError::Stockfish("Stockfish closed its output".into()));
        }
        debug!(line = line.trim(), "SF >");
        Ok(())
    }

    /// Wait for a specific response line
    async fn wait_for(&mut self, expected: &str) -> Result<(), ClassifierError> {
        let mut line = String::new();
        loop {
            self.read_line(&mut line).await?;
            if line.trim() == expected {
                return Ok(());
            }
        }
    }

    /// Ranked lines for the position reached by `moves` (UCI) from the
    /// standard start. Scores come back in White reference. Finished games
    /// get no lines and the engine is not asked.
    pub async fn analyse(
        &mut self,
        moves: &[String],
        position: &Chess,
        depth: u32,
        lines: u32,
    ) -> Result<Vec<EngineLine>, ClassifierError> {
        if position.is_game_over() {
            return Ok(Vec::new());
        }

        let lines = lines.max(1);
        if lines != self.multipv {
            self.send(&format!("setoption name MultiPV value {lines}")).await?;
            self.multipv = lines;
        }

        if moves.is_empty() {
            self.send("position startpos").await?;
        } else {
            self.send(&format!("position startpos moves {}", moves.join(" "))).await?;
        }
        self.send(&format!("go depth {depth}")).await?;

        let mut slots = vec![PvSlot::default(); lines as usize];
        let mut line = String::new();

        loop {
            self.read_line(&mut line).await?;
            let trimmed = line.trim();

            if trimmed.starts_with("info") && trimmed.contains(" pv ") {
                // Parse multipv index (1-based)
                let pv_idx = parse_multipv_index(trimmed).unwrap_or(1).saturating_sub(1) as usize;
                if let Some(slot) = slots.get_mut(pv_idx) {
                    slot.depth = parse_depth(trimmed).unwrap_or(slot.depth);
                    slot.cp = parse_cp(trimmed);
                    slot.mate = parse_mate(trimmed);
                    slot.pv = parse_pv(trimmed);
                }
            } else if trimmed.starts_with("bestmove") {
                break;
            }
        }

        let turn = position.turn();
        Ok(slots
            .into_iter()
            .zip(1u32..)
            .filter(|(slot, _)| !slot.pv.is_empty())
            .filter_map(|(slot, rank)| {
                let evaluation = Evaluation::from_side_to_move(slot.cp, slot.mate, turn)?;
                Some(EngineLine::new(evaluation, slot.depth, rank, slot.pv))
            })
            .collect())
    }

    /// Send quit command and wait for process to exit
    pub async fn quit(&mut self) {
        let _ = self.send("quit").await;
        let _ = self.process.wait().await;
    }
}

impl Drop for StockfishEngine {
    fn drop(&mut self) {
        // Best-effort synchronous kill in drop
        let _ = self.process.start_kill();
    }
}

/// Value following `key` in an info line
fn parse_field<T: std::str::FromStr>(line: &str, key: &str) -> Option<T> {
    let mut parts = line.split_whitespace();
    while let Some(part) = parts.next() {
        if part == key {
            return parts.next()?.parse().ok();
        }
        // Nothing after the PV is a field
        if part == "pv" {
            break;
        }
    }
    None
}

/// Parse centipawn score from info line
fn parse_cp(line: &str) -> Option<i32> {
    parse_field(line, "cp")
}

/// Parse mate score from info line
fn parse_mate(line: &str) -> Option<i32> {
    parse_field(line, "mate")
}

/// Parse search depth from info line
fn parse_depth(line: &str) -> Option<u32> {
    parse_field(line, "depth")
}

/// Parse multipv index from info line
fn parse_multipv_index(line: &str) -> Option<u32> {
    parse_field(line, "multipv")
}

/// Parse PV moves from info line
fn parse_pv(line: &str) -> Vec<String> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    let mut in_pv = false;
    let mut moves = Vec::new();

    for part in parts {
        if part == "pv" {
            in_pv = true;
            continue;
        }
        if in_pv {
            // PV ends at next keyword or end of line
            if part.starts_with("bmc") || part == "string" {
                break;
            }
            moves.push(part.to_string());
        }
    }

    moves
}
