//! In-memory opening book: piece placement -> opening name.
//!
//! Loads either a JSON object or the bincode encoding of the same map
//! (`.bin` extension). Keys may be full FENs; only the placement field is kept.

use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};
use shakmaty::Board;
use tracing::{info, warn};

use crate::error::ClassifierError;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OpeningBook {
    openings: HashMap<String, String>,
}

impl OpeningBook {
    pub fn from_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let openings = entries
            .into_iter()
            .map(|(fen, name)| (placement_of(fen.as_ref()).to_string(), name.into()))
            .collect();
        Self { openings }
    }

    /// Load the book from a JSON or bincode file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ClassifierError> {
        let path = path.as_ref();
        let reader = BufReader::new(File::open(path)?);

        let raw: HashMap<String, String> = if path.extension().is_some_and(|ext| ext == "bin") {
            bincode::deserialize_from(reader).map_err(|e| ClassifierError::Book(e.to_string()))?
        } else {
            serde_json::from_reader(reader)?
        };

        Ok(Self::from_entries(raw))
    }

    /// Load the book, or fall back to an empty one (theory detection off).
    pub fn load_or_empty<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(book) => {
                info!(positions = book.len(), path = %path.display(), "Loaded opening book");
                book
            }
            Err(e) => {
                warn!("Failed to load opening book from {}: {}", path.display(), e);
                warn!("Theory detection will be disabled");
                Self::default()
            }
        }
    }

    /// Opening name for the placement on `board`, ignoring side to move,
    /// castling and en passant.
    pub fn lookup(&self, board: &Board) -> Option<&str> {
        self.openings.get(&board.to_string()).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.openings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.openings.is_empty()
    }
}

/// First FEN field: the piece placement.
pub fn placement_of(fen: &str) -> &str {
    fen.split_whitespace().next().unwrap_or_default()
}
