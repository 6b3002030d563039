//! Shared chess data types: games read from PGN and engine evaluations.

pub mod evaluation;
pub mod game_data;
pub mod pgn;
