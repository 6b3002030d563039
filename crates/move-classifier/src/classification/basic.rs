//! Rules that need no engine: forced moves, book moves and mates.

use shakmaty::Position;

use super::Classification;
use crate::book_cache::OpeningBook;
use crate::extraction::StateNode;

/// A label settled by the basic rules, with the opening name for book moves.
#[derive(Debug, Clone, PartialEq)]
pub struct BasicVerdict {
    pub classification: Classification,
    pub opening: Option<String>,
}

impl BasicVerdict {
    fn plain(classification: Classification) -> Self {
        Self {
            classification,
            opening: None,
        }
    }
}

/// First matching rule wins: forced, then theory, then checkmate.
pub fn classify_basic(parent: &StateNode, node: &StateNode, book: Option<&OpeningBook>) -> Option<BasicVerdict> {
    if parent.position.legal_moves().len() <= 1 {
        return Some(BasicVerdict::plain(Classification::Forced));
    }

    if let Some(name) = book.and_then(|book| book.lookup(node.position.board())) {
        return Some(BasicVerdict {
            classification: Classification::Theory,
            opening: Some(name.to_string()),
        });
    }

    if node.position.is_checkmate() {
        return Some(BasicVerdict::plain(Classification::Best));
    }

    None
}
