/// Board utility functions for tactical analysis
///
/// Everything here works on a bare `Board` so that pieces can be lifted,
/// moved and recoloured freely. `Chess` positions are only built where
/// real move legality is needed.

use shakmaty::{
    Bitboard, Board, CastlingMode, Chess, Color, File, FromSetup, Move, Piece, Position,
    PositionError, Role, Setup, Square,
};

// Piece values for exchange calculations
pub const PAWN_VALUE: i32 = 1;
pub const KNIGHT_VALUE: i32 = 3;
pub const BISHOP_VALUE: i32 = 3;
pub const ROOK_VALUE: i32 = 5;
pub const QUEEN_VALUE: i32 = 9;
/// Kings can never be traded, so they outrank everything
pub const KING_VALUE: i32 = 99;

pub fn piece_value(role: Role) -> i32 {
    match role {
        Role::Pawn => PAWN_VALUE,
        Role::Knight => KNIGHT_VALUE,
        Role::Bishop => BISHOP_VALUE,
        Role::Rook => ROOK_VALUE,
        Role::Queen => QUEEN_VALUE,
        Role::King => KING_VALUE,
    }
}

/// A piece on a specific square. Derived on demand, never cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoardPiece {
    pub square: Square,
    pub role: Role,
    pub color: Color,
}

impl BoardPiece {
    pub fn value(&self) -> i32 {
        piece_value(self.role)
    }

    pub fn piece(&self) -> Piece {
        Piece {
            color: self.color,
            role: self.role,
        }
    }
}

/// A move on a bare board, without legality or turn bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoardMove {
    pub color: Color,
    pub role: Role,
    pub from: Square,
    pub to: Square,
    pub capture: Option<Role>,
    pub promotion: Option<Role>,
}

impl BoardMove {
    /// Convert a legal move played by `color`. Castling becomes the king's step.
    pub fn from_move(mv: &Move, color: Color) -> Option<BoardMove> {
        let from = mv.from()?;
        let to = match mv {
            Move::Castle { king, rook } => {
                let file = if rook.file() > king.file() { File::G } else { File::C };
                Square::from_coords(file, king.rank())
            }
            _ => mv.to(),
        };
        Some(BoardMove {
            color,
            role: mv.role(),
            from,
            to,
            capture: mv.capture(),
            promotion: mv.promotion(),
        })
    }

    /// The piece standing on `to` once the move is made.
    pub fn landed_piece(&self) -> BoardPiece {
        BoardPiece {
            square: self.to,
            role: self.promotion.unwrap_or(self.role),
            color: self.color,
        }
    }

    /// Same mover, squares and piece type; capture details ignored.
    pub fn same_attack(&self, other: &BoardMove) -> bool {
        self.from == other.from && self.to == other.to && self.role == other.role
    }
}

pub fn piece_at(board: &Board, square: Square) -> Option<BoardPiece> {
    board.piece_at(square).map(|p| BoardPiece {
        square,
        role: p.role,
        color: p.color,
    })
}

/// All pieces of one color
pub fn pieces_of(board: &Board, color: Color) -> Vec<BoardPiece> {
    board
        .by_color(color)
        .into_iter()
        .filter_map(|sq| piece_at(board, sq))
        .collect()
}

/// Copy of `board` with the move made: the mover is lifted from `from`
/// and replaces whatever stood on `to`.
pub fn apply_move(board: &Board, mv: &BoardMove) -> Board {
    let mut next = board.clone();
    next.remove_piece_at(mv.from);
    next.remove_piece_at(mv.to);
    next.set_piece_at(mv.to, mv.landed_piece().piece());
    next
}

/// Is `color`'s king attacked on this board?
pub fn king_attacked(board: &Board, color: Color) -> bool {
    match board.king_of(color) {
        Some(king) => board.attacks_to(king, !color, board.occupied()).any(),
        None => false,
    }
}

/// Build a playable position from a bare board with `turn` to move.
/// Castling and en passant rights are dropped. Returns None when the
/// board cannot be a legal position with that side to move (e.g. the
/// other king is in check).
pub fn with_turn(board: &Board, turn: Color) -> Option<Chess> {
    let mut setup = Setup::empty();
    setup.board = board.clone();
    setup.turn = turn;
    Chess::from_setup(setup, CastlingMode::Standard)
        .or_else(PositionError::ignore_impossible_check)
        .ok()
}

/// Can the side to move deliver checkmate immediately?
pub fn has_mate_in_one(pos: &Chess) -> bool {
    pos.legal_moves().iter().any(|mv| {
        let mut next = pos.clone();
        next.play_unchecked(*mv);
        next.is_checkmate()
    })
}

/// Squares the piece on `square` could move to, ignoring whose turn it is,
/// that do not leave its own king attacked.
pub fn pseudo_legal_destinations(board: &Board, piece: &BoardPiece) -> Vec<BoardMove> {
    let own = board.by_color(piece.color);
    let targets: Bitboard = board.attacks_from(piece.square) & !own;

    targets
        .into_iter()
        .map(|to| BoardMove {
            color: piece.color,
            role: piece.role,
            from: piece.square,
            to,
            capture: board.piece_at(to).map(|p| p.role),
            promotion: None,
        })
        .filter(|mv| !king_attacked(&apply_move(board, mv), piece.color))
        .collect()
}
