pub mod board;
pub mod eval;
pub mod game;
pub mod pgn;
