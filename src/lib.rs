pub mod bitboard;
pub mod board;
pub mod game;
#[cfg(feature = "cli")]
pub mod logger;
pub mod moves;
pub mod search;
pub mod square;
pub mod tables;
