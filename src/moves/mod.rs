pub mod generate;
pub mod magic;
pub mod movegen;
pub mod perft;
pub mod types;
