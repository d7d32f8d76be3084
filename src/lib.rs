#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]

pub mod attack_lines;
pub mod board;
pub mod color;
pub mod description;
pub mod end_state;
pub mod error;
mod execute;
pub mod fen;
pub mod fuzz;
pub mod game;
pub mod memento;
pub mod movegen;
pub mod moves;
pub mod piece;
pub mod square;
