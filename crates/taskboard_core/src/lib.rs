pub mod board;
pub mod config;
pub mod error;
pub mod input;
pub mod model;
pub mod scheduler;
pub mod stats;
pub mod storage;

pub use board::{BoardOptions, BoardView, Completion, TaskBoard};
