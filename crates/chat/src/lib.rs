//! `palengke-chat` — per-product message threads.

pub mod board;

pub use board::{ChatBoard, ChatMessage};
