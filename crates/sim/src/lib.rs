//! Headless skirmish runner.
//!
//! Builds a demo board, pits two decision engines against each other and
//! reports the outcome through `tracing`. Holds no game logic of its own.

pub mod config;
pub mod scenario;

pub use config::SimConfig;
pub use scenario::{MatchSummary, demo_board, run_match};
