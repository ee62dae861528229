//! AI-versus-AI skirmish binary.
//!
//! ```bash
//! SKIRMISH_TURNS=60 RUST_LOG=skirmish_ai=debug cargo run -p skirmish-sim
//! ```

use anyhow::Result;
use skirmish_core::{BoardQuery, Faction};
use skirmish_sim::{SimConfig, demo_board, run_match};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    setup_logging();

    let config = SimConfig::from_env();
    let ai = config.load_ai_config()?;
    tracing::info!(
        turns = config.turns,
        width = config.width,
        height = config.height,
        ai_config = ?config.ai_config,
        "starting skirmish"
    );

    let mut board = demo_board(config.shape())?;
    let summary = run_match(&mut board, &ai, config.turns)?;

    for faction in Faction::ALL {
        let structures = board
            .structures()
            .iter()
            .filter(|structure| structure.is_owned_by(faction))
            .count();
        tracing::info!(
            %faction,
            units = board.units_of(faction).count(),
            structures,
            mana = board.mana(faction).total(),
            "final standing"
        );
    }
    tracing::info!(
        turns = summary.turns_played,
        winner = ?summary.winner,
        actions = summary.actions,
        kills = summary.kills,
        captures = summary.captures,
        failures = summary.failures,
        "skirmish finished"
    );
    Ok(())
}

/// Logs to stderr; `RUST_LOG` overrides the `info` default.
fn setup_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
