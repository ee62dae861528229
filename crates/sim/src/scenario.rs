//! Demo battlefield and the match loop.

use anyhow::Result;
use skirmish_ai::{AiConfig, DecisionEngine, TurnReport};
use skirmish_core::{
    Board, BoardBuilder, BoardEvent, BoardQuery, Element, Faction, GameError, GridShape, Mana,
    MoveCost, Position, Tile, UnitTemplate,
};
use tracing::{info, warn};

/// Slow ground that burns whoever stops on it.
const EMBERS: Tile = Tile::new(MoveCost::Cost(2)).with_entry_damage(10);

/// Two structures, a short wall at the center, a strip of burning ground in
/// the lower half, and two units per faction in opposite corners.
pub fn demo_board(shape: GridShape) -> Result<Board> {
    let (w, h) = (shape.width as i32, shape.height as i32);
    let mut board = BoardBuilder::new(shape)
        .paint(EMBERS, |cell| cell.y >= h * 7 / 10 && cell.x >= w / 4 && cell.x < w * 3 / 4)
        .paint(Tile::WALL, |cell| cell.x == w / 2 && (h / 2 - 1..=h / 2).contains(&cell.y))
        .structure(Position::new(w / 5, h / 3))
        .structure(Position::new(w - 1 - w / 5, h - 1 - h / 3))
        .template(UnitTemplate::new("ember", Element::Fire, 1))
        .template(UnitTemplate::new("tide", Element::Water, 1).with_stats(120, 40, 4))
        .template(
            UnitTemplate::new("sprout", Element::Plant, 1)
                .with_stats(80, 40, 3)
                .with_damage_area([Position::new(-1, -1), Position::new(0, -1), Position::new(1, -1)]),
        )
        .mana(Faction::A, Mana::new(2, 2, 2))
        .mana(Faction::B, Mana::new(2, 2, 2))
        .build();

    for (owner, template, cell) in [
        (Faction::A, "ember", Position::new(1, 1)),
        (Faction::A, "tide", Position::new(1, h - 2)),
        (Faction::B, "ember", Position::new(w - 2, 1)),
        (Faction::B, "sprout", Position::new(w - 2, h - 2)),
    ] {
        board.spawn(owner, template, cell)?;
    }
    Ok(board)
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MatchSummary {
    pub turns_played: u32,
    /// Faction left standing, if the other one was wiped out.
    pub winner: Option<Faction>,
    pub actions: usize,
    pub kills: usize,
    pub captures: usize,
    /// Recovered failures across both engines.
    pub failures: usize,
}

/// Plays up to `turns` turns, forwarding each turn's events to the idle
/// engine. Stops early once a faction has no units and cannot deploy.
pub fn run_match(board: &mut Board, config: &AiConfig, turns: u32) -> Result<MatchSummary> {
    let mut engines = [
        DecisionEngine::new(Faction::A, board.shape(), config.clone())?,
        DecisionEngine::new(Faction::B, board.shape(), config.clone())?,
    ];
    let mut summary = MatchSummary::default();

    for _ in 0..turns {
        let mover = usize::from(board.active_faction() == Faction::B);
        let report = engines[mover].play_turn(board);
        for event in &report.events {
            engines[1 - mover].on_event(&*board, event);
        }
        tally(&mut summary, &report);
        summary.turns_played += 1;

        if let Some(loser) = Faction::ALL
            .into_iter()
            .find(|faction| board.units_of(*faction).next().is_none() && !board.can_field_unit(*faction))
        {
            summary.winner = Some(loser.rival());
            info!(winner = %loser.rival(), turn = board.turn(), "match decided");
            break;
        }
    }
    Ok(summary)
}

fn tally(summary: &mut MatchSummary, report: &TurnReport) {
    summary.actions += report.actions.len();
    summary.kills += report.kills();
    summary.captures += report
        .events
        .iter()
        .filter(|event| matches!(event, BoardEvent::StructureCaptured { .. }))
        .count();
    summary.failures += report.failures.len();
    for failure in &report.failures {
        warn!(
            faction = %report.faction,
            turn = report.turn,
            code = failure.error_code(),
            severity = failure.severity().as_str(),
            "{failure}"
        );
    }
}
