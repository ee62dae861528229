//! Decision engine for two-faction elemental skirmishes.
//!
//! The engine turns a [`BoardQuery`](skirmish_core::BoardQuery) snapshot
//! into prioritized [`Waypoint`]s and per-unit [`PrimitiveAction`]s:
//!
//! - [`InfluenceField`] measures who controls which cells,
//! - [`Navigator`] answers reachability and pathing under move budgets,
//! - the faction [`StrategyTree`] picks a posture and publishes waypoints,
//! - one unit [`BehaviorTree`] per unit turns waypoints into primitives,
//! - [`DecisionEngine`] runs the cycle and applies the result through
//!   [`BoardCommands`](skirmish_core::BoardCommands).
//!
//! Everything is synchronous and single-threaded. Tunables live in
//! [`AiConfig`].

pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod executor;
pub mod faction;
pub mod generator;
pub mod influence;
pub mod navigator;
pub mod threat;
pub mod unit;
pub mod waypoint;

pub use config::AiConfig;
pub use context::FactionContext;
pub use engine::{DecisionEngine, TurnReport};
pub use error::AiError;
pub use executor::{PrimitiveAction, apply};
pub use faction::{FactionState, Posture, StrategyTree, strategy_tree};
pub use generator::WaypointGenerator;
pub use influence::InfluenceField;
pub use navigator::Navigator;
pub use threat::StructureThreat;
pub use unit::{BehaviorTree, Directives, UnitContext, UnitState, behavior_tree};
pub use waypoint::{Waypoint, WaypointKind, WaypointSet};
