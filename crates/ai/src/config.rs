//! Tunables for the decision engine.
//!
//! Every field has a default taken from play-tested values, so an empty
//! config file yields a working engine. With the `serde` feature the whole
//! tree can be loaded from RON (missing fields fall back to defaults).

use crate::error::AiError;

#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AiConfig {
    pub influence: InfluenceConfig,
    pub thresholds: ThresholdConfig,
    pub threat: ThreatConfig,
    pub deploy: DeployConfig,
    pub unit: UnitConfig,
    pub weights: PriorityWeights,
    pub posture: PostureConfig,
    pub resolver: ResolverConfig,
}

impl AiConfig {
    /// Rejects values that would make the engine misbehave silently.
    pub fn validate(&self) -> Result<(), AiError> {
        if !(self.influence.strength.is_finite() && self.influence.strength > 0.0) {
            return Err(AiError::Config(format!(
                "influence.strength must be positive, got {}",
                self.influence.strength
            )));
        }
        let thresholds = [
            ("thresholds.frontier", self.thresholds.frontier),
            ("thresholds.strong_neighbor", self.thresholds.strong_neighbor),
            ("thresholds.no_mans_land", self.thresholds.no_mans_land),
        ];
        for (name, value) in thresholds {
            if !value.is_finite() || value < 0.0 {
                return Err(AiError::Config(format!("{name} must be >= 0, got {value}")));
            }
        }
        let ratios = [
            ("unit.retreat_health", self.unit.retreat_health),
            ("unit.overextend_health", self.unit.overextend_health),
            ("unit.escort_health", self.unit.escort_health),
        ];
        for (name, value) in ratios {
            if !(0.0..=1.0).contains(&value) {
                return Err(AiError::Config(format!("{name} must be in [0, 1], got {value}")));
            }
        }
        if self.resolver.iteration_cap == Some(0) {
            return Err(AiError::Config("resolver.iteration_cap must be positive".into()));
        }
        Ok(())
    }
}

/// Shape of each unit's influence footprint.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct InfluenceConfig {
    /// Manhattan radius of a unit's footprint.
    pub radius: u32,
    /// Contribution at the unit's own cell; decays linearly to zero at `radius`.
    pub strength: f32,
}

impl Default for InfluenceConfig {
    fn default() -> Self {
        Self {
            radius: 4,
            strength: 1.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ThresholdConfig {
    /// Own influence below which a cell counts as frontier.
    pub frontier: f32,
    /// Own influence a neighbor needs for a frontier cell to be worth taking.
    pub strong_neighbor: f32,
    /// Magnitude below which neither faction controls a cell.
    pub no_mans_land: f32,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            frontier: 0.5,
            strong_neighbor: 1.0,
            no_mans_land: 0.25,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ThreatConfig {
    /// Radius sampled around each owned structure.
    pub fort_radius: u32,
    /// Rival units within this distance of an owned structure get attack
    /// waypoints while defending.
    pub defend_radius: u32,
    /// Share of sampled cells that must lean rival for a structure to count
    /// as threatened without a rival standing next to it.
    pub pressure_share: f32,
}

impl Default for ThreatConfig {
    fn default() -> Self {
        Self {
            fort_radius: 4,
            defend_radius: 6,
            pressure_share: 0.5,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DeployConfig {
    /// Hard ceiling on deploy waypoints per plan.
    pub waypoint_cap: usize,
    /// Deploys the executor may issue per turn.
    pub per_turn: usize,
    /// Candidate cells must lie within this distance of an owned structure
    /// or a friendly unit, when the faction has any.
    pub reach: u32,
    /// Below this many units the faction turns defensive while it can pay.
    pub min_army: usize,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            waypoint_cap: 6,
            per_turn: 1,
            reach: 3,
            min_army: 2,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct UnitConfig {
    /// Health ratio at or below which a unit stops advancing.
    pub retreat_health: f32,
    /// Health ratio at or below which a replaceable unit throws itself in.
    pub overextend_health: f32,
    /// Teammates at or below this health ratio are worth escorting.
    pub escort_health: f32,
    /// Teammates farther than this are left alone.
    pub escort_radius: u32,
    /// Bonus score for a strike that kills.
    pub kill_bonus: i32,
}

impl Default for UnitConfig {
    fn default() -> Self {
        Self {
            retreat_health: 0.35,
            overextend_health: 0.15,
            escort_health: 0.5,
            escort_radius: 4,
            kill_bonus: 50,
        }
    }
}

/// Additive terms used when scoring waypoints.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PriorityWeights {
    pub attack_base: i32,
    pub capture_base: i32,
    pub advantage_bonus: i32,
    pub unclaimed_bonus: i32,
    /// Proximity bonus is `max(0, proximity_range - distance)`.
    pub proximity_range: i32,
    /// Added or removed depending on which side holds the target cell.
    pub attack_support: i32,
    pub capture_support: i32,
    pub capture_contested: i32,
    pub move_support: i32,
    /// Removed per rival unit close to a move target.
    pub move_crowding: i32,
    pub deploy_base: i32,
    pub defend_attack: i32,
    pub defend_move_base: i32,
}

impl Default for PriorityWeights {
    fn default() -> Self {
        Self {
            attack_base: 10,
            capture_base: 12,
            advantage_bonus: 5,
            unclaimed_bonus: 5,
            proximity_range: 5,
            attack_support: 4,
            capture_support: 3,
            capture_contested: 5,
            move_support: 3,
            move_crowding: 2,
            deploy_base: 30,
            defend_attack: 80,
            defend_move_base: 100,
        }
    }
}

/// Biases applied while a posture is active.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PostureConfig {
    /// Added to attack waypoints while offensive.
    pub offensive_aggression: i32,
    /// Added to move waypoints while defensive.
    pub defensive_caution: i32,
}

impl Default for PostureConfig {
    fn default() -> Self {
        Self {
            offensive_aggression: 5,
            defensive_caution: 5,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ResolverConfig {
    /// Overrides the per-tree default derived from tree shape.
    pub iteration_cap: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert!(AiConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_out_of_range_ratio() {
        let mut config = AiConfig::default();
        config.unit.retreat_health = 1.5;
        assert!(matches!(config.validate(), Err(AiError::Config(_))));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn partial_ron_keeps_defaults() {
        let config: AiConfig =
            ron::from_str("(influence: (radius: 6), deploy: (per_turn: 2))").unwrap();
        assert_eq!(config.influence.radius, 6);
        assert_eq!(config.influence.strength, 1.0);
        assert_eq!(config.deploy.per_turn, 2);
        assert_eq!(config.weights, PriorityWeights::default());
    }
}
