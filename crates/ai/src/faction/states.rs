//! Node payloads of the faction strategy tree.

use skirmish_core::BoardQuery;
use state_tree::{Lifecycle, Scope, State, Transition};

use super::{
    CAPTURE_FOCUS, DEFENSIVE, DEPLOY_FOCUS, FORT_FOCUS, KILL_FOCUS, OFFENSIVE, Posture, aggression,
    caution, choose_posture, defensive_focus, offensive_focus,
};
use crate::context::FactionContext;
use crate::generator::WaypointGenerator;
use crate::waypoint::Waypoint;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FactionState {
    Root,
    Defensive { caution: i32 },
    Offensive { aggression: i32 },
    DeployFocus,
    FortFocus,
    KillFocus,
    CaptureFocus,
}

impl FactionState {
    /// Waypoints published while this node is the active leaf. Folders
    /// publish nothing.
    pub fn waypoints<B: BoardQuery>(
        &self,
        ctx: &FactionContext<'_, B>,
        posture: Posture,
    ) -> Vec<Waypoint> {
        let generator = WaypointGenerator::new(ctx, posture);
        match self {
            Self::Root | Self::Defensive { .. } | Self::Offensive { .. } => Vec::new(),
            Self::DeployFocus => {
                let mut waypoints = generator.deploy_candidates();
                waypoints.extend(generator.attack_candidates());
                waypoints
            }
            Self::FortFocus => generator.defense_candidates(&ctx.threats()),
            Self::KillFocus => generator.kill_candidates(),
            Self::CaptureFocus => generator.generate().as_slice().to_vec(),
        }
    }

    /// Name of the folder a leaf lives under.
    fn posture(&self) -> Option<&'static str> {
        match self {
            Self::DeployFocus | Self::FortFocus => Some(DEFENSIVE),
            Self::KillFocus | Self::CaptureFocus => Some(OFFENSIVE),
            Self::Root | Self::Defensive { .. } | Self::Offensive { .. } => None,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Root => super::ROOT,
            Self::Defensive { .. } => DEFENSIVE,
            Self::Offensive { .. } => OFFENSIVE,
            Self::DeployFocus => DEPLOY_FOCUS,
            Self::FortFocus => FORT_FOCUS,
            Self::KillFocus => KILL_FOCUS,
            Self::CaptureFocus => CAPTURE_FOCUS,
        }
    }
}

impl Lifecycle<Posture> for FactionState {
    fn enter(&mut self, scope: &mut Scope<'_, Posture>) {
        match *self {
            Self::Defensive { caution: value } => scope.temporary_change(caution, value),
            Self::Offensive { aggression: value } => scope.temporary_change(aggression, value),
            _ => {}
        }
    }
}

impl<'a, B: BoardQuery> State<FactionContext<'a, B>, Posture> for FactionState {
    fn try_transition(
        &mut self,
        ctx: &FactionContext<'a, B>,
        _posture: &Posture,
    ) -> Option<Transition> {
        let posture = choose_posture(ctx);
        let focus = |posture: &str| {
            if posture == DEFENSIVE {
                defensive_focus(ctx)
            } else {
                offensive_focus(ctx)
            }
        };
        match self {
            Self::Root => Some(Transition::Child(posture)),
            Self::Defensive { .. } | Self::Offensive { .. } => {
                if posture != self.name() {
                    Some(Transition::Sibling(posture))
                } else {
                    Some(Transition::Child(focus(posture)))
                }
            }
            _ => {
                if self.posture() != Some(posture) {
                    Some(Transition::Parent)
                } else if focus(posture) != self.name() {
                    Some(Transition::Sibling(focus(posture)))
                } else {
                    None
                }
            }
        }
    }
}
