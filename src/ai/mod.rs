//! Enemy AI module
//!
//! Provides the enemy behaviour state machine, its motion primitives, and the
//! perception it uses to find targets.

mod enemy;
mod motion;
mod perception;
mod sighting;

pub use enemy::{Behaviour, BehaviourKind, EnemyContext, EnemyController, Freezable, PatrolPhase};
pub use motion::{
    ARRIVAL_EPSILON, FireAction, MotionDriver, SpinSweep, TurnProgress, bearing_degrees,
    facing_from_degrees, full_spin_updates, move_towards, signed_angle, step_towards,
    turn_direction, wrap_degrees,
};
pub use perception::{Blind, Grid, PerceptionProbe, SightProbe, SightTarget, VisionConfig};
pub use sighting::{Sighting, SightingStack};
