//! Enemy behaviour controller
//!
//! A fixed, hand-authored state machine for a single enemy: patrol a cyclic
//! path, engage a visible target, chase where it was last seen, sweep around
//! to reacquire it, then walk back to where the chase began.
//!
//! # Priority
//!
//! Each tick runs exactly one branch, picked in this order:
//!
//! 1. **Engaging** - a target is visible
//! 2. **Alerting** - the target was visible last tick and is gone now
//! 3. **Spinning** - sweeping around a reached sighting
//! 4. **Chasing** - walking to the most recent sighting
//! 5. **Returning** - walking back to the return point
//! 6. **Patrolling** - turning toward, then walking to, the next waypoint
//!
//! Perception is checked before the stored behaviour, so engaging preempts
//! every other branch. Alerting is the one-tick exit out of engaging.
//!
//! # Example
//!
//! ```ignore
//! let config = EnemyConfig::new(vec![Vec2::ZERO, Vec2::new(10.0, 0.0)]);
//! let mut enemy = EnemyController::spawn(config, &mut body)?;
//!
//! let mut ctx = EnemyContext {
//!     probe: &probe,
//!     body: &mut body,
//!     weapon: &mut weapon,
//! };
//! let branch = enemy.tick(1, &mut ctx);
//! ```

use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::motion::{
    FireAction, MotionDriver, SpinSweep, TurnProgress, full_spin_updates, signed_angle,
    step_towards, turn_direction,
};
use super::perception::PerceptionProbe;
use super::sighting::{Sighting, SightingStack};
use crate::core::{ConfigError, EnemyConfig, SPEED_MULTIPLIER};

// ============================================================================
// Collaborators
// ============================================================================

/// External collaborators the controller talks to during a tick.
pub struct EnemyContext<'a> {
    /// Finds visible targets
    pub probe: &'a dyn PerceptionProbe,
    /// The actor's transform and animation flag
    pub body: &'a mut dyn MotionDriver,
    /// Fires at an engaged target
    pub weapon: &'a mut dyn FireAction,
}

/// Something a freeze power-up can stop in place.
pub trait Freezable {
    /// Stop moving and firing
    fn freeze(&mut self);

    /// Restore movement and firing
    fn unfreeze(&mut self);

    /// Whether the actor is currently frozen
    fn is_frozen(&self) -> bool;
}

// ============================================================================
// Behaviour
// ============================================================================

/// Which branch of the state machine ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BehaviourKind {
    Engaging,
    Alerting,
    Spinning,
    Chasing,
    Returning,
    Patrolling,
}

impl BehaviourKind {
    /// Name for logging
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Engaging => "Engaging",
            Self::Alerting => "Alerting",
            Self::Spinning => "Spinning",
            Self::Chasing => "Chasing",
            Self::Returning => "Returning",
            Self::Patrolling => "Patrolling",
        }
    }
}

impl fmt::Display for BehaviourKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Patrol sub-phase
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PatrolPhase {
    /// Turning to face the next waypoint
    Turning(TurnProgress),
    /// Walking to the next waypoint
    Walking,
}

/// Persisted behaviour between ticks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Behaviour {
    /// Following the patrol path
    Patrolling(PatrolPhase),
    /// Tracking and firing at a visible target
    Engaging {
        /// Target position this tick
        target: Vec2,
        /// Vector from us to the target this tick
        bearing: Vec2,
        /// Turn toward the target
        turn: TurnProgress,
    },
    /// Sweeping around the top sighting
    Spinning(SpinSweep),
    /// Walking to the top sighting
    Chasing,
    /// Walking back to the return point
    Returning,
}

// ============================================================================
// Controller
// ============================================================================

/// Per-enemy behaviour state machine.
#[derive(Debug, Clone)]
pub struct EnemyController {
    path: Vec<Vec2>,
    next_point: usize,
    target_tag: String,

    default_speed: f32,
    chase_speed: f32,
    current_speed: f32,

    turn_speed: f32,
    spin_speed: f32,
    full_spin_updates: u32,

    behaviour: Behaviour,
    last_branch: BehaviourKind,
    sightings: SightingStack,
    /// Signed change in bearing to the target over the last engaged tick
    turn_delta: f32,
    /// Where the current chase episode started
    return_point: Vec2,

    frozen: bool,
}

impl EnemyController {
    /// Create a controller from a validated config.
    ///
    /// The first behaviour is a patrol turn toward the second waypoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the config fails [`EnemyConfig::validate`]
    pub fn new(config: EnemyConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let default_speed = config.speed * SPEED_MULTIPLIER;
        let next_point = 1 % config.path.len();

        Ok(Self {
            next_point,
            target_tag: config.target_tag,
            default_speed,
            chase_speed: config.chase_speed * SPEED_MULTIPLIER,
            current_speed: default_speed,
            turn_speed: config.turn_speed,
            spin_speed: config.spin_speed,
            full_spin_updates: full_spin_updates(config.spin_speed),
            behaviour: Behaviour::Patrolling(PatrolPhase::Turning(TurnProgress::begin(0.0))),
            last_branch: BehaviourKind::Patrolling,
            sightings: SightingStack::new(),
            turn_delta: 0.0,
            return_point: config.path[0],
            frozen: false,
            path: config.path,
        })
    }

    /// Create a controller and place `body` on the first waypoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the config fails [`EnemyConfig::validate`]
    pub fn spawn(config: EnemyConfig, body: &mut dyn MotionDriver) -> Result<Self, ConfigError> {
        let mut controller = Self::new(config)?;
        body.set_position(controller.path[0]);
        controller.behaviour =
            Behaviour::Patrolling(PatrolPhase::Turning(TurnProgress::begin(body.rotation())));
        Ok(controller)
    }

    /// Run `dt_ticks` fixed steps.
    ///
    /// Returns the branch taken by the last step, or the previous branch if
    /// `dt_ticks` is zero.
    pub fn tick(&mut self, dt_ticks: u32, ctx: &mut EnemyContext<'_>) -> BehaviourKind {
        for _ in 0..dt_ticks {
            self.step(ctx);
        }
        self.last_branch
    }

    /// Run one fixed step and return the branch taken.
    pub fn step(&mut self, ctx: &mut EnemyContext<'_>) -> BehaviourKind {
        ctx.body.set_walking(false);

        let origin = ctx.body.position();
        let found = ctx.probe.find(&self.target_tag, origin, ctx.body.facing());

        let current = self.behaviour;
        let (branch, next) = match (found, current) {
            (Some(target), _) => (BehaviourKind::Engaging, self.engage(target, current, ctx)),
            (None, Behaviour::Engaging { target, .. }) => {
                (BehaviourKind::Alerting, self.alert(target, ctx))
            }
            (None, Behaviour::Spinning(sweep)) => (BehaviourKind::Spinning, self.spin(sweep, ctx)),
            (None, Behaviour::Chasing) => (BehaviourKind::Chasing, self.chase(ctx)),
            (None, Behaviour::Returning) => (BehaviourKind::Returning, self.return_to_post(ctx)),
            (None, Behaviour::Patrolling(phase)) => {
                (BehaviourKind::Patrolling, self.patrol(phase, ctx))
            }
        };

        if branch != self.last_branch {
            log::debug!("enemy behaviour {} -> {}", self.last_branch, branch);
        }
        log::trace!(
            "enemy step {branch} at {:?}, {} sighting(s)",
            ctx.body.position(),
            self.sightings.len()
        );

        self.behaviour = next;
        self.last_branch = branch;
        branch
    }

    // ------------------------------------------------------------------------
    // Transitions
    // ------------------------------------------------------------------------

    fn engage(&mut self, target: Vec2, current: Behaviour, ctx: &mut EnemyContext<'_>) -> Behaviour {
        let origin = ctx.body.position();
        let bearing = target - origin;

        let mut turn = match current {
            Behaviour::Engaging {
                bearing: previous,
                turn,
                ..
            } => {
                self.turn_delta = signed_angle(previous, bearing);
                turn
            }
            _ => {
                log::debug!("enemy spotted target at {target:?}");
                self.turn_delta = 0.0;
                TurnProgress::begin(ctx.body.rotation())
            }
        };

        turn.step(ctx.body, target, self.turn_speed);

        if !self.frozen {
            ctx.weapon.fire(origin, ctx.body.facing());
        }

        Behaviour::Engaging {
            target,
            bearing,
            turn,
        }
    }

    fn alert(&mut self, last_seen: Vec2, ctx: &mut EnemyContext<'_>) -> Behaviour {
        if self.sightings.is_empty() {
            self.return_point = ctx.body.position();
        }

        let sighting = Sighting::new(last_seen, turn_direction(self.turn_delta));
        log::debug!(
            "enemy lost target at {:?}, spin direction {}, depth {}",
            sighting.location,
            sighting.direction,
            self.sightings.len() + 1
        );
        self.sightings.push(sighting);

        Behaviour::Chasing
    }

    fn spin(&mut self, mut sweep: SpinSweep, ctx: &mut EnemyContext<'_>) -> Behaviour {
        let Some(&sighting) = self.sightings.peek() else {
            log::warn!("enemy spinning without a sighting, returning to post");
            return Behaviour::Returning;
        };

        if !sweep.step(
            ctx.body,
            sighting.direction,
            self.spin_speed,
            self.full_spin_updates,
        ) {
            return Behaviour::Spinning(sweep);
        }

        self.sightings.pop();
        log::debug!("enemy finished sweep, {} sighting(s) left", self.sightings.len());

        if self.sightings.is_empty() {
            Behaviour::Returning
        } else {
            Behaviour::Chasing
        }
    }

    fn chase(&mut self, ctx: &mut EnemyContext<'_>) -> Behaviour {
        let Some(&sighting) = self.sightings.peek() else {
            log::warn!("enemy chasing without a sighting, returning to post");
            return Behaviour::Returning;
        };

        if !self.frozen {
            self.current_speed = self.chase_speed;
        }

        if step_towards(ctx.body, sighting.location, self.current_speed) {
            Behaviour::Spinning(SpinSweep::begin())
        } else {
            Behaviour::Chasing
        }
    }

    fn return_to_post(&mut self, ctx: &mut EnemyContext<'_>) -> Behaviour {
        if !self.frozen {
            self.current_speed = self.default_speed;
        }

        if step_towards(ctx.body, self.return_point, self.current_speed) {
            log::debug!("enemy back at {:?}, resuming patrol", self.return_point);
            Behaviour::Patrolling(PatrolPhase::Walking)
        } else {
            Behaviour::Returning
        }
    }

    fn patrol(&mut self, phase: PatrolPhase, ctx: &mut EnemyContext<'_>) -> Behaviour {
        match phase {
            PatrolPhase::Walking => {
                let waypoint = self.path[self.next_point];
                if !step_towards(ctx.body, waypoint, self.current_speed) {
                    return Behaviour::Patrolling(PatrolPhase::Walking);
                }

                self.next_point = (self.next_point + 1) % self.path.len();
                let turn = TurnProgress::begin(ctx.body.rotation());
                Behaviour::Patrolling(PatrolPhase::Turning(turn))
            }
            PatrolPhase::Turning(mut turn) => {
                let waypoint = self.path[self.next_point];
                if turn.step(ctx.body, waypoint, self.turn_speed) {
                    Behaviour::Patrolling(PatrolPhase::Walking)
                } else {
                    Behaviour::Patrolling(PatrolPhase::Turning(turn))
                }
            }
        }
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    /// Stored behaviour
    #[must_use]
    pub fn behaviour(&self) -> &Behaviour {
        &self.behaviour
    }

    /// Branch taken by the most recent step
    #[must_use]
    pub fn last_branch(&self) -> BehaviourKind {
        self.last_branch
    }

    /// Pending sightings, oldest first
    #[must_use]
    pub fn sightings(&self) -> &SightingStack {
        &self.sightings
    }

    /// Index of the waypoint currently being approached
    #[must_use]
    pub fn next_point(&self) -> usize {
        self.next_point
    }

    /// Where the enemy returns once every sighting has been searched
    #[must_use]
    pub fn return_point(&self) -> Vec2 {
        self.return_point
    }

    /// Whether the enemy is walking back to its return point
    #[must_use]
    pub fn is_returning(&self) -> bool {
        matches!(self.behaviour, Behaviour::Returning)
    }

    /// Whether a target was visible on the last step
    #[must_use]
    pub fn sees_target(&self) -> bool {
        matches!(self.behaviour, Behaviour::Engaging { .. })
    }

    /// Movement per tick right now
    #[must_use]
    pub fn current_speed(&self) -> f32 {
        self.current_speed
    }

    /// Patrol movement per tick
    #[must_use]
    pub fn default_speed(&self) -> f32 {
        self.default_speed
    }

    /// Chase movement per tick
    #[must_use]
    pub fn chase_speed(&self) -> f32 {
        self.chase_speed
    }

    /// Ticks in one full search sweep
    #[must_use]
    pub fn full_spin_updates(&self) -> u32 {
        self.full_spin_updates
    }
}

impl Freezable for EnemyController {
    fn freeze(&mut self) {
        if self.frozen {
            return;
        }
        log::debug!("enemy frozen");
        self.frozen = true;
        self.current_speed = 0.0;
    }

    fn unfreeze(&mut self) {
        if !self.frozen {
            return;
        }
        log::debug!("enemy unfrozen");
        self.frozen = false;
        self.current_speed = self.default_speed;
    }

    fn is_frozen(&self) -> bool {
        self.frozen
    }
}
