//! Motion primitives for 2D actors
//!
//! Provides the move/turn/spin building blocks used by the enemy controller
//! and the traits through which it drives an actor's transform.
//!
//! Rotations are in degrees about +Z. A rotation of 0 faces +X and positive
//! angles turn counter-clockwise.

use glam::Vec2;

/// Remaining distance under which a move counts as arrived.
pub const ARRIVAL_EPSILON: f32 = 1e-4;

// ============================================================================
// Collaborator traits
// ============================================================================

/// Moves and rotates an actor's transform.
pub trait MotionDriver {
    /// Current world position
    fn position(&self) -> Vec2;

    /// Teleport to a world position
    fn set_position(&mut self, position: Vec2);

    /// Current rotation in degrees
    fn rotation(&self) -> f32;

    /// Set rotation in degrees
    fn set_rotation(&mut self, degrees: f32);

    /// Set the walking animation flag
    fn set_walking(&mut self, walking: bool);

    /// Unit vector the actor is facing
    fn facing(&self) -> Vec2 {
        facing_from_degrees(self.rotation())
    }
}

/// Triggers a projectile or attack effect.
pub trait FireAction {
    /// Fire from `origin` along `direction`
    fn fire(&mut self, origin: Vec2, direction: Vec2);
}

// ============================================================================
// Angle helpers
// ============================================================================

/// Wrap an angle into `[-180, 180)`.
#[must_use]
pub fn wrap_degrees(degrees: f32) -> f32 {
    (degrees + 180.0).rem_euclid(360.0) - 180.0
}

/// Unit facing vector for a rotation in degrees.
#[must_use]
pub fn facing_from_degrees(degrees: f32) -> Vec2 {
    Vec2::from_angle(degrees.to_radians())
}

/// Bearing in degrees from `from` toward `to`.
///
/// Returns 0 when both points coincide.
#[must_use]
pub fn bearing_degrees(from: Vec2, to: Vec2) -> f32 {
    let delta = to - from;
    delta.y.atan2(delta.x).to_degrees()
}

/// Signed angle in degrees from `from` to `to` (counter-clockwise positive).
#[must_use]
pub fn signed_angle(from: Vec2, to: Vec2) -> f32 {
    if from == Vec2::ZERO || to == Vec2::ZERO {
        return 0.0;
    }
    from.perp_dot(to).atan2(from.dot(to)).to_degrees()
}

/// Sign of a turn delta as a spin direction. Zero counts as positive.
#[must_use]
pub fn turn_direction(delta: f32) -> i32 {
    if delta < 0.0 { -1 } else { 1 }
}

// ============================================================================
// Move
// ============================================================================

/// Step `current` toward `destination` by at most `max_step`.
#[must_use]
pub fn move_towards(current: Vec2, destination: Vec2, max_step: f32) -> Vec2 {
    let to_target = destination - current;
    let distance = to_target.length();

    if distance <= max_step || distance == 0.0 {
        return destination;
    }

    current + to_target / distance * max_step
}

/// Move the driver one tick toward `destination` at `speed` units per tick.
///
/// Returns `true` once the destination has been reached. On arrival the
/// position is snapped exactly onto the destination.
pub fn step_towards(body: &mut dyn MotionDriver, destination: Vec2, speed: f32) -> bool {
    body.set_walking(true);

    let next = move_towards(body.position(), destination, speed);
    if next.distance(destination) <= ARRIVAL_EPSILON {
        body.set_position(destination);
        return true;
    }

    body.set_position(next);
    false
}

// ============================================================================
// Turn
// ============================================================================

/// A turn toward a destination bearing, completed after a fixed tick count.
///
/// The interpolation parameter is `turn_speed * updates`, so `turn_speed`
/// is the fraction of the turn covered per tick regardless of the angle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TurnProgress {
    /// Rotation when the turn began
    pub start_rotation: f32,
    /// Ticks spent turning so far
    pub updates: u32,
}

impl TurnProgress {
    /// Begin a turn from the given rotation
    #[must_use]
    pub fn begin(start_rotation: f32) -> Self {
        Self {
            start_rotation,
            updates: 0,
        }
    }

    /// Advance one tick toward `destination`.
    ///
    /// Returns `true` when the turn has completed.
    pub fn step(&mut self, body: &mut dyn MotionDriver, destination: Vec2, turn_speed: f32) -> bool {
        self.updates += 1;
        let progress = turn_speed * self.updates as f32;

        let target = bearing_degrees(body.position(), destination);
        let arc = wrap_degrees(target - self.start_rotation);
        let rotation = self.start_rotation + arc * progress.clamp(0.0, 1.0);
        body.set_rotation(wrap_degrees(rotation));

        progress >= 1.0
    }
}

// ============================================================================
// Spin
// ============================================================================

/// A full-revolution search sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpinSweep {
    /// Ticks spent spinning so far
    pub updates: u32,
}

impl SpinSweep {
    /// Start a new sweep
    #[must_use]
    pub fn begin() -> Self {
        Self { updates: 0 }
    }

    /// Rotate one increment of `spin_speed` degrees in `direction`.
    ///
    /// Returns `true` once `full_updates` increments have been applied.
    pub fn step(
        &mut self,
        body: &mut dyn MotionDriver,
        direction: i32,
        spin_speed: f32,
        full_updates: u32,
    ) -> bool {
        let rotation = body.rotation() + spin_speed * direction as f32;
        body.set_rotation(wrap_degrees(rotation));
        self.updates += 1;

        self.updates >= full_updates
    }
}

/// Number of ticks a full sweep lasts at the given speed (truncated).
///
/// Zero above 360 degrees per tick; [`SpinSweep::step`] still rotates once.
#[must_use]
pub fn full_spin_updates(spin_speed: f32) -> u32 {
    (360.0 / spin_speed) as u32
}
