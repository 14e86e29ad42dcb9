//! Event Queue for Decoupled Communication
//!
//! Enemy systems report what happened (shots, lost targets, freezes) through
//! a double-buffered queue instead of calling into audio, UI or projectile
//! code directly. Events written during tick N are read during tick N+1.
//!
//! # Example
//!
//! ```ignore
//! // In the enemy system
//! events.push(GameEvent::ProjectileFired { shooter, origin, direction });
//!
//! // In the projectile system, next tick
//! for event in events.iter() {
//!     if let GameEvent::ProjectileFired { origin, direction, .. } = event {
//!         spawn_projectile(*origin, *direction);
//!     }
//! }
//! ```

use std::collections::VecDeque;

use glam::Vec2;
use hecs::Entity;

use crate::ai::BehaviourKind;

// ============================================================================
// Event Types
// ============================================================================

/// Game events produced by enemies.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum GameEvent {
    /// An enemy fired at its target.
    ProjectileFired {
        /// The firing enemy
        shooter: Entity,
        /// World-space muzzle position
        origin: Vec2,
        /// Unit firing direction
        direction: Vec2,
    },

    /// An enemy switched behaviour branch.
    BehaviourChanged {
        entity: Entity,
        from: BehaviourKind,
        to: BehaviourKind,
    },

    /// An enemy lost sight of its target and recorded a sighting.
    TargetLost {
        entity: Entity,
        /// Last known target position
        location: Vec2,
        /// Pending sightings including this one
        depth: usize,
    },

    /// An enemy was frozen by a power-up.
    Frozen { entity: Entity },

    /// An enemy thawed.
    Unfrozen { entity: Entity },

    /// An enemy was removed from the world.
    EnemyDestroyed { entity: Entity },
}

// ============================================================================
// Event Queue
// ============================================================================

/// Double-buffered event queue for tick-consistent event processing.
///
/// Events pushed during tick N are available for reading during tick N+1,
/// so the order systems run in does not change what they observe.
#[derive(Debug)]
pub struct EventQueue<E = GameEvent> {
    /// Events being written this tick
    pending: VecDeque<E>,
    /// Events from the previous tick, ready for processing
    processing: VecDeque<E>,
}

impl<E> EventQueue<E> {
    /// Default initial capacity for event queues.
    const DEFAULT_CAPACITY: usize = 64;

    /// Create a new event queue with default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    /// Create a new event queue with specified initial capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            pending: VecDeque::with_capacity(capacity),
            processing: VecDeque::with_capacity(capacity),
        }
    }

    /// Push an event to be processed next tick.
    #[inline]
    pub fn push(&mut self, event: E) {
        self.pending.push_back(event);
    }

    /// Make this tick's events readable and start a fresh pending buffer.
    ///
    /// Call once per tick, before systems run. Unread events from the
    /// previous tick are dropped.
    pub fn swap(&mut self) {
        std::mem::swap(&mut self.pending, &mut self.processing);
        self.pending.clear();
    }

    /// Iterate over events from the previous tick.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &E> {
        self.processing.iter()
    }

    /// Iterate over events written so far this tick.
    #[inline]
    pub fn pending(&self) -> impl Iterator<Item = &E> {
        self.pending.iter()
    }

    /// Check if there are any events to process.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.processing.is_empty()
    }
}

impl<E> Default for EventQueue<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_entities() -> (Entity, Entity) {
        let mut world = hecs::World::new();
        (world.spawn(()), world.spawn(()))
    }

    fn shot(shooter: Entity) -> GameEvent {
        GameEvent::ProjectileFired {
            shooter,
            origin: Vec2::ZERO,
            direction: Vec2::X,
        }
    }

    #[test]
    fn test_shots_readable_next_tick() {
        let (guard, _) = two_entities();
        let mut events = EventQueue::new();

        events.push(shot(guard));
        assert!(events.is_empty());
        assert_eq!(events.pending().count(), 1);

        events.swap();
        assert_eq!(events.iter().count(), 1);
        assert_eq!(events.iter().next(), Some(&shot(guard)));
    }

    #[test]
    fn test_unread_events_dropped_after_one_tick() {
        let (guard, _) = two_entities();
        let mut events = EventQueue::new();

        events.push(GameEvent::Frozen { entity: guard });
        events.swap();
        events.push(GameEvent::Unfrozen { entity: guard });
        assert_eq!(
            events.iter().collect::<Vec<_>>(),
            vec![&GameEvent::Frozen { entity: guard }]
        );

        events.swap();
        events.swap();
        assert!(events.is_empty());
    }

    #[test]
    fn test_filter_by_enemy() {
        let (guard, sentry) = two_entities();
        let mut events = EventQueue::new();

        events.push(shot(guard));
        events.push(GameEvent::TargetLost {
            entity: sentry,
            location: Vec2::new(2.0, 3.0),
            depth: 2,
        });
        events.push(GameEvent::BehaviourChanged {
            entity: guard,
            from: BehaviourKind::Engaging,
            to: BehaviourKind::Alerting,
        });
        events.swap();

        let guard_events = events
            .iter()
            .filter(|event| match event {
                GameEvent::ProjectileFired { shooter, .. } => *shooter == guard,
                GameEvent::BehaviourChanged { entity, .. } => *entity == guard,
                _ => false,
            })
            .count();
        assert_eq!(guard_events, 2);
        assert_eq!(events.iter().count(), 3);
    }
}
