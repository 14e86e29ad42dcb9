//! Enemy behaviour for a top-down 2D game
//!
//! This crate provides:
//! - A per-enemy state machine: patrol, engage, chase, search sweep, return
//! - Vision-cone perception with wall occlusion
//! - Entity Component System (ECS) integration with hecs
//! - A headless fixed-timestep simulation driver

pub mod ai;
pub mod core;
pub mod ecs;

// Re-exports for convenience
pub use glam;
pub use hecs;

/// Prelude module for common imports
pub mod prelude {
    pub use crate::ai::{
        BehaviourKind, EnemyContext, EnemyController, FireAction, Freezable, Grid, MotionDriver,
        PerceptionProbe, SightProbe, SightTarget, VisionConfig,
    };
    pub use crate::core::{
        ConfigError, EnemyConfig, EventQueue, Game, GameEvent, Simulation, SimulationConfig,
        SimulationContext, TickStats,
    };
    pub use crate::ecs::{ActorBody, EnemyHandle, Name, Tag, Transform2D, World};
    pub use glam::Vec2;
}
