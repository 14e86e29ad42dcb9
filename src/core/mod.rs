//! Core simulation module
//!
//! Contains the simulation driver, enemy configuration, events and statistics

mod config;
mod debug;
mod engine;
mod events;
mod time;

pub use config::{ConfigError, EnemyConfig, SPEED_MULTIPLIER};
pub use debug::TickStats;
pub use engine::{Game, Simulation, SimulationConfig, SimulationContext, SimulationError};
pub use events::{EventQueue, GameEvent};
pub use time::FixedTimestep;
