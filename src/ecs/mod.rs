//! Entity Component System module
//!
//! Built on top of the hecs ECS library

mod components;
mod systems;
mod world;

pub use components::{ActorBody, Name, Tag, Transform2D};
pub use systems::{destroy_enemy, freeze_enemies, unfreeze_enemies, update_enemies};
pub use world::{EnemyHandle, World};
