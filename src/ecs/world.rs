//! World wrapper around hecs

use glam::Vec2;
use hecs::Entity;

use super::components::{ActorBody, Name, Tag, Transform2D};
use crate::ai::EnemyController;
use crate::core::{ConfigError, EnemyConfig};

/// Game world containing all entities and components
pub struct World {
    /// The underlying hecs world
    pub inner: hecs::World,
}

impl World {
    /// Create a new empty world
    pub fn new() -> Self {
        Self {
            inner: hecs::World::new(),
        }
    }

    /// Spawn an enemy standing on the first waypoint of its patrol
    ///
    /// # Errors
    ///
    /// Returns an error if the config is invalid
    pub fn spawn_enemy(
        &mut self,
        name: impl Into<String>,
        config: EnemyConfig,
    ) -> Result<Entity, ConfigError> {
        let vision = config.vision;
        let mut body = ActorBody::default();
        let controller = EnemyController::spawn(config, &mut body)?;

        let name = Name::new(name);
        log::debug!("spawning enemy {} at {:?}", name.0, body.transform.position);
        Ok(self.inner.spawn((name, body, vision, controller)))
    }

    /// Spawn a target that enemies hunting `tag` can see
    pub fn spawn_target(
        &mut self,
        name: impl Into<String>,
        tag: impl Into<String>,
        position: Vec2,
    ) -> Entity {
        self.inner.spawn((
            Name::new(name),
            Tag::new(tag),
            ActorBody::new(Transform2D::from_position(position)),
        ))
    }

    /// Despawn an entity
    pub fn despawn(&mut self, entity: Entity) -> Result<(), hecs::NoSuchEntity> {
        self.inner.despawn(entity)
    }

    /// Get a reference to a component
    pub fn get<T: hecs::Component>(
        &self,
        entity: Entity,
    ) -> Result<hecs::Ref<'_, T>, hecs::ComponentError> {
        self.inner.get::<&T>(entity)
    }

    /// Get a mutable reference to a component
    pub fn get_mut<T: hecs::Component>(
        &mut self,
        entity: Entity,
    ) -> Result<hecs::RefMut<'_, T>, hecs::ComponentError> {
        self.inner.get::<&mut T>(entity)
    }

    /// Check if an entity has been removed from the world
    pub fn is_destroyed(&self, entity: Entity) -> bool {
        !self.inner.contains(entity)
    }

    /// Query for entities with specific components
    pub fn query<Q: hecs::Query>(&self) -> hecs::QueryBorrow<'_, Q> {
        self.inner.query::<Q>()
    }

    /// Query for entities with specific components (mutable)
    pub fn query_mut<Q: hecs::Query>(&mut self) -> hecs::QueryMut<'_, Q> {
        self.inner.query_mut::<Q>()
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Reference to an enemy held by other systems (projectiles, power-ups)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnemyHandle(pub Entity);

impl EnemyHandle {
    /// Whether the enemy has been removed from `world`
    pub fn is_destroyed(&self, world: &World) -> bool {
        world.is_destroyed(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::MotionDriver;

    #[test]
    fn test_spawn_enemy_on_first_waypoint() {
        let mut world = World::new();
        let config = EnemyConfig::new(vec![Vec2::new(3.0, 4.0), Vec2::ZERO]);
        let enemy = world.spawn_enemy("guard", config).unwrap();

        let body = world.get::<ActorBody>(enemy).unwrap();
        assert_eq!(body.position(), Vec2::new(3.0, 4.0));
        assert!(world.get::<EnemyController>(enemy).is_ok());
    }

    #[test]
    fn test_spawn_enemy_rejects_empty_path() {
        let mut world = World::new();
        let result = world.spawn_enemy("guard", EnemyConfig::default());
        assert!(matches!(result, Err(ConfigError::EmptyPath)));
        assert_eq!(world.query::<&EnemyController>().iter().count(), 0);
    }

    #[test]
    fn test_enemy_handle_liveness() {
        let mut world = World::new();
        let entity = world
            .spawn_enemy("guard", EnemyConfig::new(vec![Vec2::ZERO]))
            .unwrap();
        let handle = EnemyHandle(entity);

        assert!(!handle.is_destroyed(&world));
        world.despawn(entity).unwrap();
        assert!(handle.is_destroyed(&world));
    }
}
