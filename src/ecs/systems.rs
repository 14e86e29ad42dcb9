//! Systems driving enemies inside the ECS world

use glam::Vec2;
use hecs::Entity;

use super::components::{ActorBody, Tag};
use super::world::World;
use crate::ai::{
    BehaviourKind, EnemyContext, EnemyController, FireAction, Freezable, Grid, SightProbe,
    SightTarget, VisionConfig,
};
use crate::core::{EventQueue, GameEvent, TickStats};

/// Fires by posting a projectile event for the projectile system.
struct EventLauncher<'a> {
    shooter: Entity,
    events: &'a mut EventQueue,
    shots: u32,
}

impl FireAction for EventLauncher<'_> {
    fn fire(&mut self, origin: Vec2, direction: Vec2) {
        self.shots += 1;
        self.events.push(GameEvent::ProjectileFired {
            shooter: self.shooter,
            origin,
            direction,
        });
    }
}

/// Visible targets this tick, snapshotted before enemies move
fn collect_targets(world: &World) -> Vec<SightTarget> {
    world
        .query::<(&Tag, &ActorBody)>()
        .iter()
        .map(|(_, (tag, body))| SightTarget::new(tag.0.clone(), body.transform.position))
        .collect()
}

/// Step every enemy one tick.
///
/// Targets are sampled once before any enemy moves, so enemies never see
/// each other's mid-tick state. `walls`, if given, blocks line of sight.
pub fn update_enemies(
    world: &mut World,
    walls: Option<&Grid>,
    events: &mut EventQueue,
    stats: &mut TickStats,
) {
    let targets = collect_targets(world);

    for (entity, (enemy, body, vision)) in
        world.query_mut::<(&mut EnemyController, &mut ActorBody, &VisionConfig)>()
    {
        let mut probe = SightProbe::new(&targets, *vision);
        if let Some(grid) = walls {
            probe = probe.with_walls(grid);
        }

        let before = enemy.last_branch();
        let mut launcher = EventLauncher {
            shooter: entity,
            events: &mut *events,
            shots: 0,
        };
        let branch = {
            let mut ctx = EnemyContext {
                probe: &probe,
                body,
                weapon: &mut launcher,
            };
            enemy.tick(1, &mut ctx)
        };

        for _ in 0..launcher.shots {
            stats.record_shot();
        }
        stats.record_branch(branch, enemy.sightings().len());

        if branch == BehaviourKind::Alerting {
            if let Some(sighting) = enemy.sightings().peek() {
                events.push(GameEvent::TargetLost {
                    entity,
                    location: sighting.location,
                    depth: enemy.sightings().len(),
                });
            }
        }

        if branch != before {
            events.push(GameEvent::BehaviourChanged {
                entity,
                from: before,
                to: branch,
            });
        }
    }
}

/// Freeze every enemy, as a freeze power-up does.
///
/// Returns how many enemies were newly frozen.
pub fn freeze_enemies(world: &mut World, events: &mut EventQueue) -> usize {
    let mut frozen = 0;
    for (entity, enemy) in world.query_mut::<&mut EnemyController>() {
        if !enemy.is_frozen() {
            enemy.freeze();
            events.push(GameEvent::Frozen { entity });
            frozen += 1;
        }
    }
    log::info!("freeze power-up hit {frozen} enemies");
    frozen
}

/// Thaw every frozen enemy.
///
/// Returns how many enemies were thawed.
pub fn unfreeze_enemies(world: &mut World, events: &mut EventQueue) -> usize {
    let mut thawed = 0;
    for (entity, enemy) in world.query_mut::<&mut EnemyController>() {
        if enemy.is_frozen() {
            enemy.unfreeze();
            events.push(GameEvent::Unfrozen { entity });
            thawed += 1;
        }
    }
    log::info!("{thawed} enemies thawed");
    thawed
}

/// Remove an enemy from the world.
///
/// Returns `false` if it was already gone.
pub fn destroy_enemy(world: &mut World, entity: Entity, events: &mut EventQueue) -> bool {
    if world.despawn(entity).is_err() {
        return false;
    }
    events.push(GameEvent::EnemyDestroyed { entity });
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::MotionDriver;
    use crate::core::EnemyConfig;

    fn guard_config() -> EnemyConfig {
        EnemyConfig::new(vec![Vec2::ZERO, Vec2::new(10.0, 0.0)])
            .with_speed(100.0)
            .with_chase_speed(100.0)
            .with_turn_speed(0.5)
            .with_spin_speed(90.0)
    }

    fn step(world: &mut World, walls: Option<&Grid>, events: &mut EventQueue, stats: &mut TickStats) {
        events.swap();
        update_enemies(world, walls, events, stats);
        stats.record_tick();
    }

    #[test]
    fn test_enemy_fires_at_visible_target() {
        let mut world = World::new();
        let mut events = EventQueue::new();
        let mut stats = TickStats::new();

        let guard = world.spawn_enemy("guard", guard_config()).unwrap();
        world.spawn_target("hero", "Player", Vec2::new(4.0, 0.0));

        step(&mut world, None, &mut events, &mut stats);

        let fired: Vec<_> = events
            .pending()
            .filter(|e| matches!(e, GameEvent::ProjectileFired { shooter, .. } if *shooter == guard))
            .collect();
        assert_eq!(fired.len(), 1);
        assert!(events.pending().any(|e| matches!(
            e,
            GameEvent::BehaviourChanged { to: BehaviourKind::Engaging, .. }
        )));
        assert_eq!(stats.shots_fired(), 1);
        assert_eq!(stats.branch_count(BehaviourKind::Engaging), 1);
    }

    #[test]
    fn test_enemy_ignores_other_tags() {
        let mut world = World::new();
        let mut events = EventQueue::new();
        let mut stats = TickStats::new();

        world.spawn_enemy("guard", guard_config()).unwrap();
        world.spawn_target("crate", "Crate", Vec2::new(4.0, 0.0));

        step(&mut world, None, &mut events, &mut stats);
        assert_eq!(stats.branch_count(BehaviourKind::Patrolling), 1);
        assert_eq!(stats.shots_fired(), 0);
    }

    #[test]
    fn test_target_hidden_by_wall_is_lost() {
        let mut world = World::new();
        let mut events = EventQueue::new();
        let mut stats = TickStats::new();
        let mut grid = Grid::new(20, 20, 1.0).with_origin(Vec2::new(-10.0, -10.0));

        let guard = world.spawn_enemy("guard", guard_config()).unwrap();
        world.spawn_target("hero", "Player", Vec2::new(4.0, 0.0));

        step(&mut world, Some(&grid), &mut events, &mut stats);
        assert_eq!(stats.branch_count(BehaviourKind::Engaging), 1);

        // Wall drops between guard and hero: cell covering x in [2, 3)
        grid.set_wall(12, 10, true);
        step(&mut world, Some(&grid), &mut events, &mut stats);

        assert!(events.pending().any(|e| matches!(
            e,
            GameEvent::TargetLost { entity, depth: 1, .. } if *entity == guard
        )));
        let enemy = world.get::<EnemyController>(guard).unwrap();
        assert_eq!(enemy.sightings().len(), 1);
        assert_eq!(enemy.last_branch(), BehaviourKind::Alerting);
    }

    #[test]
    fn test_freeze_and_unfreeze_all() {
        let mut world = World::new();
        let mut events = EventQueue::new();
        let mut stats = TickStats::new();

        let a = world.spawn_enemy("a", guard_config()).unwrap();
        let b = world.spawn_enemy("b", guard_config()).unwrap();

        assert_eq!(freeze_enemies(&mut world, &mut events), 2);
        assert_eq!(freeze_enemies(&mut world, &mut events), 0);

        for _ in 0..5 {
            step(&mut world, None, &mut events, &mut stats);
        }
        for entity in [a, b] {
            let body = world.get::<ActorBody>(entity).unwrap();
            assert_eq!(body.position(), Vec2::ZERO);
        }

        assert_eq!(unfreeze_enemies(&mut world, &mut events), 2);
        step(&mut world, None, &mut events, &mut stats);
        let body = world.get::<ActorBody>(a).unwrap();
        assert_eq!(body.position(), Vec2::new(1.0, 0.0));
    }

    #[test]
    fn test_destroy_enemy() {
        let mut world = World::new();
        let mut events = EventQueue::new();

        let guard = world.spawn_enemy("guard", guard_config()).unwrap();
        assert!(destroy_enemy(&mut world, guard, &mut events));
        assert!(!destroy_enemy(&mut world, guard, &mut events));
        assert!(world.is_destroyed(guard));
        assert_eq!(events.pending().count(), 1);
    }
}
