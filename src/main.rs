//! Headless demo: a guard patrols, spots the player, loses them behind a
//! wall, searches, and gets frozen by a power-up for a while
//!
//! Pass a `.ron` or `.json` enemy config as the first argument to replace
//! the default guard.

use std::error::Error;
use std::path::PathBuf;

use hecs::Entity;
use warden::ecs::{destroy_enemy, freeze_enemies, unfreeze_enemies};
use warden::prelude::*;

const FREEZE_AT: u64 = 400;
const THAW_AT: u64 = 500;
const SENTRY_LEAVES_AT: u64 = 700;
const HERO_MOVES_AT: u64 = 150;
const HERO_SPEED: f32 = 0.15;
const HERO_TAG: &str = "Player";

/// Scripted player plus two enemies
struct DemoGame {
    guard_config: EnemyConfig,
    guard: Option<Entity>,
    sentry: Option<EnemyHandle>,
    hero: Option<Entity>,
    hero_route: Vec<Vec2>,
    shots: usize,
}

impl DemoGame {
    fn new(guard_config: EnemyConfig) -> Self {
        Self {
            guard_config,
            guard: None,
            sentry: None,
            hero: None,
            hero_route: vec![Vec2::new(13.0, 1.0), Vec2::new(13.0, 6.0)],
            shots: 0,
        }
    }

    fn default_guard() -> EnemyConfig {
        EnemyConfig::new(vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 0.0),
            Vec2::new(10.0, 10.0),
            Vec2::new(0.0, 10.0),
        ])
        .with_target_tag(HERO_TAG)
        .with_vision(VisionConfig {
            range: 9.0,
            field_of_view: 40.0,
        })
    }

    fn name_of(world: &World, entity: Entity) -> String {
        world
            .get::<Name>(entity)
            .map(|name| name.0.clone())
            .unwrap_or_else(|_| format!("{entity:?}"))
    }

    fn report(&mut self, ctx: &SimulationContext) {
        if ctx.events.is_empty() {
            return;
        }
        for event in ctx.events.iter() {
            match event {
                GameEvent::ProjectileFired { .. } => self.shots += 1,
                GameEvent::BehaviourChanged { entity, from, to } => log::info!(
                    "[{}] {}: {from} -> {to}",
                    ctx.tick_count(),
                    Self::name_of(&ctx.world, *entity)
                ),
                GameEvent::TargetLost {
                    entity,
                    location,
                    depth,
                } => log::info!(
                    "[{}] {} lost sight of the player near {location:?} ({depth} pending)",
                    ctx.tick_count(),
                    Self::name_of(&ctx.world, *entity)
                ),
                GameEvent::EnemyDestroyed { entity } => {
                    log::info!("[{}] {entity:?} destroyed", ctx.tick_count());
                }
                _ => {}
            }
        }
    }

    fn move_hero(&self, ctx: &mut SimulationContext) {
        let Some(hero) = self.hero else {
            return;
        };
        if ctx.tick_count() < HERO_MOVES_AT {
            return;
        }

        let goal = self.hero_route[self.hero_route.len() - 1];
        if let Ok(mut body) = ctx.world.get_mut::<ActorBody>(hero) {
            let next = warden::ai::move_towards(body.position(), goal, HERO_SPEED);
            body.set_position(next);
        }
    }
}

impl Game for DemoGame {
    fn init(&mut self, ctx: &mut SimulationContext) {
        log::info!("Initializing demo");

        // A wall just short of the guard's first corner
        let mut walls = Grid::new(40, 40, 1.0).with_origin(Vec2::new(-20.0, -20.0));
        for y in 22..28 {
            walls.set_wall(31, y, true);
        }
        ctx.walls = Some(walls);

        match ctx.world.spawn_enemy("guard", self.guard_config.clone()) {
            Ok(guard) => self.guard = Some(guard),
            Err(e) => {
                log::error!("Could not spawn guard: {e}");
                ctx.quit();
                return;
            }
        }

        let sentry_config = EnemyConfig::new(vec![Vec2::new(-10.0, -10.0)]);
        if let Ok(sentry) = ctx.world.spawn_enemy("sentry", sentry_config) {
            self.sentry = Some(EnemyHandle(sentry));
        }

        self.hero = Some(ctx.world.spawn_target("hero", HERO_TAG, self.hero_route[0]));
    }

    fn fixed_update(&mut self, ctx: &mut SimulationContext) {
        self.report(ctx);
        self.move_hero(ctx);

        match ctx.tick_count() {
            FREEZE_AT => {
                freeze_enemies(&mut ctx.world, &mut ctx.events);
            }
            THAW_AT => {
                unfreeze_enemies(&mut ctx.world, &mut ctx.events);
            }
            SENTRY_LEAVES_AT => {
                if let Some(sentry) = self.sentry {
                    destroy_enemy(&mut ctx.world, sentry.0, &mut ctx.events);
                }
            }
            _ => {}
        }
    }

    fn shutdown(&mut self, ctx: &mut SimulationContext) {
        if let Some(sentry) = self.sentry {
            log::info!("Sentry destroyed: {}", sentry.is_destroyed(&ctx.world));
        }
        if let Some(guard) = self.guard {
            if let Ok(body) = ctx.world.get::<ActorBody>(guard) {
                log::info!(
                    "Guard finished at {:?} facing {:.1} degrees",
                    body.position(),
                    body.rotation()
                );
            }
            if let Ok(enemy) = ctx.world.get::<EnemyController>(guard) {
                for sighting in enemy.sightings().iter() {
                    log::info!("Guard never searched {:?}", sighting.location);
                }
            }
        }
        log::info!("Projectiles observed: {}", self.shots);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let guard_config = match std::env::args().nth(1).map(PathBuf::from) {
        Some(path) if path.extension().is_some_and(|ext| ext == "json") => {
            EnemyConfig::load_json(path)?
        }
        Some(path) => EnemyConfig::load_ron(path)?,
        None => DemoGame::default_guard(),
    };
    guard_config.validate()?;

    let config = SimulationConfig::default()
        .with_title("Warden Demo")
        .with_tick_rate(50.0)
        .with_max_ticks(900);

    let mut simulation = Simulation::new(config, DemoGame::new(guard_config))?;
    simulation.run()?;

    println!("{}", simulation.context().stats.format_stats());
    Ok(())
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Simulation error: {}", e);
    }
}
