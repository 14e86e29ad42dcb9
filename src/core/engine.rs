//! Headless simulation driver and fixed-step game loop

use std::fmt;
use std::time::Duration;

use super::debug::TickStats;
use super::events::EventQueue;
use super::time::FixedTimestep;
use crate::ai::Grid;
use crate::ecs::{World, update_enemies};

/// Simulation configuration
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    /// Name shown in logs
    pub title: String,
    /// Fixed ticks per second
    pub tick_rate: f64,
    /// Stop after this many ticks (`None` runs until the game quits)
    pub max_ticks: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            title: String::from("Simulation"),
            tick_rate: 50.0,
            max_ticks: None,
        }
    }
}

impl SimulationConfig {
    /// Set the title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set ticks per second
    pub fn with_tick_rate(mut self, hz: f64) -> Self {
        self.tick_rate = hz;
        self
    }

    /// Stop after a number of ticks
    pub fn with_max_ticks(mut self, ticks: u64) -> Self {
        self.max_ticks = Some(ticks);
        self
    }
}

/// Errors raised when starting a simulation
#[derive(Debug, Clone, PartialEq)]
pub enum SimulationError {
    /// Tick rate is not positive and finite, or gives an unrepresentable tick
    InvalidTickRate(f64),
}

impl fmt::Display for SimulationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidTickRate(hz) => write!(f, "Invalid tick rate: {hz}"),
        }
    }
}

impl std::error::Error for SimulationError {}

/// Game trait that users implement
pub trait Game {
    /// Called once before the first tick
    fn init(&mut self, ctx: &mut SimulationContext);

    /// Called every tick, before enemies are stepped
    fn fixed_update(&mut self, ctx: &mut SimulationContext);

    /// Called when the simulation stops
    fn shutdown(&mut self, _ctx: &mut SimulationContext) {}
}

/// Context passed to game callbacks
pub struct SimulationContext {
    /// Tick clock
    pub time: FixedTimestep,
    /// ECS world
    pub world: World,
    /// Events from enemies and the game
    pub events: EventQueue,
    /// Per-tick statistics
    pub stats: TickStats,
    /// Walls blocking enemy sight
    pub walls: Option<Grid>,
    /// Should the simulation stop
    should_quit: bool,
}

impl SimulationContext {
    fn new(time: FixedTimestep) -> Self {
        Self {
            time,
            world: World::new(),
            events: EventQueue::new(),
            stats: TickStats::new(),
            walls: None,
            should_quit: false,
        }
    }

    /// Ticks run so far
    pub fn tick_count(&self) -> u64 {
        self.time.tick_count()
    }

    /// Request shutdown after the current tick
    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// Check if the simulation should stop
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }
}

/// Fixed-step simulation driving a [`Game`] and every enemy in its world
pub struct Simulation<G: Game> {
    config: SimulationConfig,
    game: G,
    context: SimulationContext,
    initialized: bool,
}

impl<G: Game> Simulation<G> {
    /// Create a new simulation with the given game
    ///
    /// # Errors
    ///
    /// Returns an error if the tick rate is not a positive finite number, or
    /// if one tick at that rate cannot be represented as a `Duration`
    pub fn new(config: SimulationConfig, game: G) -> Result<Self, SimulationError> {
        let time = FixedTimestep::from_hz(config.tick_rate)
            .ok_or(SimulationError::InvalidTickRate(config.tick_rate))?;

        let context = SimulationContext::new(time);
        Ok(Self {
            config,
            game,
            context,
            initialized: false,
        })
    }

    /// The game being simulated
    pub fn game(&self) -> &G {
        &self.game
    }

    /// The simulation context
    pub fn context(&self) -> &SimulationContext {
        &self.context
    }

    /// The simulation context, mutably
    pub fn context_mut(&mut self) -> &mut SimulationContext {
        &mut self.context
    }

    /// Run ticks back to back until the game quits or `max_ticks` is reached.
    ///
    /// Does not sleep between ticks; use [`Simulation::advance`] to follow
    /// wall time instead.
    pub fn run(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
            .try_init()
            .ok();
        log::info!(
            "Starting simulation: {} at {} Hz",
            self.config.title,
            self.config.tick_rate
        );

        self.ensure_initialized();
        while !self.finished() {
            self.tick();
        }
        self.stop();

        Ok(())
    }

    /// Feed elapsed wall time and run every tick now due.
    ///
    /// Returns the number of ticks run.
    pub fn advance(&mut self, elapsed: Duration) -> u32 {
        self.ensure_initialized();

        let due = self.context.time.accumulate(elapsed);
        let mut ran = 0;
        for _ in 0..due {
            if self.finished() {
                break;
            }
            self.tick();
            ran += 1;
        }
        ran
    }

    /// Whether the game quit or the tick limit was reached
    pub fn finished(&self) -> bool {
        self.context.should_quit
            || self
                .config
                .max_ticks
                .is_some_and(|max| self.context.stats.total_ticks() >= max)
    }

    fn ensure_initialized(&mut self) {
        if !self.initialized {
            self.game.init(&mut self.context);
            self.initialized = true;
            log::info!("Simulation initialized");
        }
    }

    fn tick(&mut self) {
        let ctx = &mut self.context;
        ctx.time.advance();
        ctx.events.swap();

        self.game.fixed_update(ctx);
        update_enemies(
            &mut ctx.world,
            ctx.walls.as_ref(),
            &mut ctx.events,
            &mut ctx.stats,
        );
        ctx.stats.record_tick();
    }

    fn stop(&mut self) {
        self.game.shutdown(&mut self.context);
        log::info!("Simulation stopped: {}", self.context.stats.format_stats());
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::*;
    use crate::ai::BehaviourKind;
    use crate::core::{EnemyConfig, GameEvent};

    #[derive(Default)]
    struct ScriptedGame {
        inits: u32,
        updates: u32,
        shutdowns: u32,
        quit_at: Option<u32>,
        shots_seen: usize,
    }

    impl Game for ScriptedGame {
        fn init(&mut self, ctx: &mut SimulationContext) {
            self.inits += 1;
            ctx.world
                .spawn_enemy(
                    "guard",
                    EnemyConfig::new(vec![Vec2::ZERO, Vec2::new(5.0, 0.0)]).with_speed(100.0),
                )
                .unwrap();
        }

        fn fixed_update(&mut self, ctx: &mut SimulationContext) {
            self.updates += 1;
            self.shots_seen += ctx
                .events
                .iter()
                .filter(|e| matches!(e, GameEvent::ProjectileFired { .. }))
                .count();
            if self.quit_at == Some(self.updates) {
                ctx.quit();
            }
        }

        fn shutdown(&mut self, _ctx: &mut SimulationContext) {
            self.shutdowns += 1;
        }
    }

    #[test]
    fn test_run_stops_at_max_ticks() {
        let config = SimulationConfig::default().with_max_ticks(30);
        let mut sim = Simulation::new(config, ScriptedGame::default()).unwrap();
        sim.run().unwrap();

        assert_eq!(sim.game().inits, 1);
        assert_eq!(sim.game().updates, 30);
        assert_eq!(sim.game().shutdowns, 1);
        assert_eq!(sim.context().stats.total_ticks(), 30);
        assert_eq!(sim.context().tick_count(), 30);
        assert_eq!(
            sim.context().stats.branch_count(BehaviourKind::Patrolling),
            30
        );
    }

    #[test]
    fn test_game_can_quit() {
        let game = ScriptedGame {
            quit_at: Some(4),
            ..Default::default()
        };
        let mut sim = Simulation::new(SimulationConfig::default(), game).unwrap();
        sim.run().unwrap();

        assert_eq!(sim.game().updates, 4);
        assert_eq!(sim.context().stats.total_ticks(), 4);
    }

    #[test]
    fn test_advance_follows_wall_time() {
        let config = SimulationConfig::default().with_tick_rate(50.0);
        let mut sim = Simulation::new(config, ScriptedGame::default()).unwrap();

        assert_eq!(sim.advance(Duration::from_millis(10)), 0);
        assert_eq!(sim.advance(Duration::from_millis(50)), 3);
        assert_eq!(sim.game().inits, 1);
        assert_eq!(sim.game().updates, 3);
    }

    #[test]
    fn test_game_reads_previous_tick_events() {
        let mut sim = Simulation::new(
            SimulationConfig::default().with_max_ticks(3),
            ScriptedGame::default(),
        )
        .unwrap();
        sim.context_mut().world.spawn_target("hero", "Player", Vec2::new(3.0, 0.0));
        sim.run().unwrap();

        // Shots fired on ticks 1 and 2 are read on ticks 2 and 3
        assert_eq!(sim.context().stats.shots_fired(), 3);
        assert_eq!(sim.game().shots_seen, 2);
    }

    #[test]
    fn test_rejects_bad_tick_rate() {
        for hz in [0.0, -5.0, f64::INFINITY, 1e-30, 1e30] {
            let config = SimulationConfig::default().with_tick_rate(hz);
            assert!(
                matches!(
                    Simulation::new(config, ScriptedGame::default()),
                    Err(SimulationError::InvalidTickRate(_))
                ),
                "tick rate {hz} should be rejected"
            );
        }
    }

    #[test]
    fn test_advance_counts_only_ticks_run() {
        let config = SimulationConfig::default()
            .with_tick_rate(50.0)
            .with_max_ticks(2);
        let mut sim = Simulation::new(config, ScriptedGame::default()).unwrap();

        // Five ticks are due but the limit allows two
        assert_eq!(sim.advance(Duration::from_millis(100)), 2);
        assert_eq!(sim.context().tick_count(), 2);
        assert_eq!(sim.context().stats.total_ticks(), 2);

        assert_eq!(sim.advance(Duration::from_millis(100)), 0);
        assert_eq!(sim.context().tick_count(), 2);
    }
}
