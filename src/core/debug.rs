//! Debug and statistics module

use rustc_hash::FxHashMap;

use crate::ai::BehaviourKind;

/// Per-tick behaviour statistics across all enemies
#[derive(Debug, Default)]
pub struct TickStats {
    /// Enemy steps per behaviour branch
    branches: FxHashMap<BehaviourKind, u64>,
    /// Total simulation ticks recorded
    total_ticks: u64,
    /// Projectiles fired
    shots_fired: u64,
    /// Deepest sighting stack seen on any enemy
    max_sighting_depth: usize,
}

impl TickStats {
    /// Create an empty stats tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the end of a simulation tick
    pub fn record_tick(&mut self) {
        self.total_ticks += 1;
    }

    /// Record one enemy step
    pub fn record_branch(&mut self, branch: BehaviourKind, sighting_depth: usize) {
        *self.branches.entry(branch).or_insert(0) += 1;
        self.max_sighting_depth = self.max_sighting_depth.max(sighting_depth);
    }

    /// Record a fired projectile
    pub fn record_shot(&mut self) {
        self.shots_fired += 1;
    }

    /// Steps spent in a branch
    pub fn branch_count(&self, branch: BehaviourKind) -> u64 {
        self.branches.get(&branch).copied().unwrap_or(0)
    }

    /// Get total ticks recorded
    pub fn total_ticks(&self) -> u64 {
        self.total_ticks
    }

    /// Get projectiles fired
    pub fn shots_fired(&self) -> u64 {
        self.shots_fired
    }

    /// Get the deepest sighting stack seen
    pub fn max_sighting_depth(&self) -> usize {
        self.max_sighting_depth
    }

    /// Get a formatted stats string
    pub fn format_stats(&self) -> String {
        let branches = [
            BehaviourKind::Patrolling,
            BehaviourKind::Engaging,
            BehaviourKind::Alerting,
            BehaviourKind::Chasing,
            BehaviourKind::Spinning,
            BehaviourKind::Returning,
        ]
        .iter()
        .map(|&branch| format!("{branch}: {}", self.branch_count(branch)))
        .collect::<Vec<_>>()
        .join(", ");

        format!(
            "Ticks: {} | Shots: {} | Max sightings: {} | {branches}",
            self.total_ticks, self.shots_fired, self.max_sighting_depth
        )
    }
}
