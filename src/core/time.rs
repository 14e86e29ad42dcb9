//! Fixed-timestep clock

use std::time::Duration;

/// Most ticks one `accumulate` call may produce before the backlog is dropped
const MAX_TICKS_PER_UPDATE: u32 = 8;

/// Converts elapsed wall time into whole simulation ticks.
#[derive(Debug, Clone)]
pub struct FixedTimestep {
    /// Length of one tick, never zero
    step: Duration,
    /// Time not yet consumed by a tick
    accumulator: Duration,
    /// Ticks run since creation
    tick_count: u64,
}

impl FixedTimestep {
    /// Create a clock ticking `hz` times per second.
    ///
    /// Returns `None` if `hz` is not positive and finite, or if one tick
    /// would be too long for a `Duration` or shorter than a nanosecond.
    #[must_use]
    pub fn from_hz(hz: f64) -> Option<Self> {
        if !hz.is_finite() || hz <= 0.0 {
            return None;
        }
        let step = Duration::try_from_secs_f64(1.0 / hz).ok()?;
        Self::new(step)
    }

    /// Create a clock with the given tick length, or `None` for a zero step
    #[must_use]
    pub fn new(step: Duration) -> Option<Self> {
        if step.is_zero() {
            return None;
        }
        Some(Self {
            step,
            accumulator: Duration::ZERO,
            tick_count: 0,
        })
    }

    /// Add elapsed time and return how many ticks are now due.
    ///
    /// Due ticks are not counted until they run, see [`FixedTimestep::advance`].
    /// Time beyond the per-update cap is discarded.
    pub fn accumulate(&mut self, elapsed: Duration) -> u32 {
        self.accumulator += elapsed;

        let mut ticks = 0;
        while self.accumulator >= self.step && ticks < MAX_TICKS_PER_UPDATE {
            self.accumulator -= self.step;
            ticks += 1;
        }

        if ticks == MAX_TICKS_PER_UPDATE && self.accumulator >= self.step {
            log::warn!(
                "simulation fell behind, dropping {:.1}ms",
                self.accumulator.as_secs_f64() * 1000.0
            );
            self.accumulator = Duration::ZERO;
        }

        ticks
    }

    /// Record one tick that has run
    pub fn advance(&mut self) {
        self.tick_count += 1;
    }

    /// Length of one tick
    #[must_use]
    pub fn step(&self) -> Duration {
        self.step
    }

    /// Ticks run so far
    #[must_use]
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accumulate_whole_ticks() {
        let mut time = FixedTimestep::new(Duration::from_millis(20)).unwrap();

        assert_eq!(time.accumulate(Duration::from_millis(10)), 0);
        assert_eq!(time.accumulate(Duration::from_millis(15)), 1);
        assert_eq!(time.accumulate(Duration::from_millis(40)), 2);

        // Only ticks that actually ran are counted
        assert_eq!(time.tick_count(), 0);
        time.advance();
        assert_eq!(time.tick_count(), 1);
    }

    #[test]
    fn test_accumulate_caps_and_drops_backlog() {
        let mut time = FixedTimestep::new(Duration::from_millis(10)).unwrap();

        assert_eq!(time.accumulate(Duration::from_secs(1)), MAX_TICKS_PER_UPDATE);
        assert_eq!(time.accumulate(Duration::ZERO), 0);
    }

    #[test]
    fn test_from_hz() {
        let time = FixedTimestep::from_hz(50.0).unwrap();
        assert_eq!(time.step(), Duration::from_millis(20));
    }

    #[test]
    fn test_from_hz_rejects_unrepresentable_steps() {
        // One tick would outlast any Duration
        assert!(FixedTimestep::from_hz(1e-30).is_none());
        // One tick rounds down to nothing
        assert!(FixedTimestep::from_hz(1e30).is_none());
        assert!(FixedTimestep::from_hz(0.0).is_none());
        assert!(FixedTimestep::from_hz(f64::NAN).is_none());
        assert!(FixedTimestep::new(Duration::ZERO).is_none());
    }
}
