//! Perception: finding visible targets
//!
//! The controller asks a [`PerceptionProbe`] once per tick for the nearest
//! visible target along its facing. [`SightProbe`] answers with a vision cone
//! and an optional wall [`Grid`] that blocks line of sight.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Finds the nearest visible target with a given tag.
pub trait PerceptionProbe {
    /// Nearest visible target tagged `tag`, looking from `origin` along `direction`
    fn find(&self, tag: &str, origin: Vec2, direction: Vec2) -> Option<Vec2>;
}

/// Probe that never sees anything
#[derive(Debug, Clone, Copy, Default)]
pub struct Blind;

impl PerceptionProbe for Blind {
    fn find(&self, _tag: &str, _origin: Vec2, _direction: Vec2) -> Option<Vec2> {
        None
    }
}

// ============================================================================
// Wall grid
// ============================================================================

/// A 2D occlusion grid
#[derive(Debug, Clone)]
pub struct Grid {
    /// Width in cells
    pub width: usize,
    /// Height in cells
    pub height: usize,
    /// Cell size in world units
    pub cell_size: f32,
    /// Wall cells (true = blocks sight)
    cells: Vec<bool>,
    /// World origin offset
    pub origin: Vec2,
}

impl Grid {
    /// Create a new grid with no walls
    #[must_use]
    pub fn new(width: usize, height: usize, cell_size: f32) -> Self {
        Self {
            width,
            height,
            cell_size,
            cells: vec![false; width * height],
            origin: Vec2::ZERO,
        }
    }

    /// Move the grid's lower-left corner
    #[must_use]
    pub fn with_origin(mut self, origin: Vec2) -> Self {
        self.origin = origin;
        self
    }

    /// Mark or clear a wall cell
    pub fn set_wall(&mut self, x: usize, y: usize, wall: bool) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = wall;
        }
    }

    /// Check if a cell is a wall. Cells outside the grid are open.
    #[must_use]
    pub fn is_wall(&self, x: i32, y: i32) -> bool {
        if x < 0 || y < 0 {
            return false;
        }
        let (x, y) = (x as usize, y as usize);
        if x >= self.width || y >= self.height {
            return false;
        }
        self.cells[y * self.width + x]
    }

    /// Convert world position to grid coordinates
    #[must_use]
    pub fn world_to_grid(&self, pos: Vec2) -> (i32, i32) {
        let local = pos - self.origin;
        (
            (local.x / self.cell_size).floor() as i32,
            (local.y / self.cell_size).floor() as i32,
        )
    }

    /// Whether the segment between two world points crosses no wall.
    ///
    /// Only the part of the segment inside the grid is sampled, at half-cell
    /// spacing, so the cost is bounded by the grid size. A grid whose cell
    /// size is not positive and finite has no resolvable cells and never
    /// blocks.
    #[must_use]
    pub fn line_of_sight(&self, from: Vec2, to: Vec2) -> bool {
        if !self.cell_size.is_finite() || self.cell_size <= 0.0 {
            return true;
        }
        let Some((start, end)) = self.clip(from, to) else {
            return true;
        };

        let delta = end - start;
        let step = self.cell_size * 0.5;
        let samples = (delta.length() / step).ceil().max(1.0) as u32;

        (0..=samples).all(|i| {
            let point = start + delta * (i as f32 / samples as f32);
            let (x, y) = self.world_to_grid(point);
            !self.is_wall(x, y)
        })
    }

    /// Clip a segment to the grid's bounds (Liang-Barsky)
    fn clip(&self, from: Vec2, to: Vec2) -> Option<(Vec2, Vec2)> {
        let min = self.origin;
        let max = self.origin + Vec2::new(self.width as f32, self.height as f32) * self.cell_size;
        let delta = to - from;

        let (mut enter, mut exit) = (0.0_f32, 1.0_f32);
        for (p, q) in [
            (-delta.x, from.x - min.x),
            (delta.x, max.x - from.x),
            (-delta.y, from.y - min.y),
            (delta.y, max.y - from.y),
        ] {
            if p == 0.0 {
                if q < 0.0 {
                    return None;
                }
                continue;
            }
            let t = q / p;
            if p < 0.0 {
                enter = enter.max(t);
            } else {
                exit = exit.min(t);
            }
            if enter > exit {
                return None;
            }
        }

        Some((from + delta * enter, from + delta * exit))
    }
}

// ============================================================================
// Vision cone
// ============================================================================

/// Range and field of view of a vision cone
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisionConfig {
    /// Maximum sight distance in world units
    pub range: f32,
    /// Full cone angle in degrees
    pub field_of_view: f32,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            range: 8.0,
            field_of_view: 30.0,
        }
    }
}

/// A tagged point that can be seen
#[derive(Debug, Clone, PartialEq)]
pub struct SightTarget {
    pub tag: String,
    pub position: Vec2,
}

impl SightTarget {
    pub fn new(tag: impl Into<String>, position: Vec2) -> Self {
        Self {
            tag: tag.into(),
            position,
        }
    }
}

/// Vision-cone probe over a set of candidate targets
#[derive(Debug, Clone, Copy)]
pub struct SightProbe<'a> {
    targets: &'a [SightTarget],
    walls: Option<&'a Grid>,
    vision: VisionConfig,
}

impl<'a> SightProbe<'a> {
    #[must_use]
    pub fn new(targets: &'a [SightTarget], vision: VisionConfig) -> Self {
        Self {
            targets,
            walls: None,
            vision,
        }
    }

    /// Let walls in `grid` block line of sight
    #[must_use]
    pub fn with_walls(mut self, grid: &'a Grid) -> Self {
        self.walls = Some(grid);
        self
    }

    fn can_see(&self, origin: Vec2, direction: Vec2, target: Vec2) -> bool {
        let to_target = target - origin;
        let distance = to_target.length();
        if distance > self.vision.range {
            return false;
        }

        // Standing on the target always counts as seeing it
        if distance > f32::EPSILON {
            let cos_half = (self.vision.field_of_view * 0.5).to_radians().cos();
            let facing = direction.normalize_or_zero();
            if facing.dot(to_target / distance) < cos_half {
                return false;
            }
        }

        self.walls
            .is_none_or(|grid| grid.line_of_sight(origin, target))
    }
}

impl PerceptionProbe for SightProbe<'_> {
    fn find(&self, tag: &str, origin: Vec2, direction: Vec2) -> Option<Vec2> {
        self.targets
            .iter()
            .filter(|target| target.tag == tag)
            .map(|target| target.position)
            .filter(|&position| self.can_see(origin, direction, position))
            .min_by(|a, b| {
                origin
                    .distance_squared(*a)
                    .total_cmp(&origin.distance_squared(*b))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn targets() -> Vec<SightTarget> {
        vec![
            SightTarget::new("Player", Vec2::new(5.0, 0.0)),
            SightTarget::new("Player", Vec2::new(3.0, 0.5)),
            SightTarget::new("Crate", Vec2::new(1.0, 0.0)),
            SightTarget::new("Player", Vec2::new(-2.0, 0.0)),
        ]
    }

    #[test]
    fn test_finds_nearest_in_cone() {
        let targets = targets();
        let probe = SightProbe::new(&targets, VisionConfig::default());

        let found = probe.find("Player", Vec2::ZERO, Vec2::X);
        assert_eq!(found, Some(Vec2::new(3.0, 0.5)));
    }

    #[test]
    fn test_ignores_targets_behind() {
        let targets = targets();
        let probe = SightProbe::new(&targets, VisionConfig::default());

        let found = probe.find("Player", Vec2::ZERO, Vec2::NEG_X);
        assert_eq!(found, Some(Vec2::new(-2.0, 0.0)));

        let found = probe.find("Player", Vec2::ZERO, Vec2::Y);
        assert!(found.is_none());
    }

    #[test]
    fn test_respects_range() {
        let targets = targets();
        let vision = VisionConfig {
            range: 2.5,
            ..Default::default()
        };
        let probe = SightProbe::new(&targets, vision);

        assert!(probe.find("Player", Vec2::ZERO, Vec2::X).is_none());
        assert_eq!(probe.find("Crate", Vec2::ZERO, Vec2::X), Some(Vec2::X));
    }

    #[test]
    fn test_walls_block_sight() {
        let targets = vec![SightTarget::new("Player", Vec2::new(4.5, 0.5))];
        let mut grid = Grid::new(10, 10, 1.0);
        grid.set_wall(2, 0, true);

        let probe = SightProbe::new(&targets, VisionConfig::default()).with_walls(&grid);
        assert!(probe.find("Player", Vec2::new(0.5, 0.5), Vec2::X).is_none());

        grid.set_wall(2, 0, false);
        let probe = SightProbe::new(&targets, VisionConfig::default()).with_walls(&grid);
        assert_eq!(
            probe.find("Player", Vec2::new(0.5, 0.5), Vec2::X),
            Some(Vec2::new(4.5, 0.5))
        );
    }

    #[test]
    fn test_grid_outside_is_open() {
        let grid = Grid::new(2, 2, 1.0).with_origin(Vec2::new(10.0, 10.0));
        assert!(!grid.is_wall(-1, 0));
        assert!(!grid.is_wall(5, 5));
        assert!(grid.line_of_sight(Vec2::ZERO, Vec2::new(3.0, 3.0)));
    }

    #[test]
    fn test_degenerate_cell_size_never_blocks() {
        for cell_size in [0.0, -1.0, f32::NAN] {
            let mut grid = Grid::new(4, 4, cell_size);
            grid.set_wall(1, 0, true);
            assert!(grid.line_of_sight(Vec2::ZERO, Vec2::new(600.0, 0.0)));
        }
    }

    #[test]
    fn test_long_sight_line_samples_only_inside_grid() {
        let mut grid = Grid::new(4, 4, 1.0);
        grid.set_wall(2, 0, true);

        // Kilometres of open ground either side of a small walled grid
        let from = Vec2::new(-1.0e6, 0.5);
        let to = Vec2::new(1.0e6, 0.5);
        assert!(!grid.line_of_sight(from, to));
        assert!(grid.line_of_sight(from + Vec2::Y * 2.0, to + Vec2::Y * 2.0));

        let (start, end) = grid
            .clip(Vec2::new(-1000.0, 0.5), Vec2::new(1000.0, 0.5))
            .unwrap();
        assert!((start - Vec2::new(0.0, 0.5)).length() < 1e-2);
        assert!((end - Vec2::new(4.0, 0.5)).length() < 1e-2);
        assert!(grid.clip(Vec2::new(-5.0, 9.0), Vec2::new(9.0, 9.0)).is_none());
    }

    #[test]
    fn test_blind_sees_nothing() {
        assert!(Blind.find("Player", Vec2::ZERO, Vec2::X).is_none());
    }
}
