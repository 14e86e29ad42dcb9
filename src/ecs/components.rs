//! Common ECS components

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::ai::{MotionDriver, facing_from_degrees, wrap_degrees};

/// 2D transform: position plus rotation in degrees about +Z
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Transform2D {
    /// Position in world space
    pub position: Vec2,
    /// Rotation in degrees, 0 facing +X
    pub rotation: f32,
}

impl Transform2D {
    /// Create a transform with just a position
    pub fn from_position(position: Vec2) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Direction the transform faces
    pub fn forward(&self) -> Vec2 {
        facing_from_degrees(self.rotation)
    }
}

/// An actor's transform plus its walk animation flag
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ActorBody {
    pub transform: Transform2D,
    /// Whether the walk animation should play this tick
    pub walking: bool,
}

impl ActorBody {
    pub fn new(transform: Transform2D) -> Self {
        Self {
            transform,
            walking: false,
        }
    }
}

impl MotionDriver for ActorBody {
    fn position(&self) -> Vec2 {
        self.transform.position
    }

    fn set_position(&mut self, position: Vec2) {
        self.transform.position = position;
    }

    fn rotation(&self) -> f32 {
        self.transform.rotation
    }

    fn set_rotation(&mut self, degrees: f32) {
        self.transform.rotation = wrap_degrees(degrees);
    }

    fn set_walking(&mut self, walking: bool) {
        self.walking = walking;
    }

    fn facing(&self) -> Vec2 {
        self.transform.forward()
    }
}

/// Perception tag, e.g. `"Player"`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag(pub String);

impl Tag {
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }
}

/// Name component for debugging
#[derive(Debug, Clone)]
pub struct Name(pub String);

impl Name {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transform_forward() {
        let transform = Transform2D {
            position: Vec2::ZERO,
            rotation: 90.0,
        };
        assert!((transform.forward() - Vec2::Y).length() < 1e-5);
    }

    #[test]
    fn test_actor_body_drives_transform() {
        let mut body = ActorBody::default();
        body.set_position(Vec2::new(1.0, 2.0));
        body.set_rotation(450.0);
        body.set_walking(true);

        assert_eq!(body.transform.position, Vec2::new(1.0, 2.0));
        assert!((body.rotation() - 90.0).abs() < 1e-4);
        assert!((body.facing() - Vec2::Y).length() < 1e-5);
        assert!(body.walking);
    }
}
