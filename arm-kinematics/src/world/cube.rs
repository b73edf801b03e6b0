//! The graspable cube

use crate::core::Point3;

/// Cube state: position, size and whether the gripper holds it
#[derive(Debug, Clone, PartialEq)]
pub struct Cube {
    position: Point3,
    original: Point3,
    size: f64,
    held: bool,
}

impl Cube {
    /// Cube at its start position
    pub fn new(start: Point3, size: f64) -> Self {
        Self {
            position: start,
            original: start,
            size,
            held: false,
        }
    }

    /// Current center position
    pub fn position(&self) -> Point3 {
        self.position
    }

    /// Position the cube returns to on reset
    pub fn original_position(&self) -> Point3 {
        self.original
    }

    /// Edge length
    pub fn size(&self) -> f64 {
        self.size
    }

    /// Height of the center when resting on the ground
    pub fn rest_height(&self) -> f64 {
        self.size / 2.0
    }

    /// True while attached to the gripper
    pub fn is_held(&self) -> bool {
        self.held
    }

    pub(crate) fn set_held(&mut self, held: bool) {
        self.held = held;
    }

    pub(crate) fn move_to(&mut self, position: Point3) {
        self.position = position;
    }

    /// Drop one step toward the ground, never below the rest height
    pub(crate) fn settle(&mut self, step: f64) {
        let rest = self.rest_height();
        if self.position.z > rest {
            self.position.z = (self.position.z - step).max(rest);
        } else if self.position.z < rest {
            self.position.z = rest;
        }
    }

    pub(crate) fn restore(&mut self) {
        self.position = self.original;
        self.held = false;
    }
}
