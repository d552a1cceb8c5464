//! Core types for the freight simulation
//!
//! Ids and the 2D position model shared by every other module.

use std::fmt;

/// A unique identifier for simulation entities
/// This is a simple wrapper around a usize for type safety
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SimId(pub usize);

/// A wrapper type for field IDs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldId(pub SimId);

/// A wrapper type for warehouse IDs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WarehouseId(pub SimId);

/// A wrapper type for transporter IDs
///
/// The wrapped value is the transporter's index in the simulation's
/// processing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TransporterId(pub SimId);

/// Axis tolerance used when deciding whether two positions coincide
pub const POSITION_EPSILON: f64 = 1e-3;

/// A 2D position in the simulation
#[derive(Debug, Clone, Copy, Default)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Travel distance between two positions.
    ///
    /// Straight-line distance stands in for the length of the real route
    /// between the two points. Callers may only rely on it being symmetric,
    /// non-negative and zero for coinciding positions.
    pub fn distance(&self, other: &Position) -> f64 {
        straight_line(self, other)
    }

    pub fn lerp(&self, other: &Position, t: f64) -> Position {
        Position {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
        }
    }
}

fn straight_line(a: &Position, b: &Position) -> f64 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    (dx * dx + dy * dy).sqrt()
}

/// Positions compare equal when both axes are within [`POSITION_EPSILON`].
impl PartialEq for Position {
    fn eq(&self, other: &Self) -> bool {
        (self.x - other.x).abs() < POSITION_EPSILON && (self.y - other.y).abs() < POSITION_EPSILON
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:.1}, {:.1}]", self.x, self.y)
    }
}
