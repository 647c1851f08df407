//! Value types exchanged between the interpreter, the planner and the
//! motor-space interpolator.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Coord {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Coord {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Euclidean distance between two points
    pub fn distance(&self, other: &Coord) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// Arithmetic mean of two points
    pub fn midpoint(&self, other: &Coord) -> Coord {
        Coord {
            x: (self.x + other.x) * 0.5,
            y: (self.y + other.y) * 0.5,
            z: (self.z + other.z) * 0.5,
        }
    }

    pub fn lerp(&self, other: &Coord, t: f64) -> Coord {
        Coord {
            x: lerp(self.x, other.x, t),
            y: lerp(self.y, other.y, t),
            z: lerp(self.z, other.z, t),
        }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

/// Commanded pose: tool center point position plus rotary angles in degrees.
///
/// Angles are unbounded; 0° and 360° are distinct commands.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MotionState {
    pub tcp: Coord,
    pub a_deg: f64,
    pub c_deg: f64,
}

impl MotionState {
    pub const fn new(x: f64, y: f64, z: f64, a_deg: f64, c_deg: f64) -> Self {
        Self {
            tcp: Coord { x, y, z },
            a_deg,
            c_deg,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.tcp.is_finite() && self.a_deg.is_finite() && self.c_deg.is_finite()
    }

    /// Linear interpolation in command space (position and angles alike)
    pub fn lerp(&self, other: &MotionState, t: f64) -> MotionState {
        MotionState {
            tcp: self.tcp.lerp(&other.tcp, t),
            a_deg: lerp(self.a_deg, other.a_deg, t),
            c_deg: lerp(self.c_deg, other.c_deg, t),
        }
    }
}

/// Linear motor (joint) position. Rotary joints are driven directly by the
/// commanded angles and are not part of the pose.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MotorPose {
    pub mx: f64,
    pub my: f64,
    pub mz: f64,
}

impl MotorPose {
    pub const fn new(mx: f64, my: f64, mz: f64) -> Self {
        Self { mx, my, mz }
    }

    pub fn distance(&self, other: &MotorPose) -> f64 {
        self.as_coord().distance(&other.as_coord())
    }

    /// What a linear-interpolating motor controller reaches halfway between
    /// two anchors.
    pub fn midpoint(&self, other: &MotorPose) -> MotorPose {
        MotorPose::from(self.as_coord().midpoint(&other.as_coord()))
    }

    pub fn lerp(&self, other: &MotorPose, t: f64) -> MotorPose {
        MotorPose::from(self.as_coord().lerp(&other.as_coord(), t))
    }

    pub const fn as_coord(&self) -> Coord {
        Coord {
            x: self.mx,
            y: self.my,
            z: self.mz,
        }
    }
}

impl From<Coord> for MotorPose {
    fn from(c: Coord) -> Self {
        Self {
            mx: c.x,
            my: c.y,
            mz: c.z,
        }
    }
}

/// A sub-interval of a commanded move.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub start: MotionState,
    pub end: MotionState,
}

impl Segment {
    pub const fn new(start: MotionState, end: MotionState) -> Self {
        Self { start, end }
    }

    /// Command-space state at path parameter `t` in [0, 1]
    pub fn at(&self, t: f64) -> MotionState {
        self.start.lerp(&self.end, t)
    }

    /// The piece of this segment between path parameters `t0` and `t1`
    pub fn slice(&self, t0: f64, t1: f64) -> Segment {
        Segment {
            start: self.at(t0),
            end: self.at(t1),
        }
    }

    pub fn is_finite(&self) -> bool {
        self.start.is_finite() && self.end.is_finite()
    }

    /// Cartesian length of the tool center point path
    pub fn tcp_length(&self) -> f64 {
        self.start.tcp.distance(&self.end.tcp)
    }
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}
