//! Rotation tool center point compensation for A-on-C trunnion tables.
//!
//! Commanded tool positions are mapped into linear motor coordinates, and
//! every move is split into as few motor-space segments as keep the tool
//! within tolerance of the commanded straight line.
//!
//! This crate has no I/O; configuration loading and output live in the
//! `rtcp` binary.

pub mod error;
pub mod kinematics;
pub mod limits;
pub mod motion;
pub mod params;
pub mod planner;
pub mod report;
pub mod segment_line;

pub use error::{Error, Result};
pub use kinematics::{Kinematics, ModeKin, RtcpMode, forward, inverse};
pub use motion::{Coord, MotionState, MotorPose, Segment};
pub use params::{MachineParameters, ParameterStore};
pub use planner::{PlannerConfig, SegmentPlanner, plan};
