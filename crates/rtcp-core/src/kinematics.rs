// Kinematic transforms between tool center point and motor space

use crate::{
    error::Result,
    motion::{Coord, MotionState, MotorPose},
    params::MachineParameters,
};
use serde::{Deserialize, Serialize};

pub mod identity;
pub mod singularity;
pub mod table_table;

pub use identity::IdentityKin;
pub use singularity::SingularityGuard;
pub use table_table::TableTableKin;

/// A TCP <-> motor transform for one machine topology.
///
/// The segment planner only talks to this trait, so a different 5-axis
/// arrangement plugs in without touching the segmentation algorithm.
pub trait Kinematics {
    /// Motor pose that places the tool center point at `state`
    fn inverse(&self, state: &MotionState) -> Result<MotorPose>;

    /// Tool center point reached by `motor` at the given rotary angles
    fn forward(&self, motor: &MotorPose, a_deg: f64, c_deg: f64) -> Result<Coord>;

    /// Reject rotary poses this topology cannot use
    fn check_angles(&self, _a_deg: f64, _c_deg: f64) -> Result<()> {
        Ok(())
    }

    /// First path parameter at which a linear rotary sweep becomes unusable
    fn first_unsafe_in_sweep(&self, _start: &MotionState, _end: &MotionState) -> Option<f64> {
        None
    }
}

impl<K: Kinematics + ?Sized> Kinematics for &K {
    fn inverse(&self, state: &MotionState) -> Result<MotorPose> {
        (**self).inverse(state)
    }

    fn forward(&self, motor: &MotorPose, a_deg: f64, c_deg: f64) -> Result<Coord> {
        (**self).forward(motor, a_deg, c_deg)
    }

    fn check_angles(&self, a_deg: f64, c_deg: f64) -> Result<()> {
        (**self).check_angles(a_deg, c_deg)
    }

    fn first_unsafe_in_sweep(&self, start: &MotionState, end: &MotionState) -> Option<f64> {
        (**self).first_unsafe_in_sweep(start, end)
    }
}

/// Whether tool center point compensation is applied
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RtcpMode {
    /// Plain cartesian machine: motor coordinates equal the command
    #[default]
    Disabled,
    Enabled,
}

impl RtcpMode {
    pub fn is_enabled(&self) -> bool {
        matches!(self, RtcpMode::Enabled)
    }
}

/// Kinematics selected by the current [`RtcpMode`]
#[derive(Clone, Copy, Debug)]
pub enum ModeKin {
    Identity(IdentityKin),
    TableTable(TableTableKin),
}

impl ModeKin {
    pub fn new(mode: RtcpMode, params: MachineParameters) -> Self {
        match mode {
            RtcpMode::Disabled => ModeKin::Identity(IdentityKin),
            RtcpMode::Enabled => ModeKin::TableTable(TableTableKin::new(params)),
        }
    }

    pub fn mode(&self) -> RtcpMode {
        match self {
            ModeKin::Identity(_) => RtcpMode::Disabled,
            ModeKin::TableTable(_) => RtcpMode::Enabled,
        }
    }
}

impl Kinematics for ModeKin {
    fn inverse(&self, state: &MotionState) -> Result<MotorPose> {
        match self {
            ModeKin::Identity(k) => k.inverse(state),
            ModeKin::TableTable(k) => k.inverse(state),
        }
    }

    fn forward(&self, motor: &MotorPose, a_deg: f64, c_deg: f64) -> Result<Coord> {
        match self {
            ModeKin::Identity(k) => k.forward(motor, a_deg, c_deg),
            ModeKin::TableTable(k) => k.forward(motor, a_deg, c_deg),
        }
    }

    fn check_angles(&self, a_deg: f64, c_deg: f64) -> Result<()> {
        match self {
            ModeKin::Identity(k) => k.check_angles(a_deg, c_deg),
            ModeKin::TableTable(k) => k.check_angles(a_deg, c_deg),
        }
    }

    fn first_unsafe_in_sweep(&self, start: &MotionState, end: &MotionState) -> Option<f64> {
        match self {
            ModeKin::Identity(k) => k.first_unsafe_in_sweep(start, end),
            ModeKin::TableTable(k) => k.first_unsafe_in_sweep(start, end),
        }
    }
}

/// TCP pose -> motor pose for an A-on-C table machine
pub fn inverse(state: &MotionState, params: &MachineParameters) -> Result<MotorPose> {
    TableTableKin::new(*params).inverse(state)
}

/// Motor pose -> TCP position for an A-on-C table machine
pub fn forward(
    motor: &MotorPose,
    a_deg: f64,
    c_deg: f64,
    params: &MachineParameters,
) -> Result<Coord> {
    TableTableKin::new(*params).forward(motor, a_deg, c_deg)
}
