// Identity kinematics - compensation switched off

use crate::{
    error::Result,
    kinematics::Kinematics,
    motion::{Coord, MotionState, MotorPose},
};

/// Motors follow the commanded coordinates directly. Rotary angles are
/// passed through to their joints and never fault.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IdentityKin;

impl Kinematics for IdentityKin {
    fn inverse(&self, state: &MotionState) -> Result<MotorPose> {
        Ok(MotorPose::from(state.tcp))
    }

    fn forward(&self, motor: &MotorPose, _a_deg: f64, _c_deg: f64) -> Result<Coord> {
        Ok(motor.as_coord())
    }
}
