//! Soft travel limits evaluated in motor space.
//!
//! With compensation active the commanded coordinates say little about where
//! the linear axes actually go, so limits are checked after the inverse
//! transform.

use crate::{
    error::{Error, Result},
    kinematics::Kinematics,
    motion::{MotionState, MotorPose, Segment},
};
use serde::{Deserialize, Serialize};

/// Bisection steps when shortening a jog; resolves to 1/65536 of the move
pub const BISECTION_ITERATIONS: u32 = 16;

/// Allowed motor travel, inclusive on both ends
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorkEnvelope {
    pub min: MotorPose,
    pub max: MotorPose,
}

impl WorkEnvelope {
    pub fn new(min: MotorPose, max: MotorPose) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, motor: &MotorPose) -> bool {
        (self.min.mx..=self.max.mx).contains(&motor.mx)
            && (self.min.my..=self.max.my).contains(&motor.my)
            && (self.min.mz..=self.max.mz).contains(&motor.mz)
    }

    pub fn check(&self, motor: &MotorPose) -> Result<()> {
        if self.contains(motor) {
            Ok(())
        } else {
            Err(Error::TravelLimit {
                mx: motor.mx,
                my: motor.my,
                mz: motor.mz,
            })
        }
    }

    /// Transform `state` and check the resulting motor position
    pub fn check_tcp<K: Kinematics>(&self, state: &MotionState, kin: &K) -> Result<MotorPose> {
        let motor = kin.inverse(state)?;
        self.check(&motor)?;
        Ok(motor)
    }

    /// Farthest point towards `to` that stays inside the envelope.
    ///
    /// `from` has to be reachable. Points are searched along the command-space
    /// line, so the result lies on the requested jog direction. Only travel
    /// limits shorten a jog; a singular pose on the way fails the whole jog.
    pub fn clamp_jog<K: Kinematics>(
        &self,
        from: &MotionState,
        to: &MotionState,
        kin: &K,
    ) -> Result<MotionState> {
        self.check_tcp(from, kin)?;

        let path = Segment::new(*from, *to);
        if let Some(t) = kin.first_unsafe_in_sweep(from, to) {
            let at = path.at(t);
            return Err(Error::SingularityInPath {
                t,
                a_deg: at.a_deg,
                c_deg: at.c_deg,
            });
        }

        if self.reachable(to, kin)? {
            return Ok(*to);
        }

        let (mut lo, mut hi) = (0.0, 1.0);
        let mut best = *from;
        for _ in 0..BISECTION_ITERATIONS {
            let t = (lo + hi) * 0.5;
            let state = path.at(t);
            if self.reachable(&state, kin)? {
                best = state;
                lo = t;
            } else {
                hi = t;
            }
        }

        tracing::debug!(t = lo, ?best, "jog clamped to travel limits");
        Ok(best)
    }

    /// `Ok(false)` when `state` is only outside the envelope; other faults
    /// are passed on.
    fn reachable<K: Kinematics>(&self, state: &MotionState, kin: &K) -> Result<bool> {
        match self.check_tcp(state, kin) {
            Ok(_) => Ok(true),
            Err(Error::TravelLimit { .. }) => Ok(false),
            Err(err) => Err(err),
        }
    }
}
