// A-on-C table kinematics (trunnion table: A tilts about X, C turns about Z)

use crate::{
    error::Result,
    kinematics::Kinematics,
    motion::{Coord, MotionState, MotorPose},
    params::MachineParameters,
};

/// sin/cos of one rotary pose, evaluated once and shared by both directions
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RotaryTrig {
    pub sin_a: f64,
    pub cos_a: f64,
    pub sin_c: f64,
    pub cos_c: f64,
}

impl RotaryTrig {
    pub fn new(a_deg: f64, c_deg: f64) -> Self {
        let (sin_a, cos_a) = a_deg.to_radians().sin_cos();
        let (sin_c, cos_c) = c_deg.to_radians().sin_cos();
        Self {
            sin_a,
            cos_a,
            sin_c,
            cos_c,
        }
    }
}

/// Tool center point compensation for a trunnion table.
///
/// The table turns under a stationary tool, so the inverse applies +C to the
/// pivot-centered point and then A about X. The Y/Z axis offsets and the tool
/// length offset only enter through the A stage.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TableTableKin {
    params: MachineParameters,
}

impl TableTableKin {
    pub fn new(params: MachineParameters) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &MachineParameters {
        &self.params
    }

    /// Inverse transform with precomputed trigonometry; no guard check
    pub fn inverse_with(&self, tcp: &Coord, trig: &RotaryTrig) -> MotorPose {
        let p = &self.params;
        let dy = p.axis_offset_y;
        let dz = p.effective_offset_z();

        let px = tcp.x - p.pivot_x;
        let py = tcp.y - p.pivot_y;
        let pz = tcp.z - p.pivot_z;

        // C about Z
        let xc = px * trig.cos_c - py * trig.sin_c;
        let yc = px * trig.sin_c + py * trig.cos_c;

        // A about X around the offset axis
        let y_rot = (yc - dy) * trig.cos_a - (pz - dz) * trig.sin_a + dy;
        let z_rot = (yc - dy) * trig.sin_a + (pz - dz) * trig.cos_a + dz;

        MotorPose {
            mx: xc + p.pivot_x,
            my: y_rot + p.pivot_y,
            mz: z_rot + p.pivot_z,
        }
    }

    /// Forward transform with precomputed trigonometry; no guard check
    pub fn forward_with(&self, motor: &MotorPose, trig: &RotaryTrig) -> Coord {
        let p = &self.params;
        let dy = p.axis_offset_y;
        let dz = p.effective_offset_z();

        let xm = motor.mx - p.pivot_x;
        let ym = motor.my - dy - p.pivot_y;
        let zm = motor.mz - dz - p.pivot_z;

        // Undo A
        let yc = trig.cos_a * ym + trig.sin_a * zm + dy;
        let pz = -trig.sin_a * ym + trig.cos_a * zm + dz;

        // Undo C
        let px = trig.cos_c * xm + trig.sin_c * yc;
        let py = -trig.sin_c * xm + trig.cos_c * yc;

        Coord {
            x: px + p.pivot_x,
            y: py + p.pivot_y,
            z: pz + p.pivot_z,
        }
    }
}

fn is_home_pose(a_deg: f64, c_deg: f64) -> bool {
    a_deg == 0.0 && c_deg == 0.0
}

impl Kinematics for TableTableKin {
    fn inverse(&self, state: &MotionState) -> Result<MotorPose> {
        self.check_angles(state.a_deg, state.c_deg)?;
        if is_home_pose(state.a_deg, state.c_deg) {
            return Ok(MotorPose::from(state.tcp));
        }
        let trig = RotaryTrig::new(state.a_deg, state.c_deg);
        Ok(self.inverse_with(&state.tcp, &trig))
    }

    fn forward(&self, motor: &MotorPose, a_deg: f64, c_deg: f64) -> Result<Coord> {
        self.check_angles(a_deg, c_deg)?;
        if is_home_pose(a_deg, c_deg) {
            return Ok(motor.as_coord());
        }
        let trig = RotaryTrig::new(a_deg, c_deg);
        Ok(self.forward_with(motor, &trig))
    }

    fn check_angles(&self, a_deg: f64, c_deg: f64) -> Result<()> {
        self.params.guard.check(a_deg, c_deg)
    }

    fn first_unsafe_in_sweep(&self, start: &MotionState, end: &MotionState) -> Option<f64> {
        self.params
            .guard
            .first_unsafe_in_sweep(start.a_deg, end.a_deg)
    }
}
