// Operator-facing status output

use crate::{
    error::Result,
    kinematics::{Kinematics, ModeKin, RtcpMode},
    motion::{MotionState, MotorPose},
    params::MachineParameters,
};
use core::fmt;
use serde::Serialize;

/// Read-only snapshot of the compensation state at one motor position
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct StatusReport {
    pub mode: RtcpMode,
    pub params: MachineParameters,
    pub tcp: MotionState,
    pub motor: MotorPose,
}

impl StatusReport {
    /// Capture the report for a motor position, deriving the TCP through the
    /// kinematics of `mode`.
    pub fn capture(
        mode: RtcpMode,
        params: MachineParameters,
        motor: MotorPose,
        a_deg: f64,
        c_deg: f64,
    ) -> Result<Self> {
        let tcp = ModeKin::new(mode, params).forward(&motor, a_deg, c_deg)?;
        Ok(Self {
            mode,
            params,
            tcp: MotionState {
                tcp,
                a_deg,
                c_deg,
            },
            motor,
        })
    }

    /// Compact tag appended to the realtime status line
    pub fn realtime_tag(&self) -> &'static str {
        if self.mode.is_enabled() {
            "|RTCP:ON"
        } else {
            "|RTCP:OFF"
        }
    }

    /// Compensation is off while the table is tilted or turned, so commanded
    /// coordinates no longer describe the tool position.
    pub fn rotary_unaligned(&self) -> bool {
        !self.mode.is_enabled() && (self.tcp.a_deg != 0.0 || self.tcp.c_deg != 0.0)
    }
}

impl fmt::Display for StatusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let p = &self.params;
        let t = &self.tcp.tcp;
        let m = &self.motor;

        writeln!(f, "RTCP status")?;
        writeln!(
            f,
            "mode: {}",
            if self.mode.is_enabled() { "ON" } else { "OFF" }
        )?;
        writeln!(
            f,
            "pivot: X={:.3} Y={:.3} Z={:.3} mm",
            p.pivot_x, p.pivot_y, p.pivot_z
        )?;
        writeln!(
            f,
            "axis offset: Y={:.3} Z={:.3} mm",
            p.axis_offset_y, p.axis_offset_z
        )?;
        writeln!(f, "tool length offset: {:.3} mm", p.tool_length_offset)?;
        writeln!(
            f,
            "singularity threshold: |cos A| < {}",
            p.guard.cos_threshold
        )?;
        writeln!(f, "TCP: X={:.3} Y={:.3} Z={:.3} mm", t.x, t.y, t.z)?;
        writeln!(f, "motor: X={:.3} Y={:.3} Z={:.3} mm", m.mx, m.my, m.mz)?;
        write!(
            f,
            "rotary: A={:.2} C={:.2} deg",
            self.tcp.a_deg, self.tcp.c_deg
        )?;
        if self.rotary_unaligned() {
            write!(f, "\nwarning: RTCP off with rotary axes not at zero")?;
        }
        Ok(())
    }
}
