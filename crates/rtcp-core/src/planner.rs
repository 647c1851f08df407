//! Adaptive segmentation of commanded moves.
//!
//! Motor controllers interpolate linearly between anchor points while the
//! TCP -> motor transform is trigonometric and contains products of linear
//! and rotary inputs (X·sin(C) and friends). The planner picks the smallest
//! power-of-two number of equal segments for which the tool center point
//! reached halfway between every pair of motor anchors stays within
//! tolerance of the commanded straight line.
//!
//! Each candidate is evaluated with the real transform at the segment
//! midpoints, so chord error of either rotary axis and linear/rotary
//! cross-coupling are all captured by the same measurement. Feedrate plays no
//! part.

use crate::{
    error::{Error, Result},
    kinematics::{Kinematics, TableTableKin},
    motion::{Coord, MotionState, MotorPose, Segment},
    params::MachineParameters,
};
use serde::{Deserialize, Serialize};

/// Feed move tolerance (10 µm)
pub const DEFAULT_TOLERANCE_MM: f64 = 0.01;
/// Rapid moves trade accuracy for fewer segments
pub const DEFAULT_RAPID_TOLERANCE_MM: f64 = 0.5;
pub const DEFAULT_MAX_SEGMENTS: u32 = 1024;

fn default_tolerance() -> f64 {
    DEFAULT_TOLERANCE_MM
}

fn default_rapid_tolerance() -> f64 {
    DEFAULT_RAPID_TOLERANCE_MM
}

fn default_max_segments() -> u32 {
    DEFAULT_MAX_SEGMENTS
}

/// Segmentation settings
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// Maximum TCP deviation for feed moves
    #[serde(default = "default_tolerance")]
    pub tolerance_mm: f64,

    /// Maximum TCP deviation for rapid moves
    #[serde(default = "default_rapid_tolerance")]
    pub rapid_tolerance_mm: f64,

    /// Upper bound on segments per move. Bounds the worst-case number of
    /// transform calls of one planning call.
    #[serde(default = "default_max_segments")]
    pub max_segments: u32,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            tolerance_mm: default_tolerance(),
            rapid_tolerance_mm: default_rapid_tolerance(),
            max_segments: default_max_segments(),
        }
    }
}

impl PlannerConfig {
    pub fn tolerance_for(&self, rapid: bool) -> f64 {
        if rapid {
            self.rapid_tolerance_mm
        } else {
            self.tolerance_mm
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_tolerance(self.tolerance_mm)?;
        validate_tolerance(self.rapid_tolerance_mm)?;
        validate_max_segments(self.max_segments)
    }
}

fn validate_tolerance(tolerance_mm: f64) -> Result<()> {
    if tolerance_mm.is_finite() && tolerance_mm > 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidTolerance(tolerance_mm))
    }
}

fn validate_move(segment: &Segment) -> Result<()> {
    if segment.is_finite() {
        Ok(())
    } else {
        Err(Error::InvalidMove)
    }
}

fn validate_max_segments(max_segments: u32) -> Result<()> {
    if max_segments >= 1 {
        Ok(())
    } else {
        Err(Error::InvalidSegmentLimit(max_segments))
    }
}

/// Outcome of a successful planning call
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Plan {
    /// Power-of-two segment count
    pub segments: u32,
    /// Worst midpoint deviation at that count
    pub max_error: f64,
    /// Number of candidate counts probed, including the accepted one
    pub candidates: u32,
}

/// States of one planning call. Starts at `Probing(1)`; `Converged` and
/// `Faulted` are terminal.
#[derive(Clone, Debug, PartialEq)]
pub enum PlanState {
    Probing(u32),
    Converged(Plan),
    Faulted(Error),
}

/// Doubling search for the segment count of a move.
///
/// Holds no state between calls; concurrent planning on one planner is fine.
#[derive(Clone, Copy, Debug)]
pub struct SegmentPlanner<K> {
    kin: K,
    config: PlannerConfig,
}

impl<K: Kinematics> SegmentPlanner<K> {
    pub fn new(kin: K, max_segments: u32) -> Self {
        Self {
            kin,
            config: PlannerConfig {
                max_segments,
                ..PlannerConfig::default()
            },
        }
    }

    pub fn with_config(kin: K, config: PlannerConfig) -> Self {
        Self { kin, config }
    }

    pub fn kinematics(&self) -> &K {
        &self.kin
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Plan a feed or rapid move with the configured tolerance
    pub fn plan_move(&self, segment: &Segment, rapid: bool) -> Result<Plan> {
        self.plan(segment, self.config.tolerance_for(rapid))
    }

    /// Smallest power-of-two segment count whose worst midpoint deviation is
    /// at most `tolerance_mm`.
    pub fn plan(&self, segment: &Segment, tolerance_mm: f64) -> Result<Plan> {
        validate_tolerance(tolerance_mm)?;
        validate_max_segments(self.config.max_segments)?;
        validate_move(segment)?;

        let (start, end) = (&segment.start, &segment.end);
        if let Some(t) = self.kin.first_unsafe_in_sweep(start, end) {
            let err = in_path(t, &segment.at(t));
            tracing::warn!(%err, "move crosses singular pose");
            return Err(err);
        }

        let mut state = PlanState::Probing(1);
        let mut candidates = 0;
        loop {
            state = match state {
                PlanState::Probing(n) => {
                    candidates += 1;
                    self.step(segment, tolerance_mm, n, candidates)
                }
                PlanState::Converged(plan) => {
                    tracing::debug!(
                        segments = plan.segments,
                        error = plan.max_error,
                        candidates = plan.candidates,
                        "segmentation converged"
                    );
                    return Ok(plan);
                }
                PlanState::Faulted(err) => {
                    tracing::warn!(%err, "segmentation faulted");
                    return Err(err);
                }
            };
        }
    }

    fn step(&self, segment: &Segment, tolerance_mm: f64, n: u32, candidates: u32) -> PlanState {
        let error = match self.probe(segment, n) {
            Ok(error) => error,
            Err(err) => return PlanState::Faulted(err),
        };
        tracing::debug!(segments = n, error, tolerance_mm, "probed candidate");

        if error <= tolerance_mm {
            return PlanState::Converged(Plan {
                segments: n,
                max_error: error,
                candidates,
            });
        }

        match n.checked_mul(2) {
            Some(next) if next <= self.config.max_segments => PlanState::Probing(next),
            _ => PlanState::Faulted(Error::ToleranceUnreachable {
                tolerance: tolerance_mm,
                max_segments: self.config.max_segments,
                error,
            }),
        }
    }

    /// Worst midpoint deviation over `n` equal segments.
    ///
    /// Samples are visited in path order, so a singular pose is reported at
    /// the first place it is met.
    pub fn probe(&self, segment: &Segment, n: u32) -> Result<f64> {
        let n = n.max(1);
        let step = 1.0 / n as f64;
        let mut start = self.motor_at(segment, 0.0)?;
        let mut worst = 0.0f64;

        for i in 0..n {
            let t0 = i as f64 * step;
            let t1 = if i + 1 == n { 1.0 } else { (i + 1) as f64 * step };
            let tm = (t0 + t1) * 0.5;

            let ideal = segment.at(tm);
            self.check(tm, &ideal)?;
            let end = self.motor_at(segment, t1)?;

            let reached = self.reached(&start, &end, &ideal, tm)?;
            let error = reached.distance(&ideal.tcp);
            // NaN must survive a later finite value
            if error.is_nan() || error > worst {
                worst = error;
            }
            start = end;
        }

        Ok(worst)
    }

    /// Deviation vector (reached - commanded) halfway through the piece of
    /// `segment` between `t0` and `t1`, if it were executed as one linear
    /// motor move.
    pub fn midpoint_deviation(&self, segment: &Segment, t0: f64, t1: f64) -> Result<Coord> {
        let start = self.motor_at(segment, t0)?;
        let tm = (t0 + t1) * 0.5;
        let ideal = segment.at(tm);
        self.check(tm, &ideal)?;
        let end = self.motor_at(segment, t1)?;
        let reached = self.reached(&start, &end, &ideal, tm)?;
        Ok(Coord {
            x: reached.x - ideal.tcp.x,
            y: reached.y - ideal.tcp.y,
            z: reached.z - ideal.tcp.z,
        })
    }

    fn reached(
        &self,
        start: &MotorPose,
        end: &MotorPose,
        ideal: &MotionState,
        t: f64,
    ) -> Result<Coord> {
        let interpolated = start.midpoint(end);
        self.kin
            .forward(&interpolated, ideal.a_deg, ideal.c_deg)
            .map_err(|err| into_path_error(err, t))
    }

    fn motor_at(&self, segment: &Segment, t: f64) -> Result<MotorPose> {
        let state = segment.at(t);
        self.check(t, &state)?;
        self.kin
            .inverse(&state)
            .map_err(|err| into_path_error(err, t))
    }

    fn check(&self, t: f64, state: &MotionState) -> Result<()> {
        self.kin
            .check_angles(state.a_deg, state.c_deg)
            .map_err(|err| into_path_error(err, t))
    }
}

fn in_path(t: f64, state: &MotionState) -> Error {
    Error::SingularityInPath {
        t,
        a_deg: state.a_deg,
        c_deg: state.c_deg,
    }
}

fn into_path_error(err: Error, t: f64) -> Error {
    match err {
        Error::KinematicSingularity { a_deg, c_deg, .. } => {
            Error::SingularityInPath { t, a_deg, c_deg }
        }
        other => other,
    }
}

/// Segment count for a move on an A-on-C table machine
pub fn plan(
    segment: &Segment,
    tolerance_mm: f64,
    params: &MachineParameters,
    max_segments: u32,
) -> Result<u32> {
    SegmentPlanner::new(TableTableKin::new(*params), max_segments)
        .plan(segment, tolerance_mm)
        .map(|plan| plan.segments)
}
