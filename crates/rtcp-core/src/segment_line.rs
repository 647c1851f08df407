// Anchor emission for a planned move

use crate::{
    error::Result,
    kinematics::Kinematics,
    motion::{MotionState, MotorPose, Segment},
    planner::{Plan, SegmentPlanner},
};
use serde::{Deserialize, Serialize};

/// Feed correction bounds. Segments passing very close to or far from the
/// pivot would otherwise produce extreme motor feeds.
pub const MIN_FEED_SCALE: f64 = 0.5;
pub const MAX_FEED_SCALE: f64 = 2.0;

/// TCP segment length below which no feed correction is applied
pub const MIN_SCALED_LENGTH_MM: f64 = 1e-4;

/// One motor-space target handed to the interpolator
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Anchor {
    /// 0-based position in the move
    pub index: u32,
    /// Commanded pose at this anchor
    pub tcp: MotionState,
    /// Linear motor position for `tcp`
    pub motor: MotorPose,
    /// Multiplier on the programmed feed so the tool moves at the programmed
    /// TCP speed while motors cover a different distance
    pub feed_scale: f64,
}

/// Yields the `segments` anchors of one move in path order.
///
/// The last anchor is the exact commanded endpoint. A transform fault is
/// yielded once and ends the iteration.
#[derive(Clone, Debug)]
pub struct SegmentLine<K> {
    kin: K,
    segment: Segment,
    segments: u32,
    rapid: bool,
    step_length: f64,
    next: u32,
    last_motor: MotorPose,
    done: bool,
}

impl<K: Kinematics> SegmentLine<K> {
    /// Starts a move at `segment.start`. Fails if the start pose itself
    /// cannot be transformed.
    pub fn new(kin: K, segment: Segment, segments: u32, rapid: bool) -> Result<Self> {
        let segments = segments.max(1);
        let last_motor = kin.inverse(&segment.start)?;
        Ok(Self {
            step_length: segment.tcp_length() / segments as f64,
            kin,
            segment,
            segments,
            rapid,
            next: 0,
            last_motor,
            done: false,
        })
    }

    pub fn segments(&self) -> u32 {
        self.segments
    }

    fn feed_scale(&self, motor: &MotorPose) -> f64 {
        if self.rapid || self.step_length < MIN_SCALED_LENGTH_MM {
            return 1.0;
        }
        let ratio = motor.distance(&self.last_motor) / self.step_length;
        ratio.clamp(MIN_FEED_SCALE, MAX_FEED_SCALE)
    }
}

impl<K: Kinematics> Iterator for SegmentLine<K> {
    type Item = Result<Anchor>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.next >= self.segments {
            return None;
        }

        let index = self.next;
        self.next += 1;

        let tcp = if self.next == self.segments {
            self.segment.end
        } else {
            self.segment.at(self.next as f64 / self.segments as f64)
        };

        let motor = match self.kin.inverse(&tcp) {
            Ok(motor) => motor,
            Err(err) => {
                self.done = true;
                return Some(Err(err));
            }
        };

        let feed_scale = self.feed_scale(&motor);
        self.last_motor = motor;

        Some(Ok(Anchor {
            index,
            tcp,
            motor,
            feed_scale,
        }))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.done {
            return (0, Some(0));
        }
        let remaining = (self.segments - self.next) as usize;
        (0, Some(remaining))
    }
}

impl<K: Kinematics> SegmentPlanner<K> {
    /// Plans `segment` and returns its anchors. Nothing is emitted for a move
    /// that fails to plan.
    pub fn segment_line(&self, segment: &Segment, rapid: bool) -> Result<(Plan, SegmentLine<&K>)> {
        let plan = self.plan_move(segment, rapid)?;
        let line = SegmentLine::new(self.kinematics(), *segment, plan.segments, rapid)?;
        Ok((plan, line))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::Error,
        kinematics::{IdentityKin, TableTableKin},
        params::MachineParameters,
        planner::DEFAULT_MAX_SEGMENTS,
    };

    fn kin() -> TableTableKin {
        TableTableKin::new(MachineParameters::with_pivot(0.0, 0.0, 150.0))
    }

    fn collect<K: Kinematics>(line: SegmentLine<K>) -> Vec<Anchor> {
        line.collect::<Result<Vec<_>>>().unwrap()
    }

    #[test]
    fn emits_planned_count_ending_on_target() {
        let seg = Segment::new(
            MotionState::new(0.0, 0.0, 0.0, 0.0, 0.0),
            MotionState::new(100.0, 0.0, 0.0, 0.0, 30.0),
        );
        let planner = SegmentPlanner::new(kin(), DEFAULT_MAX_SEGMENTS);
        let (plan, line) = planner.segment_line(&seg, false).unwrap();
        let anchors = collect(line);

        assert_eq!(anchors.len(), plan.segments as usize);
        let last = anchors.last().unwrap();
        assert_eq!(last.tcp, seg.end);
        assert_eq!(last.motor, kin().inverse(&seg.end).unwrap());
        for (i, anchor) in anchors.iter().enumerate() {
            assert_eq!(anchor.index, i as u32);
        }
    }

    #[test]
    fn linear_move_keeps_programmed_feed() {
        let seg = Segment::new(
            MotionState::new(0.0, 0.0, 0.0, 0.0, 0.0),
            MotionState::new(50.0, 20.0, -5.0, 0.0, 0.0),
        );
        let anchors = collect(SegmentLine::new(kin(), seg, 4, false).unwrap());
        assert_eq!(anchors.len(), 4);
        for anchor in &anchors {
            assert!((anchor.feed_scale - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn feed_scale_is_clamped() {
        // 1 mm of TCP travel while the table swings the part through 90°
        let seg = Segment::new(
            MotionState::new(100.0, 0.0, 0.0, 0.0, 0.0),
            MotionState::new(101.0, 0.0, 0.0, 0.0, 90.0),
        );
        let anchors = collect(SegmentLine::new(kin(), seg, 8, false).unwrap());
        for anchor in &anchors {
            assert_eq!(anchor.feed_scale, MAX_FEED_SCALE);
        }
    }

    #[test]
    fn rapid_and_zero_length_moves_are_unscaled() {
        let swing = Segment::new(
            MotionState::new(100.0, 0.0, 0.0, 0.0, 0.0),
            MotionState::new(101.0, 0.0, 0.0, 0.0, 90.0),
        );
        for anchor in collect(SegmentLine::new(kin(), swing, 8, true).unwrap()) {
            assert_eq!(anchor.feed_scale, 1.0);
        }

        let rotate_only = Segment::new(
            MotionState::new(100.0, 0.0, 0.0, 0.0, 0.0),
            MotionState::new(100.0, 0.0, 0.0, 0.0, 90.0),
        );
        for anchor in collect(SegmentLine::new(kin(), rotate_only, 8, false).unwrap()) {
            assert_eq!(anchor.feed_scale, 1.0);
        }
    }

    #[test]
    fn identity_emits_the_command() {
        let seg = Segment::new(
            MotionState::new(0.0, 0.0, 0.0, 0.0, 0.0),
            MotionState::new(10.0, 20.0, 30.0, 45.0, 90.0),
        );
        let planner = SegmentPlanner::new(IdentityKin, DEFAULT_MAX_SEGMENTS);
        let (plan, line) = planner.segment_line(&seg, false).unwrap();
        let anchors = collect(line);
        assert_eq!(plan.segments, 1);
        assert_eq!(anchors.len(), 1);
        assert_eq!(anchors[0].motor, MotorPose::new(10.0, 20.0, 30.0));
    }

    #[test]
    fn faulted_move_emits_nothing() {
        let seg = Segment::new(
            MotionState::new(0.0, 0.0, 0.0, 80.0, 0.0),
            MotionState::new(0.0, 0.0, 0.0, 100.0, 0.0),
        );
        let planner = SegmentPlanner::new(kin(), DEFAULT_MAX_SEGMENTS);
        let err = planner.segment_line(&seg, false).unwrap_err();
        assert!(matches!(err, Error::SingularityInPath { .. }));
    }

    #[test]
    fn transform_fault_ends_iteration() {
        // Built directly, bypassing the planner's checks
        let seg = Segment::new(
            MotionState::new(0.0, 0.0, 0.0, 0.0, 0.0),
            MotionState::new(0.0, 0.0, 0.0, 180.0, 0.0),
        );
        let mut line = SegmentLine::new(kin(), seg, 2, false).unwrap();
        assert!(matches!(line.next(), Some(Err(Error::KinematicSingularity { .. }))));
        assert!(line.next().is_none());
    }
}
