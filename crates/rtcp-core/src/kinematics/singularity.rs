// Gimbal-lock guard for the A axis

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Default |cos(A)| below which a pose is rejected (about ±0.5° around ±90°)
pub const COS_THRESHOLD: f64 = 0.0087;

fn default_cos_threshold() -> f64 {
    COS_THRESHOLD
}

/// Rejects rotary poses where C stops being an independent degree of freedom.
///
/// At A = ±90° the C rotation degenerates into a translation. The band is
/// expressed on |cos(A)|, which around each odd multiple of 90° is the same
/// as a symmetric band in angle of `asin(threshold)` degrees.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SingularityGuard {
    #[serde(
        rename = "singularity_cos_threshold",
        default = "default_cos_threshold"
    )]
    pub cos_threshold: f64,
}

impl Default for SingularityGuard {
    fn default() -> Self {
        Self {
            cos_threshold: COS_THRESHOLD,
        }
    }
}

impl SingularityGuard {
    pub fn new(cos_threshold: f64) -> Self {
        Self { cos_threshold }
    }

    pub fn is_safe(&self, a_deg: f64) -> bool {
        a_deg.to_radians().cos().abs() >= self.cos_threshold
    }

    /// Fails with [`Error::KinematicSingularity`] if the pose is inside the band
    pub fn check(&self, a_deg: f64, c_deg: f64) -> Result<()> {
        let cos_a = a_deg.to_radians().cos().abs();
        if cos_a >= self.cos_threshold {
            return Ok(());
        }
        Err(Error::KinematicSingularity {
            a_deg,
            c_deg,
            cos_a,
            threshold: self.cos_threshold,
        })
    }

    /// Half-width of the exclusion band in degrees
    pub fn band_half_width_deg(&self) -> f64 {
        self.cos_threshold.clamp(0.0, 1.0).asin().to_degrees()
    }

    /// First path parameter at which a linear A sweep from `a0` to `a1`
    /// reaches the exclusion band, if it ever does.
    pub fn first_unsafe_in_sweep(&self, a0: f64, a1: f64) -> Option<f64> {
        if !self.is_safe(a0) {
            return Some(0.0);
        }
        let end_unsafe = (!self.is_safe(a1)).then_some(1.0);
        // A threshold that lets A = 90° through leaves no band to enter
        if a0 == a1 || self.is_safe(90.0) {
            return end_unsafe;
        }

        // Bands are symmetric under negation, so sweep upward only
        let (from, to) = if a1 > a0 { (a0, a1) } else { (-a0, -a1) };
        let half = self.band_half_width_deg();

        // Lowest band center 90 + 180k whose lower edge lies at or above `from`
        let k = ((from + half - 90.0) / 180.0).ceil();
        let entry = 90.0 + 180.0 * k - half;
        if entry < to {
            Some(((entry - from) / (to - from)).clamp(0.0, 1.0))
        } else {
            end_unsafe
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_ninety_degrees() {
        let guard = SingularityGuard::default();
        assert!(guard.check(90.0, 0.0).is_err());
        assert!(guard.check(-90.0, 0.0).is_err());
        assert!(guard.check(90.0, 90.0).is_err());
        assert!(guard.check(270.0, 0.0).is_err());
    }

    #[test]
    fn threshold_boundary() {
        let guard = SingularityGuard::default();
        // cos(89.6°) ≈ 0.00698
        assert!(matches!(
            guard.check(89.6, 0.0),
            Err(Error::KinematicSingularity { .. })
        ));
        // cos(89°) ≈ 0.01745
        assert!(guard.check(89.0, 0.0).is_ok());
        assert!(guard.check(-89.0, 0.0).is_ok());
        assert!(guard.check(80.0, 0.0).is_ok());
    }

    #[test]
    fn threshold_is_configurable() {
        let strict = SingularityGuard::new(0.05);
        assert!(strict.check(88.0, 0.0).is_err());
        assert!(SingularityGuard::default().check(88.0, 0.0).is_ok());

        let disabled = SingularityGuard::new(0.0);
        assert!(disabled.check(89.99, 0.0).is_ok());
    }

    #[test]
    fn band_width_matches_threshold() {
        let half = SingularityGuard::default().band_half_width_deg();
        assert!((half - 0.4985).abs() < 1e-3, "half width {half}");
    }

    #[test]
    fn sweep_crossing_the_band() {
        let guard = SingularityGuard::default();

        // 80 -> 100 crosses 90 although both ends are safe
        let t = guard.first_unsafe_in_sweep(80.0, 100.0).unwrap();
        let a = 80.0 + 20.0 * t;
        assert!((a - (90.0 - guard.band_half_width_deg())).abs() < 1e-9);

        // Downward crossing of -90
        let t = guard.first_unsafe_in_sweep(0.0, -170.0).unwrap();
        let a = -170.0 * t;
        assert!((a + 90.0 - guard.band_half_width_deg()).abs() < 1e-9);
    }

    #[test]
    fn sweep_staying_clear() {
        let guard = SingularityGuard::default();
        assert_eq!(guard.first_unsafe_in_sweep(0.0, 45.0), None);
        assert_eq!(guard.first_unsafe_in_sweep(-89.0, 89.0), None);
        assert_eq!(guard.first_unsafe_in_sweep(91.0, 269.0), None);
        assert_eq!(guard.first_unsafe_in_sweep(30.0, 30.0), None);
    }

    #[test]
    fn sweep_starting_or_ending_inside() {
        let guard = SingularityGuard::default();
        assert_eq!(guard.first_unsafe_in_sweep(90.0, 0.0), Some(0.0));
        let t = guard.first_unsafe_in_sweep(0.0, 89.6).unwrap();
        assert!(t > 0.99 && t <= 1.0);
    }

    #[test]
    fn disabled_guard_accepts_every_sweep() {
        for threshold in [0.0, -1.0, 1e-20] {
            let guard = SingularityGuard::new(threshold);
            assert!(guard.check(90.0, 0.0).is_ok());
            assert!(guard.check(-270.0, 0.0).is_ok());
            assert_eq!(guard.first_unsafe_in_sweep(80.0, 100.0), None);
            assert_eq!(guard.first_unsafe_in_sweep(0.0, 90.0), None);
            assert_eq!(guard.first_unsafe_in_sweep(300.0, -300.0), None);
        }
    }

    #[test]
    fn sweep_agrees_with_check_on_bad_angles() {
        let guard = SingularityGuard::new(0.0);
        assert!(guard.check(f64::NAN, 0.0).is_err());
        assert_eq!(guard.first_unsafe_in_sweep(0.0, f64::NAN), Some(1.0));
        assert_eq!(guard.first_unsafe_in_sweep(f64::NAN, 0.0), Some(0.0));
    }
}
