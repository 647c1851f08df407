use thiserror::Error;

/// Faults raised by the transform, the planner and the travel-limit checks.
///
/// Every variant is terminal for the call that produced it; nothing in this
/// crate retries or returns a partial result.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum Error {
    #[error(
        "kinematic singularity at A={a_deg} C={c_deg}: |cos(A)|={cos_a:.5} below threshold {threshold}"
    )]
    KinematicSingularity {
        a_deg: f64,
        c_deg: f64,
        cos_a: f64,
        threshold: f64,
    },

    #[error("singularity in path at t={t:.6} (A={a_deg:.4} C={c_deg:.4})")]
    SingularityInPath { t: f64, a_deg: f64, c_deg: f64 },

    #[error(
        "tolerance {tolerance} mm unreachable within {max_segments} segments (error {error:.6} mm)"
    )]
    ToleranceUnreachable {
        tolerance: f64,
        max_segments: u32,
        error: f64,
    },

    #[error("invalid tolerance {0}: must be finite and positive")]
    InvalidTolerance(f64),

    #[error("invalid segment limit {0}: must be at least 1")]
    InvalidSegmentLimit(u32),

    #[error("invalid move: coordinates and angles must be finite")]
    InvalidMove,

    #[error("motor position ({mx:.3}, {my:.3}, {mz:.3}) outside travel limits")]
    TravelLimit { mx: f64, my: f64, mz: f64 },
}

impl Error {
    /// Singularity faults require operator intervention; the others are
    /// caller configuration problems.
    pub fn is_singularity(&self) -> bool {
        matches!(
            self,
            Error::KinematicSingularity { .. } | Error::SingularityInPath { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
