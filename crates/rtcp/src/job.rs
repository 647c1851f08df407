use crate::config::parse_by_extension;
use anyhow::{Context, Result};
use rtcp_core::{MotionState, Segment};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

/// A commanded pose in a job file
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub z: f64,
    #[serde(default)]
    pub a: f64,
    #[serde(default)]
    pub c: f64,
    /// Reach this waypoint with a rapid move
    #[serde(default)]
    pub rapid: bool,
}

impl Waypoint {
    pub fn state(&self) -> MotionState {
        MotionState::new(self.x, self.y, self.z, self.a, self.c)
    }
}

/// A sequence of waypoints executed as straight commanded moves
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub waypoints: Vec<Waypoint>,
}

/// One move between consecutive waypoints
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Move {
    pub segment: Segment,
    pub rapid: bool,
}

impl Job {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read job file {}", path.display()))?;
        let job: Self = parse_by_extension(path, &content)?;
        job.validate()?;
        Ok(job)
    }

    pub fn validate(&self) -> Result<()> {
        if self.waypoints.len() < 2 {
            anyhow::bail!("a job needs at least two waypoints");
        }
        for (i, wp) in self.waypoints.iter().enumerate() {
            if !wp.state().is_finite() {
                anyhow::bail!("waypoint {i} has a non-finite coordinate");
            }
        }
        Ok(())
    }

    /// Moves in execution order; each takes its rapid flag from its target
    pub fn moves(&self) -> impl Iterator<Item = Move> + '_ {
        self.waypoints.windows(2).map(|pair| Move {
            segment: Segment::new(pair[0].state(), pair[1].state()),
            rapid: pair[1].rapid,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parses_waypoints() {
        let job: Job = toml::from_str(
            r#"
[[waypoints]]
x = 0.0

[[waypoints]]
x = 100.0
c = 30.0

[[waypoints]]
z = 50.0
a = -15.0
rapid = true
"#,
        )
        .unwrap();
        job.validate().unwrap();

        let moves: Vec<_> = job.moves().collect();
        assert_eq!(moves.len(), 2);
        assert_eq!(moves[0].segment.end, MotionState::new(100.0, 0.0, 0.0, 0.0, 30.0));
        assert!(!moves[0].rapid);
        assert!(moves[1].rapid);
    }

    #[test]
    fn rejects_single_waypoint() {
        let job = Job {
            waypoints: vec![Waypoint {
                x: 1.0,
                y: 0.0,
                z: 0.0,
                a: 0.0,
                c: 0.0,
                rapid: false,
            }],
        };
        assert!(job.validate().is_err());
    }

    #[test]
    fn rejects_non_finite_waypoint() {
        let text = "[[waypoints]]\n\n[[waypoints]]\nx = nan\n";
        let job: Job = toml::from_str(text).unwrap();
        let err = job.validate().unwrap_err();
        assert!(err.to_string().contains("waypoint 1"), "{err}");
    }

    #[test]
    fn loads_json_job() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"{{ "waypoints": [ {{ "x": 1.0 }}, {{ "y": 2.0, "rapid": true }} ] }}"#
        )
        .unwrap();
        let job = Job::from_file(file.path()).unwrap();
        assert_eq!(job.waypoints[1].y, 2.0);
        assert!(job.waypoints[1].rapid);
    }
}
