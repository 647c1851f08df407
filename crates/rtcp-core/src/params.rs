//! Machine geometry and its shared snapshot store.

use crate::kinematics::singularity::SingularityGuard;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Geometry of an A-on-C table machine, in machine linear units.
///
/// Read-only once loaded. A configuration change produces a new value that is
/// published through [`ParameterStore`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MachineParameters {
    /// X of the A/C rotation center, measured from machine origin
    #[serde(default)]
    pub pivot_x: f64,
    /// Y of the A/C rotation center
    #[serde(default)]
    pub pivot_y: f64,
    /// Z of the A/C rotation center; usually the dimension that matters most
    #[serde(default)]
    pub pivot_z: f64,
    /// Active tool length offset. Participates in the A rotation.
    #[serde(default)]
    pub tool_length_offset: f64,
    /// Y offset between the A and C axes (0 when they intersect)
    #[serde(default)]
    pub axis_offset_y: f64,
    /// Z offset between the A and C axes (0 when they intersect)
    #[serde(default)]
    pub axis_offset_z: f64,
    #[serde(default, flatten)]
    pub guard: SingularityGuard,
}

impl MachineParameters {
    /// Parameters with only the pivot set
    pub fn with_pivot(pivot_x: f64, pivot_y: f64, pivot_z: f64) -> Self {
        Self {
            pivot_x,
            pivot_y,
            pivot_z,
            ..Self::default()
        }
    }

    pub fn pivot(&self) -> (f64, f64, f64) {
        (self.pivot_x, self.pivot_y, self.pivot_z)
    }

    /// Effective Z offset seen by the A rotation: axis offset plus tool length
    pub fn effective_offset_z(&self) -> f64 {
        self.axis_offset_z + self.tool_length_offset
    }

    pub fn is_finite(&self) -> bool {
        [
            self.pivot_x,
            self.pivot_y,
            self.pivot_z,
            self.tool_length_offset,
            self.axis_offset_y,
            self.axis_offset_z,
            self.guard.cos_threshold,
        ]
        .iter()
        .all(|v| v.is_finite())
    }
}

/// Publishes immutable [`MachineParameters`] snapshots.
///
/// Planning calls take one snapshot up front and use it throughout, so a
/// concurrent update is never observed half-applied.
#[derive(Debug, Default)]
pub struct ParameterStore {
    current: RwLock<Arc<MachineParameters>>,
}

impl ParameterStore {
    pub fn new(params: MachineParameters) -> Self {
        Self {
            current: RwLock::new(Arc::new(params)),
        }
    }

    pub fn snapshot(&self) -> Arc<MachineParameters> {
        self.current.read().clone()
    }

    /// Replace the current parameters, returning the previous snapshot
    pub fn publish(&self, params: MachineParameters) -> Arc<MachineParameters> {
        let next = Arc::new(params);
        tracing::debug!(?params, "publishing machine parameters");
        std::mem::replace(&mut *self.current.write(), next)
    }

    /// Derive a new snapshot from the current one
    pub fn update(&self, f: impl FnOnce(&mut MachineParameters)) -> Arc<MachineParameters> {
        let mut current = self.current.write();
        let mut next = **current;
        f(&mut next);
        *current = Arc::new(next);
        current.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_survives_publish() {
        let store = ParameterStore::new(MachineParameters::with_pivot(0.0, 0.0, 150.0));
        let before = store.snapshot();
        let previous = store.publish(MachineParameters::with_pivot(0.0, 0.0, 100.0));

        assert_eq!(before.pivot_z, 150.0);
        assert_eq!(previous.pivot_z, 150.0);
        assert_eq!(store.snapshot().pivot_z, 100.0);
    }

    #[test]
    fn update_derives_from_current() {
        let store = ParameterStore::new(MachineParameters::with_pivot(1.0, 2.0, 3.0));
        let next = store.update(|p| p.tool_length_offset = 25.0);

        assert_eq!(next.pivot(), (1.0, 2.0, 3.0));
        assert_eq!(next.tool_length_offset, 25.0);
        assert_eq!(*store.snapshot(), *next);
    }

    #[test]
    fn effective_offset_includes_tool_length() {
        let params = MachineParameters {
            axis_offset_z: 12.0,
            tool_length_offset: 30.0,
            ..MachineParameters::default()
        };
        assert_eq!(params.effective_offset_z(), 42.0);
    }

    #[test]
    fn concurrent_readers_see_whole_snapshots() {
        let store = ParameterStore::new(MachineParameters::with_pivot(0.0, 0.0, 0.0));
        std::thread::scope(|s| {
            s.spawn(|| {
                for i in 1..200 {
                    let v = i as f64;
                    store.publish(MachineParameters::with_pivot(v, v, v));
                }
            });
            for _ in 0..4 {
                s.spawn(|| {
                    for _ in 0..200 {
                        let p = store.snapshot();
                        assert_eq!(p.pivot_x, p.pivot_y);
                        assert_eq!(p.pivot_y, p.pivot_z);
                    }
                });
            }
        });
    }
}
