use anyhow::{Context, Result};
use rtcp_core::{
    MachineParameters, ModeKin, PlannerConfig, RtcpMode, SegmentPlanner, limits::WorkEnvelope,
};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

/// Machine configuration for the rtcp tools
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Whether compensation is applied. Off by default, as on controller
    /// power-up.
    #[serde(default)]
    pub mode: RtcpMode,

    /// Pivot, axis offsets, tool length and singularity threshold
    #[serde(default)]
    pub machine: MachineParameters,

    /// Segmentation tolerances
    #[serde(default)]
    pub planner: PlannerConfig,

    /// Motor travel limits; unchecked when absent
    #[serde(default)]
    pub limits: Option<WorkEnvelope>,
}

impl Config {
    /// Load configuration from a file, auto-detecting TOML or JSON format
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        parse_by_extension(path, &content)
    }

    /// Parse configuration from TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).context("failed to parse config as TOML")
    }

    /// Parse configuration from JSON string
    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content).context("failed to parse config as JSON")
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if !self.machine.is_finite() {
            anyhow::bail!("machine parameters must be finite numbers");
        }

        let threshold = self.machine.guard.cos_threshold;
        if !(0.0..1.0).contains(&threshold) {
            anyhow::bail!("machine.singularity_cos_threshold must be in [0, 1), got {threshold}");
        }

        self.planner.validate().context("invalid planner settings")?;

        if let Some(limits) = &self.limits {
            let (min, max) = (limits.min, limits.max);
            if min.mx > max.mx || min.my > max.my || min.mz > max.mz {
                anyhow::bail!("limits.min must not exceed limits.max on any axis");
            }
        }

        Ok(())
    }

    /// Kinematics for the configured mode
    pub fn kinematics(&self) -> ModeKin {
        ModeKin::new(self.mode, self.machine)
    }

    pub fn planner(&self) -> SegmentPlanner<ModeKin> {
        SegmentPlanner::with_config(self.kinematics(), self.planner)
    }
}

/// Shared by the config and job loaders: pick the format from the extension,
/// preferring TOML when it is unknown.
pub fn parse_by_extension<T>(path: &Path, content: &str) -> Result<T>
where
    T: for<'de> Deserialize<'de>,
{
    let from_toml = |content: &str| -> Result<T> {
        toml::from_str(content)
            .with_context(|| format!("failed to parse {} as TOML", path.display()))
    };
    let from_json = |content: &str| -> Result<T> {
        serde_json::from_str(content)
            .with_context(|| format!("failed to parse {} as JSON", path.display()))
    };

    match path.extension().and_then(|s| s.to_str()) {
        Some("toml") => from_toml(content),
        Some("json") => from_json(content),
        _ => from_toml(content).or_else(|_| from_json(content)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_toml() {
        let toml = r#"
mode = "enabled"

[machine]
pivot_x = 1.5
pivot_z = 150.0
tool_length_offset = 42.0
axis_offset_y = 0.25
singularity_cos_threshold = 0.01

[planner]
tolerance_mm = 0.005
max_segments = 256

[limits]
min = { mx = -200.0, my = -150.0, mz = -100.0 }
max = { mx = 200.0, my = 150.0, mz = 0.0 }
"#;

        let config = Config::from_toml(toml).unwrap();
        config.validate().unwrap();
        assert_eq!(config.mode, RtcpMode::Enabled);
        assert_eq!(config.machine.pivot(), (1.5, 0.0, 150.0));
        assert_eq!(config.machine.tool_length_offset, 42.0);
        assert_eq!(config.machine.guard.cos_threshold, 0.01);
        assert_eq!(config.planner.tolerance_mm, 0.005);
        assert_eq!(config.planner.rapid_tolerance_mm, 0.5);
        assert_eq!(config.planner.max_segments, 256);
        assert_eq!(config.limits.unwrap().max.mz, 0.0);
    }

    #[test]
    fn test_parse_json() {
        let json = r#"{
            "mode": "disabled",
            "machine": { "pivot_z": 120.0, "axis_offset_z": -3.0 },
            "planner": { "rapid_tolerance_mm": 0.25 }
        }"#;

        let config = Config::from_json(json).unwrap();
        assert_eq!(config.mode, RtcpMode::Disabled);
        assert_eq!(config.machine.pivot_z, 120.0);
        assert_eq!(config.machine.axis_offset_z, -3.0);
        assert_eq!(config.planner.rapid_tolerance_mm, 0.25);
        assert!(config.limits.is_none());
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_toml("").unwrap();
        config.validate().unwrap();
        assert_eq!(config.mode, RtcpMode::Disabled);
        assert_eq!(config.machine, MachineParameters::default());
        assert_eq!(config.machine.guard.cos_threshold, 0.0087);
        assert_eq!(config.planner, PlannerConfig::default());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = Config::from_toml("[planner]\ntolerance_mm = 0.0\n").unwrap();
        assert!(config.validate().is_err());

        let config = Config::from_toml("[machine]\nsingularity_cos_threshold = 1.5\n").unwrap();
        assert!(config.validate().is_err());

        let config = Config::from_toml(concat!(
            "[limits]\n",
            "min = { mx = 10.0, my = 0.0, mz = 0.0 }\n",
            "max = { mx = 0.0, my = 1.0, mz = 1.0 }\n",
        ))
        .unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_file_detects_format() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{ "mode": "enabled", "machine": {{ "pivot_z": 99.0 }} }}"#).unwrap();
        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.machine.pivot_z, 99.0);

        // No extension: TOML first, then JSON
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "mode = \"enabled\"\n[machine]\npivot_y = 7.0\n").unwrap();
        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.machine.pivot_y, 7.0);
        assert!(config.kinematics().mode().is_enabled());
    }

    #[test]
    fn test_missing_file() {
        let err = Config::from_file("/nonexistent/rtcp.toml").unwrap_err();
        assert!(err.to_string().contains("failed to read config file"));
    }
}
