use crate::{
    cli::{PoseArgs, load_config},
    config::Config,
};
use anyhow::{Context, Result};
use clap::Args;
use rtcp_core::{MotorPose, report::StatusReport};
use std::{
    io::{self, Write},
    path::PathBuf,
};

#[derive(Args)]
pub struct StatusArgs {
    /// Path to the machine configuration (TOML or JSON).
    pub config: PathBuf,

    /// Motor position and rotary angles to report on.
    #[command(flatten)]
    pub pose: PoseArgs,

    /// Print only the realtime status tag.
    #[arg(long)]
    pub tag: bool,
}

impl StatusArgs {
    pub fn run(&self) -> Result<()> {
        let config = load_config(&self.config)?;
        let stdout = io::stdout();
        execute(&config, &self.pose, self.tag, &mut stdout.lock())
    }
}

pub fn execute<W: Write>(config: &Config, pose: &PoseArgs, tag: bool, out: &mut W) -> Result<()> {
    let motor = MotorPose::new(pose.x, pose.y, pose.z);
    let report = StatusReport::capture(config.mode, config.machine, motor, pose.a, pose.c)
        .context("failed to evaluate tool position")?;

    if report.rotary_unaligned() {
        tracing::warn!(
            a = pose.a,
            c = pose.c,
            "RTCP off with rotary axes not at zero"
        );
    }

    if tag {
        writeln!(out, "{}", report.realtime_tag())?;
    } else {
        writeln!(out, "{report}")?;
    }
    Ok(())
}
