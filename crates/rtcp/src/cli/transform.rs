use crate::{
    cli::{PoseArgs, load_config},
    config::Config,
};
use anyhow::{Context, Result};
use clap::Args;
use rtcp_core::{Coord, Kinematics, MotionState, MotorPose};
use std::{
    io::{self, Write},
    path::PathBuf,
};

#[derive(Args)]
pub struct TransformArgs {
    /// Path to the machine configuration (TOML or JSON).
    pub config: PathBuf,

    #[command(flatten)]
    pub pose: PoseArgs,

    /// Treat X/Y/Z as motor coordinates and compute the tool position.
    #[arg(long)]
    pub forward: bool,
}

impl TransformArgs {
    pub fn run(&self) -> Result<()> {
        let config = load_config(&self.config)?;
        let stdout = io::stdout();
        execute(&config, &self.pose, self.forward, &mut stdout.lock())
    }
}

pub fn execute<W: Write>(
    config: &Config,
    pose: &PoseArgs,
    forward: bool,
    out: &mut W,
) -> Result<()> {
    let kin = config.kinematics();

    let result = if forward {
        let motor = MotorPose::new(pose.x, pose.y, pose.z);
        kin.forward(&motor, pose.a, pose.c)
            .context("forward transform failed")?
    } else {
        let state = MotionState::new(pose.x, pose.y, pose.z, pose.a, pose.c);
        let motor = kin.inverse(&state).context("inverse transform failed")?;
        if let Some(Err(err)) = config.limits.as_ref().map(|limits| limits.check(&motor)) {
            tracing::warn!(%err, "motor position outside travel limits");
        }
        motor.as_coord()
    };

    write_pose(out, &result, pose)?;
    Ok(())
}

fn write_pose<W: Write>(out: &mut W, p: &Coord, pose: &PoseArgs) -> io::Result<()> {
    writeln!(
        out,
        "X{:.4} Y{:.4} Z{:.4} A{:.4} C{:.4}",
        p.x, p.y, p.z, pose.a, pose.c
    )
}
