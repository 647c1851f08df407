use crate::{cli::load_config, config::Config, job::Job};
use anyhow::{Context, Result};
use clap::Args;
use rtcp_core::segment_line::Anchor;
use std::{
    io::{self, Write},
    path::PathBuf,
};

#[derive(Args)]
pub struct PlanArgs {
    /// Path to the machine configuration (TOML or JSON).
    pub config: PathBuf,

    /// Path to the job file with `waypoints` (TOML or JSON).
    pub job: PathBuf,

    /// Print anchors as JSON lines instead of text.
    #[arg(long)]
    pub json: bool,
}

impl PlanArgs {
    pub fn run(&self) -> Result<()> {
        let config = load_config(&self.config)?;
        let job = Job::from_file(&self.job)?;
        let stdout = io::stdout();
        execute(&config, &job, self.json, &mut stdout.lock())
    }
}

/// Plans every move of `job` and writes its anchors.
///
/// A move is only written once all its anchors are known, so a fault never
/// leaves part of a move in the output.
pub fn execute<W: Write>(config: &Config, job: &Job, json: bool, out: &mut W) -> Result<()> {
    let planner = config.planner();
    let mut total = 0u64;

    for (i, mv) in job.moves().enumerate() {
        let number = i + 1;
        let (plan, line) = planner
            .segment_line(&mv.segment, mv.rapid)
            .with_context(|| format!("move {number} could not be planned"))?;
        let anchors = line
            .collect::<rtcp_core::Result<Vec<_>>>()
            .with_context(|| format!("move {number} could not be transformed"))?;

        if let Some(limits) = &config.limits {
            for anchor in &anchors {
                limits.check(&anchor.motor).with_context(|| {
                    format!("move {number} anchor {} exceeds travel limits", anchor.index)
                })?;
            }
        }

        tracing::info!(
            number,
            segments = plan.segments,
            max_error = plan.max_error,
            rapid = mv.rapid,
            "planned move"
        );
        total += u64::from(plan.segments);

        if json {
            for anchor in &anchors {
                serde_json::to_writer(&mut *out, anchor)?;
                writeln!(out)?;
            }
        } else {
            writeln!(
                out,
                "move {number}: {} segment(s), max error {:.6} mm{}",
                plan.segments,
                plan.max_error,
                if mv.rapid { " (rapid)" } else { "" }
            )?;
            for anchor in &anchors {
                write_anchor(out, anchor)?;
            }
        }
    }

    tracing::info!(
        moves = job.waypoints.len().saturating_sub(1),
        segments = total,
        "job planned"
    );
    Ok(())
}

fn write_anchor<W: Write>(out: &mut W, anchor: &Anchor) -> io::Result<()> {
    let t = &anchor.tcp;
    let m = &anchor.motor;
    writeln!(
        out,
        "  {:>4} X{:.4} Y{:.4} Z{:.4} A{:.4} C{:.4} -> X{:.4} Y{:.4} Z{:.4} F*{:.3}",
        anchor.index,
        t.tcp.x,
        t.tcp.y,
        t.tcp.z,
        t.a_deg,
        t.c_deg,
        m.mx,
        m.my,
        m.mz,
        anchor.feed_scale
    )
}
