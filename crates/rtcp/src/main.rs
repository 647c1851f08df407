use anyhow::Result;
use clap::{Parser, Subcommand};

mod cli;
mod config;
mod job;

fn main() -> Result<()> {
    let cli = Cli::parse();
    cli::init_tracing();
    match cli.command {
        Command::Plan(args) => args.run(),
        Command::Transform(args) => args.run(),
        Command::Status(args) => args.run(),
    }
}

#[derive(Parser)]
#[command(name = "rtcp", about = "Tool center point compensation for AC table machines")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Segment the moves of a waypoint job and print motor anchors.
    Plan(cli::plan::PlanArgs),
    /// Map a single pose between tool and motor coordinates.
    Transform(cli::transform::TransformArgs),
    /// Show the diagnostic report for a motor position.
    Status(cli::status::StatusArgs),
}
