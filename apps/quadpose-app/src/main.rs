//! Quadpose body pose controller CLI.
//!
//! Provides three modes of operation:
//! - `run`: Run the control loop against a loopback robot, driven from stdin
//! - `defaults`: Print the default configuration as TOML
//! - `info`: Print workspace crate versions and the loaded configuration

mod console;
mod loopback;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use log::info;

use quadpose_control::prelude::*;
use quadpose_core::prelude::*;
use quadpose_teleop::PoseCommander;

use crate::console::Console;
use crate::loopback::LoopbackTransport;

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

/// Body pose control for a four-legged robot.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the control loop, reading pose commands from stdin.
    Run {
        /// Configuration file (TOML). Built-in A1 defaults when omitted.
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Stop after this many ticks.
        #[arg(short, long)]
        ticks: Option<u64>,

        /// Do not read commands from stdin; hold the neutral pose.
        #[arg(long)]
        no_console: bool,
    },

    /// Print the default configuration.
    Defaults,

    /// Print crate information.
    Info {
        /// Configuration file to summarize.
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

// ---------------------------------------------------------------------------
// Mode implementations
// ---------------------------------------------------------------------------

fn load_config(path: Option<&Path>) -> Result<QuadposeConfig, QuadposeError> {
    match path {
        Some(path) => {
            info!("Using config: {}", path.display());
            Ok(QuadposeConfig::from_file(path)?)
        }
        None => {
            info!("Using built-in A1 configuration");
            let config = QuadposeConfig::default();
            config.validate()?;
            Ok(config)
        }
    }
}

fn run_loop(
    config: &QuadposeConfig,
    ticks: Option<u64>,
    console: bool,
) -> Result<(), QuadposeError> {
    let commander = PoseCommander::new(config.input.clone(), config.control.baseline_height);
    let feedback = FeedbackCell::new();

    let mut runner = ControlRunner::new(
        &config.control,
        PoseController::from_config(config),
        LoopbackTransport::new(feedback.clone()),
        commander.clone(),
        feedback,
    );
    if let Some(ticks) = ticks {
        runner = runner.with_tick_limit(ticks);
    }

    let stop = runner.stop_handle();
    ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        stop.stop();
    })
    .map_err(|e| QuadposeError::Runtime(format!("Error setting Ctrl-C handler: {e}")))?;

    let handle = runner.spawn()?;
    if console {
        // Blocked on stdin until a line arrives; not joined.
        let _console = Console::new(commander).spawn_stdin()?;
    }

    let summary = handle.join()?;
    println!(
        "ticks={}, startup={}, ik_failures={}, dropped={}",
        summary.ticks, summary.startup_ticks, summary.ik_failures, summary.transport_failures
    );
    Ok(())
}

fn run_defaults() -> Result<(), QuadposeError> {
    print!("{}", QuadposeConfig::default().to_toml_string()?);
    Ok(())
}

fn run_info(config: &QuadposeConfig) {
    println!("quadpose v{}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("crates:");
    println!("  quadpose-core        {}", env!("CARGO_PKG_VERSION"));
    println!("  quadpose-ik          {}", env!("CARGO_PKG_VERSION"));
    println!("  quadpose-teleop      {}", env!("CARGO_PKG_VERSION"));
    println!("  quadpose-control     {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("control:");
    println!("  rate            {} Hz", config.control.control_hz);
    println!("  startup steps   {}", config.control.startup_steps);
    println!("  smoothing       1/{}", config.control.smoothing_divisor);
    println!("  baseline height {} m", config.control.baseline_height);
    println!("  workspace clamp {}", config.control.clamp_to_workspace);
    println!("geometry:");
    println!(
        "  links           {} / {} / {} m",
        config.geometry.abduction_offset, config.geometry.thigh_length, config.geometry.calf_length
    );
    println!("input:");
    println!("  angle limit     {} rad", config.input.angle_limit);
    println!("  height travel   {} m", config.input.height_travel);
    println!("  on release      {:?}", config.input.release_policy);
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<(), QuadposeError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match cli.command.unwrap_or(Commands::Run {
        config: None,
        ticks: None,
        no_console: false,
    }) {
        Commands::Run {
            config,
            ticks,
            no_console,
        } => {
            let config = load_config(config.as_deref())?;
            run_loop(&config, ticks, !no_console)
        }
        Commands::Defaults => run_defaults(),
        Commands::Info { config } => {
            run_info(&load_config(config.as_deref())?);
            Ok(())
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
