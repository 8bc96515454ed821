//! drawctl - command line access to the draw progression engine
//!
//! Every command reads a draw definition from a JSON file, loads it (which
//! validates and derives it) and prints JSON to stdout. Engine errors print
//! the `{ "error": ..., "context": ... }` payload and exit with status 1.
//!
//! Match-ups can be named by id or as `structure/round/position`.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use draw_progression_core_rs::{
    mocks, state_digest, DrawDefinition, DrawEngine, DrawError, MatchUpStatus, Outcome,
    PropagationOptions,
};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "drawctl")]
#[command(version, about = "Apply results to a draw and query its progression", long_about = None)]
struct Cli {
    /// Enable debug logging (overrides DRAWCTL_LOG / RUST_LOG)
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct DrawArgs {
    /// Draw definition JSON file
    #[arg(short, long, value_name = "PATH")]
    draw: PathBuf,

    /// PropagationOptions JSON file
    #[arg(long, value_name = "PATH")]
    options: Option<PathBuf>,

    /// Let a bye advance past an exit for finishing positions
    #[arg(long)]
    bye_advancements: bool,

    /// Forward a bye instead of an exited slot when an exit faces a bye
    #[arg(long)]
    double_exit_propagates_bye: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Enter, change or clear a result and propagate it
    Apply {
        #[command(flatten)]
        draw: DrawArgs,

        /// Match-up id or structure/round/position
        #[arg(short, long)]
        match_up: String,

        /// Status, e.g. COMPLETED, DOUBLE_WALKOVER, TO_BE_PLAYED
        #[arg(short, long)]
        status: String,

        #[arg(short, long)]
        winning_side: Option<u8>,

        #[arg(long)]
        score: Option<String>,

        /// Write the updated draw here
        #[arg(short, long, value_name = "PATH")]
        out: Option<PathBuf>,
    },

    /// Show where a match-up's winner and loser go
    Targets {
        #[command(flatten)]
        draw: DrawArgs,

        #[arg(short, long)]
        match_up: String,
    },

    /// Check whether genuine play downstream depends on a match-up
    Active {
        #[command(flatten)]
        draw: DrawArgs,

        #[arg(short, long)]
        match_up: String,
    },

    /// Finishing-position ranges of a participant
    Finishing {
        #[command(flatten)]
        draw: DrawArgs,

        #[arg(short, long)]
        participant: String,
    },

    /// SHA-256 digest of the derived draw
    Digest {
        #[command(flatten)]
        draw: DrawArgs,
    },

    /// Print a fixture draw to start from
    Sample {
        #[arg(value_enum)]
        shape: Shape,

        /// Draw size (elimination shapes) or group size (round robin)
        #[arg(long, default_value_t = 8)]
        size: u32,

        /// Number of round-robin groups
        #[arg(long, default_value_t = 1)]
        groups: u32,

        /// Add a playoff after the round-robin groups
        #[arg(long)]
        playoff: bool,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Shape {
    Elimination,
    Consolation,
    RoundRobin,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env("DRAWCTL_LOG")
            .or_else(|_| EnvFilter::try_from_default_env())
            .unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<DrawError>() {
                Some(draw_err) => match serde_json::to_string_pretty(&draw_err.to_response()) {
                    Ok(json) => println!("{}", json),
                    Err(_) => eprintln!("error: {}", draw_err),
                },
                None => eprintln!("error: {:#}", err),
            }
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command) -> Result<()> {
    match command {
        Command::Apply {
            draw,
            match_up,
            status,
            winning_side,
            score,
            out,
        } => {
            let mut engine = load_engine(&draw)?;
            let id = match_up_id(&engine, &match_up)?;
            let outcome = Outcome {
                match_up_status: status.parse::<MatchUpStatus>()?,
                winning_side,
                score,
            };
            let result = engine.apply_outcome(&id, &outcome)?;
            debug!(changes = result.len(), "outcome applied");
            if let Some(path) = out {
                write_json(&path, engine.draw()?)?;
            }
            print_json(&result)
        }
        Command::Targets { draw, match_up } => {
            let engine = load_engine(&draw)?;
            let id = match_up_id(&engine, &match_up)?;
            print_json(&engine.resolve_targets(&id)?)
        }
        Command::Active { draw, match_up } => {
            let engine = load_engine(&draw)?;
            let id = match_up_id(&engine, &match_up)?;
            let active = engine.is_active_downstream(&id)?;
            print_json(&serde_json::json!({ "matchUpId": id, "activeDownstream": active }))
        }
        Command::Finishing { draw, participant } => {
            let engine = load_engine(&draw)?;
            print_json(&engine.finishing_positions(&participant)?)
        }
        Command::Digest { draw } => {
            let engine = load_engine(&draw)?;
            let digest = state_digest(engine.draw()?)?;
            print_json(&serde_json::json!({ "digest": digest }))
        }
        Command::Sample {
            shape,
            size,
            groups,
            playoff,
        } => {
            if size < 2 {
                bail!("size must be at least 2");
            }
            let draw = match shape {
                Shape::Elimination => mocks::elimination(size),
                Shape::Consolation => mocks::first_match_loser_consolation(size, &[]),
                Shape::RoundRobin => mocks::round_robin(groups.max(1), size, playoff),
            };
            print_json(&draw)
        }
    }
}

fn load_options(args: &DrawArgs) -> Result<PropagationOptions> {
    let mut options = match &args.options {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading options {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("parsing options {}", path.display()))?
        }
        None => PropagationOptions::default(),
    };
    if args.bye_advancements {
        options.bye_advancements = true;
    }
    if args.double_exit_propagates_bye {
        options.double_exit_propagates_bye = true;
    }
    Ok(options)
}

fn load_engine(args: &DrawArgs) -> Result<DrawEngine> {
    let options = load_options(args)?;
    let text = fs::read_to_string(&args.draw)
        .with_context(|| format!("reading draw {}", args.draw.display()))?;
    let draw: DrawDefinition = serde_json::from_str(&text)
        .with_context(|| format!("parsing draw {}", args.draw.display()))?;
    Ok(DrawEngine::from_draw(draw, options)?)
}

/// Accept a match-up id or `structure/round/position`
fn match_up_id(engine: &DrawEngine, reference: &str) -> Result<String> {
    let draw = engine.draw()?;
    if draw.match_up(reference).is_some() {
        return Ok(reference.to_string());
    }
    let parts: Vec<&str> = reference.split('/').collect();
    if let [structure, round, position] = parts.as_slice() {
        if let (Ok(round), Ok(position)) = (round.parse::<u32>(), position.parse::<u32>()) {
            if let Some(id) = engine.match_up_id_at(structure, round, position) {
                return Ok(id);
            }
        }
    }
    Err(DrawError::MatchUpNotFound(reference.to_string()).into())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}
