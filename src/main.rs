//! ReelKit Simulator
//!
//! Usage:
//!   reelkit simulate --spins 200 --seed 7   - Run a headless session
//!   reelkit simulate --quick-stop --json    - Quick-stop every spin, JSON stats
//!   reelkit config --profile turbo          - Print a preset config as JSON

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};

use rk_core::MS_PER_FRAME;
use rk_reel::{MachineConfig, ManualScheduler, SessionStats, SlotMachine, SpeedProfile};
use rk_signal::{SignalTrace, SpinSource};

#[derive(Parser)]
#[command(name = "reelkit", about = "Headless slot reel simulator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run spins at a fixed frame delta and report the outcome
    Simulate {
        /// Number of spins to start
        #[arg(short, long, default_value_t = 100)]
        spins: u64,
        /// RNG seed (random when omitted)
        #[arg(long)]
        seed: Option<u64>,
        /// Preset to start from
        #[arg(short, long, value_enum, default_value = "studio")]
        profile: Profile,
        /// JSON config file (overrides --profile)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Frame delta per tick (1.0 = one 60 fps frame)
        #[arg(long, default_value_t = 1.0)]
        delta: f64,
        /// Quick-stop every spin as soon as it is in motion
        #[arg(long)]
        quick_stop: bool,
        /// Safety cap on ticks
        #[arg(long, default_value_t = 5_000_000)]
        max_frames: u64,
        /// Write the recorded signal trace to this file
        #[arg(long)]
        trace: Option<PathBuf>,
        /// Print statistics as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print a preset configuration
    Config {
        #[arg(short, long, value_enum, default_value = "standard")]
        profile: Profile,
        /// Write to file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Profile {
    Standard,
    Turbo,
    Studio,
}

impl From<Profile> for SpeedProfile {
    fn from(profile: Profile) -> Self {
        match profile {
            Profile::Standard => SpeedProfile::Standard,
            Profile::Turbo => SpeedProfile::Turbo,
            Profile::Studio => SpeedProfile::Studio,
        }
    }
}

/// Options for one simulated session
struct SimOptions {
    spins: u64,
    delta: f64,
    quick_stop: bool,
    max_frames: u64,
}

/// What a session produced
struct SimReport {
    stats: SessionStats,
    frames: u64,
    balance: i64,
    trace: SignalTrace,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Simulate {
            spins,
            seed,
            profile,
            config,
            delta,
            quick_stop,
            max_frames,
            trace,
            json,
        } => {
            let mut machine_config = match config {
                Some(path) => MachineConfig::load(&path)
                    .with_context(|| format!("Failed to load config {}", path.display()))?,
                None => MachineConfig::from_profile(profile.into()),
            };
            if seed.is_some() {
                machine_config.seed = seed;
            }

            let options = SimOptions {
                spins,
                delta,
                quick_stop,
                max_frames,
            };
            let report = simulate(machine_config, &options)?;
            print_report(&report, json)?;

            if let Some(path) = trace {
                write_trace(&report.trace, &path)?;
            }
            Ok(())
        }
        Commands::Config { profile, output } => {
            let json = MachineConfig::from_profile(profile.into()).to_json()?;
            match output {
                Some(path) => fs::write(&path, json)
                    .with_context(|| format!("Failed to write {}", path.display()))?,
                None => println!("{}", json),
            }
            Ok(())
        }
    }
}

fn simulate(config: MachineConfig, options: &SimOptions) -> Result<SimReport> {
    if !(options.delta.is_finite() && options.delta > 0.0) {
        bail!("--delta must be a positive number, got {}", options.delta);
    }

    let scheduler = ManualScheduler::new();
    let profile = config.profile;
    let machine = SlotMachine::new(config, scheduler.clone())?;
    let rx = machine.subscribe();

    let mut trace = SignalTrace::new(format!("sim-{:?}", profile).to_lowercase())
        .with_metadata("spins", serde_json::json!(options.spins))
        .with_metadata("delta", serde_json::json!(options.delta));

    let frame_time = Duration::from_micros((options.delta * MS_PER_FRAME * 1000.0).round() as u64);
    let mut started = 0u64;
    let mut frames = 0u64;

    log::info!("Simulating {} spins at delta {}", options.spins, options.delta);

    while frames < options.max_frames {
        machine.tick(options.delta);
        scheduler.advance(frame_time);
        frames += 1;
        trace.collect_from(&rx);

        let round = machine.round();
        if options.quick_stop && round.is_in_motion() {
            machine.request_quick_stop();
        } else if started < options.spins {
            if round.input_allowed
                && !round.is_spinning
                && machine.request_spin(SpinSource::Auto).is_ok()
            {
                started += 1;
            }
        } else if !round.is_spinning && !machine.is_reset_pending() {
            break;
        }
    }
    trace.collect_from(&rx);

    if started < options.spins {
        log::warn!(
            "Stopped after {} frames with {} of {} spins started",
            frames,
            started,
            options.spins
        );
    }

    Ok(SimReport {
        stats: machine.stats(),
        frames,
        balance: machine.round().balance,
        trace,
    })
}

fn print_report(report: &SimReport, json: bool) -> Result<()> {
    let stats = &report.stats;
    if json {
        println!("{}", serde_json::to_string_pretty(stats)?);
        return Ok(());
    }

    println!("🎰 ReelKit session\n");
    println!("  Spins:          {}", stats.total_spins);
    println!("  Frames:         {}", report.frames);
    println!("  Bet / Won:      {} / {}", stats.total_bet, stats.total_won);
    println!("  RTP:            {:.2}%", stats.rtp());
    println!("  Hit rate:       {:.2}%", stats.hit_rate());
    println!("  Jackpots:       {}", stats.jackpots);
    println!("  Best multiplier x{}", stats.max_multiplier);
    println!("  Quick stops:    {}", stats.quick_stops);
    println!("  Round resets:   {}", stats.resets);
    println!("  Final balance:  {}", report.balance);
    println!("  Signals:        {}", report.trace.len());
    if stats.evaluation_faults > 0 {
        println!("\n⚠️  {} settle(s) found no symbol in any window", stats.evaluation_faults);
    }
    Ok(())
}

fn write_trace(trace: &SignalTrace, path: &Path) -> Result<()> {
    let json = trace.to_json().context("Failed to serialize signal trace")?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    log::info!("Wrote {} signal events to {}", trace.len(), path.display());
    Ok(())
}
