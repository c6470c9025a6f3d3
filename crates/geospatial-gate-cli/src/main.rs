//! Geospatial gate CLI: `ggate` command.
//!
//! Drives a bring-up run against the simulated platform, evaluates the
//! accuracy gate, and manages the anchor history and privacy flag stored in
//! a preferences file.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;

use geospatial_gate::history::decode_history;
use geospatial_gate::ports::{FeatureSupport, PermissionKind};
use geospatial_gate::sim::{SimCounters, SimScript, SimulatedPlatform};
use geospatial_gate::storage::{
    has_displayed_privacy_prompt, mark_privacy_prompt_displayed, reset_privacy_prompt,
    ANCHOR_HISTORY_KEY,
};
use geospatial_gate::{
    is_localized, AnchorHistoryStore, AnchorKind, BootstrapState, GateConfig,
    GeospatialSession, KeyValueStore, LifecycleController, LifecycleState, MemoryStore,
    PoseSample, PrefsFile, ProbeSignals, ProbeStatus, SoftFailure,
};

// ── Path helpers ──────────────────────────────────────────────────────────────

fn default_store_path() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME not set; pass --store")?;
    Ok(PathBuf::from(home)
        .join(".geospatial-gate")
        .join("prefs.json"))
}

fn open_store(path: Option<&Path>) -> Result<PrefsFile> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => default_store_path()?,
    };
    PrefsFile::open(&path)
        .with_context(|| format!("failed to open preferences file {}", path.display()))
}

fn load_config(path: Option<&Path>) -> Result<GateConfig> {
    match path {
        Some(p) => GateConfig::load(p)
            .with_context(|| format!("failed to load config {}", p.display())),
        None => Ok(GateConfig::default()),
    }
}

// ── CLI structure ─────────────────────────────────────────────────────────────

/// Geospatial gate CLI: simulate bring-up, evaluate the accuracy gate, and
/// manage persisted anchor history.
#[derive(Parser, Debug)]
#[command(
    name = "ggate",
    about = "Geospatial gate CLI",
    version,
    long_about = "ggate: geospatial gate CLI\n\nSimulate geospatial AR bring-up, evaluate the pose accuracy gate,\nand inspect or prune the persisted anchor history."
)]
struct Cli {
    /// JSON configuration file (defaults are used when absent)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Preferences file (default: ~/.geospatial-gate/prefs.json)
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the lifecycle controller and availability probe against a simulated device
    Simulate {
        /// Number of frames to run
        #[arg(long, default_value_t = 600)]
        ticks: u64,

        /// Frame duration in milliseconds
        #[arg(long, default_value_t = 16)]
        frame_ms: u64,

        /// Report the geospatial capability as unsupported
        #[arg(long)]
        unsupported: bool,

        /// Deny the camera permission
        #[arg(long)]
        deny_camera: bool,

        /// Disable the location service
        #[arg(long)]
        location_disabled: bool,

        /// Horizontal accuracy of the simulated pose
        #[arg(long, default_value_t = 3.0)]
        horizontal: f64,

        /// Vertical accuracy of the simulated pose
        #[arg(long, default_value_t = 2.0)]
        vertical: f64,

        /// Yaw accuracy of the simulated pose
        #[arg(long, default_value_t = 1.0)]
        yaw: f64,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Evaluate the accuracy gate for one pose
    Gate {
        #[arg(long)]
        horizontal: f64,

        #[arg(long)]
        vertical: f64,

        #[arg(long)]
        yaw: f64,

        /// Treat the device as not tracking
        #[arg(long)]
        not_tracking: bool,

        /// Override the configured threshold
        #[arg(long)]
        threshold: Option<f64>,
    },

    /// Inspect or maintain the anchor history
    History {
        #[command(subcommand)]
        subcommand: HistoryCommands,
    },

    /// Inspect or change the privacy prompt flag
    Privacy {
        #[command(subcommand)]
        subcommand: PrivacyCommands,
    },
}

#[derive(Subcommand, Debug)]
enum HistoryCommands {
    /// List stored anchors without pruning
    List {
        /// Only show anchors of this kind (geospatial, terrain, rooftop)
        #[arg(long)]
        kind: Option<String>,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Load the history as of now, evicting expired anchors
    Prune,
    /// Delete the stored history
    Clear,
}

#[derive(Subcommand, Debug)]
enum PrivacyCommands {
    /// Show whether the privacy prompt was accepted
    Status,
    /// Record acceptance of the privacy prompt
    Accept,
    /// Forget acceptance so the prompt shows again
    Reset,
}

struct SimulateArgs {
    ticks: u64,
    frame_ms: u64,
    unsupported: bool,
    deny_camera: bool,
    location_disabled: bool,
    pose: PoseSample,
    json: bool,
}

fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let verbose = cli.verbose;
    let config_path = cli.config.as_deref();
    let store_path = cli.store.as_deref();

    let result = match cli.command {
        Commands::Simulate {
            ticks,
            frame_ms,
            unsupported,
            deny_camera,
            location_disabled,
            horizontal,
            vertical,
            yaw,
            json,
        } => cmd_simulate(
            config_path,
            SimulateArgs {
                ticks,
                frame_ms,
                unsupported,
                deny_camera,
                location_disabled,
                pose: PoseSample::with_accuracy(horizontal, vertical, yaw),
                json,
            },
            verbose,
        ),
        Commands::Gate {
            horizontal,
            vertical,
            yaw,
            not_tracking,
            threshold,
        } => cmd_gate(
            config_path,
            PoseSample::with_accuracy(horizontal, vertical, yaw),
            !not_tracking,
            threshold,
        ),
        Commands::History { subcommand } => match subcommand {
            HistoryCommands::List { kind, json } => {
                cmd_history_list(store_path, kind.as_deref(), json)
            }
            HistoryCommands::Prune => cmd_history_prune(config_path, store_path, verbose),
            HistoryCommands::Clear => cmd_history_clear(config_path, store_path),
        },
        Commands::Privacy { subcommand } => match subcommand {
            PrivacyCommands::Status => cmd_privacy_status(store_path),
            PrivacyCommands::Accept => cmd_privacy_accept(store_path),
            PrivacyCommands::Reset => cmd_privacy_reset(store_path),
        },
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

// ── Command implementations ───────────────────────────────────────────────────

#[derive(Serialize)]
struct SimulationSummary {
    frames: u64,
    lifecycle: LifecycleState,
    bootstrap: BootstrapState,
    soft_failures: Vec<SoftFailure>,
    hard_failure: Option<String>,
    probe: Option<ProbeStatus>,
    location_permission_requests: u32,
    camera_permission_requests: u32,
    availability_checks: u32,
    positioning_queries: u32,
}

impl SimulationSummary {
    fn new(
        frames: u64,
        controller: &LifecycleController,
        probe: Option<ProbeStatus>,
        counters: &SimCounters,
    ) -> Self {
        Self {
            frames,
            lifecycle: controller.state(),
            bootstrap: controller.bootstrap().state(),
            soft_failures: controller.bootstrap().soft_failures().to_vec(),
            hard_failure: controller.bootstrap().hard_failure().map(|h| h.to_string()),
            probe,
            location_permission_requests: counters.permission_requests(PermissionKind::FineLocation),
            camera_permission_requests: counters.permission_requests(PermissionKind::Camera),
            availability_checks: counters.availability_checks,
            positioning_queries: counters.positioning_queries,
        }
    }
}

/// `ggate simulate [--ticks N] [--frame-ms MS] [...]`
fn cmd_simulate(config_path: Option<&Path>, args: SimulateArgs, verbose: bool) -> Result<()> {
    let config = load_config(config_path)?;
    if args.frame_ms == 0 {
        return Err(anyhow!("--frame-ms must be greater than zero"));
    }

    let script = SimScript {
        feature_support: if args.unsupported {
            FeatureSupport::Unsupported
        } else {
            FeatureSupport::Supported
        },
        camera_permission: !args.deny_camera,
        grant_camera_on_request: !args.deny_camera,
        location_enabled: !args.location_disabled,
        pose: args.pose,
        ..SimScript::default()
    };
    let mut platform = SimulatedPlatform::new(script);
    let mut controller = LifecycleController::new(&config);
    log::info!("Simulating up to {} frame(s) of {} ms", args.ticks, args.frame_ms);
    let mut session = GeospatialSession::open(
        MemoryStore::new(),
        &config,
        geospatial_gate::time::local_now(),
    )
    .context("failed to open simulated session")?;

    let frame_micros = args.frame_ms.saturating_mul(1_000);
    let mut last_probe: Option<ProbeStatus> = None;
    let mut frames = 0;

    for frame in 0..args.ticks {
        let now = frame.saturating_mul(frame_micros);
        let report = controller.tick(now, &mut platform);
        for effect in &report.effects {
            session.apply(*effect);
        }
        if report.transitioned() {
            log::debug!(
                "frame {frame}: lifecycle {:?} -> {:?}, bootstrap {:?}",
                report.previous,
                report.current,
                controller.bootstrap().state()
            );
        }
        if report.transitioned() && !args.json {
            println!(
                "[{:>6} ms] lifecycle {} -> {}",
                now / 1_000,
                report.previous.as_tag(),
                report.current.as_tag()
            );
        }

        let signals = ProbeSignals {
            location_starting: controller.bootstrap().is_waiting_for_location(),
            session_returning: false,
        };
        let probe = session.tick_probe(now, &mut platform, &signals);
        if probe != last_probe {
            if let Some(status) = probe {
                log::debug!("frame {frame}: probe {status:?}");
                if !args.json && (verbose || status.is_finished()) {
                    println!("[{:>6} ms] probe {}", now / 1_000, status.as_tag());
                }
            }
            last_probe = probe;
        }

        platform.advance();
        frames = frame + 1;

        let probe_done = last_probe.map(|s| s.is_finished()).unwrap_or(true);
        let settled = matches!(controller.state(), LifecycleState::Ready | LifecycleState::Error);
        if settled && probe_done {
            break;
        }
    }

    let summary = SimulationSummary::new(frames, &controller, last_probe, platform.counters());
    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("Simulation finished after {} frame(s)", summary.frames);
    println!("  Lifecycle: {}", summary.lifecycle.as_tag());
    println!("  Bootstrap: {}", summary.bootstrap.as_tag());
    if let Some(ref hard) = summary.hard_failure {
        println!("  Hard failure: {hard}");
    }
    if summary.soft_failures.is_empty() {
        println!("  Soft failures: none");
    } else {
        println!("  Soft failures:");
        for soft in &summary.soft_failures {
            println!("    - {soft}");
        }
    }
    match summary.probe {
        Some(ProbeStatus::Completed {
            coordinates,
            availability,
        }) => println!(
            "  Probe: {availability:?} at ({:.5}, {:.5})",
            coordinates.latitude, coordinates.longitude
        ),
        Some(ProbeStatus::Aborted(soft)) => println!("  Probe: aborted ({soft})"),
        Some(status) => println!("  Probe: {}", status.as_tag()),
        None => println!("  Probe: not started"),
    }
    if verbose {
        println!(
            "  Requests: {} location permission, {} camera permission, {} availability check(s), {} positioning query(ies)",
            summary.location_permission_requests,
            summary.camera_permission_requests,
            summary.availability_checks,
            summary.positioning_queries
        );
    }

    Ok(())
}

/// `ggate gate --horizontal H --vertical V --yaw Y [--not-tracking] [--threshold T]`
fn cmd_gate(
    config_path: Option<&Path>,
    pose: PoseSample,
    tracking: bool,
    threshold: Option<f64>,
) -> Result<()> {
    let threshold = match threshold {
        Some(t) => t,
        None => load_config(config_path)?.accuracy_threshold,
    };
    let localized = is_localized(&pose, tracking, threshold);

    println!(
        "{} (horizontal {}, vertical {}, yaw {}, tracking {}, threshold {})",
        if localized { "localized" } else { "not localized" },
        pose.horizontal_accuracy,
        pose.vertical_accuracy,
        pose.yaw_accuracy,
        tracking,
        threshold
    );
    Ok(())
}

/// `ggate history list [--kind TAG] [--json]`
fn cmd_history_list(store_path: Option<&Path>, kind: Option<&str>, json: bool) -> Result<()> {
    let kind = kind
        .map(|tag| {
            AnchorKind::from_tag(tag).ok_or_else(|| {
                anyhow!("unknown anchor kind '{tag}' (expected geospatial, terrain, or rooftop)")
            })
        })
        .transpose()?;

    let store = open_store(store_path)?;
    let mut records = match store.get_string(ANCHOR_HISTORY_KEY) {
        Some(blob) => decode_history(&blob).context("failed to read anchor history")?,
        None => Vec::new(),
    };
    if let Some(kind) = kind {
        records.retain(|r| r.kind == kind);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    if records.is_empty() {
        println!("No anchors in {}", store.path().display());
        return Ok(());
    }

    println!(
        "{:<24} {:<11} {:>11} {:>12} {:>9}  CREATED",
        "ID", "KIND", "LATITUDE", "LONGITUDE", "ALTITUDE"
    );
    println!("{}", "-".repeat(92));
    for r in &records {
        println!(
            "{:<24} {:<11} {:>11.6} {:>12.6} {:>9.2}  {}",
            r.id.0,
            r.kind.as_tag(),
            r.coordinates.latitude,
            r.coordinates.longitude,
            r.coordinates.altitude,
            r.created_at.format("%Y-%m-%d %H:%M:%S")
        );
    }
    println!();
    println!("{} anchor(s)", records.len());
    Ok(())
}

/// `ggate history prune`
fn cmd_history_prune(
    config_path: Option<&Path>,
    store_path: Option<&Path>,
    verbose: bool,
) -> Result<()> {
    let config = load_config(config_path)?;
    let store = open_store(store_path)?;
    let before = match store.get_string(ANCHOR_HISTORY_KEY) {
        Some(blob) => decode_history(&blob).context("failed to read anchor history")?,
        None => {
            println!("No anchor history stored");
            return Ok(());
        }
    };

    let mut history = AnchorHistoryStore::new(store, config.history.clone());
    let kept = history
        .load(geospatial_gate::time::local_now())
        .context("failed to prune anchor history")?;

    println!(
        "Kept {} of {} anchor(s), evicted {}",
        kept.len(),
        before.len(),
        before.len() - kept.len()
    );
    if verbose {
        for r in before.iter().filter(|r| kept.get(&r.id).is_none()) {
            println!("  evicted {} ({})", r.id, r.created_at.format("%Y-%m-%d %H:%M"));
        }
    }
    Ok(())
}

/// `ggate history clear`
fn cmd_history_clear(config_path: Option<&Path>, store_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;
    let mut history = AnchorHistoryStore::new(open_store(store_path)?, config.history.clone());
    history.clear().context("failed to clear anchor history")?;
    println!("Cleared anchor history");
    Ok(())
}

/// `ggate privacy status`
fn cmd_privacy_status(store_path: Option<&Path>) -> Result<()> {
    let store = open_store(store_path)?;
    if has_displayed_privacy_prompt(&store) {
        println!("Privacy prompt: accepted");
    } else {
        println!("Privacy prompt: not yet accepted");
    }
    Ok(())
}

/// `ggate privacy accept`
fn cmd_privacy_accept(store_path: Option<&Path>) -> Result<()> {
    let mut store = open_store(store_path)?;
    mark_privacy_prompt_displayed(&mut store).context("failed to save privacy flag")?;
    println!("Privacy prompt: accepted");
    Ok(())
}

/// `ggate privacy reset`
fn cmd_privacy_reset(store_path: Option<&Path>) -> Result<()> {
    let mut store = open_store(store_path)?;
    reset_privacy_prompt(&mut store).context("failed to reset privacy flag")?;
    println!("Privacy prompt: reset");
    Ok(())
}
