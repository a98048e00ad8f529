use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use glob::glob;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing_subscriber::EnvFilter;

use dmxcast_core::fixtures::{Catalog, FixtureKind};
use dmxcast_core::{ArtNetSender, Controller, Engine, FrameSink, SendError, SenderConfig};

#[derive(Parser, Debug)]
#[command(name = "dmxcast")]
#[command(version, long_version = concat!(
    env!("CARGO_PKG_VERSION"),
    " (", env!("DMXCAST_BUILD_COMMIT"), ", ", env!("DMXCAST_BUILD_DATE"), ")"
))]
#[command(
    about = "Art-Net DMX transmitter for stage lighting rigs.",
    long_about = None,
    after_help = "Examples:\n  dmxcast send --channel 1=200 --host 192.168.1.50\n  dmxcast run --duration 10 --fps 30 --arm\n  dmxcast fixtures list"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug)]
struct TargetArgs {
    /// Art-Net node address
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Art-Net UDP port
    #[arg(long, default_value_t = dmxcast_core::ARTNET_PORT)]
    port: u16,

    /// Art-Net universe id
    #[arg(long, default_value_t = 0)]
    universe: u16,

    /// Transmit retry budget per frame
    #[arg(long, default_value_t = 3)]
    retries: u32,

    /// Print frames to stdout instead of sending UDP
    #[arg(long)]
    dry_run: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Drive the transmit loop for a fixed duration.
    #[command(
        after_help = "Examples:\n  dmxcast run --duration 10 --fps 30 --host 192.168.1.50\n  dmxcast run --dry-run --duration 1 --arm"
    )]
    Run {
        #[command(flatten)]
        target: TargetArgs,

        /// Frames per second for the transmit loop
        #[arg(long, default_value_t = dmxcast_core::DEFAULT_FPS)]
        fps: f64,

        /// How long to run, in seconds
        #[arg(long, default_value_t = 5.0)]
        duration: f64,

        /// Path (or glob) to a fixtures JSON file
        #[arg(long)]
        fixtures: Option<PathBuf>,

        /// Apply fixture arm values before the loop starts
        #[arg(long)]
        arm: bool,

        /// Log a hex dump of every transmitted frame
        #[arg(long)]
        debug_frames: bool,

        /// Suppress non-error output
        #[arg(long)]
        quiet: bool,
    },

    /// Apply channel values and transmit a single forced frame.
    #[command(
        after_help = "Examples:\n  dmxcast send --channel 1=200\n  dmxcast send --channel 1=255 --channel 7=255 --host 192.168.1.50"
    )]
    Send {
        #[command(flatten)]
        target: TargetArgs,

        /// Channel update as CHANNEL=VALUE (repeatable)
        #[arg(long, required = true)]
        channel: Vec<String>,

        /// Path (or glob) to a fixtures JSON file
        #[arg(long)]
        fixtures: Option<PathBuf>,

        /// Suppress non-error output
        #[arg(long)]
        quiet: bool,
    },

    /// Operations on the fixture catalog.
    Fixtures {
        #[command(subcommand)]
        command: FixtureCommands,
    },
}

#[derive(Subcommand, Debug)]
enum FixtureCommands {
    /// List the fixtures in the catalog.
    List {
        /// Path (or glob) to a fixtures JSON file
        #[arg(long)]
        fixtures: Option<PathBuf>,

        /// Output the catalog as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            target,
            fps,
            duration,
            fixtures,
            arm,
            debug_frames,
            quiet,
        } => cmd_run(target, fps, duration, fixtures, arm, debug_frames, quiet),
        Commands::Send {
            target,
            channel,
            fixtures,
            quiet,
        } => cmd_send(target, channel, fixtures, quiet),
        Commands::Fixtures { command } => match command {
            FixtureCommands::List { fixtures, json } => cmd_fixtures_list(fixtures, json),
        },
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err.message);
            if let Some(hint) = err.hint {
                eprintln!("hint: {}", hint);
            }
            ExitCode::from(2)
        }
    }
}

#[derive(Debug)]
struct CliError {
    message: String,
    hint: Option<String>,
}

impl CliError {
    fn new(message: impl Into<String>, hint: Option<String>) -> Self {
        Self {
            message: message.into(),
            hint,
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        CliError::new(err.to_string(), None)
    }
}

/// Sink used by `--dry-run`: prints frames instead of sending UDP.
#[derive(Default)]
struct ConsoleSink;

impl FrameSink for ConsoleSink {
    fn send(&mut self, payload: &[u8], force: bool) -> Result<bool, SendError> {
        let nonzero = payload
            .iter()
            .enumerate()
            .filter(|&(_, &value)| value != 0)
            .map(|(index, value)| format!("{}={}", index + 1, value))
            .collect::<Vec<_>>()
            .join(" ");
        println!(
            "frame len={} force={} nonzero=[{}]",
            payload.len(),
            force,
            nonzero
        );
        Ok(true)
    }
}

fn cmd_run(
    target: TargetArgs,
    fps: f64,
    duration: f64,
    fixtures: Option<PathBuf>,
    arm: bool,
    debug_frames: bool,
    quiet: bool,
) -> Result<(), CliError> {
    if !(fps > 0.0) {
        return Err(CliError::new(
            format!("invalid fps {fps}"),
            Some("fps must be positive".to_string()),
        ));
    }
    if !(0.0..=86_400.0).contains(&duration) {
        return Err(CliError::new(
            format!("invalid duration {duration}"),
            Some("duration is in seconds (0..=86400)".to_string()),
        ));
    }

    let catalog = load_catalog(resolve_fixtures_path(fixtures)?.as_deref())?;
    let controller = build_controller(&target, fps, catalog)?.with_debug_frames(debug_frames);
    if arm {
        controller
            .arm_fixtures(false, false)
            .map_err(|err| CliError::new(format!("failed to arm fixtures: {err}"), None))?;
    }
    let controller = Arc::new(controller);

    let started = OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .context("timestamp formatting failed")?;
    if !quiet {
        eprintln!(
            "transmit loop started at {} -> {}:{} (universe {})",
            started, target.host, target.port, target.universe
        );
    }

    let mut engine = Engine::new(Arc::clone(&controller), fps);
    engine.start();
    thread::sleep(Duration::from_secs_f64(duration));
    engine.stop(Duration::from_secs(1));

    if !quiet {
        eprintln!(
            "OK: transmit loop finished -> {}:{} (universe {})",
            target.host, target.port, target.universe
        );
    }
    Ok(())
}

fn cmd_send(
    target: TargetArgs,
    channel_specs: Vec<String>,
    fixtures: Option<PathBuf>,
    quiet: bool,
) -> Result<(), CliError> {
    let mut updates = Vec::with_capacity(channel_specs.len());
    for spec in &channel_specs {
        updates.push(parse_channel_spec(spec)?);
    }

    let catalog = load_catalog(resolve_fixtures_path(fixtures)?.as_deref())?;
    let controller = build_controller(&target, 1000.0, catalog)?;
    controller.apply(&updates).map_err(|err| {
        CliError::new(err.to_string(), Some("channels are 1..=512".to_string()))
    })?;
    controller
        .send_frame(true)
        .map_err(|err| CliError::new(err.to_string(), Some("is the target reachable?".to_string())))?;

    if !quiet {
        eprintln!(
            "OK: frame sent -> {}:{} (universe {})",
            target.host, target.port, target.universe
        );
    }
    Ok(())
}

fn cmd_fixtures_list(fixtures: Option<PathBuf>, json: bool) -> Result<(), CliError> {
    let catalog = load_catalog(resolve_fixtures_path(fixtures)?.as_deref())?;

    if json {
        let text = serde_json::to_string_pretty(&catalog)
            .context("JSON serialization failed")
            .map_err(CliError::from)?;
        println!("{}", text);
        return Ok(());
    }

    for fixture in &catalog.fixtures {
        let channels = fixture
            .channels
            .iter()
            .map(|(logical, channel)| format!("{logical}={channel}"))
            .collect::<Vec<_>>()
            .join(", ");
        println!(
            "{}  {}  [{}]  channels: {}",
            fixture.id,
            fixture.name,
            kind_label(fixture.kind),
            channels
        );
    }
    Ok(())
}

fn build_controller(
    target: &TargetArgs,
    fps: f64,
    catalog: Catalog,
) -> Result<Controller, CliError> {
    if target.dry_run {
        return Ok(Controller::new(ConsoleSink, catalog));
    }
    let config = SenderConfig {
        host: target.host.clone(),
        port: target.port,
        universe: target.universe,
        fps,
        retries: target.retries,
        ..SenderConfig::default()
    };
    let sender = ArtNetSender::new(&config).map_err(|err| {
        CliError::new(
            err.to_string(),
            Some("check --host and --port".to_string()),
        )
    })?;
    Ok(Controller::new(sender, catalog))
}

fn kind_label(kind: FixtureKind) -> &'static str {
    match kind {
        FixtureKind::Generic => "generic",
        FixtureKind::ColorMixing => "color_mixing",
        FixtureKind::PanTilt => "pan_tilt",
    }
}

fn parse_channel_spec(spec: &str) -> Result<(u16, u8), CliError> {
    let (channel, value) = spec.split_once('=').ok_or_else(|| {
        CliError::new(
            format!("invalid channel spec '{spec}'"),
            Some("use CHANNEL=VALUE, e.g. --channel 1=255".to_string()),
        )
    })?;
    let channel: u16 = channel.trim().parse().map_err(|_| {
        CliError::new(
            format!("invalid channel number in '{spec}'"),
            Some("channels are 1..=512".to_string()),
        )
    })?;
    let value: u8 = value.trim().parse().map_err(|_| {
        CliError::new(
            format!("invalid channel value in '{spec}'"),
            Some("values are 0..=255".to_string()),
        )
    })?;
    Ok((channel, value))
}

fn load_catalog(path: Option<&Path>) -> Result<Catalog, CliError> {
    Catalog::load(path).map_err(|err| {
        CliError::new(
            err.to_string(),
            Some("use --fixtures to point at a fixtures JSON file".to_string()),
        )
    })
}

fn resolve_fixtures_path(input: Option<PathBuf>) -> Result<Option<PathBuf>, CliError> {
    let Some(input) = input else {
        return Ok(None);
    };
    let pattern = input.to_string_lossy().to_string();
    if !is_glob_pattern(&pattern) {
        return Ok(Some(input));
    }

    let mut matches = Vec::new();
    let paths = glob(&pattern).map_err(|err| {
        CliError::new(
            format!("invalid fixtures pattern '{}'", pattern),
            Some(format!("pattern error: {}", err.msg)),
        )
    })?;
    for entry in paths {
        let path = entry.map_err(|err| {
            CliError::new(
                format!("invalid fixtures pattern '{}'", pattern),
                Some(format!("pattern error: {}", err)),
            )
        })?;
        if path.is_file() {
            matches.push(path);
        }
    }

    if matches.is_empty() {
        return Err(CliError::new(
            format!("no files match pattern '{}'", pattern),
            Some("check the path or quote the pattern".to_string()),
        ));
    }
    if matches.len() > 1 {
        return Err(CliError::new(
            format!(
                "multiple files match pattern '{}' ({} matches)",
                pattern,
                matches.len()
            ),
            Some("pass a single fixtures file".to_string()),
        ));
    }
    Ok(Some(matches.remove(0)))
}

fn is_glob_pattern(input: &str) -> bool {
    input.contains('*') || input.contains('?') || input.contains('[')
}
