//! patchfit-replay: headless controller for patchfit sessions.
//!
//! Replays a JSON script of input events (pointer presses and releases
//! at canvas pixels, Generate button presses) against a session, then
//! writes the final frame and prints a fit report. Useful for:
//!
//! - Reproducing a selection without a window
//! - Comparing the three fitters on the same selection
//! - Inspecting two-point boundary diagnostics
//!
//! # Usage
//!
//! ```text
//! cargo run --bin patchfit-replay -- [OPTIONS] <SCRIPT>
//! ```
//!
//! The script is a JSON array such as
//! `[{"event": "pointer", "x": 40, "y": 40, "button": "left", "action": "up"}, {"event": "generate"}]`.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use log::{info, warn};
use patchfit::{EventOutcome, FitError, FitMode, FitReport, InputEvent, Replay, SessionConfig};
use serde::Serialize;

/// Replay scripted input events against a patchfit session.
///
/// Writes the final frame as PNG and prints the fit report of the shape
/// the session holds at the end of the script.
#[derive(Parser)]
#[command(name = "patchfit-replay", version)]
struct Cli {
    /// Path to the JSON event script.
    script: PathBuf,

    /// Fitting mode.
    #[arg(long, value_enum, default_value_t = CLI_DEFAULT_MODE)]
    mode: Mode,

    /// Marker edge length in pixels.
    #[arg(long, default_value_t = SessionConfig::DEFAULT_MARKER_SIZE, value_parser = clap::builder::RangedU64ValueParser::<u32>::new().range(1..))]
    marker_size: u32,

    /// Patch rows and columns.
    #[arg(long, default_value_t = SessionConfig::DEFAULT_GRID_DIMENSION, value_parser = clap::builder::RangedU64ValueParser::<u32>::new().range(1..))]
    grid_dimension: u32,

    /// Control strip height below the canvas (centroid and ellipse modes).
    #[arg(long, default_value_t = SessionConfig::DEFAULT_CONTROL_STRIP_HEIGHT)]
    control_strip_height: u32,

    /// Truncate the centroid circle center to whole pixels.
    #[arg(long)]
    snap_center: bool,

    /// Full session config as a JSON string.
    ///
    /// When provided, all other session parameter flags are ignored.
    /// The JSON must be a valid `SessionConfig` serialization; missing
    /// fields take their defaults.
    #[arg(long)]
    config_json: Option<String>,

    /// Write the final frame as PNG.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Write the final scene as SVG.
    #[arg(long)]
    svg: Option<PathBuf>,

    /// Output the summary as JSON instead of a human-readable report.
    #[arg(long)]
    json: bool,
}

/// Fitting mode selection.
#[derive(Clone, Copy, ValueEnum)]
enum Mode {
    /// Center on mouse-down, circumference on mouse-up.
    TwoPoint,
    /// Centroid center with the mean distance as radius.
    Centroid,
    /// Direct least-squares ellipse.
    Ellipse,
}

/// Maps a [`FitMode`] to the local CLI [`Mode`] enum.
const fn mode_from_core(mode: FitMode) -> Mode {
    match mode {
        FitMode::TwoPointCircle => Mode::TwoPoint,
        FitMode::CentroidCircle => Mode::Centroid,
        FitMode::Ellipse => Mode::Ellipse,
    }
}

/// The CLI default mode; a test keeps it equal to [`FitMode::default`].
const CLI_DEFAULT_MODE: Mode = mode_from_core(FitMode::CentroidCircle);

const fn core_mode(mode: Mode) -> FitMode {
    match mode {
        Mode::TwoPoint => FitMode::TwoPointCircle,
        Mode::Centroid => FitMode::CentroidCircle,
        Mode::Ellipse => FitMode::Ellipse,
    }
}

/// Machine-readable summary printed with `--json`.
#[derive(Serialize)]
struct Summary<'a> {
    mode: FitMode,
    events: usize,
    warnings: usize,
    errors: usize,
    report: Option<&'a FitReport>,
}

/// Build a [`SessionConfig`] from CLI arguments.
///
/// If `--config-json` is provided, the JSON is parsed directly and all
/// individual parameter flags are ignored.
fn config_from_cli(cli: &Cli) -> Result<SessionConfig, String> {
    let config = if let Some(ref json) = cli.config_json {
        serde_json::from_str(json).map_err(|e| format!("Error parsing --config-json: {e}"))?
    } else {
        SessionConfig {
            marker_size: cli.marker_size,
            grid_dimension: cli.grid_dimension,
            control_strip_height: cli.control_strip_height,
            snap_center_to_pixel: cli.snap_center,
            ..SessionConfig::default()
        }
    };
    config.validate().map_err(|e| e.to_string())?;
    Ok(config)
}

fn read_script(path: &Path) -> Result<Vec<InputEvent>, String> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("Error reading {}: {e}", path.display()))?;
    serde_json::from_str(&text).map_err(|e| format!("Error parsing {}: {e}", path.display()))
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match config_from_cli(&cli) {
        Ok(c) => c,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
    };

    let events = match read_script(&cli.script) {
        Ok(events) => events,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
    };

    let mode = core_mode(cli.mode);
    info!(
        "replaying {} event(s) from {} in {mode} mode",
        events.len(),
        cli.script.display(),
    );

    let Replay { session, outcomes } = match patchfit::replay(config.clone(), mode, &events) {
        Ok(run) => run,
        Err(e) => {
            eprintln!("Session error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let (warnings, errors) = tally(&outcomes);
    for (i, (event, outcome)) in events.iter().zip(&outcomes).enumerate() {
        log::debug!("event {i}: {event:?} -> {outcome:?}");
    }

    if cli.json {
        let summary = Summary {
            mode,
            events: events.len(),
            warnings,
            errors,
            report: session.report(),
        };
        match serde_json::to_string_pretty(&summary) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Error serializing summary: {e}");
                return ExitCode::FAILURE;
            }
        }
    } else {
        match session.report() {
            Some(report) => println!("{}", report.report()),
            None => println!("No shape fitted ({} event(s), {warnings} warning(s))", events.len()),
        }
    }

    if let Some(ref png_path) = cli.output {
        let frame = session.frame();
        match frame.save_with_format(png_path, image::ImageFormat::Png) {
            Ok(()) => eprintln!(
                "PNG written to {} ({}x{})",
                png_path.display(),
                frame.width(),
                frame.height(),
            ),
            Err(e) => {
                eprintln!("Error writing PNG to {}: {e}", png_path.display());
                return ExitCode::FAILURE;
            }
        }
    }

    if let Some(ref svg_path) = cli.svg {
        let title = cli
            .script
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("replay");
        let desc = format!("{mode} session, {} event(s)", events.len());
        let config_json = serde_json::to_string(&config).ok();
        let metadata = patchfit_export::SvgMetadata {
            title: Some(title),
            description: Some(&desc),
            config_json: config_json.as_deref(),
        };
        let svg = patchfit_export::to_svg(&session.scene(), &metadata);
        match std::fs::write(svg_path, &svg) {
            Ok(()) => eprintln!("SVG written to {} ({} bytes)", svg_path.display(), svg.len()),
            Err(e) => {
                eprintln!("Error writing SVG to {}: {e}", svg_path.display());
                return ExitCode::FAILURE;
            }
        }
    }

    if errors > 0 {
        warn!("{errors} event(s) were rejected");
    }
    ExitCode::SUCCESS
}

/// Count warning-class and error-class failures.
fn tally(outcomes: &[Result<EventOutcome, FitError>]) -> (usize, usize) {
    outcomes
        .iter()
        .filter_map(|o| o.as_ref().err())
        .fold((0, 0), |(w, e), err| match err.severity() {
            patchfit::Severity::Warning => (w + 1, e),
            patchfit::Severity::Error => (w, e + 1),
        })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("patchfit-replay").chain(args.iter().copied()))
            .unwrap()
    }

    #[test]
    fn default_mode_matches_core() {
        assert_eq!(core_mode(CLI_DEFAULT_MODE), FitMode::default());
    }

    #[test]
    fn flags_build_config() {
        let cli = parse(&["script.json", "--grid-dimension", "8", "--snap-center"]);
        let config = config_from_cli(&cli).unwrap();
        assert_eq!(config.grid_dimension, 8);
        assert!(config.snap_center_to_pixel);
        assert_eq!(config.marker_size, SessionConfig::DEFAULT_MARKER_SIZE);
    }

    #[test]
    fn config_json_overrides_flags() {
        let cli = parse(&[
            "script.json",
            "--grid-dimension",
            "8",
            "--config-json",
            r#"{"marker_size": 5}"#,
        ]);
        let config = config_from_cli(&cli).unwrap();
        assert_eq!(config.marker_size, 5);
        assert_eq!(config.grid_dimension, SessionConfig::DEFAULT_GRID_DIMENSION);
    }

    #[test]
    fn invalid_config_json_is_reported() {
        let cli = parse(&["script.json", "--config-json", r#"{"marker_size": 0}"#]);
        assert!(config_from_cli(&cli).is_err());
        let cli = parse(&["script.json", "--config-json", "not json"]);
        assert!(config_from_cli(&cli).unwrap_err().contains("--config-json"));
    }

    #[test]
    fn oversized_config_json_is_rejected() {
        let cli = parse(&[
            "script.json",
            "--config-json",
            r#"{"marker_size": 100000, "grid_dimension": 10000}"#,
        ]);
        assert!(config_from_cli(&cli).unwrap_err().contains("exceeds"));
    }

    #[test]
    fn zero_grid_dimension_flag_is_rejected() {
        let result = Cli::try_parse_from(["patchfit-replay", "s.json", "--grid-dimension", "0"]);
        assert!(result.is_err());
    }

    #[test]
    fn tally_splits_by_severity() {
        let outcomes = vec![
            Ok(EventOutcome::Fitted),
            Err(FitError::Locked),
            Err(FitError::OutOfBounds {
                row: 30,
                col: 0,
                dimension: 20,
            }),
            Err(FitError::DegenerateFit),
        ];
        assert_eq!(tally(&outcomes), (2, 1));
    }
}
