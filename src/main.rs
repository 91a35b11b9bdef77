//! Stonyman Vision Chip CLI
//!
//! Command-line interface for exercising the scan engine and the optical
//! flow pipeline against a simulated chip.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use stonyman_flow::{
    calibration::{CalibrationError, FpnMask},
    chip::{ConfigError, FileConfig, Sensor, SimulatedChip, ADC_MAX},
    flow::{FlowError, FlowEstimator, Odometry},
    image::Image,
    metrics::{MetricsError, MetricsRegistry, MetricsSnapshot},
    render::{to_ascii, to_matlab, AsciiRange},
    scan::{ScanError, ScanWindow},
    Pixel,
};
use thiserror::Error;
use tracing::{info, warn};

/// Fixed-pattern noise amplitude of the simulated chip.
const FPN_AMPLITUDE: u16 = 24;

#[derive(Debug, Parser)]
#[command(name = "stonyman-flow", version, about = "Stonyman vision chip demo")]
struct Cli {
    /// TOML file with [sensor], [window] and [flow] tables
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print Prometheus metrics when done
    #[arg(long, global = true)]
    metrics: bool,

    /// Seed for the simulated fixed-pattern noise
    #[arg(long, global = true, default_value_t = 7)]
    seed: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Calibrate, capture one frame and print it as ASCII art
    Snapshot {
        /// Fixed lower display bound (auto if omitted)
        #[arg(long)]
        min: Option<i64>,
        /// Fixed upper display bound (auto if omitted)
        #[arg(long)]
        max: Option<i64>,
    },
    /// Capture one raw frame as a MATLAB matrix
    Matlab,
    /// Locate the brightest pixel in the window
    FindBrightest,
    /// Track a drifting scene and print flow and odometry per frame
    Flow {
        /// Frames to process
        #[arg(long, default_value_t = 20)]
        frames: u32,
        /// Run until Ctrl-C instead of stopping after --frames
        #[arg(long)]
        continuous: bool,
        /// Scene drift per frame, in pixels along x
        #[arg(long, default_value_t = 0.25)]
        speed_x: f32,
        /// Scene drift per frame, in pixels along y
        #[arg(long, default_value_t = 0.0)]
        speed_y: f32,
    },
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Scan(#[from] ScanError),
    #[error(transparent)]
    Calibration(#[from] CalibrationError),
    #[error(transparent)]
    Flow(#[from] FlowError),
    #[error(transparent)]
    Metrics(#[from] MetricsError),
    #[error("failed to install Ctrl-C handler: {0}")]
    Signal(#[from] ctrlc::Error),
}

/// Scan and pipeline counters for the metrics snapshot.
#[derive(Debug, Default)]
struct Counters {
    scans: u64,
}

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();
    info!("Stonyman flow v{}", stonyman_flow::VERSION);

    if let Err(e) = run(&cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), CliError> {
    let config = match &cli.config {
        Some(path) => FileConfig::from_file(path)?,
        None => FileConfig::default(),
    };
    config.validate()?;

    let chip = SimulatedChip::new().with_fpn(cli.seed, FPN_AMPLITUDE);
    let mut sensor = Sensor::begin(chip, config.sensor.clone())?;
    let window = config.window;
    let mut counters = Counters::default();
    let mut odometry = Odometry::from_config(&config.flow)?;

    match &cli.command {
        Command::Snapshot { min, max } => {
            let mask = calibrate(&mut sensor, &window, &mut counters)?;
            set_scene(&mut sensor, 0.0, 0.0);
            let frame = capture(&mut sensor, &window, &mut counters)?;
            let corrected = mask.apply(&frame)?;
            print!(
                "{}",
                to_ascii(
                    &corrected,
                    AsciiRange {
                        min: *min,
                        max: *max,
                    }
                )
            );
        }
        Command::Matlab => {
            set_scene(&mut sensor, 0.0, 0.0);
            let frame = capture(&mut sensor, &window, &mut counters)?;
            print!("{}", to_matlab(&frame));
        }
        Command::FindBrightest => {
            set_scene(&mut sensor, 0.0, 0.0);
            let brightest = sensor.engine().find_brightest(&window)?;
            counters.scans += 1;
            println!(
                "Brightest pixel: row {} col {} (chip {} {}) value {}",
                brightest.row,
                brightest.col,
                window.chip_row(brightest.row),
                window.chip_col(brightest.col),
                brightest.value
            );
        }
        Command::Flow {
            frames,
            continuous,
            speed_x,
            speed_y,
        } => {
            let running = Arc::new(AtomicBool::new(true));
            if *continuous {
                let flag = Arc::clone(&running);
                ctrlc::set_handler(move || flag.store(false, Ordering::SeqCst))?;
                info!("Running until Ctrl-C");
            }

            let mask = calibrate(&mut sensor, &window, &mut counters)?;
            let estimator = FlowEstimator::from_config(&config.flow);

            set_scene(&mut sensor, 0.0, 0.0);
            let mut previous = mask.apply(&capture(&mut sensor, &window, &mut counters)?)?;

            let mut frame = 0u32;
            while running.load(Ordering::SeqCst) && (*continuous || frame < *frames) {
                frame += 1;
                let shift = frame as f32;
                set_scene(&mut sensor, shift * speed_x, shift * speed_y);
                let current = mask.apply(&capture(&mut sensor, &window, &mut counters)?)?;

                let flow = estimator.estimate(&current, &previous)?;
                let step = odometry.update(flow);
                let (x, y) = odometry.position();
                println!(
                    "frame {:>5}  flow {:>6} {:>6}  filtered {:>6} {:>6}  position {:>8} {:>8}",
                    frame, flow.dx, flow.dy, step.filtered.dx, step.filtered.dy, x, y
                );
                previous = current;
            }

            let (x, y) = odometry.accumulators();
            info!(
                frames = frame,
                accepted = x.accepted() + y.accepted(),
                rejected = x.rejected() + y.rejected(),
                "Flow run finished"
            );
        }
    }

    if cli.metrics {
        let registry = MetricsRegistry::new()?;
        let snapshot = MetricsSnapshot::from_components(
            counters.scans,
            sensor.port().io().reads(),
            sensor.port(),
            &odometry,
        );
        registry.update(&snapshot);
        print!("{}", registry.encode()?);
    }

    Ok(())
}

/// Captures the FPN mask against the chip's uniform default scene.
fn calibrate(
    sensor: &mut Sensor<SimulatedChip>,
    window: &ScanWindow,
    counters: &mut Counters,
) -> Result<FpnMask, CliError> {
    sensor
        .port_mut()
        .io_mut()
        .set_scene(|_, _| ADC_MAX / 2);
    let flat = capture(sensor, window, counters)?;
    match FpnMask::capture(&flat) {
        Ok(mask) => Ok(mask),
        Err(e) => {
            warn!("Calibration frame rejected: {}", e);
            Err(e.into())
        }
    }
}

fn capture(
    sensor: &mut Sensor<SimulatedChip>,
    window: &ScanWindow,
    counters: &mut Counters,
) -> Result<Image<Pixel>, CliError> {
    let frame = sensor.engine().capture(window)?;
    counters.scans += 1;
    Ok(frame)
}

/// Smooth textured scene translated by (`dx`, `dy`) pixels.
fn set_scene(sensor: &mut Sensor<SimulatedChip>, dx: f32, dy: f32) {
    let mid = f32::from(ADC_MAX / 2);
    sensor.port_mut().io_mut().set_scene(|row, col| {
        let x = f32::from(col) - dx;
        let y = f32::from(row) - dy;
        let value = mid + 180.0 * (x / 5.0).sin() * (y / 7.0).cos() + 60.0 * (x / 11.0 + y / 13.0).sin();
        value.clamp(0.0, f32::from(ADC_MAX)) as Pixel
    });
}
