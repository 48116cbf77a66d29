use anyhow::Result;
use clap::Parser;
use head_teleop::config::AppConfig;
use head_teleop::control_loop::ControlLoop;
use head_teleop::drone::{simulated_telemetry_loop, SimulatedDrone};
use head_teleop::headset::SimulatedHeadset;
use head_teleop::input::{InputSource, KeyboardInput, ScriptedInput};
use head_teleop::telemetry::TelemetryStore;
use std::path::PathBuf;
use std::time::Instant;
use tokio::time::{interval, Duration, MissedTickBehavior};

/// Simulated drone telemetry callback rate (10 Hz).
const TELEMETRY_PERIOD: Duration = Duration::from_millis(100);
const STATUS_PERIOD: Duration = Duration::from_secs(5);

#[derive(Parser, Debug)]
#[command(name = "head_teleop")]
#[command(about = "Fly a quadcopter by head pose while logging gaze and drone telemetry")]
struct Args {
    /// JSON config file (defaults are used when it does not exist)
    #[arg(long, default_value = "head_teleop.json")]
    config: PathBuf,

    /// Duration in seconds (0 = until quit)
    #[arg(long, value_name = "SECONDS", default_value = "0")]
    duration: u64,

    /// Log directory, overrides logging.log_dir
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Control tick rate, overrides tick_hz
    #[arg(long)]
    tick_hz: Option<u32>,

    /// Read operator keys from the terminal instead of running the scripted demo
    #[arg(long)]
    interactive: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut config = AppConfig::load(&args.config)?;
    if let Some(dir) = args.output_dir {
        config.logging.log_dir = dir;
    }
    if let Some(hz) = args.tick_hz {
        config.tick_hz = hz;
    }
    config.validate()?;

    log::info!(
        "head_teleop starting: {} Hz, logs in {}, {} input",
        config.tick_hz,
        config.logging.log_dir.display(),
        if args.interactive { "keyboard" } else { "scripted" }
    );

    let store = TelemetryStore::new();
    let drone = SimulatedDrone::new();
    let telemetry_task = tokio::spawn(simulated_telemetry_loop(
        drone.clone(),
        store.publisher(),
        TELEMETRY_PERIOD,
    ));

    let mut input: Box<dyn InputSource> = if args.interactive {
        log::info!("Keys: space gaze calibration, o mark origin, g logging, t/l take-off/land, q quit");
        Box::new(KeyboardInput::new()?)
    } else {
        Box::new(ScriptedInput::demo(config.tick_hz))
    };

    let mut control = ControlLoop::new(&config, SimulatedHeadset::spawn(), drone, store);

    let mut frame_clock = interval(Duration::from_secs_f64(1.0 / config.tick_hz as f64));
    frame_clock.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let start = Instant::now();
    let mut last_status = Instant::now();

    loop {
        tokio::select! {
            _ = frame_clock.tick() => {}
            _ = &mut ctrl_c => {
                log::info!("Interrupted, stopping...");
                break;
            }
        }

        if args.duration > 0 && start.elapsed().as_secs() >= args.duration {
            log::info!("Duration reached, stopping...");
            break;
        }

        let frame = match input.poll() {
            Ok(frame) => frame,
            Err(e) => {
                log::error!("Input polling failed: {}", e);
                break;
            }
        };
        if frame.quit {
            log::info!("Quit requested");
            break;
        }

        let report = control.tick(&frame);

        if last_status.elapsed() >= STATUS_PERIOD {
            log::info!(
                "{:?} | flying={} logging={} | yaw_err={:+.3} | axes lx={:+.1} ly={:+.1} rx={:+.1} ry={:+.1}{}",
                report.phase,
                control.drone().is_flying(),
                report.logging,
                report.rotation_diff,
                report.axes.lx,
                report.axes.ly,
                report.axes.rx,
                report.axes.ry,
                if report.telemetry_stale { " | telemetry stale" } else { "" }
            );
            last_status = Instant::now();
        }
    }

    // Leave raw mode before the final log lines
    drop(input);
    let summary = control.shutdown();
    telemetry_task.abort();

    println!(
        "Session: {} ticks, {} gaze rows, {} telemetry rows, origin {}",
        summary.ticks,
        summary.gaze_rows,
        summary.telemetry_rows,
        if summary.calibrated { "captured" } else { "not captured" }
    );

    Ok(())
}
