use crate::config::{GazeCalibrationMode, GazeOutputFilter, GazeOutputFrequency};
use crate::types::{EyeSample, GazeSample, Pose, Vec3};
use chrono::Utc;
use crossbeam::channel::{self, Receiver, Sender, TrySendError};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Headset SDK boundary.
pub trait HeadsetSource {
    fn set_output_frequency(&mut self, frequency: GazeOutputFrequency);

    fn set_output_filter(&mut self, filter: GazeOutputFilter);

    /// Ask the SDK to run its own gaze calibration routine.
    fn request_calibration(&mut self, mode: GazeCalibrationMode);

    /// Samples produced since the previous call, oldest first. May be empty.
    fn drain_samples(&mut self) -> Vec<GazeSample>;

    /// Live head pose for this frame.
    fn current_pose(&self) -> Pose;
}

fn sample_period_us(frequency: GazeOutputFrequency) -> u64 {
    match frequency {
        GazeOutputFrequency::MaximumSupported | GazeOutputFrequency::Hz200 => 5_000,
        GazeOutputFrequency::Hz100 => 10_000,
    }
}

/// Synthetic head motion: slow yaw sweep plus lateral and forward sway.
fn simulated_pose(t: f64) -> Pose {
    use std::f64::consts::PI;
    let yaw = 0.6 * (t * 2.0 * PI / 8.0).sin();
    let position = Vec3::new(
        0.05 * (t * 2.0 * PI / 5.0).sin(),
        1.6,
        0.04 * (t * 2.0 * PI / 7.0).sin(),
    );
    Pose::new(position, Vec3::new(0.0, yaw, 0.0))
}

fn simulated_sample(t: f64, seq: u64) -> GazeSample {
    let wander = Vec3::new(0.1 * (t * 1.3).sin(), 0.05 * (t * 0.7).cos(), 1.0).normalize();
    // Periodic single-eye dropouts, like a blink on one side
    let right_valid = seq % 50 != 0;

    GazeSample {
        capture_time: Utc::now(),
        headset: simulated_pose(t),
        combined_forward: wander,
        focus_distance: 1.0 + 0.5 * (t * 0.2).sin().abs(),
        focus_stability: 0.9,
        left: EyeSample {
            forward: wander,
            origin: Vec3::new(-0.032, 0.0, 0.0),
            valid: true,
        },
        right: EyeSample {
            forward: wander,
            origin: Vec3::new(0.032, 0.0, 0.0),
            valid: right_valid,
        },
    }
}

/// Stand-in headset producing gaze samples on its own thread.
pub struct SimulatedHeadset {
    rx: Receiver<GazeSample>,
    period_us: Arc<AtomicU64>,
    running: Arc<AtomicBool>,
    start: Instant,
    handle: Option<JoinHandle<()>>,
}

impl SimulatedHeadset {
    pub fn spawn() -> Self {
        let (tx, rx) = channel::bounded(1024);
        let period_us = Arc::new(AtomicU64::new(sample_period_us(GazeOutputFrequency::MaximumSupported)));
        let running = Arc::new(AtomicBool::new(true));
        let start = Instant::now();

        let handle = {
            let period_us = Arc::clone(&period_us);
            let running = Arc::clone(&running);
            thread::spawn(move || gaze_loop(tx, period_us, running, start))
        };

        Self {
            rx,
            period_us,
            running,
            start,
            handle: Some(handle),
        }
    }
}

fn gaze_loop(tx: Sender<GazeSample>, period_us: Arc<AtomicU64>, running: Arc<AtomicBool>, start: Instant) {
    let mut seq = 0u64;
    while running.load(Ordering::Relaxed) {
        thread::sleep(Duration::from_micros(period_us.load(Ordering::Relaxed)));
        let t = start.elapsed().as_secs_f64();
        match tx.try_send(simulated_sample(t, seq)) {
            Ok(()) => seq += 1,
            Err(TrySendError::Full(_)) => {
                // Nobody drained lately, drop this sample
            }
            Err(TrySendError::Disconnected(_)) => break,
        }
    }
    log::debug!("Simulated headset stopped after {} samples", seq);
}

impl HeadsetSource for SimulatedHeadset {
    fn set_output_frequency(&mut self, frequency: GazeOutputFrequency) {
        self.period_us.store(sample_period_us(frequency), Ordering::Relaxed);
        log::info!("Gaze output frequency set to {:?}", frequency);
    }

    fn set_output_filter(&mut self, filter: GazeOutputFilter) {
        // Simulated gaze is noise-free, nothing to filter
        log::info!("Gaze output filter set to {:?}", filter);
    }

    fn request_calibration(&mut self, mode: GazeCalibrationMode) {
        log::info!("Gaze calibration requested ({:?})", mode);
    }

    fn drain_samples(&mut self) -> Vec<GazeSample> {
        self.rx.try_iter().collect()
    }

    fn current_pose(&self) -> Pose {
        simulated_pose(self.start.elapsed().as_secs_f64())
    }
}

impl Drop for SimulatedHeadset {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
