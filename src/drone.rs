use crate::error::{TeleopError, TeleopResult};
use crate::telemetry::TelemetryPublisher;
use crate::types::{CommandAxes, DroneTelemetrySample, Vec3};
use nalgebra::UnitQuaternion;
use std::sync::{Arc, Mutex};
use tokio::time::{interval, Duration};

/// Drone link boundary. Telemetry flows back separately through a
/// [`TelemetryPublisher`].
pub trait DroneLink {
    /// Submit stick axes, each in [-1, 1].
    fn submit_axes(&mut self, axes: CommandAxes) -> TeleopResult<()>;
    fn take_off(&mut self) -> TeleopResult<()>;
    fn land(&mut self) -> TeleopResult<()>;
}

#[derive(Debug, Clone, Copy, Default)]
struct LinkState {
    axes: CommandAxes,
    flying: bool,
}

/// Stand-in link that echoes commanded rates back as telemetry.
///
/// There is no flight model: while flying, yaw and position simply follow
/// the commanded axes at fixed rates, enough to close the loop in a demo.
#[derive(Clone, Default)]
pub struct SimulatedDrone {
    state: Arc<Mutex<LinkState>>,
}

impl SimulatedDrone {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut LinkState) -> R) -> TeleopResult<R> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| TeleopError::Link("simulated link state poisoned".to_string()))?;
        Ok(f(&mut state))
    }

    pub fn is_flying(&self) -> bool {
        self.with_state(|s| s.flying).unwrap_or(false)
    }

    pub fn last_axes(&self) -> CommandAxes {
        self.with_state(|s| s.axes).unwrap_or_default()
    }
}

impl DroneLink for SimulatedDrone {
    fn submit_axes(&mut self, axes: CommandAxes) -> TeleopResult<()> {
        self.with_state(|s| s.axes = axes.clamped())
    }

    fn take_off(&mut self) -> TeleopResult<()> {
        log::info!("Take-off requested");
        self.with_state(|s| s.flying = true)
    }

    fn land(&mut self) -> TeleopResult<()> {
        log::info!("Land requested");
        self.with_state(|s| {
            s.flying = false;
            s.axes = CommandAxes::default();
        })
    }
}

/// Max yaw rate (rad/s) at full stick.
const ECHO_YAW_RATE: f64 = 0.8;
/// Max horizontal and vertical speed (m/s) at full stick.
const ECHO_SPEED: f64 = 0.5;

/// Advance the echoed state by `dt` seconds. Axes are body-frame: rx right,
/// ry forward, ly up; yaw is positive counter-clockwise seen from above.
fn echo_step(sample: &mut DroneTelemetrySample, yaw: &mut f64, axes: &CommandAxes, dt: f64) {
    *yaw += axes.lx * ECHO_YAW_RATE * dt;

    let forward = axes.ry * ECHO_SPEED;
    let right = axes.rx * ECHO_SPEED;
    let up = axes.ly * ECHO_SPEED;
    let (sin, cos) = yaw.sin_cos();
    let north = forward * cos - right * sin;
    let east = forward * sin + right * cos;

    sample.velocity_body = Vec3::new(forward, right, up);
    sample.velocity_ned = Vec3::new(north, east, -up);
    sample.position += Vec3::new(north, east, up) * dt;
    sample.orientation = *UnitQuaternion::from_euler_angles(0.0, 0.0, *yaw).quaternion();
}

/// Telemetry callback loop for [`SimulatedDrone`], publishing at `period`.
pub async fn simulated_telemetry_loop(drone: SimulatedDrone, publisher: TelemetryPublisher, period: Duration) {
    let mut ticker = interval(period);
    let mut sample = DroneTelemetrySample {
        orientation: *UnitQuaternion::identity().quaternion(),
        ..Default::default()
    };
    let mut yaw = 0.0;
    let mut published = 0u64;

    loop {
        ticker.tick().await;
        let Ok(state) = drone.with_state(|s| *s) else {
            log::error!("Simulated telemetry stopped: link state poisoned");
            break;
        };

        let axes = if state.flying { state.axes } else { CommandAxes::default() };
        echo_step(&mut sample, &mut yaw, &axes, period.as_secs_f64());
        publisher.publish(sample);

        published += 1;
        if published % 100 == 0 {
            log::debug!("Simulated telemetry: {} samples", published);
        }
    }
}
