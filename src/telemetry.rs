use crate::types::DroneTelemetrySample;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// Copy of the latest published telemetry.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TelemetrySnapshot {
    pub sample: DroneTelemetrySample,
    /// Number of samples published so far.
    pub updates: u64,
    pub received_at: Option<Instant>,
}

impl TelemetrySnapshot {
    /// True until the link has published anything. The sample is then the
    /// all-zero default, not a real zero-state drone.
    pub fn is_stale(&self) -> bool {
        self.updates == 0
    }

    pub fn age(&self) -> Option<Duration> {
        self.received_at.map(|t| t.elapsed())
    }
}

/// Latest drone telemetry, shared between the link's callback thread and
/// the control tick.
///
/// Writers publish a whole sample under the lock; readers copy the
/// snapshot out and release the lock before using it, so a tick never
/// sees a half-updated sample.
#[derive(Clone, Default)]
pub struct TelemetryStore {
    inner: Arc<Mutex<TelemetrySnapshot>>,
}

impl TelemetryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle for the telemetry producer.
    pub fn publisher(&self) -> TelemetryPublisher {
        TelemetryPublisher {
            inner: Arc::clone(&self.inner),
        }
    }

    pub fn latest(&self) -> TelemetrySnapshot {
        *lock_snapshot(&self.inner)
    }
}

#[derive(Clone)]
pub struct TelemetryPublisher {
    inner: Arc<Mutex<TelemetrySnapshot>>,
}

impl TelemetryPublisher {
    pub fn publish(&self, sample: DroneTelemetrySample) {
        let mut snapshot = lock_snapshot(&self.inner);
        snapshot.sample = sample;
        snapshot.updates += 1;
        snapshot.received_at = Some(Instant::now());
    }
}

// A panicking publisher cannot leave a torn sample behind (the copy is a
// single assignment), so a poisoned lock still holds a usable snapshot.
fn lock_snapshot(inner: &Mutex<TelemetrySnapshot>) -> MutexGuard<'_, TelemetrySnapshot> {
    inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
