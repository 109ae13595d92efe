//! Background watches polled once per scheduler tick.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::constants::TELEMETRY_REFRESH_INTERVAL;
use crate::control::actuators::ActuatorHandle;
use crate::control::vessel::{VehicleSnapshot, Vessel};

/// Shared on/off flag of a watch. Clones observe the same flag.
#[derive(Debug, Clone)]
pub struct WatchHandle {
    name: &'static str,
    active: Arc<AtomicBool>,
}

impl WatchHandle {
    fn new(name: &'static str) -> Self {
        WatchHandle {
            name,
            active: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    fn set(&self, active: bool) {
        if self.active.swap(active, Ordering::SeqCst) != active {
            event!("Watch '{}' {}", self.name, if active { "armed" } else { "disarmed" });
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StagingEvent {
    /// A stage-advance command went out.
    Fired,
    /// The new stage is live and further staging is possible.
    Confirmed { stage_index: i32 },
    /// Stage index reached zero; the watch disarmed itself.
    Exhausted,
}

/// Fires a stage advance whenever thrust drops out or the active stage runs dry.
pub struct StagingWatch {
    handle: WatchHandle,
    awaiting_stage: bool,
    fired: u32,
}

impl StagingWatch {
    fn new() -> Self {
        StagingWatch {
            handle: WatchHandle::new("staging"),
            awaiting_stage: false,
            fired: 0,
        }
    }

    pub fn handle(&self) -> &WatchHandle {
        &self.handle
    }

    pub fn fired(&self) -> u32 {
        self.fired
    }

    pub fn poll<V: Vessel + ?Sized>(
        &mut self,
        snapshot: &VehicleSnapshot,
        actuators: &mut ActuatorHandle<'_, V>,
    ) -> Option<StagingEvent> {
        if !self.handle.is_active() {
            return None;
        }

        if self.awaiting_stage {
            if !actuators.vessel().stage_ready() {
                return None;
            }
            self.awaiting_stage = false;
            if snapshot.stage_index <= 0 {
                info!("Final stage active, staging watch disarmed");
                self.handle.set(false);
                return Some(StagingEvent::Exhausted);
            }
            return Some(StagingEvent::Confirmed {
                stage_index: snapshot.stage_index,
            });
        }

        if snapshot.available_thrust == 0.0 || snapshot.stage_fuel <= 0.0 {
            info!(
                "Staging at t={:.1}, altitude {:.0} m (stage {})",
                snapshot.time, snapshot.altitude, snapshot.stage_index
            );
            actuators.stage();
            self.awaiting_stage = true;
            self.fired += 1;
            return Some(StagingEvent::Fired);
        }
        None
    }
}

/// Signals when the periodic telemetry frame is due.
pub struct TelemetryRefreshWatch {
    handle: WatchHandle,
    interval: f64,
    last_refresh: Option<f64>,
}

impl TelemetryRefreshWatch {
    fn new(interval: f64) -> Self {
        TelemetryRefreshWatch {
            handle: WatchHandle::new("telemetry refresh"),
            interval,
            last_refresh: None,
        }
    }

    pub fn handle(&self) -> &WatchHandle {
        &self.handle
    }

    pub fn poll(&mut self, now: f64) -> bool {
        if !self.handle.is_active() {
            return false;
        }
        match self.last_refresh {
            Some(last) if now - last < self.interval => false,
            _ => {
                self.last_refresh = Some(now);
                true
            }
        }
    }
}

/// Owns every background watch of a mission and disarms them all when dropped.
pub struct WatchSet {
    pub staging: StagingWatch,
    pub telemetry: TelemetryRefreshWatch,
}

impl WatchSet {
    pub fn new() -> Self {
        WatchSet {
            staging: StagingWatch::new(),
            telemetry: TelemetryRefreshWatch::new(TELEMETRY_REFRESH_INTERVAL),
        }
    }

    pub fn arm(&mut self) {
        self.staging.handle.set(true);
        self.telemetry.handle.set(true);
    }

    pub fn handles(&self) -> Vec<WatchHandle> {
        vec![self.staging.handle.clone(), self.telemetry.handle.clone()]
    }

    pub fn any_active(&self) -> bool {
        self.staging.handle.is_active() || self.telemetry.handle.is_active()
    }

    pub fn disarm_all(&mut self) {
        self.staging.handle.set(false);
        self.telemetry.handle.set(false);
    }
}

impl Default for WatchSet {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for WatchSet {
    fn drop(&mut self) {
        self.disarm_all();
    }
}
