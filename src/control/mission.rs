use std::f64::consts::PI;

use crate::config::{BodyPreset, MissionParameters};
use crate::control::actuators::ActuatorHandle;
use crate::control::ascent::{AscentPhase, AscentStateMachine};
use crate::control::triggers::{WatchHandle, WatchSet};
use crate::control::vessel::{VehicleSnapshot, Vessel};
use crate::errors::MissionError;
use crate::telemetry_system::telemetry::{TelemetryEvent, TelemetrySink};
use crate::utils::vector3d::Vec3;

#[derive(Clone, Debug, PartialEq)]
pub struct CelestialBody {
    pub name: String,
    pub radius: f64,
    /// Gravitational parameter GM.
    pub mu: f64,
    /// Sidereal rotation period; zero for a non-rotating body.
    pub rotation_period: f64,
    pub atmosphere_height: f64,
    pub scale_height: f64,
    pub surface_density: f64,
}

impl CelestialBody {
    pub fn kerbin() -> Self {
        CelestialBody {
            name: "Kerbin".to_string(),
            radius: 600_000.0,
            mu: 3.5316e12,
            rotation_period: 21_549.425,
            atmosphere_height: 70_000.0,
            scale_height: 5_600.0,
            surface_density: 1.225,
        }
    }

    pub fn mun() -> Self {
        CelestialBody {
            name: "Mun".to_string(),
            radius: 200_000.0,
            mu: 6.513_839_8e10,
            rotation_period: 138_984.38,
            atmosphere_height: 0.0,
            scale_height: 0.0,
            surface_density: 0.0,
        }
    }

    pub fn from_preset(preset: BodyPreset) -> Self {
        match preset {
            BodyPreset::Kerbin => Self::kerbin(),
            BodyPreset::Mun => Self::mun(),
        }
    }

    pub fn has_atmosphere(&self) -> bool {
        self.atmosphere_height > 0.0
    }

    pub fn surface_gravity(&self) -> f64 {
        self.mu / self.radius.powi(2)
    }

    pub fn gravity_at_altitude(&self, altitude: f64) -> f64 {
        let distance = self.radius + altitude;
        self.mu / distance.powi(2)
    }

    pub fn angular_velocity(&self) -> Vec3 {
        if self.rotation_period > 0.0 {
            Vec3::new(0.0, 0.0, 2.0 * PI / self.rotation_period)
        } else {
            Vec3::zeros()
        }
    }
}

/// Outcome of a completed mission.
#[derive(Debug, Clone)]
pub struct MissionReport {
    pub vessel: String,
    pub final_phase: AscentPhase,
    pub phases: Vec<(AscentPhase, f64)>,
    pub launch_azimuth: f64,
    pub elapsed: f64,
    pub staging_events: u32,
    pub throttle_arm_count: u32,
    pub final_state: VehicleSnapshot,
}

impl MissionReport {
    pub fn phase_sequence(&self) -> Vec<AscentPhase> {
        self.phases.iter().map(|(phase, _)| *phase).collect()
    }
}

/// Drives one ascent from the pad to a circular orbit.
///
/// Owns the scheduler loop: one host tick, one snapshot, one state-machine dispatch.
/// Actuator authority and background watches are released on every exit path.
pub struct Mission {
    params: MissionParameters,
    watch_handles: Vec<WatchHandle>,
}

impl Mission {
    pub fn new(params: MissionParameters) -> Result<Self, MissionError> {
        params.validate()?;
        Ok(Mission {
            params,
            watch_handles: Vec::new(),
        })
    }

    pub fn params(&self) -> &MissionParameters {
        &self.params
    }

    /// Watches of the most recent flight. Empty until a flight passes preflight.
    pub fn watch_handles(&self) -> &[WatchHandle] {
        &self.watch_handles
    }

    pub fn fly<V: Vessel + ?Sized>(
        &mut self,
        vessel: &mut V,
        telemetry: &mut dyn TelemetrySink,
    ) -> Result<MissionReport, MissionError> {
        let name = vessel.name().to_string();
        let body = vessel.body().clone();
        telemetry.emit(TelemetryEvent::VesselName(name.clone()));

        let start = vessel.snapshot();
        if !start.status.is_on_ground() {
            let err = MissionError::Precondition {
                status: start.status.to_string(),
            };
            error!("{name}: {err}");
            telemetry.emit(TelemetryEvent::Error(err.to_string()));
            telemetry.emit(TelemetryEvent::Status {
                time: start.time,
                phase: AscentPhase::Aborted,
            });
            return Err(err);
        }

        let mut machine = AscentStateMachine::new(&self.params, &body, &start);
        telemetry.emit(TelemetryEvent::MissionParameters {
            turn_start_altitude: self.params.turn_start_altitude,
            pitchover_angle: self.params.pitchover_angle,
            target_altitude: self.params.target_altitude(),
            target_inclination: self.params.target_inclination,
            launch_direction: self.params.launch_direction,
            launch_azimuth: machine.azimuth(),
        });
        telemetry.emit(TelemetryEvent::Status {
            time: start.time,
            phase: AscentPhase::Countdown,
        });
        info!(
            "{name}: {} km at {}° from {} ({} s countdown{})",
            self.params.target_altitude_km,
            self.params.target_inclination,
            body.name,
            self.params.countdown,
            if self.params.launch_sync { ", synchronized" } else { "" }
        );

        let mut watches = WatchSet::new();
        self.watch_handles = watches.handles();

        let outcome = {
            let mut actuators = ActuatorHandle::acquire(vessel);
            let outcome = self.run(&mut machine, &mut actuators, &mut watches, telemetry, start.time);
            watches.disarm_all();
            actuators.release();
            outcome
        };

        let final_state = vessel.snapshot();
        if let Err(err) = outcome {
            error!("{name}: mission failed: {err}");
            telemetry.emit(TelemetryEvent::Error(err.to_string()));
            machine.abort(final_state.time, telemetry);
            return Err(err);
        }

        telemetry.emit(TelemetryEvent::Diagnostic(format!(
            "Final orbit: Ap {:.0} m, Pe {:.0} m, e {:.5}",
            final_state.apoapsis, final_state.periapsis, final_state.eccentricity
        )));
        info!(
            "{name}: orbit achieved, Ap {:.0} m, Pe {:.0} m after {:.1} s",
            final_state.apoapsis,
            final_state.periapsis,
            final_state.time - start.time
        );

        Ok(MissionReport {
            vessel: name,
            final_phase: machine.phase(),
            phases: machine.history().to_vec(),
            launch_azimuth: machine.azimuth(),
            elapsed: final_state.time - start.time,
            staging_events: watches.staging.fired(),
            throttle_arm_count: machine.throttle_controller().arm_count(),
            final_state,
        })
    }

    fn run<V: Vessel + ?Sized>(
        &self,
        machine: &mut AscentStateMachine,
        actuators: &mut ActuatorHandle<'_, V>,
        watches: &mut WatchSet,
        telemetry: &mut dyn TelemetrySink,
        start_time: f64,
    ) -> Result<(), MissionError> {
        loop {
            actuators.advance()?;
            let snapshot = actuators.vessel().snapshot();

            let elapsed = snapshot.time - start_time;
            if elapsed > self.params.max_mission_time {
                return Err(MissionError::Timeout { elapsed });
            }

            if machine.tick(&snapshot, actuators, watches, telemetry)?.is_terminal() {
                return Ok(());
            }
        }
    }
}
