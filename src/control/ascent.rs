use strum_macros::Display;

use crate::config::{MissionParameters, WarpMode};
use crate::constants::WARP_LEAD_TIME;
use crate::control::actuators::{ActuatorHandle, Authority};
use crate::control::attitude::{AttitudeProgram, SteeringMode};
use crate::control::burn::{BurnExecutor, BurnPlan, BurnStatus};
use crate::control::countdown::Countdown;
use crate::control::mission::CelestialBody;
use crate::control::throttle::ThrottleController;
use crate::control::triggers::WatchSet;
use crate::control::vessel::{SteeringTarget, VehicleSnapshot, Vessel};
use crate::errors::MissionError;
use crate::telemetry_system::telemetry::{TelemetryEvent, TelemetryFrame, TelemetrySink};
use crate::trajectory_system::orbital_mechanics::{circular_speed, equatorial_speed, launch_azimuth};
use crate::utils::vector3d::LocalFrame;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum AscentPhase {
    Countdown,
    Launch,
    Pitchover,
    AOASettle,
    Ascent,
    CoastToCirc,
    Circularizing,
    Complete,
    Aborted,
}

impl AscentPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, AscentPhase::Complete | AscentPhase::Aborted)
    }
}

/// Launch-azimuth for `params` flown from `latitude` on `body`.
pub fn mission_azimuth(params: &MissionParameters, body: &CelestialBody, latitude: f64) -> f64 {
    launch_azimuth(
        latitude,
        params.target_inclination,
        params.launch_direction,
        circular_speed(body.mu, body.radius + params.target_altitude()),
        equatorial_speed(body.radius, body.rotation_period),
    )
}

/// Sequences the ascent one scheduler tick at a time.
///
/// Each call to [`tick`](Self::tick) dispatches on the current phase exactly once.
/// Throttle regulation is delegated to [`ThrottleController`], steering to
/// [`AttitudeProgram`] and the circularization burn to [`BurnExecutor`].
pub struct AscentStateMachine {
    params: MissionParameters,
    body: CelestialBody,
    azimuth: f64,
    phase: AscentPhase,
    phase_started: f64,
    countdown: Countdown,
    throttle: ThrottleController,
    attitude: AttitudeProgram,
    burn: Option<BurnExecutor>,
    history: Vec<(AscentPhase, f64)>,
}

impl AscentStateMachine {
    pub fn new(params: &MissionParameters, body: &CelestialBody, snapshot: &VehicleSnapshot) -> Self {
        let azimuth = mission_azimuth(params, body, snapshot.latitude);
        let countdown = if params.launch_sync {
            Countdown::synchronized(params.countdown, snapshot.time)
        } else {
            Countdown::new(params.countdown, snapshot.time)
        };
        info!("Launch azimuth {:.3}° from latitude {:.4}°", azimuth, snapshot.latitude);

        AscentStateMachine {
            params: params.clone(),
            body: body.clone(),
            azimuth,
            phase: AscentPhase::Countdown,
            phase_started: snapshot.time,
            countdown,
            throttle: ThrottleController::new(params.target_altitude()),
            attitude: AttitudeProgram::new(azimuth, params.pitchover_angle, body.mu),
            burn: None,
            history: vec![(AscentPhase::Countdown, snapshot.time)],
        }
    }

    pub fn phase(&self) -> AscentPhase {
        self.phase
    }

    pub fn azimuth(&self) -> f64 {
        self.azimuth
    }

    pub fn history(&self) -> &[(AscentPhase, f64)] {
        &self.history
    }

    pub fn countdown(&self) -> &Countdown {
        &self.countdown
    }

    pub fn throttle_controller(&self) -> &ThrottleController {
        &self.throttle
    }

    pub fn steering_mode(&self) -> SteeringMode {
        self.attitude.mode()
    }

    pub fn burn_plan(&self) -> Option<&BurnPlan> {
        self.burn.as_ref().map(BurnExecutor::plan)
    }

    pub fn attitude(&self) -> &AttitudeProgram {
        &self.attitude
    }

    /// Recomputes the launch azimuth for a new launch-site latitude. The steering mode is kept.
    pub fn recompute_azimuth(&mut self, latitude: f64) {
        let azimuth = mission_azimuth(&self.params, &self.body, latitude);
        if (azimuth - self.azimuth).abs() > 1e-9 {
            info!("Launch azimuth recomputed: {:.3}° -> {:.3}°", self.azimuth, azimuth);
        }
        self.azimuth = azimuth;
        self.attitude.set_azimuth(azimuth);
    }

    pub fn abort(&mut self, time: f64, telemetry: &mut dyn TelemetrySink) {
        if !self.phase.is_terminal() {
            self.burn = None;
            self.transition(AscentPhase::Aborted, time, telemetry);
        }
    }

    pub fn tick<V: Vessel + ?Sized>(
        &mut self,
        snapshot: &VehicleSnapshot,
        actuators: &mut ActuatorHandle<'_, V>,
        watches: &mut WatchSet,
        telemetry: &mut dyn TelemetrySink,
    ) -> Result<AscentPhase, MissionError> {
        if self.phase.is_terminal() {
            return Ok(self.phase);
        }

        if !actuators.warp_pending() {
            watches.staging.poll(snapshot, actuators);
            if watches.telemetry.poll(snapshot.time) {
                telemetry.emit(TelemetryEvent::Frame(self.frame(snapshot)));
            }
        }

        match self.phase {
            AscentPhase::Countdown => self.countdown_tick(snapshot, actuators, watches, telemetry)?,
            AscentPhase::Launch
            | AscentPhase::Pitchover
            | AscentPhase::AOASettle
            | AscentPhase::Ascent => self.powered_tick(snapshot, actuators, telemetry)?,
            AscentPhase::CoastToCirc => self.coast_tick(snapshot, actuators, telemetry)?,
            AscentPhase::Circularizing => self.burn_tick(snapshot, actuators, telemetry)?,
            AscentPhase::Complete | AscentPhase::Aborted => {}
        }
        Ok(self.phase)
    }

    fn countdown_tick<V: Vessel + ?Sized>(
        &mut self,
        snapshot: &VehicleSnapshot,
        actuators: &mut ActuatorHandle<'_, V>,
        watches: &mut WatchSet,
        telemetry: &mut dyn TelemetrySink,
    ) -> Result<(), MissionError> {
        if !self.countdown.tick(snapshot.time) {
            return Ok(());
        }

        self.recompute_azimuth(snapshot.latitude);
        let up = LocalFrame::at(&snapshot.position).up;
        actuators.set_throttle(Authority::Mission, 1.0)?;
        actuators.set_steering(Authority::Mission, SteeringTarget::along(up))?;
        actuators.stage();
        watches.arm();
        info!("Ignition at t={:.1}", snapshot.time);

        actuators.hand_off_throttle(Authority::ThrottleController);
        actuators.hand_off_steering(Authority::AttitudeProgram);
        self.transition(AscentPhase::Launch, snapshot.time, telemetry);
        Ok(())
    }

    fn powered_tick<V: Vessel + ?Sized>(
        &mut self,
        snapshot: &VehicleSnapshot,
        actuators: &mut ActuatorHandle<'_, V>,
        telemetry: &mut dyn TelemetrySink,
    ) -> Result<(), MissionError> {
        self.throttle.drive(snapshot, actuators)?;
        self.attitude.steer(snapshot, actuators)?;
        let in_phase = snapshot.time - self.phase_started;

        match self.phase {
            AscentPhase::Launch => {
                if snapshot.altitude >= self.params.turn_start_altitude {
                    let next = if self.body.has_atmosphere() {
                        AscentPhase::Pitchover
                    } else {
                        AscentPhase::Ascent
                    };
                    self.transition(next, snapshot.time, telemetry);
                }
            }
            AscentPhase::Pitchover => {
                if self.attitude.pitchover_converged(snapshot) {
                    self.transition(AscentPhase::AOASettle, snapshot.time, telemetry);
                } else if in_phase > self.params.steering_duration {
                    warn!("Pitchover did not converge within {:.0} s, continuing", self.params.steering_duration);
                    self.transition(AscentPhase::AOASettle, snapshot.time, telemetry);
                }
            }
            AscentPhase::AOASettle => {
                if self.attitude.angle_of_attack_settled(snapshot) {
                    self.transition(AscentPhase::Ascent, snapshot.time, telemetry);
                } else if in_phase > self.params.steering_duration {
                    warn!("Angle of attack did not settle within {:.0} s, continuing", self.params.steering_duration);
                    self.transition(AscentPhase::Ascent, snapshot.time, telemetry);
                }
            }
            AscentPhase::Ascent => {
                let clear_of_atmosphere =
                    !self.body.has_atmosphere() || snapshot.altitude > self.body.atmosphere_height;
                if !self.throttle.is_active() && clear_of_atmosphere && snapshot.available_thrust > 0.0 {
                    self.plan_circularization(snapshot, actuators, telemetry)?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn plan_circularization<V: Vessel + ?Sized>(
        &mut self,
        snapshot: &VehicleSnapshot,
        actuators: &mut ActuatorHandle<'_, V>,
        telemetry: &mut dyn TelemetrySink,
    ) -> Result<(), MissionError> {
        let plan = BurnPlan::circularization(snapshot, &self.body);
        info!(
            "Circularization planned: {:.1} m/s, {:.2} s burn starting at t={:.1}",
            plan.delta_v, plan.duration, plan.start_time
        );
        telemetry.emit(TelemetryEvent::Maneuver {
            burn_duration: plan.duration,
            delta_v: plan.delta_v,
        });

        self.transition(AscentPhase::CoastToCirc, snapshot.time, telemetry);
        self.attitude.steer(snapshot, actuators)?;

        let warp_until = plan.start_time - WARP_LEAD_TIME;
        if self.params.warp_mode != WarpMode::NoWarp && warp_until > snapshot.time {
            actuators.request_warp(warp_until, self.params.warp_mode);
        }
        self.burn = Some(BurnExecutor::new(plan));
        Ok(())
    }

    fn coast_tick<V: Vessel + ?Sized>(
        &mut self,
        snapshot: &VehicleSnapshot,
        actuators: &mut ActuatorHandle<'_, V>,
        telemetry: &mut dyn TelemetrySink,
    ) -> Result<(), MissionError> {
        if actuators.warp_pending() {
            return Ok(());
        }
        self.attitude.steer(snapshot, actuators)?;

        let Some(burn) = self.burn.as_mut() else {
            return Ok(());
        };
        if snapshot.time >= burn.plan().start_time {
            actuators.hand_off_throttle(Authority::BurnExecutor);
            actuators.hand_off_steering(Authority::BurnExecutor);
            burn.begin(snapshot, self.body.mu, actuators)?;
            self.transition(AscentPhase::Circularizing, snapshot.time, telemetry);
        }
        Ok(())
    }

    fn burn_tick<V: Vessel + ?Sized>(
        &mut self,
        snapshot: &VehicleSnapshot,
        actuators: &mut ActuatorHandle<'_, V>,
        telemetry: &mut dyn TelemetrySink,
    ) -> Result<(), MissionError> {
        let Some(burn) = self.burn.as_mut() else {
            return Ok(());
        };
        if burn.update(snapshot, actuators)? == BurnStatus::Done {
            self.burn = None;
            actuators.hand_off_throttle(Authority::Mission);
            actuators.hand_off_steering(Authority::Mission);
            self.transition(AscentPhase::Complete, snapshot.time, telemetry);
        }
        Ok(())
    }

    fn transition(&mut self, next: AscentPhase, time: f64, telemetry: &mut dyn TelemetrySink) {
        info!("{} -> {} at t={:.1}", self.phase, next, time);
        self.phase = next;
        self.phase_started = time;
        self.history.push((next, time));

        match next {
            AscentPhase::Launch => self.attitude.set_mode(SteeringMode::Vertical),
            AscentPhase::Pitchover | AscentPhase::AOASettle => self.attitude.set_mode(SteeringMode::PitchHold),
            AscentPhase::Ascent if self.body.has_atmosphere() => {
                self.attitude.set_mode(SteeringMode::SurfacePrograde)
            }
            AscentPhase::Ascent => self.attitude.set_mode(SteeringMode::PitchHold),
            AscentPhase::CoastToCirc => self.attitude.set_mode(SteeringMode::ApoapsisPrograde),
            _ => {}
        }
        telemetry.emit(TelemetryEvent::Status { time, phase: next });
    }

    fn frame(&self, snapshot: &VehicleSnapshot) -> TelemetryFrame {
        let burn_countdown = match (self.phase, &self.burn) {
            (AscentPhase::CoastToCirc, Some(burn)) => Some(burn.plan().countdown(snapshot.time)),
            _ => None,
        };
        let burn_elapsed = match (self.phase, &self.burn) {
            (AscentPhase::Circularizing, Some(burn)) => burn.elapsed(snapshot.time),
            _ => None,
        };
        TelemetryFrame {
            time: snapshot.time,
            stage: snapshot.stage_index,
            pitch: LocalFrame::at(&snapshot.position).pitch_of(&snapshot.facing),
            altitude: snapshot.altitude,
            apoapsis: snapshot.apoapsis,
            periapsis: snapshot.periapsis,
            eccentricity: snapshot.eccentricity,
            burn_countdown,
            burn_elapsed,
        }
    }
}
