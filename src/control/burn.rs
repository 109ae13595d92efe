use crate::constants::BURN_COMPLETE_EPSILON;
use crate::control::actuators::{ActuatorHandle, Authority};
use crate::control::mission::CelestialBody;
use crate::control::vessel::{SteeringTarget, VehicleSnapshot, Vessel};
use crate::errors::ActuatorError;
use crate::trajectory_system::orbital_mechanics::{
    circularization_delta_v, ideal_burn_time, velocity_at_apoapsis,
};
use crate::utils::vector3d::{normalize_or, LocalFrame, Vec3};

/// Circularization burn scheduled during the coast to apoapsis.
///
/// The world-frame vector is left empty until the burn starts: velocity direction
/// drifts over the coast, so it is only meaningful at the moment of use.
#[derive(Debug, Clone, PartialEq)]
pub struct BurnPlan {
    pub delta_v: f64,
    pub duration: f64,
    pub start_time: f64,
    vector: Option<Vec3>,
}

impl BurnPlan {
    /// Plans a burn centered on the next apoapsis crossing.
    pub fn circularization(snapshot: &VehicleSnapshot, body: &CelestialBody) -> Self {
        let delta_v = circularization_delta_v(
            body.mu,
            body.radius,
            snapshot.apoapsis,
            snapshot.semi_major_axis,
        );
        let duration = ideal_burn_time(delta_v, snapshot.mass, snapshot.available_thrust, snapshot.isp);
        BurnPlan {
            delta_v,
            duration,
            start_time: snapshot.time + snapshot.eta_apoapsis - duration / 2.0,
            vector: None,
        }
    }

    pub fn vector(&self) -> Option<Vec3> {
        self.vector
    }

    pub fn countdown(&self, now: f64) -> f64 {
        self.start_time - now
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BurnStatus {
    Burning { throttle: f64, remaining: f64 },
    Done,
}

/// Flies a [`BurnPlan`] open loop for its estimated duration.
pub struct BurnExecutor {
    plan: BurnPlan,
    started_at: Option<f64>,
    last_time: f64,
}

impl BurnExecutor {
    pub fn new(plan: BurnPlan) -> Self {
        BurnExecutor {
            plan,
            started_at: None,
            last_time: 0.0,
        }
    }

    pub fn plan(&self) -> &BurnPlan {
        &self.plan
    }

    pub fn elapsed(&self, now: f64) -> Option<f64> {
        self.started_at.map(|start| now - start)
    }

    /// Fixes the burn vector from the predicted apoapsis velocity and lights the engine.
    pub fn begin<V: Vessel + ?Sized>(
        &mut self,
        snapshot: &VehicleSnapshot,
        mu: f64,
        actuators: &mut ActuatorHandle<'_, V>,
    ) -> Result<Vec3, ActuatorError> {
        let up = LocalFrame::at(&snapshot.position).up;
        let predicted = velocity_at_apoapsis(mu, &snapshot.position, &snapshot.velocity);
        let direction = normalize_or(&predicted, up);
        let vector = direction * self.plan.delta_v;
        self.plan.vector = Some(vector);

        actuators.set_steering(
            Authority::BurnExecutor,
            SteeringTarget::along(normalize_or(&vector, direction)),
        )?;
        actuators.set_throttle(Authority::BurnExecutor, 1.0)?;
        self.started_at = Some(snapshot.time);
        self.last_time = snapshot.time;

        info!(
            "Circularization burn started: {:.1} m/s over {:.2} s",
            self.plan.delta_v, self.plan.duration
        );
        Ok(vector)
    }

    pub fn update<V: Vessel + ?Sized>(
        &mut self,
        snapshot: &VehicleSnapshot,
        actuators: &mut ActuatorHandle<'_, V>,
    ) -> Result<BurnStatus, ActuatorError> {
        let started_at = *self.started_at.get_or_insert(snapshot.time);
        let tick = snapshot.time - self.last_time;
        self.last_time = snapshot.time;

        let remaining = self.plan.duration - (snapshot.time - started_at);
        if remaining <= BURN_COMPLETE_EPSILON {
            actuators.set_throttle(Authority::BurnExecutor, 0.0)?;
            info!("Circularization burn complete after {:.2} s", snapshot.time - started_at);
            return Ok(BurnStatus::Done);
        }

        let throttle = trimmed_throttle(remaining, tick);
        actuators.set_throttle(Authority::BurnExecutor, throttle)?;
        Ok(BurnStatus::Burning { throttle, remaining })
    }
}

/// Full throttle, scaled down on the last tick so the burn ends on time.
fn trimmed_throttle(remaining: f64, tick: f64) -> f64 {
    if tick > 0.0 {
        (remaining / tick).min(1.0)
    } else {
        1.0
    }
}
