use crate::config::WarpMode;
use crate::control::vessel::{SteeringTarget, Vessel};
use crate::errors::{ActuatorError, MissionError};

/// Components that may hold throttle or steering authority.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Authority {
    Mission,
    ThrottleController,
    AttitudeProgram,
    BurnExecutor,
}

/// Exclusive access to the vessel's actuators for the duration of a mission.
///
/// Throttle and steering each have a single owner. Ownership moves only through
/// the `hand_off_*` calls. Dropping the handle zeroes the throttle and unlocks
/// steering, so every exit path leaves the vessel released.
pub struct ActuatorHandle<'v, V: Vessel + ?Sized> {
    vessel: &'v mut V,
    throttle_owner: Option<Authority>,
    steering_owner: Option<Authority>,
    throttle: f64,
    steering: Option<SteeringTarget>,
    released: bool,
}

impl<'v, V: Vessel + ?Sized> ActuatorHandle<'v, V> {
    pub fn acquire(vessel: &'v mut V) -> Self {
        event!("Actuators acquired for {}", vessel.name());
        ActuatorHandle {
            vessel,
            throttle_owner: Some(Authority::Mission),
            steering_owner: Some(Authority::Mission),
            throttle: 0.0,
            steering: None,
            released: false,
        }
    }

    pub fn vessel(&self) -> &V {
        &*self.vessel
    }

    #[cfg(test)]
    pub(crate) fn vessel_mut(&mut self) -> &mut V {
        &mut *self.vessel
    }

    pub fn throttle(&self) -> f64 {
        self.throttle
    }

    pub fn steering(&self) -> Option<SteeringTarget> {
        self.steering
    }

    pub fn throttle_owner(&self) -> Option<Authority> {
        self.throttle_owner
    }

    pub fn steering_owner(&self) -> Option<Authority> {
        self.steering_owner
    }

    pub fn hand_off_throttle(&mut self, to: Authority) {
        if self.throttle_owner != Some(to) {
            event!("Throttle authority {:?} -> {:?}", self.throttle_owner, to);
            self.throttle_owner = Some(to);
        }
    }

    pub fn hand_off_steering(&mut self, to: Authority) {
        if self.steering_owner != Some(to) {
            event!("Steering authority {:?} -> {:?}", self.steering_owner, to);
            self.steering_owner = Some(to);
        }
    }

    pub fn set_throttle(&mut self, by: Authority, throttle: f64) -> Result<(), ActuatorError> {
        self.check(by, self.throttle_owner, "throttle")?;
        self.throttle = throttle.clamp(0.0, 1.0);
        self.vessel.set_throttle(self.throttle);
        Ok(())
    }

    pub fn set_steering(&mut self, by: Authority, target: SteeringTarget) -> Result<(), ActuatorError> {
        self.check(by, self.steering_owner, "steering")?;
        self.steering = Some(target);
        self.vessel.set_steering(Some(target));
        Ok(())
    }

    pub fn stage(&mut self) {
        self.vessel.stage();
    }

    pub fn warp_pending(&self) -> bool {
        self.vessel.is_warping()
    }

    pub fn request_warp(&mut self, until: f64, mode: WarpMode) {
        if mode != WarpMode::NoWarp {
            info!("Time compression ({mode}) until t={until:.1}");
            self.vessel.request_warp(until, mode);
        }
    }

    pub fn advance(&mut self) -> Result<(), MissionError> {
        self.vessel.advance()
    }

    /// Zeroes the throttle, unlocks steering and drops all ownership. Idempotent.
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        if self.vessel.is_warping() {
            self.vessel.cancel_warp();
        }
        self.vessel.set_throttle(0.0);
        self.vessel.set_steering(None);
        self.throttle = 0.0;
        self.steering = None;
        self.throttle_owner = None;
        self.steering_owner = None;
        self.released = true;
        event!("Actuators released");
    }

    fn check(&self, by: Authority, owner: Option<Authority>, actuator: &'static str) -> Result<(), ActuatorError> {
        if self.vessel.is_warping() {
            return Err(ActuatorError::WarpPending);
        }
        if owner != Some(by) {
            return Err(ActuatorError::NotOwner { actuator, owner, requester: by });
        }
        Ok(())
    }
}

impl<V: Vessel + ?Sized> Drop for ActuatorHandle<'_, V> {
    fn drop(&mut self) {
        self.release();
    }
}
