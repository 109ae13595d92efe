use crate::constants::{AOA_TOLERANCE, PITCHOVER_TOLERANCE};
use crate::control::actuators::{ActuatorHandle, Authority};
use crate::control::vessel::{SteeringTarget, VehicleSnapshot, Vessel};
use crate::errors::ActuatorError;
use crate::trajectory_system::orbital_mechanics::velocity_at_apoapsis;
use crate::utils::vector3d::{angle_between, normalize_or, LocalFrame, Vec3};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SteeringMode {
    /// Local up.
    Vertical,
    /// Launch azimuth at `90 - pitchover` degrees above the horizon.
    PitchHold,
    /// Zero angle of attack against the surface-relative velocity.
    SurfacePrograde,
    /// Orbital velocity direction at the next apoapsis crossing.
    ApoapsisPrograde,
}

pub struct AttitudeProgram {
    azimuth: f64,
    pitchover_angle: f64,
    mu: f64,
    mode: SteeringMode,
}

impl AttitudeProgram {
    pub fn new(azimuth: f64, pitchover_angle: f64, mu: f64) -> Self {
        AttitudeProgram {
            azimuth,
            pitchover_angle,
            mu,
            mode: SteeringMode::Vertical,
        }
    }

    pub fn mode(&self) -> SteeringMode {
        self.mode
    }

    pub fn azimuth(&self) -> f64 {
        self.azimuth
    }

    pub fn set_azimuth(&mut self, azimuth: f64) {
        self.azimuth = azimuth;
    }

    pub fn set_mode(&mut self, mode: SteeringMode) {
        if self.mode != mode {
            event!("Steering mode {:?} -> {:?}", self.mode, mode);
            self.mode = mode;
        }
    }

    pub fn pitch_hold_direction(&self, snapshot: &VehicleSnapshot) -> Vec3 {
        LocalFrame::at(&snapshot.position).heading(self.azimuth, 90.0 - self.pitchover_angle)
    }

    pub fn target(&self, snapshot: &VehicleSnapshot) -> Vec3 {
        let up = LocalFrame::at(&snapshot.position).up;
        match self.mode {
            SteeringMode::Vertical => up,
            SteeringMode::PitchHold => self.pitch_hold_direction(snapshot),
            SteeringMode::SurfacePrograde => normalize_or(&snapshot.surface_velocity, up),
            SteeringMode::ApoapsisPrograde => {
                let predicted = velocity_at_apoapsis(self.mu, &snapshot.position, &snapshot.velocity);
                normalize_or(&predicted, up)
            }
        }
    }

    pub fn steer<V: Vessel + ?Sized>(
        &self,
        snapshot: &VehicleSnapshot,
        actuators: &mut ActuatorHandle<'_, V>,
    ) -> Result<Vec3, ActuatorError> {
        let direction = self.target(snapshot);
        actuators.set_steering(Authority::AttitudeProgram, SteeringTarget::along(direction))?;
        Ok(direction)
    }

    /// Facing is within tolerance of the pitch-hold vector.
    pub fn pitchover_converged(&self, snapshot: &VehicleSnapshot) -> bool {
        angle_between(&snapshot.facing, &self.pitch_hold_direction(snapshot)) <= PITCHOVER_TOLERANCE
    }

    /// Surface velocity has swung into line with the facing vector.
    pub fn angle_of_attack_settled(&self, snapshot: &VehicleSnapshot) -> bool {
        angle_between(&snapshot.surface_velocity, &snapshot.facing) <= AOA_TOLERANCE
    }
}
