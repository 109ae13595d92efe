//! Interface to the simulation host: state queries and actuator commands.

use std::fmt;

use crate::config::WarpMode;
use crate::control::mission::CelestialBody;
use crate::errors::MissionError;
use crate::utils::vector3d::Vec3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VesselStatus {
    Prelaunch,
    Landed,
    Flying,
    SubOrbital,
    Orbiting,
}

impl VesselStatus {
    pub fn is_on_ground(&self) -> bool {
        matches!(self, VesselStatus::Prelaunch | VesselStatus::Landed)
    }
}

impl fmt::Display for VesselStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            VesselStatus::Prelaunch => "PRELAUNCH",
            VesselStatus::Landed => "LANDED",
            VesselStatus::Flying => "FLYING",
            VesselStatus::SubOrbital => "SUB_ORBITAL",
            VesselStatus::Orbiting => "ORBITING",
        };
        write!(f, "{name}")
    }
}

/// Point-in-time read of the vessel. Never kept past the tick it was taken in.
#[derive(Debug, Clone, PartialEq)]
pub struct VehicleSnapshot {
    pub time: f64,
    pub status: VesselStatus,
    pub stage_index: i32,
    pub mass: f64,
    pub available_thrust: f64,
    pub isp: f64,
    pub stage_fuel: f64,
    pub altitude: f64,
    pub latitude: f64,
    pub apoapsis: f64,
    pub periapsis: f64,
    pub eccentricity: f64,
    pub semi_major_axis: f64,
    pub eta_apoapsis: f64,
    pub position: Vec3,
    pub velocity: Vec3,
    pub surface_velocity: Vec3,
    pub facing: Vec3,
}

/// Commanded attitude: pointing direction plus a roll reference.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SteeringTarget {
    pub direction: Vec3,
    pub top: Vec3,
}

impl SteeringTarget {
    /// Points along `direction` with an arbitrary stable roll reference.
    pub fn along(direction: Vec3) -> Self {
        let reference = if direction.cross(&Vec3::z()).norm() > 1e-6 {
            Vec3::z()
        } else {
            Vec3::x()
        };
        let top = direction
            .cross(&reference)
            .cross(&direction)
            .try_normalize(f64::EPSILON)
            .unwrap_or(reference);
        SteeringTarget { direction, top }
    }
}

pub trait Vessel {
    fn name(&self) -> &str;
    fn body(&self) -> &CelestialBody;
    fn snapshot(&self) -> VehicleSnapshot;

    fn set_throttle(&mut self, throttle: f64);
    /// `None` releases the steering lock.
    fn set_steering(&mut self, target: Option<SteeringTarget>);
    fn stage(&mut self);
    fn stage_ready(&self) -> bool;

    fn request_warp(&mut self, until: f64, mode: WarpMode);
    fn cancel_warp(&mut self);
    fn is_warping(&self) -> bool;

    /// Yields to the host until the next scheduler tick.
    fn advance(&mut self) -> Result<(), MissionError>;
}
