#[macro_use]
mod logger;

pub mod config;
pub mod constants;
pub mod control;
pub mod errors;
pub mod telemetry_system;
pub mod trajectory_system;
pub mod utils;

pub use config::{LaunchDirection, MissionParameters, ScenarioConfig, WarpMode};
pub use control::actuators::{ActuatorHandle, Authority};
pub use control::ascent::{AscentPhase, AscentStateMachine};
pub use control::mission::{CelestialBody, Mission, MissionReport};
pub use control::rocket::Rocket;
pub use control::vessel::{SteeringTarget, VehicleSnapshot, Vessel, VesselStatus};
pub use errors::{ActuatorError, ConfigError, MissionError};

// Re-export commonly used items from telemetry_system
pub use telemetry_system::telemetry::{Telemetry, TelemetryEvent, TelemetryFrame, TelemetrySink};

// Re-export commonly used utilities
pub use utils::vector3d::Vec3;
