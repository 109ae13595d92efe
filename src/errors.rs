use thiserror::Error;

use crate::control::actuators::Authority;

#[derive(Debug, Error)]
pub enum MissionError {
    #[error("Precondition failed: vessel status is {status}, expected PRELAUNCH or LANDED")]
    Precondition { status: String },

    #[error("Actuator error: {0}")]
    Actuator(#[from] ActuatorError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Mission timed out after {elapsed:.1} s of simulated time")]
    Timeout { elapsed: f64 },

    #[error("Vessel error: {0}")]
    Vessel(String),
}

#[derive(Debug, Error, PartialEq)]
pub enum ActuatorError {
    #[error("{requester:?} commanded the {actuator} but it is owned by {owner:?}")]
    NotOwner {
        actuator: &'static str,
        owner: Option<Authority>,
        requester: Authority,
    },

    #[error("actuator command rejected while time compression is pending")]
    WarpPending,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid parameter: {0}")]
    Invalid(String),

    #[error("unrecognized keyword: {0}")]
    Parse(String),
}
