//! Mission parameters and scenario files.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;

use crate::constants::*;
use crate::errors::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum LaunchDirection {
    #[default]
    North,
    South,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum WarpMode {
    #[default]
    NoWarp,
    Physics,
    Rails,
}

impl FromStr for LaunchDirection {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "NORTH" => Ok(LaunchDirection::North),
            "SOUTH" => Ok(LaunchDirection::South),
            other => Err(ConfigError::Parse(format!("launch direction '{other}'"))),
        }
    }
}

impl FromStr for WarpMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "NOWARP" | "NONE" => Ok(WarpMode::NoWarp),
            "PHYSICS" => Ok(WarpMode::Physics),
            "RAILS" => Ok(WarpMode::Rails),
            other => Err(ConfigError::Parse(format!("time compression mode '{other}'"))),
        }
    }
}

impl TryFrom<String> for LaunchDirection {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl TryFrom<String> for WarpMode {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for LaunchDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LaunchDirection::North => write!(f, "NORTH"),
            LaunchDirection::South => write!(f, "SOUTH"),
        }
    }
}

impl fmt::Display for WarpMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WarpMode::NoWarp => write!(f, "NOWARP"),
            WarpMode::Physics => write!(f, "PHYSICS"),
            WarpMode::Rails => write!(f, "RAILS"),
        }
    }
}

/// Parses the `SYNC`/`NOSYNC` keyword into the launch-sync flag.
pub fn parse_sync_flag(s: &str) -> Result<bool, ConfigError> {
    match s.to_ascii_uppercase().as_str() {
        "SYNC" => Ok(true),
        "NOSYNC" => Ok(false),
        other => Err(ConfigError::Parse(format!("sync flag '{other}'"))),
    }
}

/// Immutable mission input. Validated once before the countdown starts.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct MissionParameters {
    pub target_altitude_km: f64,
    pub target_inclination: f64,
    pub launch_direction: LaunchDirection,
    pub turn_start_altitude: f64,
    pub pitchover_angle: f64,
    pub steering_duration: f64,
    pub warp_mode: WarpMode,
    pub countdown: u32,
    pub launch_sync: bool,
    pub max_mission_time: f64,
}

impl Default for MissionParameters {
    fn default() -> Self {
        MissionParameters {
            target_altitude_km: DEFAULT_TARGET_ALTITUDE_KM,
            target_inclination: DEFAULT_TARGET_INCLINATION,
            launch_direction: LaunchDirection::North,
            turn_start_altitude: DEFAULT_TURN_START_ALTITUDE,
            pitchover_angle: DEFAULT_PITCHOVER_ANGLE,
            steering_duration: DEFAULT_STEERING_DURATION,
            warp_mode: WarpMode::NoWarp,
            countdown: DEFAULT_COUNTDOWN,
            launch_sync: false,
            max_mission_time: DEFAULT_MAX_MISSION_TIME,
        }
    }
}

impl MissionParameters {
    pub fn target_altitude(&self) -> f64 {
        self.target_altitude_km * 1000.0
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| Err(ConfigError::Invalid(msg));

        if !(self.target_altitude_km > 0.0) {
            return invalid(format!("target altitude must be positive, got {} km", self.target_altitude_km));
        }
        if !(0.0..=180.0).contains(&self.target_inclination) {
            return invalid(format!("inclination must be within [0, 180], got {}", self.target_inclination));
        }
        if !(self.turn_start_altitude >= 0.0) {
            return invalid(format!("turn start altitude must not be negative, got {}", self.turn_start_altitude));
        }
        if !(self.pitchover_angle > 0.0 && self.pitchover_angle < 90.0) {
            return invalid(format!("pitchover angle must be within (0, 90), got {}", self.pitchover_angle));
        }
        if !(self.steering_duration > 0.0) {
            return invalid(format!("steering duration must be positive, got {}", self.steering_duration));
        }
        if self.countdown == 0 {
            return invalid("countdown must be at least one second".to_string());
        }
        if !(self.max_mission_time > 0.0) {
            return invalid(format!("mission time limit must be positive, got {}", self.max_mission_time));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum BodyPreset {
    #[default]
    Kerbin,
    Mun,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct EngineConfig {
    pub thrust: f64,
    pub isp: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StageConfig {
    pub dry_mass: f64,
    pub fuel_mass: f64,
    /// Engines that ignite together with the stage.
    pub engines: Vec<EngineConfig>,
}

impl StageConfig {
    pub fn single_engine(dry_mass: f64, fuel_mass: f64, thrust: f64, isp: f64) -> Self {
        StageConfig {
            dry_mass,
            fuel_mass,
            engines: vec![EngineConfig { thrust, isp }],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct VehicleConfig {
    pub name: String,
    pub payload_mass: f64,
    pub drag_area: f64,
    /// Ordered bottom (first to fire) to top.
    pub stages: Vec<StageConfig>,
}

impl Default for VehicleConfig {
    fn default() -> Self {
        VehicleConfig {
            name: "Ascent Test Vehicle".to_string(),
            payload_mass: 500.0,
            drag_area: 1.0,
            stages: vec![
                StageConfig::single_engine(2_000.0, 9_000.0, 255_000.0, 280.0),
                StageConfig::single_engine(500.0, 4_000.0, 120_000.0, 340.0),
            ],
        }
    }
}

/// Everything needed to fly a simulated mission from the command line.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    pub body: BodyPreset,
    pub launch_latitude: f64,
    pub start_time: f64,
    pub time_step: f64,
    pub mission: MissionParameters,
    pub vehicle: VehicleConfig,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        ScenarioConfig {
            body: BodyPreset::Kerbin,
            launch_latitude: -0.0972,
            start_time: 0.0,
            time_step: TIME_STEP,
            mission: MissionParameters::default(),
            vehicle: VehicleConfig::default(),
        }
    }
}

impl ScenarioConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let scenario: ScenarioConfig = toml::from_str(contents)?;
        scenario.validate()?;
        Ok(scenario)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.mission.validate()?;
        if !(self.time_step > 0.0) {
            return Err(ConfigError::Invalid(format!("time step must be positive, got {}", self.time_step)));
        }
        if self.vehicle.stages.is_empty() {
            return Err(ConfigError::Invalid("vehicle needs at least one stage".to_string()));
        }
        for (index, stage) in self.vehicle.stages.iter().enumerate() {
            let bad_engine = stage.engines.iter().any(|engine| engine.thrust <= 0.0 || engine.isp <= 0.0);
            if stage.engines.is_empty() || bad_engine || stage.dry_mass < 0.0 || stage.fuel_mass < 0.0 {
                return Err(ConfigError::Invalid(format!("stage {index} has non-physical values")));
            }
        }
        Ok(())
    }
}
