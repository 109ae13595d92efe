// Physical Constants
pub const STANDARD_GRAVITY: f64 = 9.82; // m/s², used for ISP <-> mass flow conversion

// Mission Defaults
pub const DEFAULT_TARGET_ALTITUDE_KM: f64 = 80.0;
pub const DEFAULT_TARGET_INCLINATION: f64 = 0.0; // degrees
pub const DEFAULT_TURN_START_ALTITUDE: f64 = 130.0; // m
pub const DEFAULT_PITCHOVER_ANGLE: f64 = 10.0; // degrees
pub const DEFAULT_STEERING_DURATION: f64 = 30.0; // s
pub const DEFAULT_COUNTDOWN: u32 = 10; // s
pub const DEFAULT_MAX_MISSION_TIME: f64 = 3600.0; // s of simulated time

// Launch Synchronization
pub const LAUNCH_SYNC_PERIOD: u64 = 180; // s

// Throttle Controller (setpoint: target altitude, measurement: apoapsis)
pub const THROTTLE_KP: f64 = 0.001; // full throttle until the last kilometre
pub const THROTTLE_KI: f64 = 0.0001;
pub const THROTTLE_KD: f64 = 0.0;
pub const THROTTLE_INTEGRAL_LIMIT: f64 = 100.0; // m·s

// Attitude Convergence
pub const PITCHOVER_TOLERANCE: f64 = 1.0; // degrees, facing vs commanded
pub const AOA_TOLERANCE: f64 = 2.0; // degrees, surface velocity vs facing

// Circularization
pub const WARP_LEAD_TIME: f64 = 30.0; // s before burn start
pub const BURN_COMPLETE_EPSILON: f64 = 1e-9; // s

// Telemetry
pub const TELEMETRY_REFRESH_INTERVAL: f64 = 1.0; // s

// Simulation Parameters
pub const TIME_STEP: f64 = 0.1; // s
pub const PHYSICS_WARP_RATE: u32 = 4; // integration steps per scheduler tick
pub const RAILS_WARP_RATE: u32 = 50;
pub const ATTITUDE_SLEW_RATE: f64 = 10.0; // degrees per second
pub const STAGE_READY_DELAY: f64 = 0.05; // s
