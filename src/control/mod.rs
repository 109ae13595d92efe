pub mod actuators;
pub mod ascent;
pub mod attitude;
pub mod burn;
pub mod countdown;
pub mod environment;
pub mod launch_stages;
pub mod mission;
pub mod propulsion;
pub mod rocket;
pub mod structure;
pub mod throttle;
pub mod triggers;
pub mod vessel;
