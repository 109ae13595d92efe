use std::path::PathBuf;

use anyhow::Context;
use ascent_autopilot::config::parse_sync_flag;
use ascent_autopilot::*;
use clap::Parser;

#[derive(Parser)]
#[command(author, version, about = "Autonomous ascent to a circular orbit on a simulated vehicle")]
struct Cli {
    /// Scenario file (TOML); built-in Kerbin scenario when omitted
    #[arg(long)]
    scenario: Option<PathBuf>,

    /// Target orbit altitude in km
    #[arg(long)]
    altitude: Option<f64>,

    /// Target inclination in degrees
    #[arg(long)]
    inclination: Option<f64>,

    /// Launch direction (NORTH|SOUTH)
    #[arg(long)]
    direction: Option<LaunchDirection>,

    /// Altitude in m at which the gravity turn starts
    #[arg(long)]
    turn_start: Option<f64>,

    /// Pitchover angle in degrees
    #[arg(long)]
    pitchover: Option<f64>,

    /// Seconds allowed for each attitude settle
    #[arg(long)]
    steering_duration: Option<f64>,

    /// Time compression before circularization (NOWARP|PHYSICS|RAILS)
    #[arg(long)]
    warp: Option<WarpMode>,

    /// Countdown length in seconds
    #[arg(long)]
    countdown: Option<u32>,

    /// Launch synchronization (SYNC|NOSYNC)
    #[arg(long, value_parser = parse_sync_flag)]
    sync: Option<bool>,
}

impl Cli {
    fn apply(&self, params: &mut MissionParameters) {
        if let Some(altitude) = self.altitude {
            params.target_altitude_km = altitude;
        }
        if let Some(inclination) = self.inclination {
            params.target_inclination = inclination;
        }
        if let Some(direction) = self.direction {
            params.launch_direction = direction;
        }
        if let Some(turn_start) = self.turn_start {
            params.turn_start_altitude = turn_start;
        }
        if let Some(pitchover) = self.pitchover {
            params.pitchover_angle = pitchover;
        }
        if let Some(duration) = self.steering_duration {
            params.steering_duration = duration;
        }
        if let Some(warp) = self.warp {
            params.warp_mode = warp;
        }
        if let Some(countdown) = self.countdown {
            params.countdown = countdown;
        }
        if let Some(sync) = self.sync {
            params.launch_sync = sync;
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut scenario = match &cli.scenario {
        Some(path) => ScenarioConfig::load(path)
            .with_context(|| format!("failed to load scenario {}", path.display()))?,
        None => ScenarioConfig::default(),
    };
    cli.apply(&mut scenario.mission);
    scenario.validate().context("invalid mission parameters")?;

    let mut rocket = Rocket::from_scenario(&scenario);
    let mut mission = Mission::new(scenario.mission.clone())?;
    let mut telemetry = Telemetry::new();

    let result = mission.fly(&mut rocket, &mut telemetry);
    telemetry.display_data();

    let report = result.with_context(|| format!("{} did not reach orbit", rocket.name))?;
    println!(
        "\n{} reached {} in {:.1} s: Ap {:.0} m, Pe {:.0} m, {} staging events",
        report.vessel, report.final_phase, report.elapsed, report.final_state.apoapsis,
        report.final_state.periapsis, report.staging_events
    );
    Ok(())
}
