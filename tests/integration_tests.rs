use ascent_autopilot::config::{BodyPreset, StageConfig, VehicleConfig};
use ascent_autopilot::control::countdown::Countdown;
use ascent_autopilot::{
    AscentPhase, MissionError, MissionParameters, Mission, MissionReport, Rocket, ScenarioConfig, Telemetry,
    Vessel, VesselStatus, WarpMode,
};

// Helper function to fly a scenario end to end on the simulated vehicle
fn fly(scenario: &ScenarioConfig) -> (Mission, Rocket, Telemetry, Result<MissionReport, MissionError>) {
    let mut rocket = Rocket::from_scenario(scenario);
    let mut mission = Mission::new(scenario.mission.clone()).expect("scenario parameters should be valid");
    let mut telemetry = Telemetry::new();
    let result = mission.fly(&mut rocket, &mut telemetry);
    (mission, rocket, telemetry, result)
}

fn kerbin_scenario(warp_mode: WarpMode) -> ScenarioConfig {
    let mut scenario = ScenarioConfig::default();
    scenario.mission.warp_mode = warp_mode;
    scenario
}

fn mun_scenario() -> ScenarioConfig {
    ScenarioConfig {
        body: BodyPreset::Mun,
        launch_latitude: 0.0,
        mission: MissionParameters {
            target_altitude_km: 20.0,
            pitchover_angle: 60.0,
            countdown: 3,
            ..Default::default()
        },
        vehicle: VehicleConfig {
            name: "Mun Hopper".to_string(),
            payload_mass: 200.0,
            drag_area: 1.0,
            stages: vec![StageConfig::single_engine(800.0, 1_500.0, 20_000.0, 320.0)],
        },
        ..Default::default()
    }
}

fn assert_within(actual: f64, expected: f64, fraction: f64, what: &str) {
    assert!(
        (actual - expected).abs() <= expected * fraction,
        "{what} should be within {:.0}% of {expected:.0} m, got {actual:.0} m",
        fraction * 100.0
    );
}

#[test]
fn test_equatorial_ascent_to_80km() {
    println!("INTEGRATION TEST: Kerbin ascent to 80 km");

    let (mission, rocket, telemetry, result) = fly(&kerbin_scenario(WarpMode::NoWarp));
    let report = result.expect("ascent should reach orbit");

    assert_eq!(report.final_phase, AscentPhase::Complete);
    assert_eq!(
        report.phase_sequence(),
        vec![
            AscentPhase::Countdown,
            AscentPhase::Launch,
            AscentPhase::Pitchover,
            AscentPhase::AOASettle,
            AscentPhase::Ascent,
            AscentPhase::CoastToCirc,
            AscentPhase::Circularizing,
            AscentPhase::Complete,
        ]
    );
    assert_eq!(telemetry.phases(), report.phase_sequence());

    assert_within(report.final_state.apoapsis, 80_000.0, 0.01, "apoapsis");
    assert_within(report.final_state.periapsis, 80_000.0, 0.01, "periapsis");
    assert_eq!(report.final_state.status, VesselStatus::Orbiting);
    println!(
        "Orbit after {:.1}s: Ap {:.0} m, Pe {:.0} m",
        report.elapsed, report.final_state.apoapsis, report.final_state.periapsis
    );

    assert!((report.launch_azimuth - 90.0).abs() < 1.0, "equatorial launch heads east");
    assert_eq!(report.staging_events, 1, "first stage burns out during ascent");
    assert_eq!(report.final_state.stage_index, 0);
    assert!(report.throttle_arm_count >= 1);

    let maneuvers = telemetry.maneuvers();
    assert_eq!(maneuvers.len(), 1, "exactly one circularization burn is planned");
    assert!(maneuvers[0].0 > 0.0 && maneuvers[0].1 > 0.0);
    assert!(telemetry.latest_frame().is_some());
    assert!(telemetry.errors().is_empty());

    // cleanup after success
    assert!(mission.watch_handles().iter().all(|handle| !handle.is_active()));
    assert_eq!(rocket.throttle(), 0.0);
    assert!(rocket.steering().is_none());
    assert!(!rocket.is_warping());
}

#[test]
fn test_time_compression_modes_reach_the_same_orbit() {
    println!("INTEGRATION TEST: PHYSICS and RAILS compression");

    let (_, _, _, baseline) = fly(&kerbin_scenario(WarpMode::NoWarp));
    let baseline = baseline.expect("uncompressed ascent should reach orbit");

    for mode in [WarpMode::Physics, WarpMode::Rails] {
        let (_, rocket, _, result) = fly(&kerbin_scenario(mode));
        let report = result.unwrap_or_else(|err| panic!("{mode} ascent failed: {err}"));

        assert_eq!(report.final_phase, AscentPhase::Complete);
        assert_within(report.final_state.apoapsis, 80_000.0, 0.01, "apoapsis");
        assert_within(report.final_state.periapsis, 80_000.0, 0.01, "periapsis");
        assert!(
            (report.elapsed - baseline.elapsed).abs() < 5.0,
            "{mode}: {:.1}s vs {:.1}s uncompressed",
            report.elapsed,
            baseline.elapsed
        );
        assert!(!rocket.is_warping());
    }
}

#[test]
fn test_synchronized_countdown_ignites_on_window() {
    println!("INTEGRATION TEST: Launch synchronization");

    assert_eq!(Countdown::synchronized(10, 1_000.3).remaining(), 79);

    let mut scenario = ScenarioConfig::default();
    scenario.start_time = 1_000.3;
    scenario.mission.launch_sync = true;
    scenario.mission.max_mission_time = 90.0;

    let (mission, rocket, telemetry, result) = fly(&scenario);

    // the flight is cut short by the mission time guard once ignition is observed
    assert!(matches!(result, Err(MissionError::Timeout { .. })), "{result:?}");
    let launch_time = telemetry
        .phase_times()
        .iter()
        .find(|(phase, _)| *phase == AscentPhase::Launch)
        .map(|(_, time)| *time)
        .expect("the vehicle should have launched");

    println!("Ignition at t={launch_time:.2}");
    assert!((1_080.0..1_080.2).contains(&launch_time));
    assert_eq!((launch_time.floor() as u64) % 180, 0);

    // cleanup on the error path
    assert_eq!(telemetry.phases().last(), Some(&AscentPhase::Aborted));
    assert_eq!(telemetry.errors().len(), 1);
    assert!(mission.watch_handles().iter().all(|handle| !handle.is_active()));
    assert_eq!(rocket.throttle(), 0.0);
    assert!(rocket.steering().is_none());
}

#[test]
fn test_airless_ascent_skips_attitude_settling() {
    println!("INTEGRATION TEST: Mun ascent to 20 km");

    let (_, _, telemetry, result) = fly(&mun_scenario());
    let report = result.expect("airless ascent should reach orbit");

    assert_eq!(
        report.phase_sequence(),
        vec![
            AscentPhase::Countdown,
            AscentPhase::Launch,
            AscentPhase::Ascent,
            AscentPhase::CoastToCirc,
            AscentPhase::Circularizing,
            AscentPhase::Complete,
        ]
    );
    assert!(!telemetry.phases().contains(&AscentPhase::AOASettle));
    assert!(!telemetry.phases().contains(&AscentPhase::Pitchover));
    assert_within(report.final_state.apoapsis, 20_000.0, 0.02, "apoapsis");
    assert_within(report.final_state.periapsis, 20_000.0, 0.02, "periapsis");
    assert_eq!(report.staging_events, 0);
}

#[test]
fn test_flying_vehicle_is_rejected_before_any_phase() {
    println!("INTEGRATION TEST: Preflight rejection");

    let scenario = ScenarioConfig::default();
    let mut rocket = Rocket::from_scenario(&scenario);
    rocket.release_clamps();
    let mut mission = Mission::new(scenario.mission.clone()).expect("default parameters are valid");
    let mut telemetry = Telemetry::new();

    let result = mission.fly(&mut rocket, &mut telemetry);

    match result {
        Err(MissionError::Precondition { status }) => assert_eq!(status, "FLYING"),
        other => panic!("expected a precondition failure, got {other:?}"),
    }
    assert_eq!(telemetry.phases(), vec![AscentPhase::Aborted]);
    assert_eq!(telemetry.errors().len(), 1);
    assert!(telemetry.maneuvers().is_empty());
    assert!(mission.watch_handles().is_empty(), "no watch was ever armed");

    let snapshot = rocket.snapshot();
    assert_eq!(snapshot.stage_index, 2, "nothing was staged");
    assert_eq!(snapshot.time, scenario.start_time, "no tick was consumed");
    assert_eq!(rocket.throttle(), 0.0);
    assert!(rocket.steering().is_none());
}

#[test]
fn test_landed_vehicle_may_launch() {
    let mut scenario = ScenarioConfig::default();
    scenario.mission.max_mission_time = 5.0;
    let mut rocket = Rocket::from_scenario(&scenario);
    rocket.status = VesselStatus::Landed;
    let mut mission = Mission::new(scenario.mission.clone()).expect("parameters are valid");
    let mut telemetry = Telemetry::new();

    let result = mission.fly(&mut rocket, &mut telemetry);

    assert!(matches!(result, Err(MissionError::Timeout { .. })), "{result:?}");
    assert_eq!(
        telemetry.phases(),
        vec![AscentPhase::Countdown, AscentPhase::Aborted]
    );
}

#[test]
fn test_sample_scenario_matches_defaults() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/scenarios/kerbin_80km.toml");
    let scenario = ScenarioConfig::load(path).expect("sample scenario should load");
    assert_eq!(scenario, ScenarioConfig::default());
}

#[test]
fn test_sluggish_attitude_times_out_of_pitchover() {
    println!("INTEGRATION TEST: Pitchover settle timeout");

    let mut scenario = ScenarioConfig::default();
    scenario.mission.max_mission_time = 70.0;
    let mut rocket = Rocket::from_scenario(&scenario).with_slew_rate(0.01);
    let mut mission = Mission::new(scenario.mission.clone()).expect("parameters are valid");
    let mut telemetry = Telemetry::new();

    let result = mission.fly(&mut rocket, &mut telemetry);
    assert!(matches!(result, Err(MissionError::Timeout { .. })), "{result:?}");

    let entered = |target: AscentPhase| {
        telemetry
            .phase_times()
            .iter()
            .find(|(phase, _)| *phase == target)
            .map(|(_, time)| *time)
    };
    let pitchover = entered(AscentPhase::Pitchover).expect("gravity turn should start");
    let settle = entered(AscentPhase::AOASettle).expect("pitchover should give up waiting");
    let waited = settle - pitchover;
    println!("Pitchover held for {waited:.2}s");
    assert!(waited > 29.9 && waited < 30.2, "waited {waited}");
}

#[test]
fn test_short_sync_window_is_not_skipped() {
    let mut scenario = ScenarioConfig::default();
    scenario.start_time = 1_075.5;
    scenario.mission.launch_sync = true;
    scenario.mission.max_mission_time = 10.0;

    let (_, _, telemetry, _) = fly(&scenario);
    let launch_time = telemetry
        .phase_times()
        .iter()
        .find(|(phase, _)| *phase == AscentPhase::Launch)
        .map(|(_, time)| *time)
        .expect("ignition falls on the 1080 s window");
    assert!((1_080.0..1_080.2).contains(&launch_time), "ignited at {launch_time}");
}
