use nalgebra::{Rotation3, Vector3};

use crate::{
    config::{ScenarioConfig, WarpMode},
    constants::{ATTITUDE_SLEW_RATE, PHYSICS_WARP_RATE, RAILS_WARP_RATE, STAGE_READY_DELAY},
    errors::MissionError,
    trajectory_system::{
        aerodynamics::Aerodynamics,
        kinematics::Kinematics,
        orbital_mechanics::{time_to_apoapsis, OrbitalElements},
    },
    utils::vector3d::{normalize_or, Vec3},
};

use super::{
    environment::Environment,
    launch_stages::Stage,
    mission::CelestialBody,
    structure::Structure,
    vessel::{SteeringTarget, VehicleSnapshot, Vessel, VesselStatus},
};

/// Below this depth under the surface a flying vehicle is considered destroyed.
const IMPACT_DEPTH: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Warp {
    until: f64,
    mode: WarpMode,
}

/// Simulated multi-stage vehicle flying over a rotating spherical body.
///
/// Stands in for the flight host: integrates the vehicle one tick per
/// [`Vessel::advance`] call and answers state queries from its own state.
pub struct Rocket {
    pub name: String,
    pub structure: Structure,
    pub environment: Environment,
    pub kinematics: Kinematics,
    pub aerodynamics: Aerodynamics,
    pub status: VesselStatus,
    throttle: f64,
    steering: Option<SteeringTarget>,
    time_step: f64,
    slew_rate: f64,
    stage_ready_at: f64,
    warp: Option<Warp>,
}

impl Rocket {
    /// Places the vehicle on the pad at `latitude`, co-rotating with the body.
    pub fn new(
        name: String,
        structure: Structure,
        body: CelestialBody,
        aerodynamics: Aerodynamics,
        latitude: f64,
        start_time: f64,
        time_step: f64,
    ) -> Self {
        let omega = body.angular_velocity();
        let lat = latitude.to_radians();
        let site = Vec3::new(lat.cos(), 0.0, lat.sin()) * body.radius;
        let position = Rotation3::from_axis_angle(&Vector3::z_axis(), omega.z * start_time) * site;
        let velocity = omega.cross(&position);
        let facing = normalize_or(&position, Vec3::z());

        let mut environment = Environment::new(body);
        environment.update(&position);

        Rocket {
            name,
            structure,
            environment,
            kinematics: Kinematics::new(position, velocity, facing, start_time),
            aerodynamics,
            status: VesselStatus::Prelaunch,
            throttle: 0.0,
            steering: None,
            time_step,
            slew_rate: ATTITUDE_SLEW_RATE,
            stage_ready_at: start_time,
            warp: None,
        }
    }

    pub fn from_scenario(scenario: &ScenarioConfig) -> Self {
        let vehicle = &scenario.vehicle;
        let stages = vehicle.stages.iter().map(Stage::new).collect();
        Rocket::new(
            vehicle.name.clone(),
            Structure::new(stages, vehicle.payload_mass),
            CelestialBody::from_preset(scenario.body),
            Aerodynamics::new(vehicle.drag_area),
            scenario.launch_latitude,
            scenario.start_time,
            scenario.time_step,
        )
    }

    pub fn with_slew_rate(mut self, degrees_per_second: f64) -> Self {
        self.slew_rate = degrees_per_second;
        self
    }

    /// Frees the vehicle from the pad without igniting anything.
    pub fn release_clamps(&mut self) {
        if self.status.is_on_ground() {
            info!("{}: launch clamps released", self.name);
            self.status = VesselStatus::Flying;
        }
    }

    pub fn time(&self) -> f64 {
        self.kinematics.time
    }

    pub fn throttle(&self) -> f64 {
        self.throttle
    }

    pub fn steering(&self) -> Option<SteeringTarget> {
        self.steering
    }

    pub fn altitude(&self) -> f64 {
        self.kinematics.get_altitude(&self.environment)
    }

    fn step(&mut self, delta_time: f64, allow_thrust: bool) {
        if let Some(target) = self.steering {
            self.kinematics.apply_rotation(&target.direction, self.slew_rate * delta_time);
        }

        let thrust = if allow_thrust {
            self.throttle * self.structure.available_thrust()
        } else {
            0.0
        };
        let mass = self.structure.get_total_mass();

        if self.status.is_on_ground() {
            let weight = mass * self.environment.gravity;
            if thrust > weight {
                info!("{}: liftoff at t={:.1}", self.name, self.kinematics.time);
                self.status = VesselStatus::Flying;
            } else {
                self.hold_on_pad(delta_time);
                self.structure.burn(thrust, delta_time);
                return;
            }
        }

        self.kinematics
            .update(delta_time, thrust, mass, &self.aerodynamics, &self.environment);
        self.environment.update(&self.kinematics.position);
        self.structure.burn(thrust, delta_time);
    }

    fn hold_on_pad(&mut self, delta_time: f64) {
        let omega = self.environment.current_body.angular_velocity();
        let rotation = Rotation3::from_axis_angle(&Vector3::z_axis(), omega.z * delta_time);
        let kinematics = &mut self.kinematics;
        kinematics.position = rotation * kinematics.position;
        kinematics.velocity = omega.cross(&kinematics.position);
        kinematics.facing = rotation * kinematics.facing;
        kinematics.time += delta_time;
    }

    fn flight_status(&self, periapsis: f64) -> VesselStatus {
        if self.status.is_on_ground() {
            return self.status;
        }
        let body = &self.environment.current_body;
        if periapsis > body.atmosphere_height {
            VesselStatus::Orbiting
        } else if body.has_atmosphere() && !self.environment.is_in_atmosphere(&self.kinematics.position) {
            VesselStatus::SubOrbital
        } else {
            VesselStatus::Flying
        }
    }
}

impl Vessel for Rocket {
    fn name(&self) -> &str {
        &self.name
    }

    fn body(&self) -> &CelestialBody {
        &self.environment.current_body
    }

    fn snapshot(&self) -> VehicleSnapshot {
        let body = &self.environment.current_body;
        let kinematics = &self.kinematics;
        let elements = OrbitalElements::from_state(body.mu, &kinematics.position, &kinematics.velocity);
        let altitude = self.altitude();
        let apoapsis = elements.apoapsis_radius() - body.radius;
        let periapsis = elements.periapsis_radius() - body.radius;
        let latitude = (kinematics.position.z / kinematics.position.norm())
            .clamp(-1.0, 1.0)
            .asin()
            .to_degrees();

        VehicleSnapshot {
            time: kinematics.time,
            status: self.flight_status(periapsis),
            stage_index: self.structure.stage_index(),
            mass: self.structure.get_total_mass(),
            available_thrust: self.structure.available_thrust(),
            isp: self.structure.isp(),
            stage_fuel: self.structure.stage_fuel(),
            altitude,
            latitude,
            apoapsis,
            periapsis,
            eccentricity: elements.eccentricity,
            semi_major_axis: elements.semi_major_axis,
            eta_apoapsis: time_to_apoapsis(body.mu, &kinematics.position, &kinematics.velocity),
            position: kinematics.position,
            velocity: kinematics.velocity,
            surface_velocity: self
                .environment
                .surface_velocity(&kinematics.position, &kinematics.velocity),
            facing: kinematics.facing,
        }
    }

    fn set_throttle(&mut self, throttle: f64) {
        self.throttle = throttle.clamp(0.0, 1.0);
    }

    fn set_steering(&mut self, target: Option<SteeringTarget>) {
        self.steering = target;
    }

    fn stage(&mut self) {
        if self.structure.advance_stage() {
            self.stage_ready_at = self.kinematics.time + STAGE_READY_DELAY;
            info!(
                "{}: stage {} ignited at t={:.1}",
                self.name,
                self.structure.stage_index(),
                self.kinematics.time
            );
        } else {
            warn!("{}: stage command ignored, no stages left", self.name);
        }
    }

    fn stage_ready(&self) -> bool {
        self.kinematics.time >= self.stage_ready_at
    }

    fn request_warp(&mut self, until: f64, mode: WarpMode) {
        if mode != WarpMode::NoWarp && until > self.kinematics.time {
            self.warp = Some(Warp { until, mode });
        }
    }

    fn cancel_warp(&mut self) {
        if self.warp.take().is_some() {
            event!("{}: time compression cancelled", self.name);
        }
    }

    fn is_warping(&self) -> bool {
        self.warp.is_some()
    }

    fn advance(&mut self) -> Result<(), MissionError> {
        match self.warp {
            Some(Warp { until, mode }) => {
                let (steps, allow_thrust) = match mode {
                    WarpMode::Physics => (PHYSICS_WARP_RATE, true),
                    WarpMode::Rails => (RAILS_WARP_RATE, false),
                    WarpMode::NoWarp => (1, true),
                };
                for _ in 0..steps {
                    let remaining = until - self.kinematics.time;
                    if remaining <= 1e-9 {
                        break;
                    }
                    self.step(remaining.min(self.time_step), allow_thrust);
                }
                if until - self.kinematics.time <= 1e-9 {
                    self.warp = None;
                    event!("{}: time compression ended at t={:.1}", self.name, self.kinematics.time);
                }
            }
            None => self.step(self.time_step, true),
        }

        let altitude = self.altitude();
        if !self.status.is_on_ground() && altitude < -IMPACT_DEPTH {
            return Err(MissionError::Vessel(format!(
                "{} impacted the surface at t={:.1}",
                self.name, self.kinematics.time
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BodyPreset, EngineConfig, StageConfig, VehicleConfig};
    use crate::constants::STANDARD_GRAVITY;
    use crate::control::burn::BurnPlan;
    use crate::trajectory_system::orbital_mechanics::ideal_burn_time;
    use approx::assert_relative_eq;

    fn kerbin_rocket() -> Rocket {
        Rocket::from_scenario(&ScenarioConfig::default())
    }

    #[test]
    fn test_pad_corotates_with_body() {
        let mut rocket = kerbin_rocket();
        let start = rocket.snapshot();
        assert_eq!(start.status, VesselStatus::Prelaunch);
        assert_eq!(start.stage_index, 2);
        assert_relative_eq!(start.altitude, 0.0, epsilon = 1e-6);
        assert_relative_eq!(start.surface_velocity.norm(), 0.0, epsilon = 1e-9);

        for _ in 0..100 {
            rocket.advance().unwrap();
        }
        let later = rocket.snapshot();
        assert_relative_eq!(later.time, 10.0, epsilon = 1e-9);
        assert_relative_eq!(later.altitude, 0.0, epsilon = 1e-6);
        assert_relative_eq!(later.latitude, start.latitude, epsilon = 1e-9);
        assert!(later.position.y > 0.0, "pad moves east with the surface");
        assert_eq!(later.status, VesselStatus::Prelaunch);
    }

    #[test]
    fn test_liftoff_requires_thrust_over_weight() {
        let mut rocket = kerbin_rocket();
        rocket.stage();
        rocket.set_steering(Some(SteeringTarget::along(rocket.snapshot().facing)));

        rocket.set_throttle(0.3);
        rocket.advance().unwrap();
        assert_eq!(rocket.status, VesselStatus::Prelaunch);
        assert!(rocket.snapshot().stage_fuel < 9_000.0, "engines burn on the pad");

        rocket.set_throttle(1.0);
        for _ in 0..50 {
            rocket.advance().unwrap();
        }
        let snapshot = rocket.snapshot();
        assert_eq!(snapshot.status, VesselStatus::Flying);
        assert!(snapshot.altitude > 50.0);
        assert!(snapshot.apoapsis > snapshot.altitude);
    }

    #[test]
    fn test_staging_sequence_and_readiness() {
        let mut rocket = kerbin_rocket();
        assert_eq!(rocket.snapshot().available_thrust, 0.0);

        rocket.stage();
        assert!(!rocket.stage_ready());
        let snapshot = rocket.snapshot();
        assert_eq!(snapshot.stage_index, 1);
        assert_eq!(snapshot.available_thrust, 255_000.0);
        assert_eq!(snapshot.isp, 280.0);

        rocket.advance().unwrap();
        assert!(rocket.stage_ready());

        rocket.stage();
        rocket.stage();
        let snapshot = rocket.snapshot();
        assert_eq!(snapshot.stage_index, 0);
        assert_eq!(snapshot.available_thrust, 120_000.0);
        assert_relative_eq!(snapshot.mass, 5_000.0);
    }

    #[test]
    fn test_rails_warp_coasts_to_target_time() {
        let mut rocket = kerbin_rocket();
        rocket.release_clamps();
        let orbit_radius = rocket.environment.current_body.radius + 100_000.0;
        rocket.kinematics.position = Vec3::new(orbit_radius, 0.0, 0.0);
        rocket.kinematics.velocity = Vec3::new(0.0, 2_300.0, 0.0);
        rocket.stage();
        rocket.set_throttle(1.0);
        let fuel = rocket.snapshot().stage_fuel;

        rocket.request_warp(12.34, WarpMode::Rails);
        assert!(rocket.is_warping());
        rocket.advance().unwrap();
        rocket.advance().unwrap();
        rocket.advance().unwrap();

        assert!(!rocket.is_warping());
        assert_relative_eq!(rocket.time(), 12.34, epsilon = 1e-6);
        assert_eq!(rocket.snapshot().stage_fuel, fuel, "no thrust on rails");
    }

    #[test]
    fn test_physics_warp_keeps_thrust() {
        let mut rocket = kerbin_rocket();
        rocket.stage();
        rocket.set_throttle(1.0);
        rocket.request_warp(100.0, WarpMode::Physics);
        rocket.advance().unwrap();

        assert_relative_eq!(rocket.time(), 0.4, epsilon = 1e-9);
        assert!(rocket.is_warping());
        assert!(rocket.snapshot().stage_fuel < 9_000.0);
        rocket.cancel_warp();
        assert!(!rocket.is_warping());
    }

    #[test]
    fn test_impact_is_an_error() {
        let mut rocket = kerbin_rocket();
        rocket.release_clamps();
        rocket.kinematics.velocity = -rocket.kinematics.position.normalize() * 500.0;
        let mut result = Ok(());
        for _ in 0..10 {
            result = rocket.advance();
            if result.is_err() {
                break;
            }
        }
        assert!(matches!(result, Err(MissionError::Vessel(_))));
    }

    #[test]
    fn test_airless_scenario() {
        let scenario = ScenarioConfig {
            body: BodyPreset::Mun,
            launch_latitude: 0.0,
            vehicle: VehicleConfig {
                name: "Lander".to_string(),
                payload_mass: 200.0,
                drag_area: 1.0,
                stages: vec![StageConfig::single_engine(800.0, 1_500.0, 20_000.0, 320.0)],
            },
            ..Default::default()
        };
        let rocket = Rocket::from_scenario(&scenario);
        let snapshot = rocket.snapshot();
        assert_eq!(rocket.name(), "Lander");
        assert_eq!(rocket.body().name, "Mun");
        assert_eq!(snapshot.stage_index, 1);
        assert_relative_eq!(snapshot.latitude, 0.0, epsilon = 1e-12);
        assert_eq!(rocket.environment.air_density, 0.0);
    }

    #[test]
    fn test_mixed_engine_stage_plans_with_combined_isp() {
        let scenario = ScenarioConfig {
            body: BodyPreset::Mun,
            launch_latitude: 0.0,
            vehicle: VehicleConfig {
                name: "Mixed".to_string(),
                payload_mass: 200.0,
                drag_area: 1.0,
                stages: vec![StageConfig {
                    dry_mass: 800.0,
                    fuel_mass: 1_500.0,
                    engines: vec![
                        EngineConfig { thrust: 10_000.0, isp: 200.0 },
                        EngineConfig { thrust: 10_000.0, isp: 400.0 },
                    ],
                }],
            },
            ..Default::default()
        };
        let mut rocket = Rocket::from_scenario(&scenario);
        rocket.stage();
        rocket.release_clamps();
        let radius = rocket.environment.current_body.radius + 20_000.0;
        rocket.kinematics.position = Vec3::new(radius, 0.0, 0.0);
        rocket.kinematics.velocity = Vec3::new(0.0, 400.0, 0.0);

        let snapshot = rocket.snapshot();
        // 20 000 N over 50 + 25 N/s of weight flow
        let combined = 20_000.0 / 75.0;
        assert_relative_eq!(snapshot.isp, combined, max_relative = 1e-12);
        assert_eq!(snapshot.available_thrust, 20_000.0);

        let plan = BurnPlan::circularization(&snapshot, rocket.body());
        assert!(plan.delta_v > 0.0);
        let expected = ideal_burn_time(plan.delta_v, snapshot.mass, 20_000.0, combined);
        let averaged = ideal_burn_time(plan.delta_v, snapshot.mass, 20_000.0, 300.0);
        assert_relative_eq!(plan.duration, expected, max_relative = 1e-12);
        assert!((plan.duration - averaged).abs() > 0.01);

        rocket.set_throttle(1.0);
        rocket.advance().unwrap();
        // 20 000 N at the combined ISP for one 0.1 s tick
        let burned = 1_500.0 - rocket.snapshot().stage_fuel;
        assert_relative_eq!(burned, 20_000.0 / (combined * STANDARD_GRAVITY) * 0.1, max_relative = 1e-9);
    }
}
