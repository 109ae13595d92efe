use crate::control::environment::Environment;
use crate::utils::vector3d::{rotate_towards, Vec3};

use super::aerodynamics::Aerodynamics;

/// Inertial point-mass state plus the vehicle's facing vector.
#[derive(Debug, Clone)]
pub struct Kinematics {
    pub position: Vec3,
    pub velocity: Vec3,
    pub facing: Vec3,
    pub time: f64,
}

impl Kinematics {
    pub fn new(position: Vec3, velocity: Vec3, facing: Vec3, time: f64) -> Self {
        Kinematics {
            position,
            velocity,
            facing,
            time,
        }
    }

    /// Slews the facing vector toward `target` at no more than `max_angle` degrees.
    pub fn apply_rotation(&mut self, target: &Vec3, max_angle: f64) {
        self.facing = rotate_towards(&self.facing, target, max_angle);
    }

    /// One RK4 step with thrust along the facing vector. Mass is held constant over the step.
    pub fn update(
        &mut self,
        delta_time: f64,
        thrust_magnitude: f64,
        total_mass: f64,
        aerodynamics: &Aerodynamics,
        environment: &Environment,
    ) {
        let derivatives = |position: Vec3, velocity: Vec3| {
            (
                velocity,
                self.calculate_acceleration(position, velocity, thrust_magnitude, total_mass, aerodynamics, environment),
            )
        };

        let (r0, v0) = (self.position, self.velocity);
        let k1 = derivatives(r0, v0);
        let k2 = derivatives(r0 + k1.0 * (delta_time / 2.0), v0 + k1.1 * (delta_time / 2.0));
        let k3 = derivatives(r0 + k2.0 * (delta_time / 2.0), v0 + k2.1 * (delta_time / 2.0));
        let k4 = derivatives(r0 + k3.0 * delta_time, v0 + k3.1 * delta_time);

        let position = r0 + (k1.0 + k2.0 * 2.0 + k3.0 * 2.0 + k4.0) * (delta_time / 6.0);
        let velocity = v0 + (k1.1 + k2.1 * 2.0 + k3.1 * 2.0 + k4.1) * (delta_time / 6.0);

        self.position = position;
        self.velocity = velocity;
        self.time += delta_time;
    }

    fn calculate_acceleration(
        &self,
        position: Vec3,
        velocity: Vec3,
        thrust_magnitude: f64,
        total_mass: f64,
        aerodynamics: &Aerodynamics,
        environment: &Environment,
    ) -> Vec3 {
        let gravity = environment.gravity_vector(&position);
        let thrust = self.facing * (thrust_magnitude / total_mass);

        let altitude = position.norm() - environment.current_body.radius;
        let air_density = environment.density_at(altitude);
        let surface_velocity = environment.surface_velocity(&position, &velocity);
        let drag = aerodynamics.calculate_drag(&surface_velocity, air_density) / total_mass;

        gravity + thrust + drag
    }

    pub fn get_altitude(&self, environment: &Environment) -> f64 {
        self.position.norm() - environment.current_body.radius
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::mission::CelestialBody;
    use crate::trajectory_system::orbital_mechanics::{circular_speed, OrbitalElements};
    use approx::assert_relative_eq;

    fn vacuum() -> (Aerodynamics, Environment) {
        (Aerodynamics::new(1.0), Environment::new(CelestialBody::mun()))
    }

    #[test]
    fn test_circular_orbit_is_preserved() {
        let (aerodynamics, environment) = vacuum();
        let mu = environment.current_body.mu;
        let radius = environment.current_body.radius + 20_000.0;
        let speed = circular_speed(mu, radius);
        let mut kinematics = Kinematics::new(Vec3::new(radius, 0.0, 0.0), Vec3::new(0.0, speed, 0.0), Vec3::y(), 0.0);

        for _ in 0..10_000 {
            kinematics.update(0.1, 0.0, 1_000.0, &aerodynamics, &environment);
        }

        assert_relative_eq!(kinematics.position.norm(), radius, max_relative = 1e-6);
        assert_relative_eq!(kinematics.velocity.norm(), speed, max_relative = 1e-6);
        assert_relative_eq!(kinematics.time, 1_000.0, epsilon = 1e-6);
    }

    #[test]
    fn test_prograde_thrust_raises_orbit() {
        let (aerodynamics, environment) = vacuum();
        let mu = environment.current_body.mu;
        let radius = environment.current_body.radius + 20_000.0;
        let speed = circular_speed(mu, radius);
        let mut kinematics = Kinematics::new(Vec3::new(radius, 0.0, 0.0), Vec3::new(0.0, speed, 0.0), Vec3::y(), 0.0);

        let coasting = kinematics.clone();
        for _ in 0..100 {
            kinematics.update(0.1, 10_000.0, 1_000.0, &aerodynamics, &environment);
        }
        let elements = OrbitalElements::from_state(mu, &kinematics.position, &kinematics.velocity);
        assert!(elements.semi_major_axis > radius);
        assert!(kinematics.velocity.norm() > coasting.velocity.norm() + 50.0);
    }

    #[test]
    fn test_drag_slows_vehicle_in_atmosphere() {
        let kerbin = CelestialBody::kerbin();
        let environment = Environment::new(kerbin.clone());
        let position = Vec3::new(kerbin.radius + 1_000.0, 0.0, 0.0);
        let corotation = kerbin.angular_velocity().cross(&position);
        let velocity = corotation + Vec3::new(300.0, 0.0, 0.0);

        let mut with_drag = Kinematics::new(position, velocity, Vec3::x(), 0.0);
        let mut without_drag = with_drag.clone();
        with_drag.update(0.1, 0.0, 1_000.0, &Aerodynamics::new(1.0), &environment);
        without_drag.update(0.1, 0.0, 1_000.0, &Aerodynamics::new(0.0), &environment);

        assert!(with_drag.velocity.x < without_drag.velocity.x);
    }

    #[test]
    fn test_rotation_is_rate_limited() {
        let mut kinematics = Kinematics::new(Vec3::new(1.0, 0.0, 0.0), Vec3::zeros(), Vec3::x(), 0.0);
        kinematics.apply_rotation(&Vec3::y(), 1.0);
        assert_relative_eq!(kinematics.facing.x, 1.0_f64.to_radians().cos(), epsilon = 1e-12);
        kinematics.apply_rotation(&Vec3::x(), 5.0);
        assert_relative_eq!(kinematics.facing, Vec3::x(), epsilon = 1e-12);
    }
}
