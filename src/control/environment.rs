use crate::control::mission::CelestialBody;
use crate::utils::vector3d::Vec3;

/// Ambient conditions around the simulated vehicle.
pub struct Environment {
    pub air_density: f64,
    pub gravity: f64,
    pub current_body: CelestialBody,
}

impl Environment {
    pub fn new(start_body: CelestialBody) -> Self {
        Environment {
            air_density: start_body.surface_density,
            gravity: start_body.surface_gravity(),
            current_body: start_body,
        }
    }

    pub fn update(&mut self, position: &Vec3) {
        let altitude = self.calculate_altitude(position);
        self.air_density = self.density_at(altitude);
        self.gravity = self.current_body.gravity_at_altitude(altitude);
    }

    pub fn is_in_atmosphere(&self, position: &Vec3) -> bool {
        self.calculate_altitude(position) < self.current_body.atmosphere_height
    }

    /// Exponential atmosphere, cut off at the body's atmosphere height.
    pub fn density_at(&self, altitude: f64) -> f64 {
        let body = &self.current_body;
        if !body.has_atmosphere() || altitude >= body.atmosphere_height {
            return 0.0;
        }
        body.surface_density * (-altitude / body.scale_height).exp()
    }

    /// Point-mass gravitational acceleration.
    pub fn gravity_vector(&self, position: &Vec3) -> Vec3 {
        let radius = position.norm();
        -position * (self.current_body.mu / radius.powi(3))
    }

    /// Velocity relative to the rotating surface.
    pub fn surface_velocity(&self, position: &Vec3, velocity: &Vec3) -> Vec3 {
        velocity - self.current_body.angular_velocity().cross(position)
    }

    fn calculate_altitude(&self, position: &Vec3) -> f64 {
        position.norm() - self.current_body.radius
    }
}
