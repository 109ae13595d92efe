use crate::utils::vector3d::Vec3;

/// Zero-lift drag model: the vehicle flies at near-zero angle of attack during
/// the gravity turn, so lift is ignored.
#[derive(Debug, Clone)]
pub struct Aerodynamics {
    /// Drag coefficient times reference area (m²).
    pub drag_area: f64,
}

impl Aerodynamics {
    pub fn new(drag_area: f64) -> Self {
        Aerodynamics { drag_area }
    }

    /// Drag force opposing the surface-relative velocity.
    pub fn calculate_drag(&self, surface_velocity: &Vec3, air_density: f64) -> Vec3 {
        let speed = surface_velocity.norm();
        if speed == 0.0 || air_density <= 0.0 {
            return Vec3::zeros();
        }
        -surface_velocity * (0.5 * air_density * speed * self.drag_area)
    }

    pub fn calculate_dynamic_pressure(&self, surface_velocity: &Vec3, air_density: f64) -> f64 {
        0.5 * air_density * surface_velocity.norm_squared()
    }
}
