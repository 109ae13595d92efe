use crate::constants::STANDARD_GRAVITY;
use crate::trajectory_system::orbital_mechanics::combined_isp;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Engine {
    pub thrust: f64,
    pub isp: f64,
}

/// Engine cluster and propellant of one stage.
pub struct PropulsionSystem {
    pub engines: Vec<Engine>,
    pub fuel_mass: f64,
    pub dry_mass: f64,
}

impl PropulsionSystem {
    pub fn new(engines: Vec<Engine>, fuel_mass: f64, dry_mass: f64) -> Self {
        PropulsionSystem {
            engines,
            fuel_mass,
            dry_mass,
        }
    }

    pub fn max_thrust(&self) -> f64 {
        self.engines.iter().map(|engine| engine.thrust).sum()
    }

    /// Thrust the engines can deliver right now.
    pub fn available_thrust(&self) -> f64 {
        if self.is_out_of_fuel() {
            0.0
        } else {
            self.max_thrust()
        }
    }

    /// Effective ISP of the cluster firing together.
    pub fn isp(&self) -> f64 {
        combined_isp(self.engines.iter().map(|engine| (engine.thrust, engine.isp)))
    }

    pub fn mass_flow(&self, thrust: f64) -> f64 {
        let isp = self.isp();
        if isp <= 0.0 {
            return 0.0;
        }
        thrust / (isp * STANDARD_GRAVITY)
    }

    /// Consumes propellant for `thrust` held over `delta_time`.
    pub fn burn(&mut self, thrust: f64, delta_time: f64) {
        if thrust <= 0.0 {
            return;
        }
        self.fuel_mass = (self.fuel_mass - self.mass_flow(thrust) * delta_time).max(0.0);
    }

    pub fn get_total_mass(&self) -> f64 {
        self.fuel_mass + self.dry_mass
    }

    pub fn is_out_of_fuel(&self) -> bool {
        self.fuel_mass <= 0.0
    }
}
