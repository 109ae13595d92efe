use super::propulsion::{Engine, PropulsionSystem};
use crate::config::StageConfig;

pub struct Stage {
    pub propulsion: PropulsionSystem,
    pub is_active: bool,
}

impl Stage {
    pub fn new(config: &StageConfig) -> Self {
        Stage {
            propulsion: PropulsionSystem::new(
                config
                    .engines
                    .iter()
                    .map(|engine| Engine { thrust: engine.thrust, isp: engine.isp })
                    .collect(),
                config.fuel_mass,
                config.dry_mass,
            ),
            is_active: false,
        }
    }

    pub fn activate(&mut self) {
        self.is_active = true;
    }

    pub fn get_thrust(&self) -> f64 {
        if self.is_active {
            self.propulsion.available_thrust()
        } else {
            0.0
        }
    }

    pub fn is_depleted(&self) -> bool {
        self.propulsion.is_out_of_fuel()
    }

    pub fn get_total_mass(&self) -> f64 {
        self.propulsion.get_total_mass()
    }
}
