use super::launch_stages::Stage;

/// Stack of stages, bottom first, plus the payload riding on top.
pub struct Structure {
    pub stages: Vec<Stage>,
    pub payload_mass: f64,
    active: Option<usize>,
}

impl Structure {
    pub fn new(stages: Vec<Stage>, payload_mass: f64) -> Self {
        Structure {
            stages,
            payload_mass,
            active: None,
        }
    }

    pub fn active_stage(&self) -> Option<&Stage> {
        self.active.and_then(|index| self.stages.get(index))
    }

    /// Counts down to zero as stages are fired; zero means the top stage is burning.
    pub fn stage_index(&self) -> i32 {
        let fired = self.active.map_or(0, |index| index + 1);
        (self.stages.len() - fired) as i32
    }

    /// Ignites the next stage and drops the spent one. Returns false when no stage is left.
    pub fn advance_stage(&mut self) -> bool {
        let next = match self.active {
            None => 0,
            Some(index) if index + 1 < self.stages.len() => index + 1,
            Some(_) => return false,
        };
        if let Some(spent) = self.active.and_then(|index| self.stages.get_mut(index)) {
            spent.is_active = false;
        }
        self.stages[next].activate();
        self.active = Some(next);
        true
    }

    /// Payload plus every stage not yet jettisoned.
    pub fn get_total_mass(&self) -> f64 {
        let first_attached = self.active.unwrap_or(0);
        let stages_mass: f64 = self.stages[first_attached..]
            .iter()
            .map(Stage::get_total_mass)
            .sum();
        stages_mass + self.payload_mass
    }

    pub fn available_thrust(&self) -> f64 {
        self.active_stage().map_or(0.0, Stage::get_thrust)
    }

    pub fn isp(&self) -> f64 {
        self.active_stage().map_or(0.0, |stage| stage.propulsion.isp())
    }

    pub fn stage_fuel(&self) -> f64 {
        self.active_stage().map_or(0.0, |stage| stage.propulsion.fuel_mass)
    }

    pub fn burn(&mut self, thrust: f64, delta_time: f64) {
        if let Some(stage) = self.active.and_then(|index| self.stages.get_mut(index)) {
            stage.propulsion.burn(thrust, delta_time);
        }
    }
}
