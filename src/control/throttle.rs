use crate::constants::{THROTTLE_INTEGRAL_LIMIT, THROTTLE_KD, THROTTLE_KI, THROTTLE_KP};
use crate::control::actuators::{ActuatorHandle, Authority};
use crate::control::vessel::{VehicleSnapshot, Vessel};
use crate::errors::ActuatorError;

struct PIDController {
    kp: f64, // Proportional gain
    ki: f64, // Integral gain
    kd: f64, // Derivative gain
    integral_limit: f64,
    previous_error: Option<f64>,
    last_time: Option<f64>,
    integral: f64,
    output: f64,
}

impl PIDController {
    fn new(kp: f64, ki: f64, kd: f64, integral_limit: f64) -> Self {
        PIDController {
            kp,
            ki,
            kd,
            integral_limit,
            previous_error: None,
            last_time: None,
            integral: 0.0,
            output: 0.0,
        }
    }

    fn reset(&mut self) {
        self.previous_error = None;
        self.last_time = None;
        self.integral = 0.0;
        self.output = 0.0;
    }

    fn calculate(&mut self, error: f64, time: f64) -> f64 {
        let mut derivative = 0.0;
        if let (Some(last_time), Some(previous_error)) = (self.last_time, self.previous_error) {
            let delta_time = time - last_time;
            self.integral =
                (self.integral + error * delta_time).clamp(-self.integral_limit, self.integral_limit);
            if delta_time > 0.0 {
                derivative = (error - previous_error) / delta_time;
            }
        }
        self.previous_error = Some(error);
        self.last_time = Some(time);
        self.output = self.kp * error + self.ki * self.integral + self.kd * derivative;
        self.output
    }
}

/// Apoapsis-tracking throttle regulator used during powered ascent.
///
/// The setpoint is the target orbital altitude and the measurement is the current
/// apoapsis. Once apoapsis reaches the setpoint the throttle is cut and the
/// controller goes inactive; it re-arms from a clean state whenever apoapsis falls
/// back below the setpoint (atmospheric drag after cut-off).
pub struct ThrottleController {
    setpoint: f64,
    pid: PIDController,
    active: bool,
    arm_count: u32,
}

impl ThrottleController {
    pub fn new(setpoint: f64) -> Self {
        ThrottleController {
            setpoint,
            pid: PIDController::new(THROTTLE_KP, THROTTLE_KI, THROTTLE_KD, THROTTLE_INTEGRAL_LIMIT),
            active: false,
            arm_count: 0,
        }
    }

    pub fn setpoint(&self) -> f64 {
        self.setpoint
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// How many times the controller has been armed, including the first lock.
    pub fn arm_count(&self) -> u32 {
        self.arm_count
    }

    pub fn update(&mut self, apoapsis: f64, time: f64) -> f64 {
        if apoapsis >= self.setpoint {
            if self.active {
                info!("Apoapsis {:.0} m reached target, throttle cut", apoapsis);
            }
            self.deactivate();
            return 0.0;
        }

        if !self.active {
            self.arm(apoapsis);
        }
        self.pid.calculate(self.setpoint - apoapsis, time).clamp(0.0, 1.0)
    }

    /// Computes the throttle for `snapshot` and commands it under controller authority.
    pub fn drive<V: Vessel + ?Sized>(
        &mut self,
        snapshot: &VehicleSnapshot,
        actuators: &mut ActuatorHandle<'_, V>,
    ) -> Result<f64, ActuatorError> {
        let throttle = self.update(snapshot.apoapsis, snapshot.time);
        actuators.set_throttle(Authority::ThrottleController, throttle)?;
        Ok(throttle)
    }

    pub fn deactivate(&mut self) {
        self.active = false;
        self.pid.reset();
    }

    fn arm(&mut self, apoapsis: f64) {
        if self.arm_count > 0 {
            warn!(
                "Apoapsis fell to {:.0} m, below target {:.0} m; re-arming throttle control",
                apoapsis, self.setpoint
            );
        }
        self.pid.reset();
        self.active = true;
        self.arm_count += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_pid_controller() {
        let mut pid = PIDController::new(0.1, 0.01, 0.05, 10.0);
        let mut error = 100.0;
        let mut time = 0.0;

        for _ in 0..10 {
            let output = pid.calculate(error, time).clamp(-1.0, 1.0);
            error -= output * 10.0;
            time += 0.1;
        }

        assert!(error.abs() < 50.0, "PID should reduce error over time");
    }

    #[test]
    fn test_pid_integral_is_clamped() {
        let mut pid = PIDController::new(0.0, 1.0, 0.0, 10.0);
        pid.calculate(1_000.0, 0.0);
        let output = pid.calculate(1_000.0, 5.0);
        assert_relative_eq!(output, 10.0);
    }

    #[test]
    fn test_throttle_positive_below_setpoint() {
        let mut controller = ThrottleController::new(80_000.0);
        for apoapsis in [0.0, 10_000.0, 79_000.0, 79_999.0] {
            let throttle = controller.update(apoapsis, 1.0);
            assert!(throttle > 0.0, "throttle should be positive at apoapsis {apoapsis}");
            assert!(controller.is_active());
        }
    }

    #[test]
    fn test_throttle_ramps_down_over_last_kilometre() {
        let mut controller = ThrottleController::new(80_000.0);
        assert_eq!(controller.update(70_000.0, 0.0), 1.0);

        let mut controller = ThrottleController::new(80_000.0);
        assert_relative_eq!(controller.update(79_500.0, 0.0), 0.5, epsilon = 1e-9);
    }

    #[test]
    fn test_throttle_cut_at_setpoint() {
        let mut controller = ThrottleController::new(80_000.0);
        controller.update(50_000.0, 0.0);
        assert!(controller.is_active());

        assert_eq!(controller.update(80_000.0, 0.1), 0.0);
        assert!(!controller.is_active());
        assert_eq!(controller.update(80_500.0, 0.2), 0.0);
        assert!(!controller.is_active());
    }

    #[test]
    fn test_integral_term_finishes_the_approach() {
        let mut controller = ThrottleController::new(80_000.0);
        let first = controller.update(79_999.0, 0.0);
        let mut later = first;
        for step in 1..=200 {
            later = controller.update(79_999.0, step as f64 * 0.1);
        }
        assert!(later > first, "integral should nudge throttle up: {first} -> {later}");
    }

    #[test]
    fn test_rearm_is_idempotent() {
        let inputs: Vec<(f64, f64)> = (0..50)
            .map(|i| (79_000.0 + 15.0 * i as f64, i as f64 * 0.1))
            .collect();

        let mut controller = ThrottleController::new(80_000.0);
        let first: Vec<f64> = inputs.iter().map(|&(apo, t)| controller.update(apo, t)).collect();

        assert_eq!(controller.update(80_100.0, 10.0), 0.0);
        assert!(!controller.is_active());

        let second: Vec<f64> = inputs.iter().map(|&(apo, t)| controller.update(apo, t)).collect();
        assert_eq!(first, second);
        assert_eq!(controller.arm_count(), 2);
    }
}
