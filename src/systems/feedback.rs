use serde::{Deserialize, Serialize};

/// Three-term feedback controller with output clamping.
///
/// Each assist loop owns its own instance; nothing is shared between loops.
/// The derivative acts on the error by default; derivative-on-measurement is
/// available for loops whose setpoint jumps, but every loop in this crate
/// leaves it off.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackController {
    kp: f64,
    ki: f64,
    kd: f64,
    min_output: f64,
    max_output: f64,
    derivative_on_measurement: bool,
    integral: f64,
    previous_error: Option<f64>,
    previous_measurement: Option<f64>,
}

impl FeedbackController {
    pub fn new(kp: f64, ki: f64, kd: f64, min_output: f64, max_output: f64) -> Self {
        Self {
            kp,
            ki,
            kd,
            min_output,
            max_output,
            derivative_on_measurement: false,
            integral: 0.0,
            previous_error: None,
            previous_measurement: None,
        }
    }

    pub fn with_derivative_on_measurement(mut self, enabled: bool) -> Self {
        self.derivative_on_measurement = enabled;
        self
    }

    pub fn set_limits(&mut self, min_output: f64, max_output: f64) {
        self.min_output = min_output;
        self.max_output = max_output;
    }

    pub fn limits(&self) -> (f64, f64) {
        (self.min_output, self.max_output)
    }

    /// Drop integral and derivative memory. The first call after a reset
    /// contributes no derivative term.
    pub fn reset(&mut self) {
        self.integral = 0.0;
        self.previous_error = None;
        self.previous_measurement = None;
    }

    /// Control output for the current target/measurement pair, clamped into
    /// the configured range.
    pub fn required_input(&mut self, target: f64, measured: f64, dt: f64) -> f64 {
        let error = target - measured;

        if dt > 0.0 {
            self.integral += error * dt;
            // Keep the integral term from winding past what the clamp can express
            if self.ki.abs() > 1e-12 {
                let bound = self.max_output.abs().max(self.min_output.abs()) / self.ki.abs();
                self.integral = self.integral.clamp(-bound, bound);
            }
        }

        let derivative = if dt > 0.0 {
            if self.derivative_on_measurement {
                match self.previous_measurement {
                    Some(previous) => -(measured - previous) / dt,
                    None => 0.0,
                }
            } else {
                match self.previous_error {
                    Some(previous) => (error - previous) / dt,
                    None => 0.0,
                }
            }
        } else {
            0.0
        };

        self.previous_error = Some(error);
        self.previous_measurement = Some(measured);

        (self.kp * error + self.ki * self.integral + self.kd * derivative)
            .clamp(self.min_output, self.max_output)
    }
}
