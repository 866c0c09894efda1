//! PID control law and the [`PidController`] component built on it.
//!
//! [`PidLaw`] is hardware- and kernel-agnostic: the caller supplies the
//! measurement and elapsed time and gets the clamped output back.
//! [`PidController`] runs it as a `Controller` stage: set-point from
//! `SetPoints`, feedback from `Models`, result into `Outputs`.
//!
//! # Example
//!
//! ```rust
//! use ctrlk_components::pid::{PidGains, PidLaw};
//!
//! let mut pid = PidLaw::new(PidGains { kp: 1.0, ki: 0.1, kd: 0.05, ..PidGains::default() });
//! pid.set_set_point(90.0);
//!
//! let output = pid.update(0.0, 0.01);
//! assert!(output > 0.0);
//! ```

use ctrlk_kernel::{Controller, delegate_component};
use ctrlk_runtime::Stage;
use ctrlk_types::KernelError;
use serde::{Deserialize, Serialize};

/// Gains and output limits of a [`PidLaw`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PidGains {
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
    pub output_min: f64,
    pub output_max: f64,
}

impl Default for PidGains {
    fn default() -> Self {
        Self {
            kp: 1.0,
            ki: 0.0,
            kd: 0.0,
            output_min: f64::NEG_INFINITY,
            output_max: f64::INFINITY,
        }
    }
}

/// A PID law with integral anti-windup.
#[derive(Debug, Clone)]
pub struct PidLaw {
    gains: PidGains,
    set_point: f64,
    integral: f64,
    last_error: Option<f64>,
}

impl PidLaw {
    pub fn new(gains: PidGains) -> Self {
        Self {
            gains,
            set_point: 0.0,
            integral: 0.0,
            last_error: None,
        }
    }

    pub fn gains(&self) -> &PidGains {
        &self.gains
    }

    pub fn set_gains(&mut self, gains: PidGains) {
        self.gains = gains;
    }

    pub fn set_set_point(&mut self, set_point: f64) {
        self.set_point = set_point;
    }

    pub fn set_point(&self) -> f64 {
        self.set_point
    }

    /// Compute the next output for `measurement`, `dt` seconds after the
    /// previous call.
    ///
    /// Returns `0.0` without touching internal state when `dt` is not
    /// positive.
    pub fn update(&mut self, measurement: f64, dt: f64) -> f64 {
        if dt <= 0.0 {
            return 0.0;
        }
        let PidGains {
            kp,
            ki,
            kd,
            output_min,
            output_max,
        } = self.gains;

        let error = self.set_point - measurement;
        let p = kp * error;

        // Back-calculate the accumulator so the integral term never exceeds
        // the output limits.
        self.integral += error * dt;
        let i = (ki * self.integral).clamp(output_min, output_max);
        if ki.abs() > f64::EPSILON {
            self.integral = i / ki;
        }

        let d = match self.last_error {
            Some(prev) => kd * (error - prev) / dt,
            None => 0.0,
        };
        self.last_error = Some(error);

        (p + i + d).clamp(output_min, output_max)
    }

    /// Clear the integral accumulator and derivative memory.
    pub fn reset(&mut self) {
        self.integral = 0.0;
        self.last_error = None;
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Component
// ────────────────────────────────────────────────────────────────────────────

/// Scalar PID `Controller`.  Tracks the estimated state on `Models`.
pub struct PidController {
    controller: Controller<f64, f64, f64, f64>,
    law: PidLaw,
    dt: f64,
    set_point: f64,
    feedback: f64,
}

delegate_component!(PidController => controller: Controller<f64, f64, f64, f64>);

impl PidController {
    /// `dt` is the cycle period in seconds.
    pub fn new(name: &str, gains: PidGains, dt: f64) -> Self {
        Self {
            controller: Controller::new(name),
            law: PidLaw::new(gains),
            dt,
            set_point: 0.0,
            feedback: 0.0,
        }
    }

    pub fn law(&self) -> &PidLaw {
        &self.law
    }

    pub fn law_mut(&mut self) -> &mut PidLaw {
        &mut self.law
    }

    pub fn ports(&self) -> &Controller<f64, f64, f64, f64> {
        &self.controller
    }
}

impl Stage for PidController {
    fn update(&mut self) -> Result<(), KernelError> {
        let ports = &self.controller;
        ports.set_point().read_into(&mut self.set_point)?;
        ports.model().read_into(&mut self.feedback)?;
        self.law.set_set_point(self.set_point);
        let u = self.law.update(self.feedback, self.dt);
        ports.output().write(&u)
    }
}
