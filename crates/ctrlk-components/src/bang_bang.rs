//! [`BangBangController`] – on/off control with a hysteresis band.
//!
//! Drives `+amplitude` while the model is below `set_point − band` and
//! `−amplitude` while it is above `set_point + band`; inside the band the
//! previous output is held.

use ctrlk_kernel::{Controller, delegate_component};
use ctrlk_runtime::Stage;
use ctrlk_types::KernelError;

pub struct BangBangController {
    controller: Controller<f64, f64, f64, f64>,
    amplitude: f64,
    band: f64,
    set_point: f64,
    feedback: f64,
    output: f64,
}

delegate_component!(BangBangController => controller: Controller<f64, f64, f64, f64>);

impl BangBangController {
    pub fn new(name: &str, amplitude: f64, band: f64) -> Self {
        Self {
            controller: Controller::new(name),
            amplitude: amplitude.abs(),
            band: band.abs(),
            set_point: 0.0,
            feedback: 0.0,
            output: 0.0,
        }
    }

    pub fn ports(&self) -> &Controller<f64, f64, f64, f64> {
        &self.controller
    }

    fn decide(&mut self) -> f64 {
        let error = self.set_point - self.feedback;
        if error > self.band {
            self.output = self.amplitude;
        } else if error < -self.band {
            self.output = -self.amplitude;
        }
        self.output
    }
}

impl Stage for BangBangController {
    fn update(&mut self) -> Result<(), KernelError> {
        self.controller.set_point().read_into(&mut self.set_point)?;
        self.controller.model().read_into(&mut self.feedback)?;
        let u = self.decide();
        self.controller.output().write(&u)
    }
}
