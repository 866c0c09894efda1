//! [`PassThroughEstimator`] – publishes the latest measurement as the model.
//!
//! For plants measured directly, with no observer.  An optional first-order
//! smoothing factor turns it into a simple low-pass filter.

use ctrlk_kernel::{Estimator, delegate_component};
use ctrlk_runtime::Stage;
use ctrlk_types::KernelError;

pub struct PassThroughEstimator {
    estimator: Estimator<f64, f64, f64>,
    /// Weight of the new measurement, in `(0, 1]`.
    alpha: f64,
    measurement: f64,
    model: Option<f64>,
}

delegate_component!(PassThroughEstimator => estimator: Estimator<f64, f64, f64>);

impl PassThroughEstimator {
    pub fn new(name: &str) -> Self {
        Self {
            estimator: Estimator::new(name),
            alpha: 1.0,
            measurement: 0.0,
            model: None,
        }
    }

    /// Blend each measurement into the model with weight `alpha`, clamped to
    /// `(0, 1]`.
    pub fn with_smoothing(mut self, alpha: f64) -> Self {
        self.alpha = alpha.clamp(f64::EPSILON, 1.0);
        self
    }

    /// The model published last cycle.
    pub fn model(&self) -> Option<f64> {
        self.model
    }

    pub fn ports(&self) -> &Estimator<f64, f64, f64> {
        &self.estimator
    }
}

impl Stage for PassThroughEstimator {
    fn update(&mut self) -> Result<(), KernelError> {
        self.estimator.input().read_into(&mut self.measurement)?;
        let next = match self.model {
            Some(prev) => prev + self.alpha * (self.measurement - prev),
            None => self.measurement,
        };
        self.model = Some(next);
        self.estimator.model().write(&next)
    }
}
