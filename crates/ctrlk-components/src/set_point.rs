//! [`SetPointGenerator`] – a `Generator` tracking a target with an optional
//! rate limit.
//!
//! The target starts at its configured value.  Any value written to the
//! kernel's `Commands` channel replaces it; the generator notices a new
//! command by the channel's revision, so a command equal to the default
//! value still counts.

use ctrlk_kernel::{Generator, delegate_component};
use ctrlk_runtime::Stage;
use ctrlk_types::KernelError;
use tracing::debug;

pub struct SetPointGenerator {
    generator: Generator<f64, f64, f64, f64>,
    target: f64,
    /// Largest set-point change per second; `None` jumps straight to target.
    rate: Option<f64>,
    dt: f64,
    current: f64,
    seen_revision: u64,
}

delegate_component!(SetPointGenerator => generator: Generator<f64, f64, f64, f64>);

impl SetPointGenerator {
    /// `dt` is the cycle period in seconds.
    pub fn new(name: &str, target: f64, dt: f64) -> Self {
        Self {
            generator: Generator::new(name),
            target,
            rate: None,
            dt,
            current: 0.0,
            seen_revision: 0,
        }
    }

    /// Limit the set-point slew to `rate` units per second.
    pub fn with_rate(mut self, rate: f64) -> Self {
        self.rate = Some(rate.abs());
        self
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    /// The set-point published last cycle.
    pub fn current(&self) -> f64 {
        self.current
    }

    pub fn ports(&self) -> &Generator<f64, f64, f64, f64> {
        &self.generator
    }
}

impl Stage for SetPointGenerator {
    fn update(&mut self) -> Result<(), KernelError> {
        if let Some(commands) = self.generator.command().channel() {
            let revision = commands.revision();
            if revision != self.seen_revision {
                self.seen_revision = revision;
                commands.read_into(&mut self.target);
                debug!(target = self.target, "set-point target commanded");
            }
        }
        self.current = match self.rate {
            Some(rate) => {
                let step = rate * self.dt;
                self.current + (self.target - self.current).clamp(-step, step)
            }
            None => self.target,
        };
        self.generator.set_point().write(&self.current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ctrlk_kernel::ControlKernel;

    fn loaded(kernel: &mut ControlKernel, g: SetPointGenerator) -> SetPointGenerator {
        let mut g = g;
        kernel.load(&mut g).unwrap();
        g
    }

    #[test]
    fn publishes_configured_target() {
        let mut kernel = ControlKernel::new("K");
        let mut g = loaded(&mut kernel, SetPointGenerator::new("sp", 2.0, 0.1));
        g.update().unwrap();
        assert_eq!(g.ports().set_point().read().unwrap(), 2.0);
    }

    #[test]
    fn command_overrides_target() {
        let mut kernel = ControlKernel::new("K");
        let commands = kernel.command_port::<f64>();
        let mut g = loaded(&mut kernel, SetPointGenerator::new("sp", 2.0, 0.1));

        g.update().unwrap();
        commands.write(&0.0).unwrap();
        g.update().unwrap();
        assert_eq!(g.target(), 0.0);
        assert_eq!(g.current(), 0.0);

        commands.write(&-1.0).unwrap();
        g.update().unwrap();
        g.update().unwrap();
        assert_eq!(g.current(), -1.0);
    }

    #[test]
    fn rate_limit_ramps_toward_target() {
        let mut kernel = ControlKernel::new("K");
        let mut g = loaded(&mut kernel, SetPointGenerator::new("sp", 1.0, 0.1).with_rate(2.0));
        let mut seen = Vec::new();
        for _ in 0..7 {
            g.update().unwrap();
            seen.push(g.current());
        }
        let expected = [0.2, 0.4, 0.6, 0.8, 1.0, 1.0, 1.0];
        for (got, want) in seen.iter().zip(expected) {
            assert!((got - want).abs() < 1e-9, "{seen:?}");
        }
    }

    #[test]
    fn unloaded_generator_cannot_publish() {
        let mut g = SetPointGenerator::new("sp", 1.0, 0.1);
        assert!(matches!(g.update(), Err(KernelError::ChannelNotFound(_))));
    }
}
