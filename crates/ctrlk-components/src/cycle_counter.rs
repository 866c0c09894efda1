//! [`CycleCounter`] – a `Support` counting completed cycles.
//!
//! Supports are not part of the control pipeline; the application runs them
//! after each step.  The counter's facet carries a [`TraceLayer`], so
//! enabling and disabling it is logged with the owning kernel's name.

use ctrlk_kernel::{Layered, NamedFacet, Support, TraceLayer, delegate_component};
use ctrlk_runtime::Stage;
use ctrlk_types::KernelError;
use tracing::info;

type TracedFacet = Layered<TraceLayer, NamedFacet>;

pub struct CycleCounter {
    support: Support<TracedFacet>,
    count: u64,
    /// Log every this many cycles; `0` never logs.
    report_every: u64,
}

delegate_component!(CycleCounter => support: Support<TracedFacet>);

impl CycleCounter {
    pub fn new(name: &str, report_every: u64) -> Self {
        Self {
            support: Support::new(name),
            count: 0,
            report_every,
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }
}

impl Stage for CycleCounter {
    fn update(&mut self) -> Result<(), KernelError> {
        self.count += 1;
        if self.report_every > 0 && self.count % self.report_every == 0 {
            info!(component = self.support.base().name(), cycles = self.count, "cycle count");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ctrlk_kernel::{Component, ControlKernel, Kernel};
    use ctrlk_types::{Category, ComponentState};

    #[test]
    fn counts_every_update() {
        let mut c = CycleCounter::new("cycles", 2);
        for _ in 0..5 {
            c.update().unwrap();
        }
        assert_eq!(c.count(), 5);
    }

    #[test]
    fn loads_as_an_active_support() {
        let mut kernel = ControlKernel::new("K");
        let mut c = CycleCounter::new("cycles", 0);
        kernel.load(&mut c).unwrap();
        kernel.activate(&mut c).unwrap();
        assert_eq!(Component::<ControlKernel>::state(&c, &kernel), ComponentState::Active);
        assert_eq!(kernel.registered(Category::Support), ["cycles"]);
        assert!(kernel.channels().is_empty());
    }
}
