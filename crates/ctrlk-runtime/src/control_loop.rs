//! [`ControlLoop`] – one bank per pipeline stage, stepped in order.
//!
//! ```text
//! step:  sense ─▶ estimate ─▶ generate ─▶ control ─▶ act
//! ```
//!
//! A bank without an active member is skipped, so a loop can run with only
//! part of the pipeline selected (a sensor and an effector driven directly
//! by a controller, for instance).  The first stage error aborts the cycle.
//!
//! Support components do not take part in the cycle.

use ctrlk_kernel::{Component, ControlKernel};
use ctrlk_types::KernelError;
use tracing::trace;

use crate::bank::Bank;
use crate::stage::Stage;

pub struct ControlLoop<S, E, G, C, A> {
    pub sensors: Bank<S>,
    pub estimators: Bank<E>,
    pub generators: Bank<G>,
    pub controllers: Bank<C>,
    pub effectors: Bank<A>,
    cycles: u64,
}

impl<S, E, G, C, A> Default for ControlLoop<S, E, G, C, A> {
    fn default() -> Self {
        Self {
            sensors: Bank::new(),
            estimators: Bank::new(),
            generators: Bank::new(),
            controllers: Bank::new(),
            effectors: Bank::new(),
            cycles: 0,
        }
    }
}

impl<S, E, G, C, A> ControlLoop<S, E, G, C, A> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Completed cycles.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }
}

impl<S, E, G, C, A> ControlLoop<S, E, G, C, A>
where
    S: Component<ControlKernel>,
    E: Component<ControlKernel>,
    G: Component<ControlKernel>,
    C: Component<ControlKernel>,
    A: Component<ControlKernel>,
{
    /// Re-resolve every bank's active member.  Call after any selection
    /// change.
    pub fn sync(&mut self, kernel: &ControlKernel) {
        self.sensors.sync(kernel);
        self.estimators.sync(kernel);
        self.generators.sync(kernel);
        self.controllers.sync(kernel);
        self.effectors.sync(kernel);
    }

    /// Unload every bank, effectors first.
    pub fn unload_all(&mut self, kernel: &mut ControlKernel) {
        self.effectors.unload_all(kernel);
        self.controllers.unload_all(kernel);
        self.generators.unload_all(kernel);
        self.estimators.unload_all(kernel);
        self.sensors.unload_all(kernel);
    }
}

impl<S, E, G, C, A> ControlLoop<S, E, G, C, A>
where
    S: Stage,
    E: Stage,
    G: Stage,
    C: Stage,
    A: Stage,
{
    /// Run one cycle of the pipeline.
    pub fn step(&mut self) -> Result<(), KernelError> {
        let ran = [
            self.sensors.update()?,
            self.estimators.update()?,
            self.generators.update()?,
            self.controllers.update()?,
            self.effectors.update()?,
        ];
        self.cycles += 1;
        trace!(cycle = self.cycles, stages = ran.iter().filter(|r| **r).count(), "cycle done");
        Ok(())
    }
}

impl<S, E, G, C, A> Stage for ControlLoop<S, E, G, C, A>
where
    S: Stage,
    E: Stage,
    G: Stage,
    C: Stage,
    A: Stage,
{
    fn update(&mut self) -> Result<(), KernelError> {
        self.step()
    }
}
