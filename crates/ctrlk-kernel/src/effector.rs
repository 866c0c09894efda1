//! [`Effector`] – tail of the pipeline; drives the hardware.
//!
//! | Reads | Produces |
//! |---|---|
//! | `Inputs`, `Models`, `Outputs` | — |
//!
//! An effector has no write capability: its [`Producer::write_port`] is
//! always `None`.

use ctrlk_channel::{ChannelData, ReadPort, WritePort};
use ctrlk_types::{Category, ChannelRole, ComponentId};

use crate::component::{Component, ComponentBase, NoOutput, Producer, bind_reader};
use crate::facet::{Facet, FromName, Named, NamedFacet};
use crate::kernel::Kernel;

#[derive(Debug)]
pub struct Effector<I, M, O, F = NamedFacet> {
    base: ComponentBase<F>,
    input: ReadPort<I>,
    model: ReadPort<M>,
    output: ReadPort<O>,
}

impl<I, M, O, F: Named> Effector<I, M, O, F> {
    pub fn new(name: &str) -> Self
    where
        F: FromName,
    {
        Self::with_facet(F::from_name(name))
    }

    pub fn with_facet(facet: F) -> Self {
        Self {
            base: ComponentBase::new(facet),
            input: ReadPort::new(),
            model: ReadPort::new(),
            output: ReadPort::new(),
        }
    }

    pub fn base(&self) -> &ComponentBase<F> {
        &self.base
    }

    pub fn base_mut(&mut self) -> &mut ComponentBase<F> {
        &mut self.base
    }

    pub fn input(&self) -> &ReadPort<I> {
        &self.input
    }

    pub fn model(&self) -> &ReadPort<M> {
        &self.model
    }

    /// Port onto the controller's `Outputs`.
    pub fn output(&self) -> &ReadPort<O> {
        &self.output
    }
}

impl<K, I, M, O, F> Component<K> for Effector<I, M, O, F>
where
    K: Kernel + ?Sized,
    I: ChannelData,
    M: ChannelData,
    O: ChannelData,
    F: Facet<K>,
{
    const CATEGORY: Category = Category::Effector;

    fn id(&self) -> ComponentId {
        self.base.id()
    }

    fn name(&self) -> &str {
        self.base.name()
    }

    fn is_facet_enabled(&self) -> bool {
        self.base.is_facet_enabled()
    }

    fn is_wired(&self) -> bool {
        self.input.is_bound() && self.model.is_bound() && self.output.is_bound()
    }

    fn has_bound_ports(&self) -> bool {
        self.input.is_bound() || self.model.is_bound() || self.output.is_bound()
    }

    fn enable_facets(&mut self, kernel: &mut K) -> bool {
        self.base.enable_in(Category::Effector, kernel)
    }

    fn disable_facets(&mut self, kernel: &mut K) {
        self.base.disable_in(Category::Effector, kernel);
        Component::<K>::erase_ports(self);
    }

    /// Effectors produce nothing.
    fn create_data_object(&mut self, _kernel: &mut K) {}

    fn create_ports(&mut self, kernel: &K) {
        bind_reader(&mut self.input, kernel, ChannelRole::Inputs);
        bind_reader(&mut self.model, kernel, ChannelRole::Models);
        bind_reader(&mut self.output, kernel, ChannelRole::Outputs);
    }

    fn erase_ports(&mut self) {
        self.input.erase_port();
        self.model.erase_port();
        self.output.erase_port();
    }

    fn select(&self, kernel: &mut K) -> bool {
        kernel.select_effector(&Component::<K>::candidate(self))
    }
}

impl<I, M, O, F> Producer for Effector<I, M, O, F> {
    type Output = NoOutput;

    fn write_port(&self) -> Option<&WritePort<NoOutput>> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::create_produced;
    use crate::testing::FakeKernel;

    type Motor = Effector<f64, f64, f64>;

    #[test]
    fn effector_has_no_write_port() {
        let mut k = FakeKernel::new("K");
        let mut e = Motor::new("motor");
        e.create_data_object(&mut k);
        assert!(k.channels().is_empty());
        assert!(e.write_port().is_none());
    }

    #[test]
    fn effector_reads_controller_output() {
        let mut k = FakeKernel::new("K");
        let mut out = WritePort::<f64>::new();
        create_produced(&mut out, &mut k, ChannelRole::Outputs);
        crate::component::bind_writer(&mut out, &k, ChannelRole::Outputs);

        let mut e = Motor::new("motor");
        e.create_ports(&k);
        assert!(e.output().is_bound());
        assert!(!e.input().is_bound());

        out.write(&0.25).unwrap();
        assert_eq!(e.output().read().unwrap(), 0.25);
    }
}
