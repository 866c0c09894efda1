//! [`Estimator`] – turns raw measurements into a model of the plant.
//!
//! | Reads | Produces |
//! |---|---|
//! | `Inputs`, `Outputs` | `Models` |
//!
//! The `Outputs` port carries the previous cycle's control output, which is
//! what an observer needs to predict the next state.

use ctrlk_channel::{ChannelData, ReadPort, WritePort};
use ctrlk_types::{Category, ChannelRole, ComponentId};

use crate::component::{
    Component, ComponentBase, Producer, bind_reader, bind_writer, create_produced,
};
use crate::facet::{Facet, FromName, Named, NamedFacet};
use crate::kernel::Kernel;

#[derive(Debug)]
pub struct Estimator<I, O, M, F = NamedFacet> {
    base: ComponentBase<F>,
    input: ReadPort<I>,
    output: ReadPort<O>,
    model: WritePort<M>,
}

impl<I, O, M, F: Named> Estimator<I, O, M, F> {
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
            output: ReadPort::new(),
            model: WritePort::new(),
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

    pub fn output(&self) -> &ReadPort<O> {
        &self.output
    }

    pub fn model(&self) -> &WritePort<M> {
        &self.model
    }
}

impl<K, I, O, M, F> Component<K> for Estimator<I, O, M, F>
where
    K: Kernel + ?Sized,
    I: ChannelData,
    O: ChannelData,
    M: ChannelData,
    F: Facet<K>,
{
    const CATEGORY: Category = Category::Estimator;

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
        self.input.is_bound() && self.output.is_bound() && self.model.is_bound()
    }

    fn has_bound_ports(&self) -> bool {
        self.input.is_bound() || self.output.is_bound() || self.model.is_bound()
    }

    fn enable_facets(&mut self, kernel: &mut K) -> bool {
        self.base.enable_in(Category::Estimator, kernel)
    }

    fn disable_facets(&mut self, kernel: &mut K) {
        self.base.disable_in(Category::Estimator, kernel);
        Component::<K>::erase_ports(self);
    }

    fn create_data_object(&mut self, kernel: &mut K) {
        create_produced(&mut self.model, kernel, ChannelRole::Models);
    }

    fn create_ports(&mut self, kernel: &K) {
        bind_reader(&mut self.input, kernel, ChannelRole::Inputs);
        bind_reader(&mut self.output, kernel, ChannelRole::Outputs);
        bind_writer(&mut self.model, kernel, ChannelRole::Models);
    }

    fn erase_ports(&mut self) {
        self.input.erase_port();
        self.output.erase_port();
        self.model.erase_port();
    }

    fn select(&self, kernel: &mut K) -> bool {
        kernel.select_estimator(&Component::<K>::candidate(self))
    }
}

impl<I, O, M, F> Producer for Estimator<I, O, M, F> {
    type Output = M;

    fn write_port(&self) -> Option<&WritePort<M>> {
        Some(&self.model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeKernel;

    type Observer = Estimator<f64, f64, [f64; 2]>;

    #[test]
    fn estimator_without_upstream_channels_is_not_wired() {
        let mut k = FakeKernel::new("K");
        let mut e = Observer::new("obs");
        e.create_data_object(&mut k);
        e.create_ports(&k);

        assert!(e.model().is_bound());
        assert!(!e.input().is_bound());
        assert!(Component::<FakeKernel>::has_bound_ports(&e));
        assert!(!Component::<FakeKernel>::is_wired(&e));

        assert!(e.enable_facets(&mut k));
        assert!(!e.select(&mut k));
        assert!(e.input().read().is_err());
    }

    #[test]
    fn estimator_reads_inputs_and_previous_outputs() {
        let mut k = FakeKernel::new("K");
        let mut inputs = WritePort::<f64>::new();
        let mut outputs = WritePort::<f64>::new();
        create_produced(&mut inputs, &mut k, ChannelRole::Inputs);
        create_produced(&mut outputs, &mut k, ChannelRole::Outputs);
        bind_writer(&mut inputs, &k, ChannelRole::Inputs);
        bind_writer(&mut outputs, &k, ChannelRole::Outputs);

        let mut e = Observer::new("obs");
        e.create_data_object(&mut k);
        e.create_ports(&k);
        assert!(e.enable_facets(&mut k));
        assert!(e.select(&mut k));

        inputs.write(&1.5).unwrap();
        outputs.write(&-0.5).unwrap();
        let x = e.input().read().unwrap();
        let u = e.output().read().unwrap();
        e.model().write(&[x, u]).unwrap();
        assert_eq!(e.write_port().unwrap().read().unwrap(), [1.5, -0.5]);
    }

    #[test]
    fn disable_unbinds_every_port() {
        let mut k = FakeKernel::new("K");
        let mut e = Observer::new("obs");
        e.create_data_object(&mut k);
        e.create_ports(&k);
        assert!(e.enable_facets(&mut k));
        e.disable_facets(&mut k);
        assert!(!Component::<FakeKernel>::has_bound_ports(&e));
        assert!(k.registry(Category::Estimator).is_empty());
    }
}
