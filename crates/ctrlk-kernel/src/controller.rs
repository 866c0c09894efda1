//! [`Controller`] – computes the control output from set-point and feedback.
//!
//! | Reads | Produces |
//! |---|---|
//! | `SetPoints`, `Inputs`, `Models` | `Outputs` |

use ctrlk_channel::{ChannelData, ReadPort, WritePort};
use ctrlk_types::{Category, ChannelRole, ComponentId};

use crate::component::{
    Component, ComponentBase, Producer, bind_reader, bind_writer, create_produced,
};
use crate::facet::{Facet, FromName, Named, NamedFacet};
use crate::kernel::Kernel;

/// A controller reading set-points `S`, inputs `I` and models `M` and
/// writing outputs `O`.
#[derive(Debug)]
pub struct Controller<I, M, S, O, F = NamedFacet> {
    base: ComponentBase<F>,
    set_point: ReadPort<S>,
    input: ReadPort<I>,
    model: ReadPort<M>,
    output: WritePort<O>,
}

impl<I, M, S, O, F: Named> Controller<I, M, S, O, F> {
    pub fn new(name: &str) -> Self
    where
        F: FromName,
    {
        Self::with_facet(F::from_name(name))
    }

    pub fn with_facet(facet: F) -> Self {
        Self {
            base: ComponentBase::new(facet),
            set_point: ReadPort::new(),
            input: ReadPort::new(),
            model: ReadPort::new(),
            output: WritePort::new(),
        }
    }

    pub fn base(&self) -> &ComponentBase<F> {
        &self.base
    }

    pub fn base_mut(&mut self) -> &mut ComponentBase<F> {
        &mut self.base
    }

    pub fn set_point(&self) -> &ReadPort<S> {
        &self.set_point
    }

    pub fn input(&self) -> &ReadPort<I> {
        &self.input
    }

    pub fn model(&self) -> &ReadPort<M> {
        &self.model
    }

    pub fn output(&self) -> &WritePort<O> {
        &self.output
    }
}

impl<K, I, M, S, O, F> Component<K> for Controller<I, M, S, O, F>
where
    K: Kernel + ?Sized,
    I: ChannelData,
    M: ChannelData,
    S: ChannelData,
    O: ChannelData,
    F: Facet<K>,
{
    const CATEGORY: Category = Category::Controller;

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
        self.set_point.is_bound()
            && self.input.is_bound()
            && self.model.is_bound()
            && self.output.is_bound()
    }

    fn has_bound_ports(&self) -> bool {
        self.set_point.is_bound()
            || self.input.is_bound()
            || self.model.is_bound()
            || self.output.is_bound()
    }

    fn enable_facets(&mut self, kernel: &mut K) -> bool {
        self.base.enable_in(Category::Controller, kernel)
    }

    fn disable_facets(&mut self, kernel: &mut K) {
        self.base.disable_in(Category::Controller, kernel);
        Component::<K>::erase_ports(self);
    }

    fn create_data_object(&mut self, kernel: &mut K) {
        create_produced(&mut self.output, kernel, ChannelRole::Outputs);
    }

    fn create_ports(&mut self, kernel: &K) {
        bind_reader(&mut self.set_point, kernel, ChannelRole::SetPoints);
        bind_reader(&mut self.input, kernel, ChannelRole::Inputs);
        bind_reader(&mut self.model, kernel, ChannelRole::Models);
        bind_writer(&mut self.output, kernel, ChannelRole::Outputs);
    }

    fn erase_ports(&mut self) {
        self.set_point.erase_port();
        self.input.erase_port();
        self.model.erase_port();
        self.output.erase_port();
    }

    fn select(&self, kernel: &mut K) -> bool {
        kernel.select_controller(&Component::<K>::candidate(self))
    }
}

impl<I, M, S, O, F> Producer for Controller<I, M, S, O, F> {
    type Output = O;

    fn write_port(&self) -> Option<&WritePort<O>> {
        Some(&self.output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeKernel, VetoFacet};
    use ctrlk_types::ComponentState;

    type Pid = Controller<f64, f64, f64, f64>;

    #[test]
    fn controller_produces_outputs_channel() {
        let mut k = FakeKernel::new("K");
        let mut c = Pid::new("pid");
        c.create_data_object(&mut k);
        c.create_ports(&k);
        assert!(c.enable_facets(&mut k));

        c.output().write(&3.14).unwrap();
        let id = ctrlk_channel::ChannelId::new("K::Outputs", "");
        assert_eq!(k.channels().require::<f64>(&id).unwrap().read(), 3.14);
    }

    #[test]
    fn vetoed_controller_stays_unregistered() {
        let mut k = FakeKernel::new("K");
        let mut c: Controller<f64, f64, f64, f64, VetoFacet> =
            Controller::with_facet(VetoFacet::new("pid"));
        c.create_data_object(&mut k);
        c.create_ports(&k);
        assert!(!c.enable_facets(&mut k));
        assert_eq!(c.state(&k), ComponentState::Unregistered);
        assert_eq!(c.base().facet().enable_calls, 1);
        assert!(!c.select(&mut k));
    }

    #[test]
    fn state_walks_the_lifecycle() {
        let mut k = FakeKernel::new("K");
        for role in [ChannelRole::SetPoints, ChannelRole::Inputs, ChannelRole::Models] {
            create_produced(&mut WritePort::<f64>::new(), &mut k, role);
        }
        let mut c = Pid::new("pid");
        assert_eq!(c.state(&k), ComponentState::Unregistered);

        c.create_data_object(&mut k);
        c.create_ports(&k);
        assert!(c.enable_facets(&mut k));
        assert_eq!(c.state(&k), ComponentState::EnabledInactive);

        assert!(c.select(&mut k));
        assert_eq!(c.state(&k), ComponentState::Active);

        c.disable_facets(&mut k);
        assert_eq!(c.state(&k), ComponentState::Unregistered);
        assert_eq!(k.registry(Category::Controller).active(), None);
    }
}
