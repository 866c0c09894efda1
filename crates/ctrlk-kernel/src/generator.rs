//! [`Generator`] – produces the set-points the controller tracks.
//!
//! | Reads | Produces |
//! |---|---|
//! | `Commands`, `Inputs`, `Models` | `SetPoints` |

use ctrlk_channel::{ChannelData, ReadPort, WritePort};
use ctrlk_types::{Category, ChannelRole, ComponentId};

use crate::component::{
    Component, ComponentBase, Producer, bind_reader, bind_writer, create_produced,
};
use crate::facet::{Facet, FromName, Named, NamedFacet};
use crate::kernel::Kernel;

#[derive(Debug)]
pub struct Generator<I, M, C, S, F = NamedFacet> {
    base: ComponentBase<F>,
    command: ReadPort<C>,
    input: ReadPort<I>,
    model: ReadPort<M>,
    set_point: WritePort<S>,
}

impl<I, M, C, S, F: Named> Generator<I, M, C, S, F> {
    pub fn new(name: &str) -> Self
    where
        F: FromName,
    {
        Self::with_facet(F::from_name(name))
    }

    pub fn with_facet(facet: F) -> Self {
        Self {
            base: ComponentBase::new(facet),
            command: ReadPort::new(),
            input: ReadPort::new(),
            model: ReadPort::new(),
            set_point: WritePort::new(),
        }
    }

    pub fn base(&self) -> &ComponentBase<F> {
        &self.base
    }

    pub fn base_mut(&mut self) -> &mut ComponentBase<F> {
        &mut self.base
    }

    pub fn command(&self) -> &ReadPort<C> {
        &self.command
    }

    pub fn input(&self) -> &ReadPort<I> {
        &self.input
    }

    pub fn model(&self) -> &ReadPort<M> {
        &self.model
    }

    pub fn set_point(&self) -> &WritePort<S> {
        &self.set_point
    }
}

impl<K, I, M, C, S, F> Component<K> for Generator<I, M, C, S, F>
where
    K: Kernel + ?Sized,
    I: ChannelData,
    M: ChannelData,
    C: ChannelData,
    S: ChannelData,
    F: Facet<K>,
{
    const CATEGORY: Category = Category::Generator;

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
        self.command.is_bound()
            && self.input.is_bound()
            && self.model.is_bound()
            && self.set_point.is_bound()
    }

    fn has_bound_ports(&self) -> bool {
        self.command.is_bound()
            || self.input.is_bound()
            || self.model.is_bound()
            || self.set_point.is_bound()
    }

    fn enable_facets(&mut self, kernel: &mut K) -> bool {
        self.base.enable_in(Category::Generator, kernel)
    }

    fn disable_facets(&mut self, kernel: &mut K) {
        self.base.disable_in(Category::Generator, kernel);
        Component::<K>::erase_ports(self);
    }

    fn create_data_object(&mut self, kernel: &mut K) {
        create_produced(&mut self.set_point, kernel, ChannelRole::SetPoints);
    }

    fn create_ports(&mut self, kernel: &K) {
        bind_reader(&mut self.command, kernel, ChannelRole::Commands);
        bind_reader(&mut self.input, kernel, ChannelRole::Inputs);
        bind_reader(&mut self.model, kernel, ChannelRole::Models);
        bind_writer(&mut self.set_point, kernel, ChannelRole::SetPoints);
    }

    fn erase_ports(&mut self) {
        self.command.erase_port();
        self.input.erase_port();
        self.model.erase_port();
        self.set_point.erase_port();
    }

    fn select(&self, kernel: &mut K) -> bool {
        kernel.select_generator(&Component::<K>::candidate(self))
    }
}

impl<I, M, C, S, F> Producer for Generator<I, M, C, S, F> {
    type Output = S;

    fn write_port(&self) -> Option<&WritePort<S>> {
        Some(&self.set_point)
    }
}
