//! [`Sensor`] – head of the pipeline; produces the `Inputs` channel.
//!
//! | Reads | Produces |
//! |---|---|
//! | — | `Inputs` |

use ctrlk_channel::{ChannelData, WritePort};
use ctrlk_types::{Category, ChannelRole, ComponentId};

use crate::component::{Component, ComponentBase, Producer, bind_writer, create_produced};
use crate::facet::{Facet, FromName, Named, NamedFacet};
use crate::kernel::Kernel;

/// A sensor writing measurements of type `I`.
#[derive(Debug)]
pub struct Sensor<I, F = NamedFacet> {
    base: ComponentBase<F>,
    input: WritePort<I>,
}

impl<I, F: Named> Sensor<I, F> {
    pub fn new(name: &str) -> Self
    where
        F: FromName,
    {
        Self::with_facet(F::from_name(name))
    }

    pub fn with_facet(facet: F) -> Self {
        Self {
            base: ComponentBase::new(facet),
            input: WritePort::new(),
        }
    }

    pub fn base(&self) -> &ComponentBase<F> {
        &self.base
    }

    pub fn base_mut(&mut self) -> &mut ComponentBase<F> {
        &mut self.base
    }

    /// Port into the `Inputs` channel.
    pub fn input(&self) -> &WritePort<I> {
        &self.input
    }
}

impl<K, I, F> Component<K> for Sensor<I, F>
where
    K: Kernel + ?Sized,
    I: ChannelData,
    F: Facet<K>,
{
    const CATEGORY: Category = Category::Sensor;

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
        self.input.is_bound()
    }

    fn has_bound_ports(&self) -> bool {
        self.input.is_bound()
    }

    fn enable_facets(&mut self, kernel: &mut K) -> bool {
        self.base.enable_in(Category::Sensor, kernel)
    }

    fn disable_facets(&mut self, kernel: &mut K) {
        self.base.disable_in(Category::Sensor, kernel);
        self.input.erase_port();
    }

    fn create_data_object(&mut self, kernel: &mut K) {
        create_produced(&mut self.input, kernel, ChannelRole::Inputs);
    }

    fn create_ports(&mut self, kernel: &K) {
        bind_writer(&mut self.input, kernel, ChannelRole::Inputs);
    }

    fn erase_ports(&mut self) {
        self.input.erase_port();
    }

    fn select(&self, kernel: &mut K) -> bool {
        kernel.select_sensor(&Component::<K>::candidate(self))
    }
}

impl<I, F> Producer for Sensor<I, F> {
    type Output = I;

    fn write_port(&self) -> Option<&WritePort<I>> {
        Some(&self.input)
    }
}
