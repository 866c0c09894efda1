//! [`Support`] – auxiliary services running alongside the pipeline.
//!
//! Supports own no ports and are not arbitrated: any number may be enabled at
//! once, each is [`ComponentState::Active`][ctrlk_types::ComponentState] as
//! soon as it is enabled, and selecting one always succeeds.

use ctrlk_channel::WritePort;
use ctrlk_types::{Category, ComponentId};

use crate::component::{Component, ComponentBase, NoOutput, Producer};
use crate::facet::{Facet, FromName, Named, NamedFacet};
use crate::kernel::Kernel;

#[derive(Debug)]
pub struct Support<F = NamedFacet> {
    base: ComponentBase<F>,
}

impl<F: Named> Support<F> {
    pub fn new(name: &str) -> Self
    where
        F: FromName,
    {
        Self::with_facet(F::from_name(name))
    }

    pub fn with_facet(facet: F) -> Self {
        Self {
            base: ComponentBase::new(facet),
        }
    }

    pub fn base(&self) -> &ComponentBase<F> {
        &self.base
    }

    pub fn base_mut(&mut self) -> &mut ComponentBase<F> {
        &mut self.base
    }
}

impl<K, F> Component<K> for Support<F>
where
    K: Kernel + ?Sized,
    F: Facet<K>,
{
    const CATEGORY: Category = Category::Support;

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
        true
    }

    fn has_bound_ports(&self) -> bool {
        false
    }

    fn enable_facets(&mut self, kernel: &mut K) -> bool {
        self.base.enable_in(Category::Support, kernel)
    }

    fn disable_facets(&mut self, kernel: &mut K) {
        self.base.disable_in(Category::Support, kernel);
    }

    fn create_data_object(&mut self, _kernel: &mut K) {}

    fn create_ports(&mut self, _kernel: &K) {}

    fn erase_ports(&mut self) {}

    /// Always succeeds: supports are not arbitrated.
    fn select(&self, kernel: &mut K) -> bool {
        kernel.arbitrate(&Component::<K>::candidate(self))
    }
}

impl<F> Producer for Support<F> {
    type Output = NoOutput;

    fn write_port(&self) -> Option<&WritePort<NoOutput>> {
        None
    }
}
