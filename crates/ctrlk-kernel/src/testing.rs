//! Test doubles shared by the unit tests of this crate.

use ctrlk_channel::ChannelTable;
use ctrlk_types::{Category, Prefixes};

use crate::facet::{Facet, Named};
use crate::kernel::{Candidate, Kernel};
use crate::registry::Registry;

/// Minimal kernel: plain registries and table, default arbitration unless
/// `reject_selection` is set.
pub struct FakeKernel {
    pub name: String,
    pub prefixes: Prefixes,
    pub reject_selection: bool,
    channels: ChannelTable,
    registries: Vec<Registry>,
}

impl FakeKernel {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            prefixes: Prefixes::default(),
            reject_selection: false,
            channels: ChannelTable::new(),
            registries: Category::ALL.iter().map(|c| Registry::new(*c)).collect(),
        }
    }

    fn slot(category: Category) -> usize {
        Category::ALL
            .iter()
            .position(|c| *c == category)
            .unwrap_or_default()
    }
}

impl Kernel for FakeKernel {
    fn kernel_name(&self) -> &str {
        &self.name
    }

    fn prefixes(&self) -> &Prefixes {
        &self.prefixes
    }

    fn channels(&self) -> &ChannelTable {
        &self.channels
    }

    fn channels_mut(&mut self) -> &mut ChannelTable {
        &mut self.channels
    }

    fn registry(&self, category: Category) -> &Registry {
        &self.registries[Self::slot(category)]
    }

    fn registry_mut(&mut self, category: Category) -> &mut Registry {
        &mut self.registries[Self::slot(category)]
    }

    fn arbitrate(&mut self, candidate: &Candidate<'_>) -> bool {
        if !candidate.category.is_arbitrated() {
            return true;
        }
        !self.reject_selection
            && candidate.wired
            && self.registry_mut(candidate.category).set_active(candidate.id)
    }
}

/// Facet that counts its hook calls and declines enable unless built with
/// [`VetoFacet::accepting`].
#[derive(Debug)]
pub struct VetoFacet {
    name: String,
    accept: bool,
    pub enable_calls: usize,
    pub disable_calls: usize,
}

impl VetoFacet {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            accept: false,
            enable_calls: 0,
            disable_calls: 0,
        }
    }

    pub fn accepting(name: &str) -> Self {
        Self {
            accept: true,
            ..Self::new(name)
        }
    }
}

impl Named for VetoFacet {
    fn name(&self) -> &str {
        &self.name
    }
}

impl<K: ?Sized> Facet<K> for VetoFacet {
    fn enable_facet(&mut self, _kernel: &mut K) -> bool {
        self.enable_calls += 1;
        self.accept
    }

    fn disable_facet(&mut self) {
        self.disable_calls += 1;
    }
}
