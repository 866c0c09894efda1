//! [`Component`] – the lifecycle every category variant shares.
//!
//! The six category types differ only in which ports they own and which
//! registry they join.  The registration protocol itself lives here, in
//! [`ComponentBase`], so it is written once:
//!
//! ```text
//! enable_facets:   register ─▶ facet.enable ─▶ ok
//!                      │              │
//!                      ▼              ▼ (declined)
//!                    false      unregister ─▶ false
//!
//! disable_facets:  facet.disable ─▶ unregister ─▶ erase ports
//! ```
//!
//! Enabling is atomic from the outside: afterwards the component is either
//! registered with its facet enabled, or not registered at all.  Disabling
//! always ends in [`ComponentState::Unregistered`] with no ports bound, and
//! repeating it is a no-op.

use ctrlk_channel::{ChannelData, ReadPort, WritePort};
use ctrlk_types::{Category, ChannelRole, ComponentId, ComponentState};
use tracing::{debug, warn};

use crate::facet::{Facet, Named};
use crate::kernel::{Candidate, Kernel};

/// Lifecycle operations of a component against kernel `K`.
pub trait Component<K: Kernel + ?Sized> {
    /// The category this component belongs to.
    const CATEGORY: Category;

    fn id(&self) -> ComponentId;

    fn name(&self) -> &str;

    fn is_facet_enabled(&self) -> bool;

    /// Every port this category owns is bound.
    fn is_wired(&self) -> bool;

    /// At least one port is bound.
    fn has_bound_ports(&self) -> bool;

    /// Register with the kernel and enable the facet stack, rolling the
    /// registration back if the facet declines.
    fn enable_facets(&mut self, kernel: &mut K) -> bool;

    /// Disable the facet stack, unregister and erase every port.
    fn disable_facets(&mut self, kernel: &mut K);

    /// Create the channel of the role this category produces.
    fn create_data_object(&mut self, kernel: &mut K);

    /// Bind every port to its channel.
    fn create_ports(&mut self, kernel: &K);

    /// Unbind every port.
    fn erase_ports(&mut self);

    /// Ask the kernel to make this component the active one.
    fn select(&self, kernel: &mut K) -> bool;

    fn candidate(&self) -> Candidate<'_> {
        Candidate {
            id: self.id(),
            name: self.name(),
            category: Self::CATEGORY,
            wired: self.is_wired(),
        }
    }

    fn state(&self, kernel: &K) -> ComponentState {
        let registry = kernel.registry(Self::CATEGORY);
        if !registry.contains(self.id()) {
            ComponentState::Unregistered
        } else if !self.is_facet_enabled() {
            ComponentState::Registering
        } else if !Self::CATEGORY.is_arbitrated() || registry.active() == Some(self.id()) {
            ComponentState::Active
        } else {
            ComponentState::EnabledInactive
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Write capability
// ────────────────────────────────────────────────────────────────────────────

/// Data type of a category that produces nothing.
///
/// Uninhabited: no value of it exists, so a `WritePort<NoOutput>` could
/// never carry data even if one were handed out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoOutput {}

/// Access to the port of the role a category produces.
pub trait Producer {
    /// The produced data type, [`NoOutput`] for Effector and Support.
    type Output;

    /// The produced write port, or `None` when the category has no write
    /// capability.
    fn write_port(&self) -> Option<&WritePort<Self::Output>>;
}

// ────────────────────────────────────────────────────────────────────────────
// ComponentBase
// ────────────────────────────────────────────────────────────────────────────

/// Identity and facet shared by every category type.
#[derive(Debug)]
pub struct ComponentBase<F> {
    id: ComponentId,
    facet: F,
    facet_enabled: bool,
}

impl<F: Named> ComponentBase<F> {
    pub fn new(facet: F) -> Self {
        Self {
            id: ComponentId::next(),
            facet,
            facet_enabled: false,
        }
    }

    pub fn id(&self) -> ComponentId {
        self.id
    }

    pub fn name(&self) -> &str {
        self.facet.name()
    }

    pub fn facet(&self) -> &F {
        &self.facet
    }

    pub fn facet_mut(&mut self) -> &mut F {
        &mut self.facet
    }

    pub fn is_facet_enabled(&self) -> bool {
        self.facet_enabled
    }

    /// The enable protocol against `category`'s registry.
    pub fn enable_in<K>(&mut self, category: Category, kernel: &mut K) -> bool
    where
        K: Kernel + ?Sized,
        F: Facet<K>,
    {
        if self.facet_enabled {
            debug!(%category, component = self.facet.name(), "already enabled");
            return kernel.registry(category).contains(self.id);
        }
        if !kernel
            .registry_mut(category)
            .register_object(self.id, self.facet.name())
        {
            warn!(%category, component = self.facet.name(), "name already registered");
            return false;
        }
        if self.facet.enable_facet(kernel) {
            self.facet_enabled = true;
            debug!(%category, component = self.facet.name(), "enabled");
            return true;
        }
        kernel.registry_mut(category).unregister_object(self.id);
        warn!(%category, component = self.facet.name(), "facet declined enable; registration rolled back");
        false
    }

    /// The disable protocol against `category`'s registry.
    pub fn disable_in<K>(&mut self, category: Category, kernel: &mut K)
    where
        K: Kernel + ?Sized,
        F: Facet<K>,
    {
        if self.facet_enabled {
            self.facet.disable_facet();
            self.facet_enabled = false;
        }
        kernel.registry_mut(category).unregister_object(self.id);
        debug!(%category, component = self.facet.name(), "disabled");
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Port plumbing
// ────────────────────────────────────────────────────────────────────────────

/// Bind `port` to the `role` channel of `kernel`.
pub fn bind_reader<T, K>(port: &mut ReadPort<T>, kernel: &K, role: ChannelRole)
where
    T: ChannelData,
    K: Kernel + ?Sized,
{
    port.create_port(kernel.channels(), &kernel.namespace(role), kernel.prefix(role));
}

/// Bind the producer's `port` to the `role` channel of `kernel`.
pub fn bind_writer<T, K>(port: &mut WritePort<T>, kernel: &K, role: ChannelRole)
where
    T: ChannelData,
    K: Kernel + ?Sized,
{
    port.create_port(kernel.channels(), &kernel.namespace(role), kernel.prefix(role));
}

/// Create the `role` channel `port` will produce into.
pub fn create_produced<T, K>(port: &mut WritePort<T>, kernel: &mut K, role: ChannelRole)
where
    T: ChannelData,
    K: Kernel + ?Sized,
{
    let namespace = kernel.namespace(role);
    let prefix = kernel.prefix(role).to_owned();
    port.create_data_object(kernel.channels_mut(), &namespace, &prefix, role);
}

// ────────────────────────────────────────────────────────────────────────────
// Wrappers
// ────────────────────────────────────────────────────────────────────────────

/// Implement [`Component`] for a wrapper type by forwarding every operation
/// to one of its fields.
///
/// Components carrying their own state (a control law, a plant handle) hold
/// a category value and delegate the lifecycle to it:
///
/// ```
/// use ctrlk_kernel::{Component, ControlKernel, Sensor, delegate_component};
///
/// struct Encoder {
///     sensor: Sensor<f64>,
///     ticks: u64,
/// }
///
/// delegate_component!(Encoder => sensor: Sensor<f64>);
///
/// let mut kernel = ControlKernel::new("arm");
/// let mut enc = Encoder { sensor: Sensor::new("enc"), ticks: 0 };
/// kernel.load(&mut enc).unwrap();
/// assert_eq!(Component::<ControlKernel>::name(&enc), "enc");
/// ```
#[macro_export]
macro_rules! delegate_component {
    ($outer:ty => $field:ident : $inner:ty) => {
        impl<K> $crate::Component<K> for $outer
        where
            K: $crate::Kernel + ?Sized,
            $inner: $crate::Component<K>,
        {
            const CATEGORY: $crate::__types::Category =
                <$inner as $crate::Component<K>>::CATEGORY;

            fn id(&self) -> $crate::__types::ComponentId {
                $crate::Component::<K>::id(&self.$field)
            }

            fn name(&self) -> &str {
                $crate::Component::<K>::name(&self.$field)
            }

            fn is_facet_enabled(&self) -> bool {
                $crate::Component::<K>::is_facet_enabled(&self.$field)
            }

            fn is_wired(&self) -> bool {
                $crate::Component::<K>::is_wired(&self.$field)
            }

            fn has_bound_ports(&self) -> bool {
                $crate::Component::<K>::has_bound_ports(&self.$field)
            }

            fn enable_facets(&mut self, kernel: &mut K) -> bool {
                $crate::Component::<K>::enable_facets(&mut self.$field, kernel)
            }

            fn disable_facets(&mut self, kernel: &mut K) {
                $crate::Component::<K>::disable_facets(&mut self.$field, kernel)
            }

            fn create_data_object(&mut self, kernel: &mut K) {
                $crate::Component::<K>::create_data_object(&mut self.$field, kernel)
            }

            fn create_ports(&mut self, kernel: &K) {
                $crate::Component::<K>::create_ports(&mut self.$field, kernel)
            }

            fn erase_ports(&mut self) {
                $crate::Component::<K>::erase_ports(&mut self.$field)
            }

            fn select(&self, kernel: &mut K) -> bool {
                $crate::Component::<K>::select(&self.$field, kernel)
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facet::NamedFacet;
    use crate::testing::{FakeKernel, VetoFacet};

    #[test]
    fn enable_registers_and_enables_facet() {
        let mut k = FakeKernel::new("K");
        let mut base = ComponentBase::new(NamedFacet::new("enc"));
        assert!(base.enable_in(Category::Sensor, &mut k));
        assert!(base.is_facet_enabled());
        assert_eq!(k.registry(Category::Sensor).find("enc"), Some(base.id()));
    }

    #[test]
    fn facet_veto_rolls_back_registration() {
        let mut k = FakeKernel::new("K");
        let mut base = ComponentBase::new(VetoFacet::new("enc"));
        assert!(!base.enable_in(Category::Sensor, &mut k));
        assert!(!base.is_facet_enabled());
        assert!(k.registry(Category::Sensor).is_empty());
    }

    #[test]
    fn conflict_does_not_touch_facet() {
        let mut k = FakeKernel::new("K");
        let mut first = ComponentBase::new(NamedFacet::new("enc"));
        let mut second = ComponentBase::new(VetoFacet::new("enc"));
        assert!(first.enable_in(Category::Sensor, &mut k));
        assert!(!second.enable_in(Category::Sensor, &mut k));
        assert_eq!(second.facet().enable_calls, 0);
        assert_eq!(k.registry(Category::Sensor).find("enc"), Some(first.id()));
    }

    #[test]
    fn disable_twice_is_a_noop_the_second_time() {
        let mut k = FakeKernel::new("K");
        let mut base = ComponentBase::new(VetoFacet::accepting("enc"));
        assert!(base.enable_in(Category::Sensor, &mut k));
        base.disable_in(Category::Sensor, &mut k);
        base.disable_in(Category::Sensor, &mut k);
        assert_eq!(base.facet().disable_calls, 1);
        assert!(k.registry(Category::Sensor).is_empty());
    }

    struct Tagged {
        inner: crate::Sensor<u32>,
    }

    crate::delegate_component!(Tagged => inner: crate::Sensor<u32>);

    #[test]
    fn delegated_component_follows_inner_lifecycle() {
        let mut k = FakeKernel::new("K");
        let mut t = Tagged {
            inner: crate::Sensor::new("tag"),
        };
        t.create_data_object(&mut k);
        t.create_ports(&k);
        assert!(t.enable_facets(&mut k));
        assert_eq!(<Tagged as Component<FakeKernel>>::CATEGORY, Category::Sensor);
        assert_eq!(t.state(&k), ComponentState::EnabledInactive);
        assert!(t.select(&mut k));
        assert_eq!(t.state(&k), ComponentState::Active);

        t.disable_facets(&mut k);
        assert!(!Component::<FakeKernel>::has_bound_ports(&t));
        assert!(t.inner.input().target().is_none());
    }
}
