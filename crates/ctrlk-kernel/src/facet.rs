//! Facets – the statically stacked capability every component carries.
//!
//! A facet supplies the component's name and the hooks run when the kernel
//! enables or disables it.  Cross-cutting behaviour is added by wrapping a
//! facet in a [`Layered`] with a [`FacetLayer`]; stacks are plain nested
//! generic types, so every hook call is monomorphized and inlined instead of
//! going through a vtable.
//!
//! Enabling a stack is all or nothing: the base is enabled first, then each
//! layer outwards; if a layer declines, everything already enabled beneath it
//! is disabled again before the failure is reported.  Disabling runs the
//! other way round, outermost layer first.
//!
//! # Example
//!
//! ```
//! use ctrlk_kernel::facet::{Facet, Hooks, Named, NamedFacet, TraceLayer};
//! use ctrlk_kernel::ControlKernel;
//!
//! let mut kernel = ControlKernel::new("arm");
//! let mut facet = NamedFacet::new("pid")
//!     .with(TraceLayer)
//!     .with(Hooks::new(|_name: &str| false, |_name: &str| {}));
//!
//! assert_eq!(facet.name(), "pid");
//! // The outer hook declines, so the whole stack stays disabled.
//! assert!(!facet.enable_facet(&mut kernel));
//! ```

use tracing::{debug, info};

use crate::kernel::Kernel;

/// Naming half of a facet; independent of any kernel.
pub trait Named {
    /// Name the owning component registers under.
    fn name(&self) -> &str;
}

/// The capability every component is layered on.
///
/// `K` is the kernel the facet is enabled against.  Generic facets implement
/// `Facet<K>` for every `K`; a kernel-specific extension implements it only
/// for the kernel whose services it uses.
pub trait Facet<K: ?Sized>: Named {
    /// Run the enable hooks.  Returning `false` vetoes the enable and the
    /// caller rolls back the component's registration.
    fn enable_facet(&mut self, kernel: &mut K) -> bool;

    /// Run the disable hooks.  Infallible.
    fn disable_facet(&mut self);
}

/// Facets that can be built from a name alone.
pub trait FromName {
    fn from_name(name: &str) -> Self;
}

// ────────────────────────────────────────────────────────────────────────────
// NamedFacet
// ────────────────────────────────────────────────────────────────────────────

/// The base of every stack: carries the name and accepts every enable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedFacet {
    name: String,
}

impl NamedFacet {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Stack `layer` on top of this facet.
    pub fn with<L>(self, layer: L) -> Layered<L, Self> {
        Layered::new(layer, self)
    }
}

impl FromName for NamedFacet {
    fn from_name(name: &str) -> Self {
        Self::new(name)
    }
}

impl Named for NamedFacet {
    fn name(&self) -> &str {
        &self.name
    }
}

impl<K: ?Sized> Facet<K> for NamedFacet {
    fn enable_facet(&mut self, _kernel: &mut K) -> bool {
        true
    }

    fn disable_facet(&mut self) {}
}

// ────────────────────────────────────────────────────────────────────────────
// Layers
// ────────────────────────────────────────────────────────────────────────────

/// One level of a facet stack.
///
/// `owner` is the name of the component the stack belongs to.
pub trait FacetLayer<K: ?Sized> {
    fn enable_layer(&mut self, owner: &str, kernel: &mut K) -> bool;
    fn disable_layer(&mut self, owner: &str);
}

/// `layer` stacked on top of `base`.
#[derive(Debug, Clone)]
pub struct Layered<L, B> {
    layer: L,
    base: B,
}

impl<L, B> Layered<L, B> {
    pub fn new(layer: L, base: B) -> Self {
        Self { layer, base }
    }

    /// Stack another layer on top.
    pub fn with<M>(self, layer: M) -> Layered<M, Self> {
        Layered::new(layer, self)
    }

    pub fn layer(&self) -> &L {
        &self.layer
    }

    pub fn layer_mut(&mut self) -> &mut L {
        &mut self.layer
    }

    pub fn base(&self) -> &B {
        &self.base
    }
}

impl<L: Default, B: FromName> FromName for Layered<L, B> {
    fn from_name(name: &str) -> Self {
        Self::new(L::default(), B::from_name(name))
    }
}

impl<L, B: Named> Named for Layered<L, B> {
    fn name(&self) -> &str {
        self.base.name()
    }
}

impl<K, L, B> Facet<K> for Layered<L, B>
where
    K: ?Sized,
    L: FacetLayer<K>,
    B: Facet<K>,
{
    fn enable_facet(&mut self, kernel: &mut K) -> bool {
        if !self.base.enable_facet(kernel) {
            return false;
        }
        if self.layer.enable_layer(self.base.name(), kernel) {
            return true;
        }
        self.base.disable_facet();
        false
    }

    fn disable_facet(&mut self) {
        self.layer.disable_layer(self.base.name());
        self.base.disable_facet();
    }
}

/// Layer that logs enable and disable with the owning kernel's name.
#[derive(Debug, Clone, Copy, Default)]
pub struct TraceLayer;

impl<K: Kernel + ?Sized> FacetLayer<K> for TraceLayer {
    fn enable_layer(&mut self, owner: &str, kernel: &mut K) -> bool {
        info!(kernel = kernel.kernel_name(), component = owner, "facet enabled");
        true
    }

    fn disable_layer(&mut self, owner: &str) {
        info!(component = owner, "facet disabled");
    }
}

/// Layer running user callbacks.  The enable callback may veto.
pub struct Hooks<U, D> {
    on_enable: U,
    on_disable: D,
}

impl<U, D> Hooks<U, D>
where
    U: FnMut(&str) -> bool,
    D: FnMut(&str),
{
    pub fn new(on_enable: U, on_disable: D) -> Self {
        Self {
            on_enable,
            on_disable,
        }
    }
}

impl<K, U, D> FacetLayer<K> for Hooks<U, D>
where
    K: ?Sized,
    U: FnMut(&str) -> bool,
    D: FnMut(&str),
{
    fn enable_layer(&mut self, owner: &str, _kernel: &mut K) -> bool {
        let ok = (self.on_enable)(owner);
        if !ok {
            debug!(component = owner, "enable hook declined");
        }
        ok
    }

    fn disable_layer(&mut self, owner: &str) {
        (self.on_disable)(owner);
    }
}
