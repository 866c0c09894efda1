//! [`ControlKernel`] – the stock [`Kernel`] implementation.
//!
//! Owns the channel table and the six registries, and wraps the component
//! protocol in `Result`-returning configuration calls:
//!
//! ```text
//! prepare   create_data_object
//! load      create_data_object ─▶ create_ports ─▶ enable_facets
//! activate  (create_ports if unwired) ─▶ select ─▶ arbitrate
//! unload    disable_facets
//! ```
//!
//! Estimator and Controller read each other's produced channel, so no load
//! order binds both on its own.  Either `prepare` every producer before the
//! first `load`, or load in any order and let `activate` bind the ports
//! whose channels appeared since.
//!
//! [`StoppedOnly`] is the example of a kernel-specific facet extension: a
//! layer that uses `ControlKernel`'s run state and therefore implements
//! [`FacetLayer`] for this kernel only.

use ctrlk_channel::{ChannelData, ChannelId, ChannelTable, WritePort};
use ctrlk_types::{
    Category, ChannelRole, ComponentId, ComponentState, KernelConfig, KernelError, Prefixes,
};
use tracing::{debug, info, warn};

use crate::component::{Component, bind_writer, create_produced};
use crate::facet::FacetLayer;
use crate::kernel::{Candidate, Kernel};
use crate::registry::Registry;

/// Registries, channels and run state of one control kernel.
#[derive(Debug)]
pub struct ControlKernel {
    name: String,
    prefixes: Prefixes,
    channels: ChannelTable,
    sensors: Registry,
    estimators: Registry,
    generators: Registry,
    controllers: Registry,
    effectors: Registry,
    supports: Registry,
    running: bool,
}

impl ControlKernel {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            prefixes: Prefixes::default(),
            channels: ChannelTable::new(),
            sensors: Registry::new(Category::Sensor),
            estimators: Registry::new(Category::Estimator),
            generators: Registry::new(Category::Generator),
            controllers: Registry::new(Category::Controller),
            effectors: Registry::new(Category::Effector),
            supports: Registry::new(Category::Support),
            running: false,
        }
    }

    pub fn from_config(config: &KernelConfig) -> Self {
        let mut kernel = Self::new(config.name.clone());
        kernel.prefixes = config.prefixes.clone();
        kernel
    }

    /// Set the channel prefix of `role`.  Only affects ports created
    /// afterwards.
    pub fn set_prefix(&mut self, role: ChannelRole, prefix: impl Into<String>) {
        let slot = match role {
            ChannelRole::Inputs => &mut self.prefixes.input,
            ChannelRole::Outputs => &mut self.prefixes.output,
            ChannelRole::Models => &mut self.prefixes.model,
            ChannelRole::SetPoints => &mut self.prefixes.set_point,
            ChannelRole::Commands => &mut self.prefixes.command,
        };
        *slot = prefix.into();
    }

    // ── component lifecycle ─────────────────────────────────────────────

    /// Create the channel of the role `component` produces, without binding
    /// or registering anything.  Idempotent.
    pub fn prepare<C>(&mut self, component: &mut C)
    where
        C: Component<Self>,
    {
        component.create_data_object(self);
        if let Some(role) = C::CATEGORY.produces() {
            debug!(kernel = %self.name, category = %C::CATEGORY, component = component.name(), %role, "channel prepared");
        }
    }

    /// Create the component's channel, bind its ports and enable it.
    ///
    /// A name already registered in the category is reported before anything
    /// is created.  If the facet stack declines, the ports are erased again
    /// and the component is left unregistered; the produced channel stays in
    /// the table, since other producers of the role may already share it.
    pub fn load<C>(&mut self, component: &mut C) -> Result<(), KernelError>
    where
        C: Component<Self>,
    {
        let category = C::CATEGORY;
        let name = component.name().to_string();
        if self.registry(category).find(&name).is_some() {
            warn!(kernel = %self.name, %category, component = %name, "load rejected: name taken");
            return Err(KernelError::RegistrationConflict { category, name });
        }

        component.create_data_object(self);
        component.create_ports(self);
        if !component.enable_facets(self) {
            component.erase_ports();
            return Err(KernelError::FacetEnableFailure { category, name });
        }
        let pending = self.missing_roles(category);
        if pending.is_empty() {
            info!(kernel = %self.name, %category, component = %name, "component loaded");
        } else {
            info!(kernel = %self.name, %category, component = %name, ?pending, "component loaded; ports bind on activate");
        }
        Ok(())
    }

    /// Disable and unregister the component.  Idempotent.
    pub fn unload<C>(&mut self, component: &mut C)
    where
        C: Component<Self>,
    {
        component.disable_facets(self);
        debug!(kernel = %self.name, category = %C::CATEGORY, component = component.name(), "component unloaded");
    }

    /// Make the component the active instance of its category.
    ///
    /// A loaded component whose ports are not all bound is re-bound first,
    /// picking up channels created after it was loaded.
    pub fn activate<C>(&mut self, component: &mut C) -> Result<(), KernelError>
    where
        C: Component<Self>,
    {
        if component.is_facet_enabled() && !component.is_wired() {
            component.create_ports(self);
            debug!(kernel = %self.name, category = %C::CATEGORY, component = component.name(), wired = component.is_wired(), "ports re-bound");
        }
        if component.select(self) {
            return Ok(());
        }
        let missing = self.missing_roles(C::CATEGORY);
        if !missing.is_empty() {
            warn!(kernel = %self.name, category = %C::CATEGORY, component = component.name(), ?missing, "no producer for read roles");
        }
        Err(KernelError::SelectionRejected {
            category: C::CATEGORY,
            name: component.name().to_string(),
        })
    }

    /// Roles `category` reads for which no channel exists yet.
    fn missing_roles(&self, category: Category) -> Vec<ChannelRole> {
        category
            .reads()
            .iter()
            .copied()
            .filter(|&role| {
                let id = ChannelId::new(self.namespace(role), self.prefix(role));
                !self.channels.contains(&id)
            })
            .collect()
    }

    /// A write port onto the `Commands` channel, creating it on first use.
    ///
    /// No category produces commands; they come from outside the pipeline.
    pub fn command_port<T: ChannelData>(&mut self) -> WritePort<T> {
        let mut port = WritePort::new();
        create_produced(&mut port, self, ChannelRole::Commands);
        bind_writer(&mut port, self, ChannelRole::Commands);
        port
    }

    // ── queries ─────────────────────────────────────────────────────────

    pub fn active(&self, category: Category) -> Option<ComponentId> {
        self.registry(category).active()
    }

    pub fn active_name(&self, category: Category) -> Option<&str> {
        self.registry(category).active_name()
    }

    /// Names registered in `category`, sorted.
    pub fn registered(&self, category: Category) -> Vec<&str> {
        self.registry(category).names().collect()
    }

    /// State of `id` as far as the kernel can see it.
    ///
    /// The kernel only observes registration and selection, so the
    /// transient [`ComponentState::Registering`] is never reported here; use
    /// [`Component::state`] for the component's own view.
    pub fn state_of(&self, category: Category, id: ComponentId) -> ComponentState {
        let registry = self.registry(category);
        if !registry.contains(id) {
            ComponentState::Unregistered
        } else if !category.is_arbitrated() || registry.active() == Some(id) {
            ComponentState::Active
        } else {
            ComponentState::EnabledInactive
        }
    }

    // ── run state ───────────────────────────────────────────────────────

    /// Returns `false` if the kernel was already running.
    pub fn start(&mut self) -> bool {
        if self.running {
            return false;
        }
        self.running = true;
        info!(kernel = %self.name, "kernel started");
        true
    }

    /// Returns `false` if the kernel was not running.
    pub fn stop(&mut self) -> bool {
        if !self.running {
            return false;
        }
        self.running = false;
        info!(kernel = %self.name, "kernel stopped");
        true
    }

    pub fn is_running(&self) -> bool {
        self.running
    }
}

impl Kernel for ControlKernel {
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
        match category {
            Category::Sensor => &self.sensors,
            Category::Estimator => &self.estimators,
            Category::Generator => &self.generators,
            Category::Controller => &self.controllers,
            Category::Effector => &self.effectors,
            Category::Support => &self.supports,
        }
    }

    fn registry_mut(&mut self, category: Category) -> &mut Registry {
        match category {
            Category::Sensor => &mut self.sensors,
            Category::Estimator => &mut self.estimators,
            Category::Generator => &mut self.generators,
            Category::Controller => &mut self.controllers,
            Category::Effector => &mut self.effectors,
            Category::Support => &mut self.supports,
        }
    }

    fn arbitrate(&mut self, candidate: &Candidate<'_>) -> bool {
        let category = candidate.category;
        if !category.is_arbitrated() {
            return true;
        }
        if !candidate.wired {
            warn!(kernel = %self.name, %category, component = candidate.name, "selection rejected: ports not bound");
            return false;
        }
        if !self.registry_mut(category).set_active(candidate.id) {
            warn!(kernel = %self.name, %category, component = candidate.name, "selection rejected: not registered");
            return false;
        }
        info!(kernel = %self.name, %category, component = candidate.name, "selected");
        true
    }
}

/// Layer that refuses to enable while the kernel is running, so components
/// can only be brought up between runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct StoppedOnly;

impl FacetLayer<ControlKernel> for StoppedOnly {
    fn enable_layer(&mut self, owner: &str, kernel: &mut ControlKernel) -> bool {
        if kernel.is_running() {
            warn!(kernel = %kernel.name, component = owner, "enable refused while running");
            return false;
        }
        true
    }

    fn disable_layer(&mut self, _owner: &str) {}
}
