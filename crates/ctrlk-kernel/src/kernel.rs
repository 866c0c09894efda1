//! The [`Kernel`] trait – what a component needs from the kernel it joins.
//!
//! Components never reach into a concrete kernel type.  They are enabled,
//! wired and selected against anything implementing [`Kernel`]: the six
//! per-category [`Registry`]s, the [`ChannelTable`], the naming accessors and
//! the arbitration hook.  [`ControlKernel`][crate::ControlKernel] is the
//! stock implementation; tests substitute lightweight fakes.
//!
//! All of it is configuration-time surface.  The kernel is passed by `&mut`,
//! which serializes registration, selection and enabling against each other
//! and against the control cycle.

use ctrlk_channel::ChannelTable;
use ctrlk_types::{Category, ChannelRole, ComponentId, Prefixes};

use crate::registry::Registry;

/// What a kernel is told about a component asking to become active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate<'a> {
    pub id: ComponentId,
    pub name: &'a str,
    pub category: Category,
    /// Every port of the component is bound to its channel.
    pub wired: bool,
}

/// Registries, channel table, naming conventions and arbitration of one
/// kernel instance.
pub trait Kernel {
    fn kernel_name(&self) -> &str;

    fn prefixes(&self) -> &Prefixes;

    fn channels(&self) -> &ChannelTable;

    fn channels_mut(&mut self) -> &mut ChannelTable;

    fn registry(&self, category: Category) -> &Registry;

    fn registry_mut(&mut self, category: Category) -> &mut Registry;

    /// Decide whether `candidate` becomes the active instance of its
    /// category and, if so, record it in the registry.
    ///
    /// The default policy accepts a registered, fully wired candidate.
    /// Unarbitrated categories (`Support`) always succeed.
    fn arbitrate(&mut self, candidate: &Candidate<'_>) -> bool {
        if !candidate.category.is_arbitrated() {
            return true;
        }
        if !candidate.wired {
            return false;
        }
        self.registry_mut(candidate.category).set_active(candidate.id)
    }

    // ── naming ──────────────────────────────────────────────────────────

    fn input_prefix(&self) -> &str {
        &self.prefixes().input
    }

    fn output_prefix(&self) -> &str {
        &self.prefixes().output
    }

    fn model_prefix(&self) -> &str {
        &self.prefixes().model
    }

    fn set_point_prefix(&self) -> &str {
        &self.prefixes().set_point
    }

    fn command_prefix(&self) -> &str {
        &self.prefixes().command
    }

    /// Prefix of `role`, through the per-role accessors above.
    fn prefix(&self, role: ChannelRole) -> &str {
        match role {
            ChannelRole::Inputs => self.input_prefix(),
            ChannelRole::Outputs => self.output_prefix(),
            ChannelRole::Models => self.model_prefix(),
            ChannelRole::SetPoints => self.set_point_prefix(),
            ChannelRole::Commands => self.command_prefix(),
        }
    }

    /// `"<kernel name>::<role namespace>"`, e.g. `"Kernel::Outputs"`.
    fn namespace(&self, role: ChannelRole) -> String {
        format!("{}::{}", self.kernel_name(), role.namespace())
    }

    // ── registries ──────────────────────────────────────────────────────

    fn sensors(&mut self) -> &mut Registry {
        self.registry_mut(Category::Sensor)
    }

    fn estimators(&mut self) -> &mut Registry {
        self.registry_mut(Category::Estimator)
    }

    fn generators(&mut self) -> &mut Registry {
        self.registry_mut(Category::Generator)
    }

    fn controllers(&mut self) -> &mut Registry {
        self.registry_mut(Category::Controller)
    }

    fn effectors(&mut self) -> &mut Registry {
        self.registry_mut(Category::Effector)
    }

    fn supports(&mut self) -> &mut Registry {
        self.registry_mut(Category::Support)
    }

    // ── selection ───────────────────────────────────────────────────────

    fn select_sensor(&mut self, candidate: &Candidate<'_>) -> bool {
        candidate.category == Category::Sensor && self.arbitrate(candidate)
    }

    fn select_estimator(&mut self, candidate: &Candidate<'_>) -> bool {
        candidate.category == Category::Estimator && self.arbitrate(candidate)
    }

    fn select_generator(&mut self, candidate: &Candidate<'_>) -> bool {
        candidate.category == Category::Generator && self.arbitrate(candidate)
    }

    fn select_controller(&mut self, candidate: &Candidate<'_>) -> bool {
        candidate.category == Category::Controller && self.arbitrate(candidate)
    }

    fn select_effector(&mut self, candidate: &Candidate<'_>) -> bool {
        candidate.category == Category::Effector && self.arbitrate(candidate)
    }
}
