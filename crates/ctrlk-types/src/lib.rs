//! `ctrlk-types` – shared vocabulary of the control kernel.
//!
//! Everything that more than one crate needs to agree on lives here: the six
//! component [`Category`] kinds, the [`ChannelRole`] lanes they exchange data
//! through, component identity and lifecycle state, the kernel naming
//! configuration and the workspace-wide [`KernelError`].

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ────────────────────────────────────────────────────────────────────────────
// Categories and roles
// ────────────────────────────────────────────────────────────────────────────

/// The fixed pipeline position a component occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Sensor,
    Estimator,
    Generator,
    Controller,
    Effector,
    /// Runs beside the loop; has no ports and is never arbitrated.
    Support,
}

impl Category {
    /// Every category, in pipeline order, with `Support` last.
    pub const ALL: [Category; 6] = [
        Category::Sensor,
        Category::Estimator,
        Category::Generator,
        Category::Controller,
        Category::Effector,
        Category::Support,
    ];

    /// The channel role this category produces, if any.
    pub fn produces(self) -> Option<ChannelRole> {
        match self {
            Category::Sensor => Some(ChannelRole::Inputs),
            Category::Estimator => Some(ChannelRole::Models),
            Category::Generator => Some(ChannelRole::SetPoints),
            Category::Controller => Some(ChannelRole::Outputs),
            Category::Effector | Category::Support => None,
        }
    }

    /// The channel roles this category reads.
    pub fn reads(self) -> &'static [ChannelRole] {
        match self {
            Category::Sensor | Category::Support => &[],
            Category::Estimator => &[ChannelRole::Inputs, ChannelRole::Outputs],
            Category::Generator => &[
                ChannelRole::Commands,
                ChannelRole::Inputs,
                ChannelRole::Models,
            ],
            Category::Controller => &[
                ChannelRole::SetPoints,
                ChannelRole::Inputs,
                ChannelRole::Models,
            ],
            Category::Effector => &[
                ChannelRole::Inputs,
                ChannelRole::Models,
                ChannelRole::Outputs,
            ],
        }
    }

    /// Whether the kernel arbitrates a single active instance for this category.
    pub fn is_arbitrated(self) -> bool {
        !matches!(self, Category::Support)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Category::Sensor => "sensor",
            Category::Estimator => "estimator",
            Category::Generator => "generator",
            Category::Controller => "controller",
            Category::Effector => "effector",
            Category::Support => "support",
        };
        f.write_str(s)
    }
}

/// A data lane of the pipeline. Each role maps to one kernel namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChannelRole {
    Inputs,
    Models,
    SetPoints,
    Outputs,
    /// Written from outside the pipeline (operator, script, supervisor).
    Commands,
}

impl ChannelRole {
    /// Namespace suffix appended to the kernel name, e.g. `"Outputs"` in
    /// `"Kernel::Outputs"`.
    pub fn namespace(self) -> &'static str {
        match self {
            ChannelRole::Inputs => "Inputs",
            ChannelRole::Models => "Models",
            ChannelRole::SetPoints => "SetPoints",
            ChannelRole::Outputs => "Outputs",
            ChannelRole::Commands => "Commands",
        }
    }
}

impl fmt::Display for ChannelRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.namespace())
    }
}

/// Direction of a port relative to its channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortMode {
    Read,
    Write,
}

// ────────────────────────────────────────────────────────────────────────────
// Component identity and state
// ────────────────────────────────────────────────────────────────────────────

static NEXT_COMPONENT_ID: AtomicU64 = AtomicU64::new(1);

/// Opaque identity of a component instance, stable for its whole lifetime.
///
/// Registries store ids rather than references so that a component stays
/// exclusively owned by whoever assembled the topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId(u64);

impl ComponentId {
    /// Allocate a fresh, never reused id.
    pub fn next() -> Self {
        Self(NEXT_COMPONENT_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Lifecycle state of a component as seen by its kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentState {
    /// Not present in any registry; no ports bound.
    Unregistered,
    /// Registered but the facet stack has not finished enabling.
    Registering,
    /// Registered and facet-enabled, but not the selected instance.
    EnabledInactive,
    /// The selected instance of its category.
    Active,
}

impl fmt::Display for ComponentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComponentState::Unregistered => write!(f, "Unregistered"),
            ComponentState::Registering => write!(f, "Registering"),
            ComponentState::EnabledInactive => write!(f, "EnabledInactive"),
            ComponentState::Active => write!(f, "Active"),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Kernel configuration
// ────────────────────────────────────────────────────────────────────────────

/// Per-role channel prefixes handed out by a kernel.
///
/// A prefix qualifies the channel inside its role namespace. With an empty
/// prefix the channel is addressed by the namespace alone
/// (`"Kernel::Outputs"`); with prefix `"arm"` it becomes
/// `"Kernel::Outputs::arm"`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Prefixes {
    pub input: String,
    pub output: String,
    pub model: String,
    pub set_point: String,
    pub command: String,
}

/// Naming configuration of one kernel instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KernelConfig {
    #[serde(default = "default_kernel_name")]
    pub name: String,
    #[serde(default)]
    pub prefixes: Prefixes,
}

fn default_kernel_name() -> String {
    "Kernel".to_string()
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            name: default_kernel_name(),
            prefixes: Prefixes::default(),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Errors
// ────────────────────────────────────────────────────────────────────────────

/// Error type shared by the kernel, the channel table and the runtime.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KernelError {
    #[error("Registration conflict: {category} '{name}' is already registered")]
    RegistrationConflict { category: Category, name: String },

    #[error("Facet enable failed for {category} '{name}'")]
    FacetEnableFailure { category: Category, name: String },

    #[error("Selection rejected for {category} '{name}'")]
    SelectionRejected { category: Category, name: String },

    #[error("Channel not found: {0}")]
    ChannelNotFound(String),

    #[error("Activity is not running")]
    NotRunning,

    #[error("Configuration error: {0}")]
    Config(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn producing_categories_match_pipeline_roles() {
        assert_eq!(Category::Sensor.produces(), Some(ChannelRole::Inputs));
        assert_eq!(Category::Estimator.produces(), Some(ChannelRole::Models));
        assert_eq!(Category::Generator.produces(), Some(ChannelRole::SetPoints));
        assert_eq!(Category::Controller.produces(), Some(ChannelRole::Outputs));
        assert_eq!(Category::Effector.produces(), None);
        assert_eq!(Category::Support.produces(), None);
    }

    #[test]
    fn no_category_reads_what_it_produces() {
        for cat in Category::ALL {
            if let Some(role) = cat.produces() {
                assert!(!cat.reads().contains(&role), "{cat} reads its own role");
            }
        }
    }

    #[test]
    fn support_is_not_arbitrated() {
        assert!(!Category::Support.is_arbitrated());
        assert!(Category::Controller.is_arbitrated());
    }

    #[test]
    fn component_ids_are_unique() {
        let a = ComponentId::next();
        let b = ComponentId::next();
        assert_ne!(a, b);
        assert!(b.get() > a.get());
    }

    #[test]
    fn kernel_config_defaults_from_empty_toml() {
        let cfg: KernelConfig = toml::from_str("").unwrap();
        assert_eq!(cfg, KernelConfig::default());
        assert_eq!(cfg.name, "Kernel");
    }

    #[test]
    fn kernel_config_partial_prefixes() {
        let raw = "name = \"arm\"\n[prefixes]\nset_point = \"joint\"\n";
        let cfg: KernelConfig = toml::from_str(raw).unwrap();
        assert_eq!(cfg.name, "arm");
        assert_eq!(cfg.prefixes.set_point, "joint");
        assert!(cfg.prefixes.input.is_empty());
    }

    #[test]
    fn category_serializes_lowercase() {
        let json = serde_json::to_string(&Category::Controller).unwrap();
        assert_eq!(json, "\"controller\"");
        let back: Category = serde_json::from_str("\"effector\"").unwrap();
        assert_eq!(back, Category::Effector);
    }

    #[test]
    fn kernel_error_display() {
        let err = KernelError::RegistrationConflict {
            category: Category::Sensor,
            name: "encoder".into(),
        };
        assert!(err.to_string().contains("encoder"));
        assert!(err.to_string().contains("sensor"));
        assert!(
            KernelError::ChannelNotFound("K::Outputs".into())
                .to_string()
                .contains("K::Outputs")
        );
    }
}
