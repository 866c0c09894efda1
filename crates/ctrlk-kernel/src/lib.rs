//! `ctrlk-kernel` – Component Framework
//!
//! The statically composed core of a control kernel: six component
//! categories with fixed port topologies, the registration and selection
//! protocol they follow against their kernel, and the facet stacks that
//! carry their cross-cutting behaviour.
//!
//! # Modules
//!
//! - [`facet`] – [`Facet`][facet::Facet], [`NamedFacet`][facet::NamedFacet]
//!   and [`Layered`][facet::Layered]: the statically stacked capability every
//!   component carries, enabled base-first with rollback.
//! - [`registry`] – [`Registry`][registry::Registry]: per-category name table
//!   with a single active slot.
//! - [`kernel`] – the [`Kernel`][kernel::Kernel] trait components are enabled
//!   and selected against.
//! - [`component`] – the [`Component`][component::Component] lifecycle and the
//!   [`ComponentBase`][component::ComponentBase] implementing it once.
//! - [`sensor`], [`estimator`], [`generator`], [`controller`], [`effector`],
//!   [`support`] – the category types.
//! - [`control_kernel`] – [`ControlKernel`][control_kernel::ControlKernel],
//!   the stock kernel.
//!
//! # Pipeline
//!
//! ```text
//!            Commands
//!               │
//! Sensor ─Inputs─▶ Estimator ─Models─▶ Generator ─SetPoints─▶ Controller ─Outputs─▶ Effector
//!                     ▲                                          │
//!                     └──────────────── Outputs ─────────────────┘
//! ```

pub mod component;
pub mod control_kernel;
pub mod controller;
pub mod effector;
pub mod estimator;
pub mod facet;
pub mod generator;
pub mod kernel;
pub mod registry;
pub mod sensor;
pub mod support;

#[cfg(test)]
mod testing;

#[doc(hidden)]
pub use ctrlk_types as __types;

pub use component::{Component, ComponentBase, NoOutput, Producer};
pub use control_kernel::{ControlKernel, StoppedOnly};
pub use controller::Controller;
pub use effector::Effector;
pub use estimator::Estimator;
pub use facet::{Facet, FacetLayer, FromName, Hooks, Layered, Named, NamedFacet, TraceLayer};
pub use generator::Generator;
pub use kernel::{Candidate, Kernel};
pub use registry::Registry;
pub use sensor::Sensor;
pub use support::Support;
