//! `ctrlk-runtime` – Cycle Execution
//!
//! Runs what the kernel has wired and selected.
//!
//! # Modules
//!
//! - [`stage`] – [`Stage`][stage::Stage]: the per-cycle body of a component.
//! - [`bank`] – [`Bank`][bank::Bank]: the loaded candidates of one category
//!   and the index of the selected one, resolved at configuration time.
//! - [`control_loop`] – [`ControlLoop`][control_loop::ControlLoop]: five
//!   banks stepped sense → estimate → generate → control → act.
//! - [`activity`] – [`PeriodicActivity`][activity::PeriodicActivity]: runs a
//!   stage at a fixed period with start/stop and fault capture.
//! - [`telemetry`] – [`init_tracing`][telemetry::init_tracing]: installs the
//!   global `tracing` subscriber, with OTLP export when
//!   `OTEL_EXPORTER_OTLP_ENDPOINT` is set.
//!
//! # Hot path
//!
//! Selection is resolved into bank indices before a run starts.  A cycle is
//! then five indexed, monomorphized `update` calls; every port read and
//! write goes straight to an already bound channel cell.

pub mod activity;
pub mod bank;
pub mod control_loop;
pub mod stage;
pub mod telemetry;

pub use activity::PeriodicActivity;
pub use bank::Bank;
pub use control_loop::ControlLoop;
pub use stage::Stage;
pub use telemetry::{TracerProviderGuard, init_tracing};
