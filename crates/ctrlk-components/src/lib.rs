//! `ctrlk-components` – Stock Components
//!
//! Ready-made members for each category, built by wrapping a category value
//! with [`delegate_component!`][ctrlk_kernel::delegate_component] and adding
//! a [`Stage`][ctrlk_runtime::Stage] body.
//!
//! # Modules
//!
//! - [`sim`] – [`SimPlant`][sim::SimPlant], a first-order simulated plant,
//!   with the [`PlantSensor`][sim::PlantSensor] and
//!   [`PlantEffector`][sim::PlantEffector] that measure and drive it.
//! - [`pass_through`] – [`PassThroughEstimator`][pass_through::PassThroughEstimator]:
//!   measurement as model, with optional smoothing.
//! - [`set_point`] – [`SetPointGenerator`][set_point::SetPointGenerator]:
//!   commanded target with an optional rate limit.
//! - [`pid`] – [`PidLaw`][pid::PidLaw] and the
//!   [`PidController`][pid::PidController] running it.
//! - [`bang_bang`] – [`BangBangController`][bang_bang::BangBangController]:
//!   on/off control with hysteresis.
//! - [`stock`] – [`StockController`][stock::StockController]: the stock
//!   controllers as one selectable bank member type.
//! - [`cycle_counter`] – [`CycleCounter`][cycle_counter::CycleCounter]: a
//!   support counting completed cycles.

pub mod bang_bang;
pub mod cycle_counter;
pub mod pass_through;
pub mod pid;
pub mod set_point;
pub mod sim;
pub mod stock;

pub use bang_bang::BangBangController;
pub use cycle_counter::CycleCounter;
pub use pass_through::PassThroughEstimator;
pub use pid::{PidController, PidGains, PidLaw};
pub use set_point::SetPointGenerator;
pub use sim::{PlantConfig, PlantEffector, PlantSensor, SimPlant};
pub use stock::StockController;
