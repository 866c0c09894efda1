//! [`Stage`] – the per-cycle body of a component.
//!
//! The kernel crate describes how components are wired and selected; a
//! `Stage` is what actually runs once those decisions are made.  Bodies read
//! their ports with `read_into`, compute, and `write` the result.  They must
//! not allocate or look channels up by name.

use ctrlk_types::KernelError;

pub trait Stage {
    /// Run one cycle.
    fn update(&mut self) -> Result<(), KernelError>;
}
