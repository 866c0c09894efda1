//! [`Bank`] – the competing implementations of one category.
//!
//! A bank owns every loaded candidate of a category and the index of the one
//! the kernel selected.  The index is resolved by [`Bank::sync`] during
//! configuration; [`Bank::update`] then runs the active member with a plain
//! indexed call.
//!
//! Members share one type.  Candidates of different types are expressed as
//! an enum implementing both [`Component`] and [`Stage`].

use ctrlk_kernel::{Component, ControlKernel, Kernel};
use ctrlk_types::{Category, KernelError};
use tracing::debug;

use crate::stage::Stage;

pub struct Bank<T> {
    members: Vec<T>,
    active: Option<usize>,
}

impl<T> Default for Bank<T> {
    fn default() -> Self {
        Self {
            members: Vec::new(),
            active: None,
        }
    }
}

impl<T> Bank<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn members(&self) -> &[T] {
        &self.members
    }

    pub fn members_mut(&mut self) -> &mut [T] {
        &mut self.members
    }

    /// Index of the member that runs each cycle.
    pub fn active_index(&self) -> Option<usize> {
        self.active
    }

    pub fn active(&self) -> Option<&T> {
        self.active.and_then(|i| self.members.get(i))
    }

    pub fn active_mut(&mut self) -> Option<&mut T> {
        self.active.and_then(|i| self.members.get_mut(i))
    }
}

impl<T: Component<ControlKernel>> Bank<T> {
    pub fn category(&self) -> Category {
        <T as Component<ControlKernel>>::CATEGORY
    }

    /// Load `member` into `kernel` and keep it.  Returns its index.
    pub fn load(
        &mut self,
        kernel: &mut ControlKernel,
        mut member: T,
    ) -> Result<usize, KernelError> {
        kernel.load(&mut member)?;
        self.members.push(member);
        Ok(self.members.len() - 1)
    }

    /// Ask `kernel` to activate the member registered as `name`, then sync.
    pub fn select(&mut self, kernel: &mut ControlKernel, name: &str) -> Result<(), KernelError> {
        let category = self.category();
        let member = self
            .members
            .iter_mut()
            .find(|m| m.name() == name)
            .ok_or_else(|| KernelError::SelectionRejected {
                category,
                name: name.to_string(),
            })?;
        kernel.activate(member)?;
        self.sync(kernel);
        Ok(())
    }

    /// Resolve the active index from the kernel's registry.
    pub fn sync(&mut self, kernel: &ControlKernel) {
        let active = kernel.registry(self.category()).active();
        self.active = active.and_then(|id| self.members.iter().position(|m| m.id() == id));
        debug!(category = %self.category(), active = ?self.active, "bank synced");
    }

    /// Unload every member, last loaded first.
    pub fn unload_all(&mut self, kernel: &mut ControlKernel) {
        for member in self.members.iter_mut().rev() {
            kernel.unload(member);
        }
        self.active = None;
    }
}

impl<T: Stage> Bank<T> {
    /// Run the active member.  Returns `false` when no member is active.
    pub fn update(&mut self) -> Result<bool, KernelError> {
        match self.active.and_then(|i| self.members.get_mut(i)) {
            Some(member) => member.update().map(|()| true),
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ctrlk_kernel::{Sensor, delegate_component};

    struct Counter {
        sensor: Sensor<u64>,
        runs: u64,
    }

    delegate_component!(Counter => sensor: Sensor<u64>);

    impl Counter {
        fn new(name: &str) -> Self {
            Self {
                sensor: Sensor::new(name),
                runs: 0,
            }
        }
    }

    impl Stage for Counter {
        fn update(&mut self) -> Result<(), KernelError> {
            self.runs += 1;
            self.sensor.input().write(&self.runs)
        }
    }

    #[test]
    fn update_without_selection_is_skipped() {
        let mut kernel = ControlKernel::new("K");
        let mut bank = Bank::new();
        bank.load(&mut kernel, Counter::new("a")).unwrap();
        assert_eq!(bank.update(), Ok(false));
        assert_eq!(bank.members()[0].runs, 0);
    }

    #[test]
    fn only_the_selected_member_runs() {
        let mut kernel = ControlKernel::new("K");
        let mut bank = Bank::new();
        bank.load(&mut kernel, Counter::new("a")).unwrap();
        bank.load(&mut kernel, Counter::new("b")).unwrap();

        bank.select(&mut kernel, "b").unwrap();
        assert_eq!(bank.active_index(), Some(1));
        assert_eq!(bank.update(), Ok(true));
        assert_eq!(bank.members()[0].runs, 0);
        assert_eq!(bank.members()[1].runs, 1);

        bank.select(&mut kernel, "a").unwrap();
        bank.update().unwrap();
        assert_eq!(bank.members()[0].runs, 1);
        assert_eq!(kernel.active_name(Category::Sensor), Some("a"));
    }

    #[test]
    fn selecting_an_unknown_name_is_rejected() {
        let mut kernel = ControlKernel::new("K");
        let mut bank: Bank<Counter> = Bank::new();
        assert!(matches!(
            bank.select(&mut kernel, "ghost"),
            Err(KernelError::SelectionRejected { .. })
        ));
    }

    #[test]
    fn duplicate_load_leaves_bank_unchanged() {
        let mut kernel = ControlKernel::new("K");
        let mut bank = Bank::new();
        bank.load(&mut kernel, Counter::new("a")).unwrap();
        assert!(bank.load(&mut kernel, Counter::new("a")).is_err());
        assert_eq!(bank.len(), 1);
    }

    #[test]
    fn unload_all_clears_registry_and_selection() {
        let mut kernel = ControlKernel::new("K");
        let mut bank = Bank::new();
        bank.load(&mut kernel, Counter::new("a")).unwrap();
        bank.select(&mut kernel, "a").unwrap();
        bank.unload_all(&mut kernel);
        assert!(bank.active().is_none());
        assert!(kernel.registered(Category::Sensor).is_empty());
        assert_eq!(bank.update(), Ok(false));
    }
}
