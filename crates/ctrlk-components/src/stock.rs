//! [`StockController`] – the stock controllers as one bank member type.
//!
//! A [`Bank`][ctrlk_runtime::Bank] holds members of a single type.  To let
//! controllers of different types compete for selection, they are wrapped in
//! this enum, which forwards the component lifecycle and the cycle body to
//! the variant.  Dispatch is a `match`, not a vtable.

use ctrlk_kernel::{Component, Kernel};
use ctrlk_runtime::Stage;
use ctrlk_types::{Category, ComponentId, KernelError};

use crate::bang_bang::BangBangController;
use crate::pid::PidController;

pub enum StockController {
    Pid(PidController),
    BangBang(BangBangController),
}

impl From<PidController> for StockController {
    fn from(c: PidController) -> Self {
        StockController::Pid(c)
    }
}

impl From<BangBangController> for StockController {
    fn from(c: BangBangController) -> Self {
        StockController::BangBang(c)
    }
}

impl<K: Kernel + ?Sized> Component<K> for StockController {
    const CATEGORY: Category = Category::Controller;

    fn id(&self) -> ComponentId {
        match self {
            StockController::Pid(c) => Component::<K>::id(c),
            StockController::BangBang(c) => Component::<K>::id(c),
        }
    }

    fn name(&self) -> &str {
        match self {
            StockController::Pid(c) => Component::<K>::name(c),
            StockController::BangBang(c) => Component::<K>::name(c),
        }
    }

    fn is_facet_enabled(&self) -> bool {
        match self {
            StockController::Pid(c) => Component::<K>::is_facet_enabled(c),
            StockController::BangBang(c) => Component::<K>::is_facet_enabled(c),
        }
    }

    fn is_wired(&self) -> bool {
        match self {
            StockController::Pid(c) => Component::<K>::is_wired(c),
            StockController::BangBang(c) => Component::<K>::is_wired(c),
        }
    }

    fn has_bound_ports(&self) -> bool {
        match self {
            StockController::Pid(c) => Component::<K>::has_bound_ports(c),
            StockController::BangBang(c) => Component::<K>::has_bound_ports(c),
        }
    }

    fn enable_facets(&mut self, kernel: &mut K) -> bool {
        match self {
            StockController::Pid(c) => c.enable_facets(kernel),
            StockController::BangBang(c) => c.enable_facets(kernel),
        }
    }

    fn disable_facets(&mut self, kernel: &mut K) {
        match self {
            StockController::Pid(c) => c.disable_facets(kernel),
            StockController::BangBang(c) => c.disable_facets(kernel),
        }
    }

    fn create_data_object(&mut self, kernel: &mut K) {
        match self {
            StockController::Pid(c) => c.create_data_object(kernel),
            StockController::BangBang(c) => c.create_data_object(kernel),
        }
    }

    fn create_ports(&mut self, kernel: &K) {
        match self {
            StockController::Pid(c) => c.create_ports(kernel),
            StockController::BangBang(c) => c.create_ports(kernel),
        }
    }

    fn erase_ports(&mut self) {
        match self {
            StockController::Pid(c) => Component::<K>::erase_ports(c),
            StockController::BangBang(c) => Component::<K>::erase_ports(c),
        }
    }

    fn select(&self, kernel: &mut K) -> bool {
        match self {
            StockController::Pid(c) => c.select(kernel),
            StockController::BangBang(c) => c.select(kernel),
        }
    }
}

impl Stage for StockController {
    fn update(&mut self) -> Result<(), KernelError> {
        match self {
            StockController::Pid(c) => c.update(),
            StockController::BangBang(c) => c.update(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pid::PidGains;
    use ctrlk_channel::WritePort;
    use ctrlk_kernel::ControlKernel;
    use ctrlk_kernel::component::{bind_writer, create_produced};
    use ctrlk_runtime::Bank;
    use ctrlk_types::ChannelRole;

    #[test]
    fn controllers_of_different_types_share_a_bank() {
        let mut kernel = ControlKernel::new("K");
        let mut upstream = Vec::new();
        for role in [ChannelRole::SetPoints, ChannelRole::Inputs, ChannelRole::Models] {
            let mut port = WritePort::<f64>::new();
            create_produced(&mut port, &mut kernel, role);
            bind_writer(&mut port, &kernel, role);
            upstream.push(port);
        }

        let mut bank = Bank::new();
        let pid = PidController::new("pid", PidGains::default(), 0.1);
        bank.load(&mut kernel, StockController::from(pid)).unwrap();
        bank.load(&mut kernel, BangBangController::new("bb", 3.0, 0.0).into()).unwrap();

        upstream[0].write(&1.0).unwrap();
        bank.select(&mut kernel, "bb").unwrap();
        bank.update().unwrap();
        assert_eq!(published_output(&bank), 3.0);

        bank.select(&mut kernel, "pid").unwrap();
        bank.update().unwrap();
        assert_eq!(published_output(&bank), 1.0);
        assert_eq!(kernel.active_name(Category::Controller), Some("pid"));
    }

    fn published_output(bank: &Bank<StockController>) -> f64 {
        match &bank.members()[0] {
            StockController::Pid(c) => c.ports().output().read().unwrap_or_default(),
            StockController::BangBang(c) => c.ports().output().read().unwrap_or_default(),
        }
    }
}
