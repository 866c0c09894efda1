//! [`ReadPort`] and [`WritePort`] – component-owned handles onto a channel.
//!
//! A port starts unbound.  `create_port` resolves its channel in the kernel's
//! [`ChannelTable`] once, at enable time; from then on reads and writes go
//! straight to the cell.  `erase_port` drops the binding and is safe to call
//! any number of times.
//!
//! A port whose channel did not exist when it was created stays unbound and
//! reports [`KernelError::ChannelNotFound`] on use.  In a correctly ordered
//! configuration every producer creates its channel before consumers bind,
//! so that path is never taken during a cycle.

use std::fmt;

use ctrlk_types::{ChannelRole, KernelError, PortMode};
use tracing::debug;

use crate::channel::{ChannelData, ChannelId, ChannelTable, DataChannel};

fn not_found(target: Option<&ChannelId>) -> KernelError {
    KernelError::ChannelNotFound(
        target.map_or_else(|| "<unbound port>".to_string(), ToString::to_string),
    )
}

// ────────────────────────────────────────────────────────────────────────────
// ReadPort
// ────────────────────────────────────────────────────────────────────────────

/// A consumer's handle to a channel.
pub struct ReadPort<T> {
    target: Option<ChannelId>,
    channel: Option<DataChannel<T>>,
}

impl<T> Default for ReadPort<T> {
    fn default() -> Self {
        Self {
            target: None,
            channel: None,
        }
    }
}

impl<T> fmt::Debug for ReadPort<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadPort")
            .field("mode", &self.mode())
            .field("target", &self.target)
            .field("bound", &self.channel.is_some())
            .finish()
    }
}

impl<T> ReadPort<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn mode(&self) -> PortMode {
        PortMode::Read
    }

    pub fn is_bound(&self) -> bool {
        self.channel.is_some()
    }

    /// The channel this port was last asked to bind to.
    pub fn target(&self) -> Option<&ChannelId> {
        self.target.as_ref()
    }

    /// The bound channel, if any.
    pub fn channel(&self) -> Option<&DataChannel<T>> {
        self.channel.as_ref()
    }

    /// Drop the binding.
    pub fn erase_port(&mut self) {
        self.target = None;
        self.channel = None;
    }
}

impl<T: ChannelData> ReadPort<T> {
    /// Bind to `(namespace, prefix, T)` in `table`.
    pub fn create_port(&mut self, table: &ChannelTable, namespace: &str, prefix: &str) {
        let id = ChannelId::new(namespace, prefix);
        self.channel = table.lookup::<T>(&id);
        if self.channel.is_none() {
            debug!(channel = %id, "read port left unbound: channel not created yet");
        }
        self.target = Some(id);
    }

    /// Copy the channel's current value out.
    pub fn read(&self) -> Result<T, KernelError> {
        match &self.channel {
            Some(ch) => Ok(ch.read()),
            None => Err(not_found(self.target.as_ref())),
        }
    }

    /// Copy the channel's current value into `out`.
    pub fn read_into(&self, out: &mut T) -> Result<(), KernelError> {
        match &self.channel {
            Some(ch) => {
                ch.read_into(out);
                Ok(())
            }
            None => Err(not_found(self.target.as_ref())),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// WritePort
// ────────────────────────────────────────────────────────────────────────────

/// The producer's handle to the channel of the role its category produces.
pub struct WritePort<T> {
    target: Option<ChannelId>,
    channel: Option<DataChannel<T>>,
}

impl<T> Default for WritePort<T> {
    fn default() -> Self {
        Self {
            target: None,
            channel: None,
        }
    }
}

impl<T> fmt::Debug for WritePort<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WritePort")
            .field("mode", &self.mode())
            .field("target", &self.target)
            .field("bound", &self.channel.is_some())
            .finish()
    }
}

impl<T> WritePort<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn mode(&self) -> PortMode {
        PortMode::Write
    }

    pub fn is_bound(&self) -> bool {
        self.channel.is_some()
    }

    pub fn target(&self) -> Option<&ChannelId> {
        self.target.as_ref()
    }

    pub fn channel(&self) -> Option<&DataChannel<T>> {
        self.channel.as_ref()
    }

    pub fn erase_port(&mut self) {
        self.target = None;
        self.channel = None;
    }
}

impl<T: ChannelData> WritePort<T> {
    /// Create the produced channel `(namespace, prefix, T)` in `table`.
    ///
    /// Creating an already existing channel is a no-op, so competing
    /// producers of one role share the cell.
    pub fn create_data_object(
        &mut self,
        table: &mut ChannelTable,
        namespace: &str,
        prefix: &str,
        role: ChannelRole,
    ) {
        table.create::<T>(ChannelId::new(namespace, prefix), role);
    }

    /// Bind to `(namespace, prefix, T)` in `table`.
    pub fn create_port(&mut self, table: &ChannelTable, namespace: &str, prefix: &str) {
        let id = ChannelId::new(namespace, prefix);
        self.channel = table.lookup::<T>(&id);
        if self.channel.is_none() {
            debug!(channel = %id, "write port left unbound: channel not created");
        }
        self.target = Some(id);
    }

    /// Publish a copy of `value`.
    pub fn write(&self, value: &T) -> Result<(), KernelError> {
        match &self.channel {
            Some(ch) => {
                ch.write(value);
                Ok(())
            }
            None => Err(not_found(self.target.as_ref())),
        }
    }

    /// Publish `value`, moving it into the channel.
    pub fn set(&self, value: T) -> Result<(), KernelError> {
        match &self.channel {
            Some(ch) => {
                ch.set(value);
                Ok(())
            }
            None => Err(not_found(self.target.as_ref())),
        }
    }

    /// Read back the last published value.
    pub fn read(&self) -> Result<T, KernelError> {
        match &self.channel {
            Some(ch) => Ok(ch.read()),
            None => Err(not_found(self.target.as_ref())),
        }
    }
}
