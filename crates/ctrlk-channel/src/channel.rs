//! [`DataChannel`] – the single storage cell behind a `(name, type)` pair.
//!
//! A channel is written by exactly one producing component per cycle and read
//! by any number of consumers, possibly from other threads running at other
//! priorities.  Every read observes either the complete previous value or the
//! complete new one: the cell is guarded by a [`parking_lot::RwLock`], writers
//! hold the exclusive lock only for the `clone_from` of the new value and
//! readers hold the shared lock only for the copy out.
//!
//! # Example
//!
//! ```
//! use ctrlk_channel::{ChannelId, ChannelTable};
//! use ctrlk_types::ChannelRole;
//!
//! let mut table = ChannelTable::new();
//! let id = ChannelId::new("Kernel::Outputs", "");
//! let out = table.create::<f64>(id.clone(), ChannelRole::Outputs);
//! out.write(&3.14);
//!
//! let seen = table.lookup::<f64>(&id).expect("created above");
//! assert_eq!(seen.read(), 3.14);
//! ```

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use ctrlk_types::{ChannelRole, KernelError};
use parking_lot::RwLock;
use tracing::debug;

/// Values that can travel through a channel.
///
/// `Default` provides the value a freshly created channel holds before its
/// producer first writes; `Clone` lets readers copy out without holding the
/// lock.
pub trait ChannelData: Clone + Default + Send + Sync + 'static {}

impl<T> ChannelData for T where T: Clone + Default + Send + Sync + 'static {}

// ────────────────────────────────────────────────────────────────────────────
// Channel identity
// ────────────────────────────────────────────────────────────────────────────

/// Name of a channel: the role namespace (`"Kernel::Outputs"`) plus the
/// kernel-assigned prefix for that role.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChannelId {
    namespace: String,
    prefix: String,
}

impl ChannelId {
    pub fn new(namespace: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            prefix: prefix.into(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.prefix.is_empty() {
            f.write_str(&self.namespace)
        } else {
            write!(f, "{}::{}", self.namespace, self.prefix)
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// DataChannel
// ────────────────────────────────────────────────────────────────────────────

struct Cell<T> {
    id: ChannelId,
    role: ChannelRole,
    value: RwLock<T>,
    revision: AtomicU64,
}

/// Shared handle to one channel cell.
///
/// Cloning the handle is cheap and never copies the value; every clone
/// addresses the same cell.
pub struct DataChannel<T> {
    cell: Arc<Cell<T>>,
}

impl<T> Clone for DataChannel<T> {
    fn clone(&self) -> Self {
        Self {
            cell: Arc::clone(&self.cell),
        }
    }
}

impl<T> fmt::Debug for DataChannel<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataChannel")
            .field("id", &self.cell.id)
            .field("role", &self.cell.role)
            .field("revision", &self.revision())
            .finish()
    }
}

impl<T> DataChannel<T> {
    pub fn id(&self) -> &ChannelId {
        &self.cell.id
    }

    pub fn role(&self) -> ChannelRole {
        self.cell.role
    }

    /// Number of completed writes since creation.
    pub fn revision(&self) -> u64 {
        self.cell.revision.load(Ordering::Acquire)
    }

    /// Whether `self` and `other` address the same storage cell.
    pub fn same_cell(&self, other: &DataChannel<T>) -> bool {
        Arc::ptr_eq(&self.cell, &other.cell)
    }

    /// Number of live handles to this cell, the table's own included.
    pub fn handle_count(&self) -> usize {
        Arc::strong_count(&self.cell)
    }
}

impl<T: ChannelData> DataChannel<T> {
    fn new(id: ChannelId, role: ChannelRole) -> Self {
        Self {
            cell: Arc::new(Cell {
                id,
                role,
                value: RwLock::new(T::default()),
                revision: AtomicU64::new(0),
            }),
        }
    }

    /// Copy the current value out.
    pub fn read(&self) -> T {
        self.cell.value.read().clone()
    }

    /// Copy the current value into `out`, reusing its storage.
    pub fn read_into(&self, out: &mut T) {
        out.clone_from(&self.cell.value.read());
    }

    /// Replace the current value with a copy of `value`.
    pub fn write(&self, value: &T) {
        self.cell.value.write().clone_from(value);
        self.cell.revision.fetch_add(1, Ordering::Release);
    }

    /// Replace the current value, moving `value` in.
    pub fn set(&self, value: T) {
        *self.cell.value.write() = value;
        self.cell.revision.fetch_add(1, Ordering::Release);
    }
}

// ────────────────────────────────────────────────────────────────────────────
// ChannelTable
// ────────────────────────────────────────────────────────────────────────────

// Type-erased view of a `DataChannel<T>` stored in the table.
trait ErasedChannel: Send + Sync {
    fn binders(&self) -> usize;
    fn as_any(&self) -> &dyn Any;
}

impl<T: ChannelData> ErasedChannel for DataChannel<T> {
    fn binders(&self) -> usize {
        self.handle_count().saturating_sub(1)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

struct Entry {
    role: ChannelRole,
    type_name: &'static str,
    channel: Box<dyn ErasedChannel>,
}

/// Summary of one table entry, for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelInfo {
    pub id: ChannelId,
    pub role: ChannelRole,
    pub type_name: &'static str,
    /// Live handles excluding the table's own.
    pub binders: usize,
}

/// Kernel-owned table of channels keyed by `(ChannelId, type)`.
///
/// Two channels may share a name if their value types differ; a
/// `(name, type)` pair always resolves to exactly one cell.
#[derive(Default)]
pub struct ChannelTable {
    entries: HashMap<(ChannelId, TypeId), Entry>,
}

impl ChannelTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the channel `(id, T)` or return the existing one.
    pub fn create<T: ChannelData>(&mut self, id: ChannelId, role: ChannelRole) -> DataChannel<T> {
        let key = (id, TypeId::of::<T>());
        if let Some(existing) = self.get::<T>(&key) {
            return existing;
        }
        debug!(channel = %key.0, ty = std::any::type_name::<T>(), "creating data channel");
        let channel = DataChannel::<T>::new(key.0.clone(), role);
        self.entries.insert(
            key,
            Entry {
                role,
                type_name: std::any::type_name::<T>(),
                channel: Box::new(channel.clone()),
            },
        );
        channel
    }

    /// Look up `(id, T)`.  `None` when no producer created it.
    pub fn lookup<T: ChannelData>(&self, id: &ChannelId) -> Option<DataChannel<T>> {
        self.get::<T>(&(id.clone(), TypeId::of::<T>()))
    }

    /// Like [`lookup`](Self::lookup) but reports a missing channel as
    /// [`KernelError::ChannelNotFound`].
    pub fn require<T: ChannelData>(&self, id: &ChannelId) -> Result<DataChannel<T>, KernelError> {
        self.lookup(id)
            .ok_or_else(|| KernelError::ChannelNotFound(id.to_string()))
    }

    /// Whether a channel named `id` exists for any value type.
    pub fn contains(&self, id: &ChannelId) -> bool {
        self.entries.keys().any(|(k, _)| k == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Describe every channel, sorted by name.
    pub fn describe(&self) -> Vec<ChannelInfo> {
        let mut out: Vec<ChannelInfo> = self
            .entries
            .iter()
            .map(|((id, _), entry)| ChannelInfo {
                id: id.clone(),
                role: entry.role,
                type_name: entry.type_name,
                binders: entry.channel.binders(),
            })
            .collect();
        out.sort_by(|a, b| a.id.cmp(&b.id).then(a.type_name.cmp(b.type_name)));
        out
    }

    fn get<T: ChannelData>(&self, key: &(ChannelId, TypeId)) -> Option<DataChannel<T>> {
        self.entries
            .get(key)
            .and_then(|e| e.channel.as_any().downcast_ref::<DataChannel<T>>())
            .cloned()
    }
}

impl fmt::Debug for ChannelTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.describe()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn outputs() -> ChannelId {
        ChannelId::new("K::Outputs", "")
    }

    #[test]
    fn display_includes_prefix_only_when_set() {
        assert_eq!(outputs().to_string(), "K::Outputs");
        assert_eq!(ChannelId::new("K::Inputs", "enc").to_string(), "K::Inputs::enc");
    }

    #[test]
    fn fresh_channel_holds_default() {
        let mut table = ChannelTable::new();
        let ch = table.create::<f64>(outputs(), ChannelRole::Outputs);
        assert_eq!(ch.read(), 0.0);
        assert_eq!(ch.revision(), 0);
    }

    #[test]
    fn create_is_idempotent_per_name_and_type() {
        let mut table = ChannelTable::new();
        let a = table.create::<f64>(outputs(), ChannelRole::Outputs);
        let b = table.create::<f64>(outputs(), ChannelRole::Outputs);
        assert!(a.same_cell(&b));
        assert_eq!(table.len(), 1);

        a.write(&1.5);
        assert_eq!(b.read(), 1.5);
    }

    #[test]
    fn same_name_different_type_is_a_different_cell() {
        let mut table = ChannelTable::new();
        table.create::<f64>(outputs(), ChannelRole::Outputs);
        table.create::<[f32; 3]>(outputs(), ChannelRole::Outputs);
        assert_eq!(table.len(), 2);
        assert!(table.lookup::<u8>(&outputs()).is_none());
    }

    #[test]
    fn lookup_missing_channel() {
        let table = ChannelTable::new();
        assert!(table.lookup::<f64>(&outputs()).is_none());
        assert!(!table.contains(&outputs()));
        assert_eq!(
            table.require::<f64>(&outputs()).unwrap_err(),
            KernelError::ChannelNotFound("K::Outputs".into())
        );
    }

    #[test]
    fn read_into_reuses_buffer() {
        let mut table = ChannelTable::new();
        let ch = table.create::<Vec<f64>>(outputs(), ChannelRole::Outputs);
        ch.set(vec![1.0, 2.0]);
        let mut buf = Vec::with_capacity(8);
        ch.read_into(&mut buf);
        assert_eq!(buf, vec![1.0, 2.0]);
        assert!(buf.capacity() >= 8);
        assert_eq!(ch.revision(), 1);
    }

    #[test]
    fn describe_counts_binders() {
        let mut table = ChannelTable::new();
        let held = table.create::<f64>(outputs(), ChannelRole::Outputs);
        let info = table.describe();
        assert_eq!(info.len(), 1);
        assert_eq!(info[0].binders, 1);
        drop(held);
        assert_eq!(table.describe()[0].binders, 0);
    }

    #[test]
    fn concurrent_reads_never_observe_torn_values() {
        let mut table = ChannelTable::new();
        let ch = table.create::<[u64; 16]>(outputs(), ChannelRole::Outputs);

        let writer = {
            let ch = ch.clone();
            thread::spawn(move || {
                for i in 0..20_000u64 {
                    ch.write(&[i; 16]);
                }
            })
        };
        let readers: Vec<_> = (0..3)
            .map(|_| {
                let ch = ch.clone();
                thread::spawn(move || {
                    let mut buf = [0u64; 16];
                    for _ in 0..20_000 {
                        ch.read_into(&mut buf);
                        assert!(buf.iter().all(|v| *v == buf[0]), "torn read: {buf:?}");
                    }
                })
            })
            .collect();

        writer.join().unwrap();
        for r in readers {
            r.join().unwrap();
        }
        assert_eq!(ch.read(), [19_999; 16]);
    }
}
