//! Parameter cell shared between the configuration path and the solvers

use parking_lot::RwLock;
use tracing::debug;

/// Single-writer, many-reader holder of a parameter table.
///
/// Solvers take one [`snapshot`](Self::snapshot) at the start of a call and work on that copy,
/// so a concurrent [`replace`](Self::replace) is either fully visible to a call or not at all.
/// The lock is only held for the duration of a copy.
#[derive(Debug, Default)]
pub struct SharedParameters<P: Copy> {
    inner: RwLock<P>,
}

impl<P: Copy> SharedParameters<P> {
    pub fn new(parameters: P) -> Self {
        SharedParameters { inner: RwLock::new(parameters) }
    }

    /// Consistent copy of the current table.
    pub fn snapshot(&self) -> P {
        *self.inner.read()
    }

    /// Replaces the whole table.
    pub fn replace(&self, parameters: P) {
        *self.inner.write() = parameters;
        debug!(table = std::any::type_name::<P>(), "parameters replaced");
    }

    /// Changes a copy of the table, for example to set a new tool offset, then stores it.
    /// `change` runs without the lock held; readers see either the old or the new table.
    /// Meant for the single writer: concurrent updates may overwrite each other.
    pub fn update<F: FnOnce(&mut P)>(&self, change: F) {
        let mut parameters = self.snapshot();
        change(&mut parameters);
        *self.inner.write() = parameters;
        debug!(table = std::any::type_name::<P>(), "parameters updated");
    }
}

impl<P: Copy> Clone for SharedParameters<P> {
    /// Independent cell starting from the current table.
    fn clone(&self) -> Self {
        SharedParameters::new(self.snapshot())
    }
}
