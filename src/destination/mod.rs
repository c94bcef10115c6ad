//! Write sinks for projected nodes.
//!
//! A [`Destination`] receives `create` calls in document order and one
//! `submit` at the end of a run. [`MemoryDestination`] applies writes as they
//! arrive; [`BatchedDestination`] queues them and hands them to an inner
//! destination on `submit`.

use std::collections::HashMap;
use std::fmt;

use crate::error::DestinationError;
use crate::name::Path;
use crate::property::Properties;

/// The output side of a projection run.
pub trait Destination {
    /// Creates the node at `path`. An empty property set is allowed.
    ///
    /// # Errors
    ///
    /// Returns [`DestinationError`] if the write is refused.
    fn create(&mut self, path: &Path, properties: Properties) -> Result<(), DestinationError>;

    /// Adds properties to a node that was already created.
    ///
    /// # Errors
    ///
    /// Returns [`DestinationError::UnknownNode`] if nothing exists at `path`.
    fn set_properties(&mut self, path: &Path, properties: Properties) -> Result<(), DestinationError>;

    /// Applies buffered writes. Safe to call any number of times.
    ///
    /// # Errors
    ///
    /// Returns [`DestinationError`] if a buffered write fails.
    fn submit(&mut self) -> Result<(), DestinationError>;
}

/// One created node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeRecord {
    /// Where the node lives.
    pub path: Path,
    /// Its properties.
    pub properties: Properties,
}

impl fmt::Display for NodeRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path)?;
        for (name, values) in self.properties.iter() {
            write!(f, "\n  {name} =")?;
            for value in values {
                write!(f, " {value}")?;
            }
        }
        Ok(())
    }
}

/// A destination that stores nodes in memory as soon as they are created.
#[derive(Debug, Clone, Default)]
pub struct MemoryDestination {
    records: Vec<NodeRecord>,
    index: HashMap<Path, usize>,
    submits: usize,
}

impl MemoryDestination {
    /// Creates an empty destination.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the nodes in creation order.
    #[must_use]
    pub fn records(&self) -> &[NodeRecord] {
        &self.records
    }

    /// Returns the node at `path`.
    #[must_use]
    pub fn get(&self, path: &Path) -> Option<&NodeRecord> {
        self.index.get(path).map(|&i| &self.records[i])
    }

    /// Returns the number of `submit` calls received.
    #[must_use]
    pub fn submit_count(&self) -> usize {
        self.submits
    }

    /// Returns the number of stored nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if no node was created.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Consumes the destination, returning its nodes in creation order.
    #[must_use]
    pub fn into_records(self) -> Vec<NodeRecord> {
        self.records
    }
}

impl Destination for MemoryDestination {
    fn create(&mut self, path: &Path, properties: Properties) -> Result<(), DestinationError> {
        let record = NodeRecord {
            path: path.clone(),
            properties,
        };
        // A second create at the same path replaces the node in place.
        if let Some(&i) = self.index.get(path) {
            self.records[i] = record;
        } else {
            self.index.insert(path.clone(), self.records.len());
            self.records.push(record);
        }
        Ok(())
    }

    fn set_properties(&mut self, path: &Path, properties: Properties) -> Result<(), DestinationError> {
        let i = *self
            .index
            .get(path)
            .ok_or_else(|| DestinationError::UnknownNode(path.clone()))?;
        self.records[i].properties.merge(properties);
        Ok(())
    }

    fn submit(&mut self) -> Result<(), DestinationError> {
        self.submits += 1;
        Ok(())
    }
}

#[derive(Debug, Clone)]
enum PendingWrite {
    Create(Path, Properties),
    SetProperties(Path, Properties),
}

/// A destination that defers every write until `submit`.
///
/// Nothing reaches the inner destination before `submit`; [`discard`]
/// drops the queue instead.
///
/// [`discard`]: BatchedDestination::discard
#[derive(Debug)]
pub struct BatchedDestination<D> {
    inner: D,
    pending: Vec<PendingWrite>,
}

impl<D: Destination> BatchedDestination<D> {
    /// Wraps `inner`.
    pub fn new(inner: D) -> Self {
        Self {
            inner,
            pending: Vec::new(),
        }
    }

    /// Returns the number of queued writes.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Drops all queued writes.
    pub fn discard(&mut self) {
        log::debug!("discarding {} queued writes", self.pending.len());
        self.pending.clear();
    }

    /// Returns the wrapped destination.
    pub fn inner(&self) -> &D {
        &self.inner
    }

    /// Unwraps the destination. Queued writes are dropped.
    pub fn into_inner(self) -> D {
        self.inner
    }
}

impl<D: Destination> Destination for BatchedDestination<D> {
    fn create(&mut self, path: &Path, properties: Properties) -> Result<(), DestinationError> {
        self.pending.push(PendingWrite::Create(path.clone(), properties));
        Ok(())
    }

    fn set_properties(&mut self, path: &Path, properties: Properties) -> Result<(), DestinationError> {
        self.pending
            .push(PendingWrite::SetProperties(path.clone(), properties));
        Ok(())
    }

    fn submit(&mut self) -> Result<(), DestinationError> {
        let batch = std::mem::take(&mut self.pending);
        log::debug!("flushing {} queued writes", batch.len());
        for write in batch {
            match write {
                PendingWrite::Create(path, props) => self.inner.create(&path, props)?,
                PendingWrite::SetProperties(path, props) => self.inner.set_properties(&path, props)?,
            }
        }
        self.inner.submit()
    }
}
