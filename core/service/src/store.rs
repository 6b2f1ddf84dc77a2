// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

//! In-memory, append-only customer record store.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::api::{CreateResult, CustomerRecord};

/// Ordered collection of customer records, safe for concurrent use.
///
/// Records are never modified or removed once appended. Ids are caller
/// supplied and may repeat.
#[derive(Debug, Default)]
pub struct RecordStore {
    records: RwLock<Vec<Arc<CustomerRecord>>>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `record` and acknowledge it with its own id.
    pub fn append(&self, record: CustomerRecord) -> CreateResult {
        let id = record.id;

        let len = {
            let mut records = self.records.write();
            records.push(Arc::new(record));
            records.len()
        };

        debug!(id, len, "customer record appended");
        CreateResult { id, success: true }
    }

    /// Records matching `predicate`, in insertion order.
    ///
    /// The set of candidate records is fixed when `scan` is called: records
    /// appended afterwards are never yielded. The predicate is evaluated
    /// lazily while iterating the returned [`Snapshot`].
    pub fn scan<P>(&self, predicate: P) -> Snapshot<P>
    where
        P: Fn(&CustomerRecord) -> bool,
    {
        Snapshot {
            records: self.records.read().clone(),
            predicate,
        }
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

/// Point-in-time view of the store filtered by a predicate.
///
/// Iterating it more than once yields the same records.
pub struct Snapshot<P> {
    records: Vec<Arc<CustomerRecord>>,
    predicate: P,
}

impl<P> Snapshot<P>
where
    P: Fn(&CustomerRecord) -> bool,
{
    pub fn iter(&self) -> impl Iterator<Item = &CustomerRecord> + '_ {
        self.records
            .iter()
            .map(Arc::as_ref)
            .filter(|record| (self.predicate)(record))
    }
}
