use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use verimail_common::error::AppError;
use verimail_common::types::VerificationRecord;

use crate::store::VerificationStore;

/// In-process store with the same upsert semantics as the MySQL table.
#[derive(Debug, Default)]
pub struct InMemoryVerificationStore {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    records: HashMap<Uuid, VerificationRecord>,
    writes: usize,
}

impl InMemoryVerificationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: Uuid) -> Option<VerificationRecord> {
        self.lock().records.get(&id).cloned()
    }

    /// Number of distinct records.
    pub fn len(&self) -> usize {
        self.lock().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of upserts performed, including updates.
    pub fn writes(&self) -> usize {
        self.lock().writes
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // A poisoned lock only means another test thread panicked mid-write.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl VerificationStore for InMemoryVerificationStore {
    async fn upsert(&self, record: &VerificationRecord) -> Result<(), AppError> {
        let mut inner = self.lock();
        inner.writes += 1;
        inner
            .records
            .entry(record.id)
            .and_modify(|existing| existing.email_exp_time = record.email_exp_time)
            .or_insert_with(|| record.clone());
        Ok(())
    }
}
