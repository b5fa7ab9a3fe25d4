use apron_core::{PersistenceError, Snapshot, SnapshotRepository};
use std::sync::{Arc, Mutex};

/// A single serialized text slot held in memory.
///
/// Clones share the slot, so a test can open a second store on the same data
/// to simulate a process restart, or plant corrupt text with [`Self::put_raw`].
#[derive(Debug, Clone, Default)]
pub struct MemorySnapshotRepository {
    slot: Arc<Mutex<Option<String>>>,
}

impl MemorySnapshotRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_raw(&self, raw: impl Into<String>) {
        *self.lock() = Some(raw.into());
    }

    pub fn raw(&self) -> Option<String> {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<String>> {
        self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SnapshotRepository for MemorySnapshotRepository {
    fn load(&self) -> Result<Option<Snapshot>, PersistenceError> {
        match self.lock().as_deref() {
            Some(raw) => Snapshot::from_json(raw).map(Some),
            None => Ok(None),
        }
    }

    fn save(&self, snapshot: &Snapshot) -> Result<(), PersistenceError> {
        let json = snapshot.to_json()?;
        *self.lock() = Some(json);
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
