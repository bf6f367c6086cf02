use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use shared::{AgentReport, DroneReport, FieldReport};

use crate::snapshot::{self, Snapshot};

/// The single mutable store of the latest known partial map and status per
/// agent. One instance is created in `main` and shared behind an `Arc`
/// between the ingestion threads and the render loop; the mutex below is
/// the only synchronization between them.
pub struct WorldState {
    inner: Mutex<WorldInner>,
}

#[derive(Default)]
struct WorldInner {
    fields: HashMap<String, FieldReport>,
    drones: HashMap<String, DroneReport>,
    dirty: bool,
}

impl WorldState {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(WorldInner::default()),
        }
    }

    /// Absorbs one decoded report. Each payload present replaces the
    /// agent's previous one wholesale; partial merges never happen. A
    /// report with no payload still marks the world dirty, since the
    /// identifier alone was observed.
    pub fn ingest(&self, report: AgentReport) {
        let AgentReport { id, field, bot } = report;
        let mut inner = self.lock();
        if let Some(field) = field {
            inner.fields.insert(id.clone(), field);
        }
        if let Some(bot) = bot {
            inner.drones.insert(id, bot);
        }
        inner.dirty = true;
    }

    /// Consume-once dirty check: of all polls during one dirty window,
    /// exactly one observes `true`.
    pub fn poll_dirty(&self) -> bool {
        let mut inner = self.lock();
        if inner.dirty {
            inner.dirty = false;
            true
        } else {
            false
        }
    }

    /// Derives all four render layers from one consistent view of the
    /// store. Ingestion blocks on the lock for the duration, so this is
    /// the long critical section; the layer builders themselves never
    /// block or allocate beyond the layers they return.
    pub fn snapshot(&self, deterministic: bool) -> Snapshot {
        let inner = self.lock();
        snapshot::build(&inner.fields, &inner.drones, deterministic)
    }

    fn lock(&self) -> MutexGuard<'_, WorldInner> {
        // A poisoned mutex means a panic happened inside a critical
        // section. That is a lock-discipline bug, not a runtime condition.
        self.inner
            .lock()
            .unwrap_or_else(|e| panic!("world state lock poisoned: {e}"))
    }
}
