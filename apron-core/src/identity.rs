use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

/// Entity kinds that receive generated identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    User,
    Flight,
    Passenger,
    BagEvent,
    Message,
    Notification,
}

impl EntityKind {
    pub fn prefix(&self) -> &'static str {
        match self {
            EntityKind::User => "u",
            EntityKind::Flight => "f",
            EntityKind::Passenger => "p",
            EntityKind::BagEvent => "be",
            EntityKind::Message => "msg",
            EntityKind::Notification => "toast",
        }
    }
}

/// Produces unique opaque identifiers for new entities
pub trait IdentityGenerator: Send + Sync {
    fn next_id(&self, kind: EntityKind) -> String;
}

/// Random identifiers: `<prefix>_<uuid v4 simple>`
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidIdentityGenerator;

impl IdentityGenerator for UuidIdentityGenerator {
    fn next_id(&self, kind: EntityKind) -> String {
        format!("{}_{}", kind.prefix(), Uuid::new_v4().simple())
    }
}

/// Deterministic identifiers for tests: `<prefix>_<n>`
#[derive(Debug, Default)]
pub struct SequentialIdentityGenerator {
    counter: AtomicU64,
}

impl SequentialIdentityGenerator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdentityGenerator for SequentialIdentityGenerator {
    fn next_id(&self, kind: EntityKind) -> String {
        let n = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{}_{}", kind.prefix(), n)
    }
}
