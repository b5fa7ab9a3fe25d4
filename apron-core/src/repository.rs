use crate::models::{BagEvent, Flight, Message, Passenger, User};
use serde::{Deserialize, Serialize};

/// Fixed key of the durable slot that holds the state snapshot
pub const SNAPSHOT_KEY: &str = "airportapp_state_v1";

/// Everything that survives a restart. Notifications are deliberately absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub flights: Vec<Flight>,
    #[serde(default)]
    pub passengers: Vec<Passenger>,
    #[serde(default)]
    pub bag_events: Vec<BagEvent>,
    #[serde(default)]
    pub messages: Vec<Message>,
    #[serde(default)]
    pub current_user: Option<User>,
}

impl Snapshot {
    pub fn to_json(&self) -> Result<String, PersistenceError> {
        serde_json::to_string(self).map_err(PersistenceError::Encode)
    }

    pub fn from_json(raw: &str) -> Result<Self, PersistenceError> {
        serde_json::from_str(raw).map_err(PersistenceError::Corrupt)
    }
}

/// Durable storage for the state snapshot
pub trait SnapshotRepository: Send {
    /// `Ok(None)` when nothing has been stored yet
    fn load(&self) -> Result<Option<Snapshot>, PersistenceError>;

    fn save(&self, snapshot: &Snapshot) -> Result<(), PersistenceError>;

    /// Short backend name for logs
    fn describe(&self) -> String;
}

#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("Snapshot is not valid JSON: {0}")]
    Corrupt(#[source] serde_json::Error),

    #[error("Failed to encode snapshot: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("Snapshot I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Snapshot backend error: {0}")]
    Backend(String),
}
