use apron_core::{PersistenceError, Snapshot, SnapshotRepository};
use redis::Commands;
use tracing::info;

/// Keeps the snapshot under one Redis key
pub struct RedisSnapshotRepository {
    client: redis::Client,
    key: String,
}

impl RedisSnapshotRepository {
    /// Does not connect; the first load/save does.
    pub fn new(connection_string: &str, key: &str) -> Result<Self, redis::RedisError> {
        let client = redis::Client::open(connection_string)?;
        info!("Redis snapshot slot configured: {}", key);
        Ok(Self {
            client,
            key: key.to_string(),
        })
    }

    fn connection(&self) -> Result<redis::Connection, PersistenceError> {
        self.client.get_connection().map_err(backend)
    }
}

impl SnapshotRepository for RedisSnapshotRepository {
    fn load(&self) -> Result<Option<Snapshot>, PersistenceError> {
        let mut conn = self.connection()?;
        let raw: Option<String> = conn.get(&self.key).map_err(backend)?;
        raw.as_deref().map(Snapshot::from_json).transpose()
    }

    fn save(&self, snapshot: &Snapshot) -> Result<(), PersistenceError> {
        let json = snapshot.to_json()?;
        let mut conn = self.connection()?;
        conn.set::<_, _, ()>(&self.key, json).map_err(backend)?;
        Ok(())
    }

    fn describe(&self) -> String {
        format!("redis:{}", self.key)
    }
}

fn backend(e: redis::RedisError) -> PersistenceError {
    PersistenceError::Backend(e.to_string())
}
