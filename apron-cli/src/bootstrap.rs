use anyhow::Context;
use apron_core::{SnapshotRepository, SystemClock, UuidIdentityGenerator};
use apron_ops::{GroundOpsStore, StoreOptions};
use apron_store::app_config::{Config, LoggingConfig, StorageBackend, StorageConfig};
use apron_store::{FileSnapshotRepository, MemorySnapshotRepository, RedisSnapshotRepository};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Logs go to stderr; stdout carries command output
pub fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let registry = tracing_subscriber::registry().with(filter);

    if logging.json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

pub fn open_repository(storage: &StorageConfig) -> anyhow::Result<Box<dyn SnapshotRepository>> {
    let repository: Box<dyn SnapshotRepository> = match storage.backend {
        StorageBackend::File => Box::new(FileSnapshotRepository::new(&storage.data_dir, &storage.key)),
        StorageBackend::Memory => Box::new(MemorySnapshotRepository::new()),
        StorageBackend::Redis => {
            let url = storage
                .redis_url
                .as_deref()
                .context("storage.redis_url is required for the redis backend")?;
            Box::new(RedisSnapshotRepository::new(url, &storage.key).context("Invalid Redis URL")?)
        }
    };
    Ok(repository)
}

pub fn store_options(config: &Config) -> StoreOptions {
    StoreOptions {
        notification_ttl: chrono::Duration::seconds(config.notifications.ttl_seconds as i64),
        enforce_roles: config.access.enforce_roles,
    }
}

pub fn open_store(config: &Config) -> anyhow::Result<GroundOpsStore> {
    let repository = open_repository(&config.storage)?;
    Ok(GroundOpsStore::open(
        repository,
        Arc::new(UuidIdentityGenerator),
        Arc::new(SystemClock),
        store_options(config),
    ))
}
