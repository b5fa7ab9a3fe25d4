pub mod app_config;
pub mod file_repo;
pub mod memory_repo;
pub mod redis_repo;
pub mod seed;

pub use file_repo::FileSnapshotRepository;
pub use memory_repo::MemorySnapshotRepository;
pub use redis_repo::RedisSnapshotRepository;
pub use seed::demo_snapshot;
