//! OnMark engine: timer execution, durable storage and configuration.
mod config;
mod persist;
mod timers;
mod types;

pub use config::{ConfigError, EngineConfig, CONFIG_FILENAME, MAX_TIMER_MS};
pub use persist::{
    ensure_data_dir, AtomicFileWriter, FileStore, KeyValueStore, MemoryStore, PersistError,
};
pub use timers::TimerService;
pub use types::{EngineError, StreamId, TimerEvent};
