//! Infrastructure Layer
//!
//! Store backends and the file roster.

pub mod key_value;
pub mod kv;
pub mod memory;
pub mod redis_kv;
pub mod roster;

pub use key_value::{KeyValue, LocalKeyValue};
pub use kv::KvStore;
pub use memory::MemoryStore;
pub use redis_kv::RedisKv;
pub use roster::FileRoster;
