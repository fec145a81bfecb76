//! Node access
//!
//! Connection handling lives here, outside the parsers:
//! - `CommandExecutor` trait for "send command, get reply text"
//! - `RedisExecutor` built on the blocking `redis` client
//! - `NodeInspector` fetching and parsing node reports

pub mod executor;
pub mod inspector;

pub use executor::{CommandExecutor, RedisExecutor};
pub use inspector::NodeInspector;
