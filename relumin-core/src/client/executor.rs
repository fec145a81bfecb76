//! Command execution against a single node
//!
//! The parsers never talk to the network. Anything that can send a command to
//! an endpoint and hand back the complete reply text can feed them.

use std::time::Duration;
use tracing::{debug, warn};

use crate::config::RedisConfig;
use crate::error::CommandError;

/// Synchronous "send command, return raw reply" capability.
///
/// Implementations must release whatever connection they open before
/// returning, on success and on every error path.
pub trait CommandExecutor: Send + Sync {
    fn execute(&self, endpoint: &str, args: &[&str]) -> Result<String, CommandError>;
}

/// [`CommandExecutor`] backed by the `redis` crate's blocking client.
///
/// Opens one connection per call; the connection is dropped (and closed)
/// when the call returns.
#[derive(Debug, Clone)]
pub struct RedisExecutor {
    connect_timeout: Duration,
    response_timeout: Duration,
}

impl RedisExecutor {
    pub fn new(connect_timeout: Duration, response_timeout: Duration) -> Self {
        Self {
            connect_timeout,
            response_timeout,
        }
    }

    pub fn from_config(config: &RedisConfig) -> Self {
        Self::new(config.connect_timeout(), config.response_timeout())
    }

    fn connect(&self, endpoint: &str) -> Result<redis::Connection, CommandError> {
        let connect_failed = |source| CommandError::ConnectFailed {
            endpoint: endpoint.to_string(),
            source,
        };

        let client = redis::Client::open(format!("redis://{}/", endpoint)).map_err(connect_failed)?;
        let connection = client
            .get_connection_with_timeout(self.connect_timeout)
            .map_err(connect_failed)?;

        let timeout = Some(self.response_timeout);
        connection.set_read_timeout(timeout).map_err(connect_failed)?;
        connection.set_write_timeout(timeout).map_err(connect_failed)?;
        Ok(connection)
    }
}

impl Default for RedisExecutor {
    fn default() -> Self {
        Self::from_config(&RedisConfig::default())
    }
}

impl CommandExecutor for RedisExecutor {
    fn execute(&self, endpoint: &str, args: &[&str]) -> Result<String, CommandError> {
        let Some((name, rest)) = args.split_first() else {
            return Err(CommandError::EmptyCommand);
        };

        let mut connection = self.connect(endpoint)?;

        let mut cmd = redis::cmd(name);
        for arg in rest {
            cmd.arg(*arg);
        }

        debug!("Sending {} to {}", args.join(" "), endpoint);
        cmd.query::<String>(&mut connection).map_err(|source| {
            warn!("{} failed on {}: {}", name, endpoint, source);
            CommandError::Failed {
                endpoint: endpoint.to_string(),
                command: args.join(" "),
                source,
            }
        })
    }
}
