//! Redis-backed implementation of [`KeyValueBackend`].
//!
//! Holds one multiplexed async connection and clones it per command, which
//! the redis crate documents as the cheap way to share a connection.

use async_trait::async_trait;
use coinvault_core::RedisConfig;
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Client, ConnectionAddr, ConnectionInfo, RedisConnectionInfo};

use super::traits::{BackendError, KeyValueBackend, ValueKind};

/// Keys requested per SCAN round trip.
const SCAN_BATCH: usize = 500;

/// Redis key-value backend.
#[derive(Clone)]
pub struct RedisBackend {
    conn: MultiplexedConnection,
    endpoint: String,
}

impl RedisBackend {
    /// Connect to the database described by `config`.
    pub async fn connect(config: &RedisConfig) -> Result<Self, BackendError> {
        let info = ConnectionInfo {
            addr: ConnectionAddr::Tcp(config.host.clone(), config.port),
            redis: RedisConnectionInfo {
                db: config.db,
                password: config.password.clone(),
                ..Default::default()
            },
        };
        let endpoint = format!("{}:{}/{}", config.host, config.port, config.db);
        let client = Client::open(info).map_err(|e| BackendError::Connection(e.to_string()))?;
        let conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| BackendError::Connection(format!("{}: {}", endpoint, e)))?;

        tracing::debug!(endpoint = %endpoint, "connected to redis");
        Ok(Self { conn, endpoint })
    }

    fn connection(&self) -> MultiplexedConnection {
        self.conn.clone()
    }
}

impl std::fmt::Debug for RedisBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisBackend")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

fn command_error(e: redis::RedisError) -> BackendError {
    if e.is_io_error() || e.is_connection_dropped() || e.is_connection_refusal() {
        BackendError::Connection(e.to_string())
    } else {
        BackendError::Command(e.to_string())
    }
}

#[async_trait]
impl KeyValueBackend for RedisBackend {
    async fn get(&self, key: &str) -> Result<Option<String>, BackendError> {
        let mut conn = self.connection();
        let value: Option<String> = conn.get(key).await.map_err(command_error)?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), BackendError> {
        let mut conn = self.connection();
        let _: () = conn.set(key, value).await.map_err(command_error)?;
        Ok(())
    }

    async fn delete(&self, keys: &[String]) -> Result<u64, BackendError> {
        if keys.is_empty() {
            return Ok(0);
        }
        let mut conn = self.connection();
        let removed: u64 = conn.del(keys).await.map_err(command_error)?;
        Ok(removed)
    }

    async fn incr(&self, key: &str) -> Result<u64, BackendError> {
        let mut conn = self.connection();
        let value: u64 = conn.incr(key, 1u64).await.map_err(command_error)?;
        Ok(value)
    }

    async fn scan_prefix(&self, prefix: &str) -> Result<Vec<String>, BackendError> {
        let mut conn = self.connection();
        let pattern = format!("{}*", prefix);
        let mut cursor: u64 = 0;
        let mut keys = Vec::new();
        loop {
            let (next, batch): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(SCAN_BATCH)
                .query_async(&mut conn)
                .await
                .map_err(command_error)?;
            keys.extend(batch);
            if next == 0 {
                break;
            }
            cursor = next;
        }
        // SCAN may return a key more than once
        keys.sort_unstable();
        keys.dedup();
        Ok(keys)
    }

    async fn key_type(&self, key: &str) -> Result<ValueKind, BackendError> {
        let mut conn = self.connection();
        let name: String = redis::cmd("TYPE")
            .arg(key)
            .query_async(&mut conn)
            .await
            .map_err(command_error)?;
        Ok(ValueKind::from_type_name(&name))
    }

    async fn list_range(&self, key: &str) -> Result<Vec<String>, BackendError> {
        let mut conn = self.connection();
        let items: Vec<String> = conn.lrange(key, 0, -1).await.map_err(command_error)?;
        Ok(items)
    }

    async fn flush_all(&self) -> Result<(), BackendError> {
        let mut conn = self.connection();
        let _: () = redis::cmd("FLUSHDB")
            .query_async(&mut conn)
            .await
            .map_err(command_error)?;
        tracing::info!(endpoint = %self.endpoint, "flushed redis database");
        Ok(())
    }
}
