//! Redis cache module for portal sessions
//!
//! This module provides a [`KeyValueStore`] backed by Redis, for deployments
//! where several front ends share one session cache.

use redis::{Client, Commands};
use tracing::info;

use crate::error::StoreResult;
use crate::store::KeyValueStore;

/// Configuration for Redis connection
#[derive(Debug, Clone)]
pub struct RedisConfig {
    /// Redis connection URL (e.g., "redis://localhost:6379")
    pub url: String,
    /// Prefix prepended to every key so sessions do not collide with other data
    pub key_prefix: String,
}

impl RedisConfig {
    /// Create a new RedisConfig from environment variables
    ///
    /// # Environment Variables
    /// - `REDIS_URL`: Redis connection URL (default: "redis://localhost:6379")
    /// - `REDIS_KEY_PREFIX`: Key namespace (default: "portal:")
    pub fn from_env() -> Self {
        let url =
            std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string());
        let key_prefix =
            std::env::var("REDIS_KEY_PREFIX").unwrap_or_else(|_| "portal:".to_string());

        RedisConfig { url, key_prefix }
    }
}

/// Session store kept in Redis
pub struct RedisStore {
    client: Client,
    key_prefix: String,
}

impl RedisStore {
    /// Initialize a new Redis-backed store
    pub fn new(config: &RedisConfig) -> StoreResult<Self> {
        let client = Client::open(config.url.clone())?;
        info!("Redis client initialized with URL: {}", config.url);
        Ok(RedisStore {
            client,
            key_prefix: config.key_prefix.clone(),
        })
    }

    fn get_connection(&self) -> StoreResult<redis::Connection> {
        Ok(self.client.get_connection()?)
    }

    fn key(&self, key: &str) -> String {
        format!("{}{}", self.key_prefix, key)
    }

    /// Check if Redis is reachable
    pub fn health_check(&self) -> StoreResult<bool> {
        let mut conn = self.get_connection()?;
        let pong: String = redis::cmd("PING").query(&mut conn)?;
        Ok(pong == "PONG")
    }
}

impl KeyValueStore for RedisStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let mut conn = self.get_connection()?;
        let value: Option<String> = conn.get(self.key(key))?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let mut conn = self.get_connection()?;
        let _: () = conn.set(self.key(key), value)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        let mut conn = self.get_connection()?;
        let _: u64 = conn.del(self.key(key))?;
        Ok(())
    }
}
