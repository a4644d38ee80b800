//! Keyfig Redis - SettingsBackend implementation for Redis
//!
//! Binds one namespace (a Redis database index) over a multiplexed tokio
//! connection and maps the backend trait onto GET / SET / SETNX / KEYS.

mod redis_backend;

pub use redis_backend::{RedisBackend, RedisOptions};
