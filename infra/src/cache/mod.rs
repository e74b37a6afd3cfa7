//! Cache module for Redis-backed state
//!
//! Provides the shared Redis connection and the challenge store that keeps
//! one-time codes with atomic issue and consume.

pub mod challenge_store;
pub mod redis_client;


pub use challenge_store::RedisChallengeStore;
pub use redis_client::RedisClient;
