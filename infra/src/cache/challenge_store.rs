//! Redis-backed challenge store
//!
//! One hash per identity email:
//! `transaction_id`, `code`, `created_at`, `expires_at`, `consumed`, `consumed_at`,
//! `attempts`, `superseded_code` (timestamps in epoch milliseconds).

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use redis::{AsyncCommands, Script};
use std::collections::HashMap;
use uuid::Uuid;

use pw_core::domain::entities::challenge::{
    Challenge, ConsumeOutcome, MAX_ATTEMPTS, RETENTION_GRACE_SECONDS,
};
use pw_core::errors::{ChallengeRejection, DomainError, DomainResult};
use pw_core::repositories::ChallengeStore;

use super::redis_client::RedisClient;

// Replace the record, carrying over the code of an unconsumed predecessor.
// KEYS[1] = challenge hash, ARGV = transaction_id, code, created_ms, expires_ms, ttl
const ISSUE_SCRIPT: &str = r#"
local prev = redis.call('HMGET', KEYS[1], 'code', 'consumed')
local superseded = ''
if prev[1] and prev[2] ~= '1' then
    superseded = prev[1]
end
redis.call('DEL', KEYS[1])
redis.call('HSET', KEYS[1],
    'transaction_id', ARGV[1],
    'code', ARGV[2],
    'created_at', ARGV[3],
    'expires_at', ARGV[4],
    'consumed', '0',
    'consumed_at', '',
    'attempts', '0',
    'superseded_code', superseded)
redis.call('EXPIRE', KEYS[1], ARGV[5])
return superseded
"#;

// Check-and-set executed atomically by the server.
// KEYS[1] = challenge hash, ARGV = transaction_id, code, now_ms, max_attempts
const CONSUME_SCRIPT: &str = r#"
if redis.call('EXISTS', KEYS[1]) == 0 then
    return {'missing'}
end
local c = redis.call('HMGET', KEYS[1], 'transaction_id', 'code', 'created_at', 'expires_at', 'consumed', 'attempts', 'superseded_code')
if c[5] == '1' then
    return {'consumed'}
end
if tonumber(ARGV[3]) >= tonumber(c[4]) then
    return {'expired'}
end
if c[1] ~= ARGV[1] then
    return {'wrong_transaction'}
end
local attempts = tonumber(c[6]) or 0
if attempts >= tonumber(ARGV[4]) then
    return {'attempts_exceeded'}
end
local superseded = c[7] or ''
if c[2] ~= ARGV[2] then
    if superseded ~= '' and superseded == ARGV[2] then
        return {'superseded'}
    end
    redis.call('HINCRBY', KEYS[1], 'attempts', 1)
    return {'wrong_code'}
end
redis.call('HSET', KEYS[1], 'consumed', '1', 'consumed_at', ARGV[3])
return {'ok', c[3], c[4], tostring(attempts), superseded}
"#;

pub struct RedisChallengeStore {
    client: RedisClient,
    issue_script: Script,
    consume_script: Script,
}

impl RedisChallengeStore {
    pub fn new(client: RedisClient) -> Self {
        Self {
            client,
            issue_script: Script::new(ISSUE_SCRIPT),
            consume_script: Script::new(CONSUME_SCRIPT),
        }
    }

    fn key(&self, identity_email: &str) -> String {
        self.client.key(identity_email)
    }
}

fn cache_error(context: &'static str) -> impl Fn(redis::RedisError) -> DomainError {
    move |e| {
        tracing::error!(error = %e, context = context, event = "cache_failed", "Redis operation failed");
        DomainError::storage(format!("{}: {}", context, e))
    }
}

fn from_millis(value: &str) -> DomainResult<DateTime<Utc>> {
    value
        .parse::<i64>()
        .ok()
        .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
        .ok_or_else(|| DomainError::storage(format!("Invalid timestamp in challenge record: {}", value)))
}

fn parse_attempts(value: Option<&String>) -> DomainResult<u32> {
    match value {
        Some(v) if !v.is_empty() => v
            .parse()
            .map_err(|_| DomainError::storage(format!("Invalid attempt count in challenge record: {}", v))),
        _ => Ok(0),
    }
}

fn non_empty(value: Option<&String>) -> Option<String> {
    value.filter(|v| !v.is_empty()).cloned()
}

fn parse_record(identity_email: &str, fields: &HashMap<String, String>) -> DomainResult<Challenge> {
    let get = |name: &str| {
        fields
            .get(name)
            .ok_or_else(|| DomainError::storage(format!("Challenge record missing {}", name)))
    };

    let transaction_id = Uuid::parse_str(get("transaction_id")?)
        .map_err(|e| DomainError::storage(format!("Invalid transaction id in challenge: {}", e)))?;
    let consumed_at = match fields.get("consumed_at") {
        Some(v) if !v.is_empty() => Some(from_millis(v)?),
        _ => None,
    };

    Ok(Challenge {
        identity_email: identity_email.to_string(),
        transaction_id,
        code: get("code")?.clone(),
        created_at: from_millis(get("created_at")?)?,
        expires_at: from_millis(get("expires_at")?)?,
        consumed: get("consumed")? == "1",
        consumed_at,
        attempts: parse_attempts(fields.get("attempts"))?,
        superseded_code: non_empty(fields.get("superseded_code")),
    })
}

#[async_trait]
impl ChallengeStore for RedisChallengeStore {
    async fn issue(&self, challenge: Challenge) -> DomainResult<()> {
        let key = self.key(&challenge.identity_email);
        let ttl = (challenge.expires_at - challenge.created_at).num_seconds().max(1) + RETENTION_GRACE_SECONDS;
        let mut conn = self.client.connection();

        self.issue_script
            .key(key)
            .arg(challenge.transaction_id.to_string())
            .arg(&challenge.code)
            .arg(challenge.created_at.timestamp_millis())
            .arg(challenge.expires_at.timestamp_millis())
            .arg(ttl)
            .invoke_async::<_, String>(&mut conn)
            .await
            .map_err(cache_error("Failed to store challenge"))?;

        Ok(())
    }

    async fn consume(
        &self,
        identity_email: &str,
        transaction_id: Uuid,
        code: &str,
        now: DateTime<Utc>,
    ) -> DomainResult<ConsumeOutcome> {
        let mut conn = self.client.connection();
        let reply: Vec<String> = self
            .consume_script
            .key(self.key(identity_email))
            .arg(transaction_id.to_string())
            .arg(code)
            .arg(now.timestamp_millis())
            .arg(MAX_ATTEMPTS)
            .invoke_async(&mut conn)
            .await
            .map_err(cache_error("Failed to consume challenge"))?;

        let outcome = match reply.first().map(String::as_str) {
            Some("ok") if reply.len() == 5 => ConsumeOutcome::Consumed(Challenge {
                identity_email: identity_email.to_string(),
                transaction_id,
                code: code.to_string(),
                created_at: from_millis(&reply[1])?,
                expires_at: from_millis(&reply[2])?,
                consumed: true,
                consumed_at: Some(now),
                attempts: parse_attempts(reply.get(3))?,
                superseded_code: non_empty(reply.get(4)),
            }),
            Some("wrong_code") => ConsumeOutcome::WrongCode,
            Some("missing") => ConsumeOutcome::Rejected(ChallengeRejection::Missing),
            Some("consumed") => ConsumeOutcome::Rejected(ChallengeRejection::Consumed),
            Some("expired") => ConsumeOutcome::Rejected(ChallengeRejection::Expired),
            Some("wrong_transaction") => ConsumeOutcome::Rejected(ChallengeRejection::WrongTransaction),
            Some("superseded") => ConsumeOutcome::Rejected(ChallengeRejection::Superseded),
            Some("attempts_exceeded") => ConsumeOutcome::Rejected(ChallengeRejection::AttemptsExceeded),
            _ => {
                return Err(DomainError::storage(format!(
                    "Unexpected consume reply: {:?}",
                    reply
                )))
            }
        };

        Ok(outcome)
    }

    async fn find(&self, identity_email: &str) -> DomainResult<Option<Challenge>> {
        let mut conn = self.client.connection();
        let fields: HashMap<String, String> = conn
            .hgetall(self.key(identity_email))
            .await
            .map_err(cache_error("Failed to read challenge"))?;

        if fields.is_empty() {
            return Ok(None);
        }
        parse_record(identity_email, &fields).map(Some)
    }

    async fn purge_expired(&self, _now: DateTime<Utc>) -> DomainResult<usize> {
        // Records carry their own EXPIRE; Redis evicts them
        Ok(0)
    }
}
