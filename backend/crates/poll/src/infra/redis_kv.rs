//! Redis Key/Value Client

use std::collections::HashMap;
use std::future::Future;
use std::sync::LazyLock;
use std::time::Duration;

use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Script};

use crate::error::{PollError, PollResult};
use crate::infra::key_value::KeyValue;

static TOGGLE_MEMBER: LazyLock<Script> = LazyLock::new(|| {
    Script::new(
        r"
if redis.call('SISMEMBER', KEYS[1], ARGV[1]) == 1 then
    redis.call('SREM', KEYS[1], ARGV[1])
    return 0
end
redis.call('SADD', KEYS[1], ARGV[1])
return 1
",
    )
});

// KEYS: hash, list. ARGV: guard field, list item, then field/value pairs.
static PUBLISH_ONCE: LazyLock<Script> = LazyLock::new(|| {
    Script::new(
        r"
if redis.call('HEXISTS', KEYS[1], ARGV[1]) == 1 then
    return 0
end
redis.call('HSET', KEYS[1], unpack(ARGV, 3))
redis.call('RPUSH', KEYS[2], ARGV[2])
return 1
",
    )
});

/// Redis-backed [`KeyValue`].
///
/// Cloning shares the underlying multiplexed connection, which reconnects
/// on its own after a failure.
#[derive(Clone)]
pub struct RedisKv {
    conn: ConnectionManager,
    timeout: Duration,
}

impl RedisKv {
    /// Connect to `url` (e.g. `redis://127.0.0.1:6379`).
    ///
    /// `timeout` bounds the initial connection and every later command.
    pub async fn connect(url: &str, timeout: Duration) -> PollResult<Self> {
        let client = redis::Client::open(url)?;
        let conn = tokio::time::timeout(timeout, ConnectionManager::new(client))
            .await
            .map_err(|_| PollError::Timeout(timeout))??;

        tracing::info!(timeout_ms = timeout.as_millis() as u64, "Connected to redis");
        Ok(Self { conn, timeout })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn bounded<T, F>(&self, command: &'static str, fut: F) -> PollResult<T>
    where
        F: Future<Output = redis::RedisResult<T>>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result.map_err(|e| {
                tracing::debug!(command, error = %e, "Redis command failed");
                PollError::from(e)
            }),
            Err(_) => Err(PollError::Timeout(self.timeout)),
        }
    }
}

impl std::fmt::Debug for RedisKv {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisKv")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl KeyValue for RedisKv {
    async fn hset_multiple(&self, key: &str, fields: &[(&str, &str)]) -> PollResult<()> {
        let mut conn = self.conn.clone();
        self.bounded("HSET", async move {
            conn.hset_multiple::<_, _, _, ()>(key, fields).await
        })
        .await
    }

    async fn hset(&self, key: &str, field: &str, value: &str) -> PollResult<()> {
        let mut conn = self.conn.clone();
        self.bounded("HSET", async move {
            conn.hset::<_, _, _, ()>(key, field, value).await
        })
        .await
    }

    async fn hexists(&self, key: &str, field: &str) -> PollResult<bool> {
        let mut conn = self.conn.clone();
        self.bounded("HEXISTS", async move {
            conn.hexists::<_, _, bool>(key, field).await
        })
        .await
    }

    async fn hgetall(&self, key: &str) -> PollResult<HashMap<String, String>> {
        let mut conn = self.conn.clone();
        self.bounded("HGETALL", async move {
            conn.hgetall::<_, HashMap<String, String>>(key).await
        })
        .await
    }

    async fn sadd(&self, key: &str, member: &str) -> PollResult<bool> {
        let mut conn = self.conn.clone();
        let added = self
            .bounded("SADD", async move { conn.sadd::<_, _, u64>(key, member).await })
            .await?;
        Ok(added > 0)
    }

    async fn toggle_member(&self, key: &str, member: &str) -> PollResult<bool> {
        let mut conn = self.conn.clone();
        let mut invocation = TOGGLE_MEMBER.prepare_invoke();
        invocation.key(key).arg(member);
        let is_member = self
            .bounded("EVALSHA toggle_member", async move {
                let is_member: redis::RedisResult<i64> = invocation.invoke_async(&mut conn).await;
                is_member
            })
            .await?;
        Ok(is_member == 1)
    }

    async fn smembers(&self, key: &str) -> PollResult<Vec<String>> {
        let mut conn = self.conn.clone();
        self.bounded("SMEMBERS", async move {
            conn.smembers::<_, Vec<String>>(key).await
        })
        .await
    }

    async fn lrange_all(&self, key: &str) -> PollResult<Vec<String>> {
        let mut conn = self.conn.clone();
        self.bounded("LRANGE", async move {
            conn.lrange::<_, Vec<String>>(key, 0, -1).await
        })
        .await
    }

    async fn publish_once(
        &self,
        key: &str,
        guard: &str,
        fields: &[(&str, &str)],
        list_key: &str,
        item: &str,
    ) -> PollResult<bool> {
        let mut conn = self.conn.clone();
        let mut invocation = PUBLISH_ONCE.prepare_invoke();
        invocation.key(key).key(list_key).arg(guard).arg(item);
        for (field, value) in fields {
            invocation.arg(*field).arg(*value);
        }
        let wrote = self
            .bounded("EVALSHA publish_once", async move {
                let wrote: redis::RedisResult<i64> = invocation.invoke_async(&mut conn).await;
                wrote
            })
            .await?;
        Ok(wrote == 1)
    }
}
