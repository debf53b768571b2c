use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use redis::{AsyncCommands, aio::MultiplexedConnection};
use tokio::sync::RwLock;
use tokio::time::timeout;
use tracing::{debug, trace, warn};

use crate::cache::FastTier;
use crate::errors::{LinkletError, Result};

/// Redis-backed fast tier.
///
/// The connection is established lazily and cached; a Redis outage never
/// fails construction, it only degrades every operation into a soft error
/// that callers fall through on.
pub struct RedisFastTier {
    client: redis::Client,
    /// 持久化连接，使用 RwLock 保护
    connection: Arc<RwLock<Option<MultiplexedConnection>>>,
    key_prefix: String,
    op_timeout: Duration,
}

impl RedisFastTier {
    pub fn new(url: &str, key_prefix: &str, op_timeout_ms: u64) -> Result<Self> {
        let client = redis::Client::open(url)
            .map_err(|e| LinkletError::cache_connection(format!("Invalid Redis URL: {}", e)))?;

        debug!(
            "RedisFastTier created with prefix: '{}', op timeout: {}ms",
            key_prefix, op_timeout_ms
        );

        Ok(Self {
            client,
            connection: Arc::new(RwLock::new(None)),
            key_prefix: key_prefix.to_string(),
            op_timeout: Duration::from_millis(op_timeout_ms),
        })
    }

    /// 获取或建立持久连接
    async fn get_connection(&self) -> Result<MultiplexedConnection> {
        // 首先尝试读取现有连接
        {
            let conn_guard = self.connection.read().await;
            if let Some(ref conn) = *conn_guard {
                return Ok(conn.clone());
            }
        }

        // 需要建立新连接
        let mut conn_guard = self.connection.write().await;

        // 双重检查，避免竞态条件
        if let Some(ref conn) = *conn_guard {
            return Ok(conn.clone());
        }

        let new_conn = timeout(
            self.op_timeout,
            self.client.get_multiplexed_async_connection(),
        )
        .await
        .map_err(|_| LinkletError::cache_connection("Redis connect timed out"))?
        .map_err(|e| LinkletError::cache_connection(format!("Redis connect failed: {}", e)))?;

        *conn_guard = Some(new_conn.clone());
        debug!("Redis connection established and cached");

        Ok(new_conn)
    }

    /// 重置连接（在连接错误时调用）
    async fn reset_connection(&self) {
        let mut conn_guard = self.connection.write().await;
        *conn_guard = None;
        debug!("Redis connection reset due to error");
    }

    fn make_key(&self, key: &str) -> String {
        format!("{}{}", self.key_prefix, key)
    }

    /// 对单个命令施加超时；超时降级为软错误
    async fn run<T>(
        &self,
        op: &str,
        fut: impl Future<Output = redis::RedisResult<T>>,
    ) -> Result<T> {
        match timeout(self.op_timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                warn!("Redis {} failed: {}", op, e);
                self.reset_connection().await;
                Err(LinkletError::cache_operation(format!(
                    "Redis {} failed: {}",
                    op, e
                )))
            }
            Err(_) => {
                warn!("Redis {} timed out after {:?}", op, self.op_timeout);
                self.reset_connection().await;
                Err(LinkletError::cache_operation(format!(
                    "Redis {} timed out",
                    op
                )))
            }
        }
    }
}

#[async_trait]
impl FastTier for RedisFastTier {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let redis_key = self.make_key(key);
        let mut conn = self.get_connection().await?;

        let value: Option<String> = self.run("GET", conn.get(&redis_key)).await?;
        trace!("Redis GET {}: hit={}", key, value.is_some());
        Ok(value)
    }

    async fn set_with_ttl(&self, key: &str, value: &str, ttl_secs: u64) -> Result<()> {
        let redis_key = self.make_key(key);
        let mut conn = self.get_connection().await?;

        self.run(
            "SETEX",
            conn.set_ex::<_, _, ()>(&redis_key, value, ttl_secs),
        )
        .await?;
        trace!("Redis SETEX {} (ttl={}s)", key, ttl_secs);
        Ok(())
    }

    async fn expire(&self, key: &str, ttl_secs: u64) -> Result<()> {
        let redis_key = self.make_key(key);
        let mut conn = self.get_connection().await?;

        self.run("EXPIRE", conn.expire::<_, ()>(&redis_key, ttl_secs as i64))
            .await?;
        Ok(())
    }

    async fn incr(&self, key: &str) -> Result<i64> {
        let redis_key = self.make_key(key);
        let mut conn = self.get_connection().await?;

        let value: i64 = self.run("INCR", conn.incr(&redis_key, 1i64)).await?;
        Ok(value)
    }

    async fn del(&self, key: &str) -> Result<()> {
        let redis_key = self.make_key(key);
        let mut conn = self.get_connection().await?;

        self.run("DEL", conn.del::<_, ()>(&redis_key)).await?;
        Ok(())
    }

    async fn scan(&self, cursor: u64, pattern: &str) -> Result<(u64, Vec<String>)> {
        let mut conn = self.get_connection().await?;
        let prefixed_pattern = self.make_key(pattern);

        let (next_cursor, keys): (u64, Vec<String>) = self
            .run(
                "SCAN",
                redis::cmd("SCAN")
                    .arg(cursor)
                    .arg("MATCH")
                    .arg(&prefixed_pattern)
                    .arg("COUNT")
                    .arg(100)
                    .query_async(&mut conn),
            )
            .await?;

        // 去掉实例级前缀，调用方只看到逻辑键名
        let keys = keys
            .into_iter()
            .map(|k| {
                k.strip_prefix(&self.key_prefix)
                    .map(str::to_string)
                    .unwrap_or(k)
            })
            .collect();

        Ok((next_cursor, keys))
    }
}
