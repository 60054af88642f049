//! Redis implementation of [`super::Backend`].
//!
//! A single guarded `redis::Connection` behind an `Arc<Mutex<_>>`,
//! commands issued with `redis::cmd(...)` rather than the typed
//! `Commands` extension trait so that integer scores round-trip without
//! going through `f64` twice.
//!
//! Redis sorted-set scores are IEEE-754 doubles; scores outside
//! `[-2^53, 2^53]` lose precision on this backend (see DESIGN.md).

use std::sync::{Arc, Mutex};

use redis::{Client, Connection, RedisResult as RedisLibResult};

use crate::error::{LeaderboardError, Result};

use super::Backend;

/// A Redis-backed [`Backend`], cloneable and cheap (an `Arc`-guarded
/// connection).
#[derive(Clone)]
pub struct RedisBackend {
    conn: Arc<Mutex<Connection>>,
}

impl RedisBackend {
    /// Connects using a `redis://` URL.
    pub fn from_url(url: &str) -> Result<Self> {
        let client = Client::open(url).map_err(LeaderboardError::Backend)?;
        let conn = client.get_connection().map_err(LeaderboardError::Backend)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn from_config(config: &crate::config::BackendConfig) -> Result<Self> {
        Self::from_url(&config.redis_url)
    }

    /// Wraps an already-established connection.
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    fn with_conn<T>(&self, f: impl FnOnce(&mut Connection) -> RedisLibResult<T>) -> Result<T> {
        let mut conn = self.conn.lock().unwrap();
        f(&mut conn).map_err(LeaderboardError::Backend)
    }
}

impl Backend for RedisBackend {
    fn zadd(&self, key: &str, members: &[(i64, &str)]) -> Result<()> {
        self.with_conn(|conn| {
            let mut cmd = redis::cmd("ZADD");
            cmd.arg(key);
            for (score, member) in members {
                cmd.arg(*score).arg(*member);
            }
            cmd.query::<redis::Value>(conn)
        })?;
        Ok(())
    }

    fn zincrby(&self, key: &str, delta: i64, member: &str) -> Result<i64> {
        self.with_conn(|conn| {
            redis::cmd("ZINCRBY")
                .arg(key)
                .arg(delta)
                .arg(member)
                .query::<f64>(conn)
        })
        .map(|score| score.round() as i64)
    }

    fn zrank(&self, key: &str, member: &str) -> Result<Option<u64>> {
        self.with_conn(|conn| redis::cmd("ZRANK").arg(key).arg(member).query(conn))
    }

    fn zrevrank(&self, key: &str, member: &str) -> Result<Option<u64>> {
        self.with_conn(|conn| redis::cmd("ZREVRANK").arg(key).arg(member).query(conn))
    }

    fn zscore(&self, key: &str, member: &str) -> Result<Option<i64>> {
        let raw: Option<f64> =
            self.with_conn(|conn| redis::cmd("ZSCORE").arg(key).arg(member).query(conn))?;
        Ok(raw.map(|s| s.round() as i64))
    }

    fn zrange_withscores(&self, key: &str, start: isize, stop: isize) -> Result<Vec<(String, i64)>> {
        let raw: Vec<(String, f64)> = self.with_conn(|conn| {
            redis::cmd("ZRANGE")
                .arg(key)
                .arg(start)
                .arg(stop)
                .arg("WITHSCORES")
                .query(conn)
        })?;
        Ok(raw.into_iter().map(|(m, s)| (m, s.round() as i64)).collect())
    }

    fn zrevrange_withscores(&self, key: &str, start: isize, stop: isize) -> Result<Vec<(String, i64)>> {
        let raw: Vec<(String, f64)> = self.with_conn(|conn| {
            redis::cmd("ZREVRANGE")
                .arg(key)
                .arg(start)
                .arg(stop)
                .arg("WITHSCORES")
                .query(conn)
        })?;
        Ok(raw.into_iter().map(|(m, s)| (m, s.round() as i64)).collect())
    }

    fn zrevrangebyscore_limit(
        &self,
        key: &str,
        max: i64,
        min: i64,
        offset: isize,
        count: isize,
    ) -> Result<Vec<(String, i64)>> {
        let raw: Vec<(String, f64)> = self.with_conn(|conn| {
            redis::cmd("ZREVRANGEBYSCORE")
                .arg(key)
                .arg(max)
                .arg(min)
                .arg("WITHSCORES")
                .arg("LIMIT")
                .arg(offset)
                .arg(count)
                .query(conn)
        })?;
        Ok(raw.into_iter().map(|(m, s)| (m, s.round() as i64)).collect())
    }

    fn zcard(&self, key: &str) -> Result<u64> {
        self.with_conn(|conn| redis::cmd("ZCARD").arg(key).query(conn))
    }

    fn zrem(&self, key: &str, members: &[&str]) -> Result<u64> {
        self.with_conn(|conn| {
            let mut cmd = redis::cmd("ZREM");
            cmd.arg(key);
            for member in members {
                cmd.arg(*member);
            }
            cmd.query(conn)
        })
    }

    fn ttl(&self, key: &str) -> Result<i64> {
        self.with_conn(|conn| redis::cmd("TTL").arg(key).query(conn))
    }

    fn expireat(&self, key: &str, unix_ts: i64) -> Result<()> {
        self.with_conn(|conn| redis::cmd("EXPIREAT").arg(key).arg(unix_ts).query::<redis::Value>(conn))?;
        Ok(())
    }

    fn sadd(&self, key: &str, member: &str) -> Result<()> {
        self.with_conn(|conn| redis::cmd("SADD").arg(key).arg(member).query::<redis::Value>(conn))?;
        Ok(())
    }

    fn del(&self, key: &str) -> Result<()> {
        self.with_conn(|conn| redis::cmd("DEL").arg(key).query::<redis::Value>(conn))?;
        Ok(())
    }

    fn eval_script(&self, script: &str, keys: &[&str], args: &[String]) -> Result<redis::Value> {
        self.with_conn(|conn| {
            let script = redis::Script::new(script);
            let mut invocation = script.prepare_invoke();
            for key in keys {
                invocation.key(*key);
            }
            for arg in args {
                invocation.arg(arg);
            }
            invocation.invoke(conn)
        })
    }
}
