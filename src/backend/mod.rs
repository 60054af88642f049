//! The backend abstraction: a narrow interface over an ordered-map
//! store. Any store implementing these semantics — Redis or a compatible
//! engine — is admissible; `redis` is the only implementation shipped here.
//!
//! One object-safe trait, `Send + Sync`, so a `Leaderboard` handle can
//! hold `Arc<dyn Backend>` and be cheaply `Clone`.

pub mod redis;

use crate::error::Result;

pub use self::redis::RedisBackend;

/// Sorted-set and key primitives the board layer dispatches to.
///
/// All five multi-step mutations go through
/// [`Backend::eval_script`] so that the atomicity unit is the full
/// operation; the remaining methods back the query composition layer
/// and deletion, which read/write with a single backend
/// call and need no further atomicity.
pub trait Backend: Send + Sync {
    /// `ZADD key score member [score member ...]`.
    fn zadd(&self, key: &str, members: &[(i64, &str)]) -> Result<()>;

    /// `ZINCRBY key delta member`, returning the member's new score.
    fn zincrby(&self, key: &str, delta: i64, member: &str) -> Result<i64>;

    /// `ZRANK key member`, 0-based, ascending order.
    fn zrank(&self, key: &str, member: &str) -> Result<Option<u64>>;

    /// `ZREVRANK key member`, 0-based, descending order.
    fn zrevrank(&self, key: &str, member: &str) -> Result<Option<u64>>;

    /// `ZSCORE key member`.
    fn zscore(&self, key: &str, member: &str) -> Result<Option<i64>>;

    /// `ZRANGE key start stop WITHSCORES`.
    fn zrange_withscores(&self, key: &str, start: isize, stop: isize) -> Result<Vec<(String, i64)>>;

    /// `ZREVRANGE key start stop WITHSCORES`.
    fn zrevrange_withscores(&self, key: &str, start: isize, stop: isize) -> Result<Vec<(String, i64)>>;

    /// `ZREVRANGEBYSCORE key max min WITHSCORES LIMIT offset count`.
    fn zrevrangebyscore_limit(
        &self,
        key: &str,
        max: i64,
        min: i64,
        offset: isize,
        count: isize,
    ) -> Result<Vec<(String, i64)>>;

    /// `ZCARD key`.
    fn zcard(&self, key: &str) -> Result<u64>;

    /// `ZREM key member [member ...]`, returning the removed count.
    fn zrem(&self, key: &str, members: &[&str]) -> Result<u64>;

    /// `TTL key`, in seconds; `-1` means no TTL, `-2` means missing key.
    fn ttl(&self, key: &str) -> Result<i64>;

    /// `EXPIREAT key unix_ts`.
    fn expireat(&self, key: &str, unix_ts: i64) -> Result<()>;

    /// `SADD key member`.
    fn sadd(&self, key: &str, member: &str) -> Result<()>;

    /// `DEL key`.
    fn del(&self, key: &str) -> Result<()>;

    /// Executes `script` atomically with respect to every other script and
    /// command touching `keys`, binding `KEYS` to `keys` and `ARGV` to
    /// `args` in order.
    fn eval_script(&self, script: &str, keys: &[&str], args: &[String]) -> Result<::redis::Value>;
}
