//! Atomic, Redis-backed leaderboard engine.
//!
//! Three layers, leaves first: [`backend`] (a narrow trait over an
//! ordered-map store), [`board`] (the five atomic write/read primitives),
//! and [`query`] (pagination and windowing composed from the primitives).
//! [`Leaderboard`] binds the three together behind a handle scoped to one
//! board's `public_id`.

pub mod backend;
pub mod board;
pub mod config;
pub mod error;
pub mod leaderboard;
pub mod member;
pub mod query;

pub use backend::{Backend, RedisBackend};
pub use config::BackendConfig;
pub use error::{LeaderboardError, Result};
pub use leaderboard::{ExpirationPolicy, Leaderboard, NoExpiration};
pub use member::{Member, Order, ScoreTtl};

#[cfg(test)]
#[ctor::ctor]
fn init() {
    dotenv::dotenv().ok();
}

#[cfg(test)]
pub(crate) mod test_helpers {
    use std::env;

    /// Redis URL for `#[ignore]`-gated integration tests, with fallback.
    pub fn get_test_redis_url() -> String {
        env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::test_helpers::get_test_redis_url;

    #[test]
    fn test_redis_url_has_a_fallback() {
        let url = get_test_redis_url();
        assert!(url.starts_with("redis://"));
    }
}
