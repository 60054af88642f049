//! Error types returned by the leaderboard engine.
//!
//! Three disjoint outcomes, matching the error surface a caller has to
//! handle: a missing member, a rejected argument, and an unmodified
//! backend failure.

use thiserror::Error;

/// Errors produced by board primitives and query composition.
#[derive(Debug, Error)]
pub enum LeaderboardError {
    /// Raised only by `get_member`, `get_members` (single form) and
    /// `get_rank`. Bulk reads omit missing members instead of erroring.
    #[error("member `{member_id}` not found on board `{board_id}`")]
    MemberNotFound { board_id: String, member_id: String },

    /// A caller-supplied argument is outside its valid domain, e.g. a
    /// top-percentage request outside `[1, 100]`.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Propagated unchanged from the backend. The engine never retries.
    #[error("backend error: {0}")]
    Backend(#[from] redis::RedisError),

    /// The backend returned a shape the atomic script did not expect,
    /// e.g. the board key vanished right after a bulk write (the write
    /// script returns an empty reply rather than a script error in that
    /// case, so the client side is what raises it).
    #[error("backend invariant violated: {0}")]
    Invariant(String),
}

pub type Result<T> = std::result::Result<T, LeaderboardError>;
