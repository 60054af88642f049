//! Value types shared by every board primitive and query.

use serde::{Deserialize, Serialize};

/// A ranked entry returned to callers. Field names follow external
/// serialization contract directly so a caller can hand this struct to an
/// HTTP layer without a translation type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    #[serde(rename = "publicID")]
    pub public_id: String,
    pub score: i64,
    /// 1-based, always in `[1, board cardinality]`.
    pub rank: i64,
    /// 1-based, or `-1` when absent (newly inserted) or not requested.
    #[serde(rename = "previousRank")]
    pub previous_rank: i64,
    /// Unix seconds, or `0` when the member has no per-score TTL.
    #[serde(rename = "expireAt")]
    pub expire_at: i64,
}

impl Member {
    pub(crate) fn new(public_id: impl Into<String>, score: i64, rank: i64) -> Self {
        Self {
            public_id: public_id.into(),
            score,
            rank,
            previous_rank: -1,
            expire_at: 0,
        }
    }
}

/// Ranking direction. Any value other than the literal `"asc"` coerces to
/// `Desc` per — invalid order strings are never rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Asc,
    Desc,
}

impl Order {
    pub fn parse(raw: &str) -> Self {
        if raw == "asc" {
            Order::Asc
        } else {
            Order::Desc
        }
    }

    pub fn is_asc(self) -> bool {
        matches!(self, Order::Asc)
    }
}

impl Default for Order {
    fn default() -> Self {
        Order::Desc
    }
}

/// Per-score TTL argument. Empty string or the literal `"inf"` disables
/// per-score expiry; otherwise a non-negative decimal number of seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreTtl {
    None,
    Seconds(u64),
}

impl ScoreTtl {
    pub fn parse(raw: &str) -> Self {
        if raw.is_empty() || raw == "inf" {
            return ScoreTtl::None;
        }
        match raw.parse::<u64>() {
            Ok(seconds) => ScoreTtl::Seconds(seconds),
            Err(_) => ScoreTtl::None,
        }
    }

    pub fn is_set(self) -> bool {
        matches!(self, ScoreTtl::Seconds(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_coerces_unknown_values_to_desc() {
        assert_eq!(Order::parse("desc"), Order::Desc);
        assert_eq!(Order::parse("asc"), Order::Asc);
        assert_eq!(Order::parse("ASC"), Order::Desc);
        assert_eq!(Order::parse("bogus"), Order::Desc);
        assert_eq!(Order::parse(""), Order::Desc);
    }

    #[test]
    fn score_ttl_parses_inf_and_empty_as_disabled() {
        assert_eq!(ScoreTtl::parse(""), ScoreTtl::None);
        assert_eq!(ScoreTtl::parse("inf"), ScoreTtl::None);
        assert_eq!(ScoreTtl::parse("3600"), ScoreTtl::Seconds(3600));
        assert!(!ScoreTtl::parse("").is_set());
        assert!(ScoreTtl::parse("60").is_set());
    }

    #[test]
    fn score_ttl_falls_back_to_disabled_on_garbage() {
        assert_eq!(ScoreTtl::parse("not-a-number"), ScoreTtl::None);
    }
}
