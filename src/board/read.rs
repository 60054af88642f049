//! Single get, bulk get, and top-percentage. All three are
//! atomic scripts: each guarantees rank, score, and TTL come from the
//! same snapshot.

use crate::backend::Backend;
use crate::error::{LeaderboardError, Result};
use crate::member::{Member, Order};

use super::scripts::{self, GET_MEMBER, GET_MEMBERS, TOP_PERCENTAGE};

/// Single get. `None` distinguishes "not found" from the 1-based
/// `Member`; the caller (the `Leaderboard` handle) turns `None` into
/// `MemberNotFound`.
pub fn get_member(
    backend: &dyn Backend,
    board_key: &str,
    public_id: &str,
    order: Order,
    include_ttl: bool,
) -> Result<Option<Member>> {
    let ttl_key = format!("{board_key}:ttl");
    let args = vec![
        public_id.to_string(),
        if order.is_asc() { "asc" } else { "desc" }.to_string(),
        if include_ttl { "1" } else { "0" }.to_string(),
        ttl_key,
    ];

    let reply = backend.eval_script(GET_MEMBER, &[board_key], &args)?;
    let flat = scripts::flatten(reply);
    if flat.len() < 3 {
        return Ok(None);
    }

    let rank = scripts::as_int(&flat[0])
        .ok_or_else(|| LeaderboardError::Invariant("missing rank in get reply".into()))?;
    let score = scripts::as_score(&flat[1])
        .ok_or_else(|| LeaderboardError::Invariant("missing score in get reply".into()))?;
    let expire_at = scripts::as_int(&flat[2]).unwrap_or(-1);

    Ok(Some(Member {
        public_id: public_id.to_string(),
        score,
        rank: rank + 1,
        previous_rank: -1,
        expire_at: if expire_at < 0 { 0 } else { expire_at },
    }))
}

/// Bulk get. Missing members are silently omitted; result is
/// sorted by 1-based rank ascending.
pub fn get_members(
    backend: &dyn Backend,
    board_key: &str,
    public_ids: &[String],
    order: Order,
    include_ttl: bool,
) -> Result<Vec<Member>> {
    if public_ids.is_empty() {
        return Ok(Vec::new());
    }

    let ttl_key = format!("{board_key}:ttl");
    let mut args = vec![
        if order.is_asc() { "asc" } else { "desc" }.to_string(),
        if include_ttl { "1" } else { "0" }.to_string(),
        ttl_key,
        public_ids.len().to_string(),
    ];
    args.extend(public_ids.iter().cloned());

    let reply = backend.eval_script(GET_MEMBERS, &[board_key], &args)?;
    let flat = scripts::flatten(reply);
    if flat.len() % 4 != 0 {
        return Err(LeaderboardError::Invariant(format!(
            "bulk get script returned {} elements, not a multiple of 4",
            flat.len()
        )));
    }

    let mut members: Vec<Member> = flat
        .chunks(4)
        .filter_map(|chunk| {
            let public_id = scripts::as_string(&chunk[0])?;
            let rank = scripts::as_int(&chunk[1])?;
            let score = scripts::as_score(&chunk[2])?;
            let expire_at = scripts::as_int(&chunk[3]).unwrap_or(-1);
            Some(Member {
                public_id,
                score,
                rank: rank + 1,
                previous_rank: -1,
                expire_at: if expire_at < 0 { 0 } else { expire_at },
            })
        })
        .collect();

    members.sort_by_key(|m| m.rank);
    Ok(members)
}

/// Top percentage. `percent` must be in `[1, 100]`.
pub fn top_percentage(
    backend: &dyn Backend,
    board_key: &str,
    percent: u32,
    max_members: u32,
    order: Order,
) -> Result<Vec<Member>> {
    if !(1..=100).contains(&percent) {
        return Err(LeaderboardError::InvalidArgument(format!(
            "percent must be in [1, 100], got {percent}"
        )));
    }

    let args = vec![
        percent.to_string(),
        max_members.to_string(),
        if order.is_asc() { "asc" } else { "desc" }.to_string(),
    ];

    let reply = backend.eval_script(TOP_PERCENTAGE, &[board_key], &args)?;
    let flat = scripts::flatten(reply);
    if flat.len() % 3 != 0 {
        return Err(LeaderboardError::Invariant(format!(
            "top-percentage script returned {} elements, not a multiple of 3",
            flat.len()
        )));
    }

    flat.chunks(3)
        .map(|chunk| {
            let public_id = scripts::as_string(&chunk[0])
                .ok_or_else(|| LeaderboardError::Invariant("missing member id in top-percentage reply".into()))?;
            let rank = scripts::as_int(&chunk[1])
                .ok_or_else(|| LeaderboardError::Invariant("missing rank in top-percentage reply".into()))?;
            let score = scripts::as_score(&chunk[2])
                .ok_or_else(|| LeaderboardError::Invariant("missing score in top-percentage reply".into()))?;
            Ok(Member {
                public_id,
                score,
                rank: rank + 1,
                previous_rank: -1,
                expire_at: 0,
            })
        })
        .collect()
}
