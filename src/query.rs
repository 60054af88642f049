//! Query composition: pure offset arithmetic and clamping layered
//! on top of the plain backend reads. None of these operations need an
//! atomic script — each is a single backend call, so a consistent
//! snapshot is trivial.

use crate::backend::Backend;
use crate::error::{LeaderboardError, Result};
use crate::member::{Member, Order};

/// `ZCARD`.
pub fn total_members(backend: &dyn Backend, board_key: &str) -> Result<u64> {
    backend.zcard(board_key)
}

/// `ceil(cardinality / page_size)`; `0` when the board is empty.
pub fn total_pages(total_members: u64, page_size: u32) -> u64 {
    if total_members == 0 {
        return 0;
    }
    let page_size = page_size.max(1) as u64;
    (total_members + page_size - 1) / page_size
}

fn range_with_order(
    backend: &dyn Backend,
    board_key: &str,
    order: Order,
    start: isize,
    stop: isize,
) -> Result<Vec<(String, i64)>> {
    if order.is_asc() {
        backend.zrange_withscores(board_key, start, stop)
    } else {
        backend.zrevrange_withscores(board_key, start, stop)
    }
}

/// A page of leaders. `page < 1` coerces to `1`; `page >
/// total_pages` returns an empty page.
pub fn get_leaders(
    backend: &dyn Backend,
    board_key: &str,
    page: i64,
    page_size: u32,
    order: Order,
) -> Result<Vec<Member>> {
    let card = total_members(backend, board_key)?;
    let pages = total_pages(card, page_size);
    let page = page.max(1) as u64;
    if pages == 0 || page > pages {
        return Ok(Vec::new());
    }

    let page_size = page_size.max(1) as i64;
    let start = (page as i64 - 1) * page_size;
    let stop = start + page_size - 1;

    let raw = range_with_order(backend, board_key, order, start as isize, stop as isize)?;
    Ok(raw
        .into_iter()
        .enumerate()
        .map(|(i, (public_id, score))| Member::new(public_id, score, start + i as i64 + 1))
        .collect())
}

/// The member's 1-based rank, if it is found.
fn rank_of(backend: &dyn Backend, board_key: &str, public_id: &str, order: Order) -> Result<Option<i64>> {
    let raw = if order.is_asc() {
        backend.zrank(board_key, public_id)?
    } else {
        backend.zrevrank(board_key, public_id)?
    };
    Ok(raw.map(|r| r as i64 + 1))
}

/// A `page_size`-wide window of leaders centered on `public_id`.
///
/// When `public_id` is absent and `get_last_if_not_found` is set, the
/// window is synthesized around "one past the end" — effectively the
/// last page — instead of failing.
pub fn get_around_me(
    backend: &dyn Backend,
    board_key: &str,
    board_id: &str,
    public_id: &str,
    page_size: u32,
    order: Order,
    get_last_if_not_found: bool,
) -> Result<Vec<Member>> {
    let card = total_members(backend, board_key)? as i64;
    let rank = match rank_of(backend, board_key, public_id, order)? {
        Some(rank) => rank,
        None if get_last_if_not_found => card + 1,
        None => {
            return Err(LeaderboardError::MemberNotFound {
                board_id: board_id.to_string(),
                member_id: public_id.to_string(),
            })
        }
    };

    let page_size_i = page_size.max(1) as i64;
    let mut start = rank - page_size_i / 2;
    if start < 0 {
        start = 0;
    }
    let mut end = start + page_size_i - 1;
    if end > card {
        end = card;
        start = (end - page_size_i).max(0);
    }

    let raw = range_with_order(backend, board_key, order, start as isize, end as isize)?;
    Ok(raw
        .into_iter()
        .enumerate()
        .map(|(i, (id, score))| Member::new(id, score, start + i as i64 + 1))
        .collect())
}

/// Window around the highest-ranked member whose score is `<= score`
///. Falls back to [`get_around_me`] with an unknown member when no
/// such pivot exists (an empty board, or every score below `score`).
pub fn get_around_score(
    backend: &dyn Backend,
    board_key: &str,
    board_id: &str,
    score: i64,
    page_size: u32,
    order: Order,
) -> Result<Vec<Member>> {
    let pivot = backend.zrevrangebyscore_limit(board_key, score, i64::MIN, 0, 1)?;
    match pivot.into_iter().next() {
        Some((public_id, _)) => get_around_me(backend, board_key, board_id, &public_id, page_size, order, true),
        None => get_around_me(backend, board_key, board_id, "", page_size, order, true),
    }
}

/// Direct rank lookup: `MemberNotFound` when absent.
pub fn get_rank(backend: &dyn Backend, board_key: &str, board_id: &str, public_id: &str, order: Order) -> Result<i64> {
    rank_of(backend, board_key, public_id, order)?.ok_or_else(|| LeaderboardError::MemberNotFound {
        board_id: board_id.to_string(),
        member_id: public_id.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_pages_rounds_up_and_is_zero_when_empty() {
        assert_eq!(total_pages(0, 10), 0);
        assert_eq!(total_pages(1, 10), 1);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(11, 10), 2);
        assert_eq!(total_pages(25, 4), 7);
    }

    #[test]
    fn total_pages_treats_zero_page_size_as_one() {
        assert_eq!(total_pages(3, 0), 3);
    }
}
