//! Pure-logic coverage for the query composition layer (`query.rs`):
//! pagination, windowing, and rank lookup against a deterministic
//! in-process fake backend. No Redis required — these exercise only the
//! offset arithmetic and clamping that compose the board primitives, not
//! the atomic scripts themselves (those are covered, behind `#[ignore]`,
//! in `redis_integration.rs`).

use std::collections::HashMap;
use std::sync::Mutex;

use dbx_leaderboard::error::Result;
use dbx_leaderboard::{Backend, Member, Order};

/// An in-memory sorted set, ties broken lexicographically by member id
/// ascending — the same tie-break Redis uses, reproduced so ordering
/// assertions hold without a live backend.
#[derive(Default)]
struct FakeBackend {
    sets: Mutex<HashMap<String, HashMap<String, f64>>>,
}

impl FakeBackend {
    fn new() -> Self {
        Self::default()
    }

    fn seed(&self, key: &str, members: &[(&str, i64)]) {
        let mut sets = self.sets.lock().unwrap();
        let entry = sets.entry(key.to_string()).or_default();
        for (id, score) in members {
            entry.insert(id.to_string(), *score as f64);
        }
    }

    /// Ascending order: `(score, member_id)`.
    fn ascending(&self, key: &str) -> Vec<(String, f64)> {
        let sets = self.sets.lock().unwrap();
        let mut members: Vec<(String, f64)> = sets
            .get(key)
            .map(|m| m.iter().map(|(k, v)| (k.clone(), *v)).collect())
            .unwrap_or_default();
        members.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap().then_with(|| a.0.cmp(&b.0)));
        members
    }
}

fn slice(list: &[(String, f64)], start: isize, stop: isize) -> Vec<(String, i64)> {
    let len = list.len() as isize;
    if len == 0 {
        return Vec::new();
    }
    let start = start.clamp(0, len - 1);
    let stop = stop.clamp(0, len - 1);
    if start > stop {
        return Vec::new();
    }
    list[start as usize..=stop as usize]
        .iter()
        .map(|(m, s)| (m.clone(), s.round() as i64))
        .collect()
}

impl Backend for FakeBackend {
    fn zadd(&self, key: &str, members: &[(i64, &str)]) -> Result<()> {
        let mut sets = self.sets.lock().unwrap();
        let entry = sets.entry(key.to_string()).or_default();
        for (score, member) in members {
            entry.insert(member.to_string(), *score as f64);
        }
        Ok(())
    }

    fn zincrby(&self, key: &str, delta: i64, member: &str) -> Result<i64> {
        let mut sets = self.sets.lock().unwrap();
        let entry = sets.entry(key.to_string()).or_default();
        let score = entry.entry(member.to_string()).or_insert(0.0);
        *score += delta as f64;
        Ok(*score as i64)
    }

    fn zrank(&self, key: &str, member: &str) -> Result<Option<u64>> {
        Ok(self.ascending(key).iter().position(|(m, _)| m == member).map(|i| i as u64))
    }

    fn zrevrank(&self, key: &str, member: &str) -> Result<Option<u64>> {
        let asc = self.ascending(key);
        let len = asc.len();
        Ok(asc
            .iter()
            .position(|(m, _)| m == member)
            .map(|i| (len - 1 - i) as u64))
    }

    fn zscore(&self, key: &str, member: &str) -> Result<Option<i64>> {
        let sets = self.sets.lock().unwrap();
        Ok(sets.get(key).and_then(|m| m.get(member)).map(|s| s.round() as i64))
    }

    fn zrange_withscores(&self, key: &str, start: isize, stop: isize) -> Result<Vec<(String, i64)>> {
        Ok(slice(&self.ascending(key), start, stop))
    }

    fn zrevrange_withscores(&self, key: &str, start: isize, stop: isize) -> Result<Vec<(String, i64)>> {
        let mut desc = self.ascending(key);
        desc.reverse();
        Ok(slice(&desc, start, stop))
    }

    fn zrevrangebyscore_limit(
        &self,
        key: &str,
        max: i64,
        min: i64,
        offset: isize,
        count: isize,
    ) -> Result<Vec<(String, i64)>> {
        let mut desc = self.ascending(key);
        desc.reverse();
        let filtered: Vec<(String, i64)> = desc
            .into_iter()
            .filter(|(_, s)| *s as i64 <= max && *s as i64 >= min)
            .map(|(m, s)| (m, s.round() as i64))
            .collect();
        let offset = offset.max(0) as usize;
        if offset >= filtered.len() {
            return Ok(Vec::new());
        }
        let end = if count < 0 {
            filtered.len()
        } else {
            (offset + count as usize).min(filtered.len())
        };
        Ok(filtered[offset..end].to_vec())
    }

    fn zcard(&self, key: &str) -> Result<u64> {
        Ok(self.sets.lock().unwrap().get(key).map(|m| m.len()).unwrap_or(0) as u64)
    }

    fn zrem(&self, key: &str, members: &[&str]) -> Result<u64> {
        let mut sets = self.sets.lock().unwrap();
        let mut removed = 0;
        if let Some(entry) = sets.get_mut(key) {
            for member in members {
                if entry.remove(*member).is_some() {
                    removed += 1;
                }
            }
        }
        Ok(removed)
    }

    fn ttl(&self, _key: &str) -> Result<i64> {
        Ok(-1)
    }

    fn expireat(&self, _key: &str, _unix_ts: i64) -> Result<()> {
        Ok(())
    }

    fn sadd(&self, _key: &str, _member: &str) -> Result<()> {
        Ok(())
    }

    fn del(&self, key: &str) -> Result<()> {
        self.sets.lock().unwrap().remove(key);
        Ok(())
    }

    fn eval_script(&self, _script: &str, _keys: &[&str], _args: &[String]) -> Result<::redis::Value> {
        unimplemented!("query composition never calls eval_script")
    }
}

fn ids(members: &[Member]) -> Vec<&str> {
    members.iter().map(|m| m.public_id.as_str()).collect()
}

fn ranks(members: &[Member]) -> Vec<i64> {
    members.iter().map(|m| m.rank).collect()
}

// S1: empty board.
#[test]
fn s1_empty_board_returns_empty_leaders_and_zero_pages() {
    let backend = FakeBackend::new();
    use dbx_leaderboard::query;

    assert_eq!(query::total_members(&backend, "lb1").unwrap(), 0);
    assert_eq!(query::total_pages(0, 10), 0);
    let leaders = query::get_leaders(&backend, "lb1", 1, 10, Order::Desc).unwrap();
    assert!(leaders.is_empty());

    let err = query::get_rank(&backend, "lb1", "lb1", "alice", Order::Desc).unwrap_err();
    assert!(matches!(
        err,
        dbx_leaderboard::LeaderboardError::MemberNotFound { .. }
    ));
}

// S3: 10 members a..j scored 10..1, page_size=4.
fn seed_lb2(backend: &FakeBackend) {
    let letters: Vec<String> = "abcdefghij".chars().map(|c| c.to_string()).collect();
    let members: Vec<(&str, i64)> = letters
        .iter()
        .enumerate()
        .map(|(i, id)| (id.as_str(), 10 - i as i64))
        .collect();
    backend.seed("lb2", &members);
}

#[test]
fn s3_leaders_page_two_desc() {
    let backend = FakeBackend::new();
    seed_lb2(&backend);
    use dbx_leaderboard::query;

    let leaders = query::get_leaders(&backend, "lb2", 2, 4, Order::Desc).unwrap();
    assert_eq!(ids(&leaders), vec!["e", "f", "g", "h"]);
    assert_eq!(ranks(&leaders), vec![5, 6, 7, 8]);
}

#[test]
fn s3_around_me_window_contains_target_and_is_page_sized() {
    let backend = FakeBackend::new();
    seed_lb2(&backend);
    use dbx_leaderboard::query;

    let window = query::get_around_me(&backend, "lb2", "lb2", "f", 4, Order::Desc, false).unwrap();
    assert_eq!(window.len(), 4);
    assert!(ids(&window).contains(&"f"));
    assert_eq!(ranks(&window), vec![5, 6, 7, 8]);
}

// S7: GetAroundScore pivots to the highest-ranked member with score <= target.
#[test]
fn s7_around_score_pivots_to_top_scorer() {
    let backend = FakeBackend::new();
    seed_lb2(&backend);
    use dbx_leaderboard::query;

    let window = query::get_around_score(&backend, "lb2", "lb2", 45, 4, Order::Desc).unwrap();
    assert_eq!(ranks(&window)[0], 1);
    assert!(ids(&window).contains(&"a"));
}

// Property 2: distinct scores, desc order -> ranks strictly increase as score strictly decreases.
#[test]
fn property_desc_ranks_increase_as_score_decreases() {
    let backend = FakeBackend::new();
    seed_lb2(&backend);
    use dbx_leaderboard::query;

    let leaders = query::get_leaders(&backend, "lb2", 1, 10, Order::Desc).unwrap();
    for pair in leaders.windows(2) {
        assert!(pair[0].score > pair[1].score);
        assert!(pair[0].rank < pair[1].rank);
    }
}

// Property 3: TotalPages = ceil(TotalMembers / page_size); leaders page length matches the formula.
#[test]
fn property_total_pages_and_page_length() {
    let backend = FakeBackend::new();
    seed_lb2(&backend);
    use dbx_leaderboard::query;

    let card = query::total_members(&backend, "lb2").unwrap();
    assert_eq!(card, 10);
    let pages = query::total_pages(card, 4);
    assert_eq!(pages, 3);

    for page in 1..=pages {
        let leaders = query::get_leaders(&backend, "lb2", page as i64, 4, Order::Desc).unwrap();
        let expected = (card as i64 - (page as i64 - 1) * 4).clamp(0, 4) as usize;
        assert_eq!(leaders.len(), expected);
    }
}

// Property 4: GetAroundMe returns at most page_size members, exactly page_size when card >= page_size.
#[test]
fn property_around_me_is_page_sized_when_board_is_large_enough() {
    let backend = FakeBackend::new();
    seed_lb2(&backend);
    use dbx_leaderboard::query;

    for member in "abcdefghij".chars() {
        let id = member.to_string();
        let window = query::get_around_me(&backend, "lb2", "lb2", &id, 4, Order::Desc, false).unwrap();
        assert_eq!(window.len(), 4);
        assert!(ids(&window).contains(&id.as_str()));
    }
}

#[test]
fn get_around_me_propagates_not_found_when_flag_is_unset() {
    let backend = FakeBackend::new();
    seed_lb2(&backend);
    use dbx_leaderboard::query;

    let err = query::get_around_me(&backend, "lb2", "lb2", "ghost", 4, Order::Desc, false).unwrap_err();
    assert!(matches!(
        err,
        dbx_leaderboard::LeaderboardError::MemberNotFound { .. }
    ));
}

#[test]
fn get_around_me_synthesizes_last_page_when_not_found_and_flag_is_set() {
    let backend = FakeBackend::new();
    seed_lb2(&backend);
    use dbx_leaderboard::query;

    let window = query::get_around_me(&backend, "lb2", "lb2", "ghost", 4, Order::Desc, true).unwrap();
    assert_eq!(ids(&window), vec!["g", "h", "i", "j"]);
}
