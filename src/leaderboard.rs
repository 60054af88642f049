//! The public API surface: a `Leaderboard` handle bound to one board's
//! `public_id` and `page_size`, dispatching to [`crate::board`] and
//! [`crate::query`].

use std::sync::Arc;

use crate::backend::Backend;
use crate::board::{self, WriteOptions, WriteRequest};
use crate::error::Result;
use crate::member::{Member, Order, ScoreTtl};
use crate::query;

/// Supplies the absolute whole-board expiry timestamp for a given
/// `public_id`; `-1` disables whole-board expiry for that call. An
/// external collaborator — this engine never derives it itself.
pub trait ExpirationPolicy: Send + Sync {
    fn expire_at(&self, public_id: &str) -> i64;
}

impl<F> ExpirationPolicy for F
where
    F: Fn(&str) -> i64 + Send + Sync,
{
    fn expire_at(&self, public_id: &str) -> i64 {
        self(public_id)
    }
}

/// An [`ExpirationPolicy`] that never sets a whole-board TTL.
pub struct NoExpiration;

impl ExpirationPolicy for NoExpiration {
    fn expire_at(&self, _public_id: &str) -> i64 {
        -1
    }
}

/// A cheap, `Clone`-able handle bound to one board. Holds no connection of
/// its own — `backend` is shared (`Arc<dyn Backend>`).
#[derive(Clone)]
pub struct Leaderboard {
    public_id: String,
    page_size: u32,
    backend: Arc<dyn Backend>,
    expiration: Arc<dyn ExpirationPolicy>,
}

impl Leaderboard {
    pub fn new(public_id: impl Into<String>, page_size: u32, backend: Arc<dyn Backend>) -> Self {
        Self {
            public_id: public_id.into(),
            page_size,
            backend,
            expiration: Arc::new(NoExpiration),
        }
    }

    pub fn with_expiration_policy(mut self, policy: Arc<dyn ExpirationPolicy>) -> Self {
        self.expiration = policy;
        self
    }

    pub fn public_id(&self) -> &str {
        &self.public_id
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    fn ttl_key(&self) -> String {
        format!("{}:ttl", self.public_id)
    }

    fn write_options(&self, want_previous_rank: bool, score_ttl: ScoreTtl, now_unix: i64) -> WriteOptions {
        WriteOptions {
            expire_at_absolute: self.expiration.expire_at(&self.public_id),
            want_previous_rank,
            score_ttl,
            now_unix,
        }
    }

    /// Bulk set. Result order follows `members`.
    #[tracing::instrument(skip(self, members))]
    pub fn set_members_score(
        &self,
        members: &[(&str, i64)],
        want_previous_rank: bool,
        score_ttl: ScoreTtl,
        now_unix: i64,
    ) -> Result<Vec<Member>> {
        let requests: Vec<WriteRequest<'_>> = members
            .iter()
            .map(|(public_id, score)| WriteRequest {
                public_id,
                score: *score,
            })
            .collect();
        let options = self.write_options(want_previous_rank, score_ttl, now_unix);
        let outcomes = board::bulk_set(self.backend.as_ref(), &self.public_id, &requests, options)?;
        Ok(outcomes.into_iter().map(board::into_member).collect())
    }

    /// Single-member convenience wrapper over [`Self::set_members_score`].
    #[tracing::instrument(skip(self))]
    pub fn set_member_score(
        &self,
        public_id: &str,
        score: i64,
        want_previous_rank: bool,
        score_ttl: ScoreTtl,
        now_unix: i64,
    ) -> Result<Member> {
        let mut result = self.set_members_score(&[(public_id, score)], want_previous_rank, score_ttl, now_unix)?;
        Ok(result.remove(0))
    }

    /// Bulk increment. `members[i].1` is the delta.
    #[tracing::instrument(skip(self, members))]
    pub fn increment_members_score(
        &self,
        members: &[(&str, i64)],
        score_ttl: ScoreTtl,
        now_unix: i64,
    ) -> Result<Vec<Member>> {
        let requests: Vec<WriteRequest<'_>> = members
            .iter()
            .map(|(public_id, delta)| WriteRequest {
                public_id,
                score: *delta,
            })
            .collect();
        let options = self.write_options(false, score_ttl, now_unix);
        let outcomes = board::bulk_increment(self.backend.as_ref(), &self.public_id, &requests, options)?;
        Ok(outcomes.into_iter().map(board::into_member).collect())
    }

    /// Single-member convenience wrapper over [`Self::increment_members_score`].
    #[tracing::instrument(skip(self))]
    pub fn increment_member_score(&self, public_id: &str, delta: i64, score_ttl: ScoreTtl, now_unix: i64) -> Result<Member> {
        let mut result = self.increment_members_score(&[(public_id, delta)], score_ttl, now_unix)?;
        Ok(result.remove(0))
    }

    /// Single get. `MemberNotFound` when absent.
    #[tracing::instrument(skip(self))]
    pub fn get_member(&self, public_id: &str, order: Order, include_ttl: bool) -> Result<Member> {
        match board::get_member(self.backend.as_ref(), &self.public_id, public_id, order, include_ttl)? {
            Some(member) => Ok(member),
            None => Err(crate::error::LeaderboardError::MemberNotFound {
                board_id: self.public_id.clone(),
                member_id: public_id.to_string(),
            }),
        }
    }

    /// Bulk get. Missing members are silently omitted.
    #[tracing::instrument(skip(self, public_ids))]
    pub fn get_members(&self, public_ids: &[String], order: Order, include_ttl: bool) -> Result<Vec<Member>> {
        board::get_members(self.backend.as_ref(), &self.public_id, public_ids, order, include_ttl)
    }

    /// Top percentage.
    #[tracing::instrument(skip(self))]
    pub fn get_top_percentage(&self, percent: u32, max_members: u32, order: Order) -> Result<Vec<Member>> {
        board::top_percentage(self.backend.as_ref(), &self.public_id, percent, max_members, order)
    }

    /// `ZCARD`.
    #[tracing::instrument(skip(self))]
    pub fn total_members(&self) -> Result<u64> {
        query::total_members(self.backend.as_ref(), &self.public_id)
    }

    /// `ceil(cardinality / page_size)`.
    #[tracing::instrument(skip(self))]
    pub fn total_pages(&self) -> Result<u64> {
        let card = self.total_members()?;
        Ok(query::total_pages(card, self.page_size))
    }

    /// A page of leaders.
    #[tracing::instrument(skip(self))]
    pub fn get_leaders(&self, page: i64, order: Order) -> Result<Vec<Member>> {
        query::get_leaders(self.backend.as_ref(), &self.public_id, page, self.page_size, order)
    }

    /// A `page_size`-wide window around `public_id`.
    #[tracing::instrument(skip(self))]
    pub fn get_around_me(&self, public_id: &str, order: Order, get_last_if_not_found: bool) -> Result<Vec<Member>> {
        query::get_around_me(
            self.backend.as_ref(),
            &self.public_id,
            &self.public_id,
            public_id,
            self.page_size,
            order,
            get_last_if_not_found,
        )
    }

    /// A `page_size`-wide window around the highest-ranked member with
    /// score `<= score`.
    #[tracing::instrument(skip(self))]
    pub fn get_around_score(&self, score: i64, order: Order) -> Result<Vec<Member>> {
        query::get_around_score(self.backend.as_ref(), &self.public_id, &self.public_id, score, self.page_size, order)
    }

    /// Direct rank lookup. `MemberNotFound` when absent.
    #[tracing::instrument(skip(self))]
    pub fn get_rank(&self, public_id: &str, order: Order) -> Result<i64> {
        query::get_rank(self.backend.as_ref(), &self.public_id, &self.public_id, public_id, order)
    }

    /// `ZREM` on the score index. The expiry sibling index is
    /// untouched — stale entries are the compactor's problem.
    #[tracing::instrument(skip(self))]
    pub fn remove_member(&self, public_id: &str) -> Result<()> {
        self.remove_members(&[public_id])
    }

    #[tracing::instrument(skip(self, public_ids))]
    pub fn remove_members(&self, public_ids: &[&str]) -> Result<()> {
        self.backend.zrem(&self.public_id, public_ids)?;
        Ok(())
    }

    /// `DEL` on the score-index key. Sibling expiry key and registry
    /// entry are untouched.
    #[tracing::instrument(skip(self))]
    pub fn remove_leaderboard(&self) -> Result<()> {
        self.backend.del(&self.public_id)
    }

    /// The expiry sibling key this board writes to, for callers that want
    /// to inspect it directly (e.g. a compactor iterating `expiration-sets`).
    pub fn ttl_index_key(&self) -> String {
        self.ttl_key()
    }
}
