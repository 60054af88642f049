//! Bulk set / bulk increment and the single-member convenience
//! wrappers.

use crate::backend::Backend;
use crate::error::{LeaderboardError, Result};
use crate::member::{Member, ScoreTtl};

use super::scripts::{self, BULK_WRITE};

/// One `(member, rank, score)` write, ungrouped from the raw board state.
pub struct WriteRequest<'a> {
    pub public_id: &'a str,
    pub score: i64,
}

/// The decoded result of one member's write, still 0-based / sentinel-ed
/// the way the backend primitive reports it — `Leaderboard` shifts these into the external 1-based /
/// `-1` contract.
pub struct WriteOutcome {
    pub public_id: String,
    pub rank: i64,
    pub score: i64,
    pub previous_rank: i64,
    pub expire_at: i64,
}

pub struct WriteOptions {
    pub expire_at_absolute: i64,
    pub want_previous_rank: bool,
    pub score_ttl: ScoreTtl,
    pub now_unix: i64,
}

enum WriteOp {
    Add,
    Increment,
}

impl WriteOp {
    fn lua_name(&self) -> &'static str {
        match self {
            WriteOp::Add => "ZADD",
            WriteOp::Increment => "ZINCRBY",
        }
    }
}

fn run(
    backend: &dyn Backend,
    board_key: &str,
    op: WriteOp,
    members: &[WriteRequest<'_>],
    options: WriteOptions,
) -> Result<Vec<WriteOutcome>> {
    if members.is_empty() {
        return Err(LeaderboardError::InvalidArgument(
            "at least one member is required".into(),
        ));
    }

    let ttl_key = format!("{board_key}:ttl");
    let score_ttl_arg: i64 = match options.score_ttl {
        ScoreTtl::None => -1,
        ScoreTtl::Seconds(secs) => secs as i64,
    };

    let mut args: Vec<String> = vec![
        op.lua_name().to_string(),
        if options.want_previous_rank { "1" } else { "0" }.to_string(),
        options.expire_at_absolute.to_string(),
        score_ttl_arg.to_string(),
        options.now_unix.to_string(),
        ttl_key,
        members.len().to_string(),
    ];
    for member in members {
        args.push(member.public_id.to_string());
        args.push(member.score.to_string());
    }

    let reply = backend.eval_script(BULK_WRITE, &[board_key], &args)?;
    let flat = scripts::flatten(reply);

    if flat.is_empty() {
        return Err(LeaderboardError::Invariant(
            "board key missing after write".into(),
        ));
    }

    if flat.len() != members.len() * 5 {
        return Err(LeaderboardError::Invariant(format!(
            "bulk write script returned {} elements, expected {}",
            flat.len(),
            members.len() * 5
        )));
    }

    let mut outcomes = Vec::with_capacity(members.len());
    for chunk in flat.chunks(5) {
        let public_id = scripts::as_string(&chunk[0])
            .ok_or_else(|| LeaderboardError::Invariant("missing member id in write reply".into()))?;
        let rank = scripts::as_int(&chunk[1])
            .ok_or_else(|| LeaderboardError::Invariant("missing rank in write reply".into()))?;
        let score = scripts::as_score(&chunk[2])
            .ok_or_else(|| LeaderboardError::Invariant("missing score in write reply".into()))?;
        let previous_rank = scripts::as_int(&chunk[3]).unwrap_or(-2);
        let expire_at = scripts::as_int(&chunk[4]).unwrap_or(-1);
        outcomes.push(WriteOutcome {
            public_id,
            rank,
            score,
            previous_rank,
            expire_at,
        });
    }
    Ok(outcomes)
}

/// Bulk set.
pub fn bulk_set(
    backend: &dyn Backend,
    board_key: &str,
    members: &[WriteRequest<'_>],
    options: WriteOptions,
) -> Result<Vec<WriteOutcome>> {
    run(backend, board_key, WriteOp::Add, members, options)
}

/// Bulk increment. `members[i].score` is the delta.
pub fn bulk_increment(
    backend: &dyn Backend,
    board_key: &str,
    members: &[WriteRequest<'_>],
    options: WriteOptions,
) -> Result<Vec<WriteOutcome>> {
    run(backend, board_key, WriteOp::Increment, members, options)
}

/// Shifts one [`WriteOutcome`] into the external `Member` contract: ranks
/// go 0-based to 1-based, `-2` (absent, or not requested) becomes `-1`.
pub fn into_member(outcome: WriteOutcome) -> Member {
    Member {
        public_id: outcome.public_id,
        score: outcome.score,
        rank: outcome.rank + 1,
        previous_rank: outcome.previous_rank + 1,
        expire_at: if outcome.expire_at < 0 { 0 } else { outcome.expire_at },
    }
}
