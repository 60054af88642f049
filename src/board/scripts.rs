//! Lua script bodies for the five atomic primitives plus
//! the positional-table decoding that pairs with each one.
//!
//! Local bindings for `KEYS`/`ARGV`, `tonumber` coercions, one flat
//! `return` table that the Rust side destructures positionally rather
//! than by name.

use redis::Value;

/// Bulk set / bulk increment. `KEYS[1]` is the board key.
///
/// `ARGV` layout: `[op, want_prev, expire_at_absolute, score_ttl, now,
/// ttl_key, n, member_1, score_1, ..., member_n, score_n]`.
///
/// Returns a flat table of `5*n` elements:
/// `[member, new_rank, new_score, previous_rank, expire_at] * n`, or an
/// empty table if the board key is missing right after the write (the
/// configured expiry policy raced the write itself).
pub const BULK_WRITE: &str = r#"
local board = KEYS[1]
local op = ARGV[1]
local want_prev = ARGV[2] == '1'
local expire_at_absolute = tonumber(ARGV[3])
local score_ttl = tonumber(ARGV[4])
local now = tonumber(ARGV[5])
local ttl_key = ARGV[6]
local n = tonumber(ARGV[7])

local members = {}
local scores = {}
local idx = 8
for i = 1, n do
    members[i] = ARGV[idx]
    scores[i] = tonumber(ARGV[idx + 1])
    idx = idx + 2
end

local prev_ranks = {}
for i = 1, n do
    if want_prev then
        local r = redis.call('ZREVRANK', board, members[i])
        if r == false then
            prev_ranks[i] = -2
        else
            prev_ranks[i] = r
        end
    else
        prev_ranks[i] = -2
    end
end

if op == 'ZADD' then
    local zadd_args = {}
    for i = 1, n do
        table.insert(zadd_args, scores[i])
        table.insert(zadd_args, members[i])
    end
    redis.call('ZADD', board, unpack(zadd_args))
else
    for i = 1, n do
        redis.call('ZINCRBY', board, scores[i], members[i])
    end
end

if redis.call('EXISTS', board) == 0 then
    return {}
end

if expire_at_absolute ~= -1 then
    local current_ttl = redis.call('TTL', board)
    if current_ttl == -2 then
        return {}
    end
    if current_ttl == -1 then
        redis.call('EXPIREAT', board, expire_at_absolute)
    end
end

local expire_ats = {}
if score_ttl ~= -1 then
    for i = 1, n do
        local expire_at = now + score_ttl
        redis.call('ZADD', ttl_key, expire_at, members[i])
        expire_ats[i] = expire_at
    end
    redis.call('SADD', 'expiration-sets', ttl_key)
else
    for i = 1, n do
        expire_ats[i] = -1
    end
end

local result = {}
for i = 1, n do
    local new_rank = redis.call('ZREVRANK', board, members[i])
    local new_score = redis.call('ZSCORE', board, members[i])
    table.insert(result, members[i])
    table.insert(result, new_rank)
    table.insert(result, new_score)
    table.insert(result, prev_ranks[i])
    table.insert(result, expire_ats[i])
end
return result
"#;

/// Single get. `KEYS[1]` is the board key.
/// `ARGV` layout: `[member, order, include_ttl, ttl_key]`.
/// Returns `{rank, score, expire_at}`, or a false/nil reply when the
/// member has no rank or no score.
pub const GET_MEMBER: &str = r#"
local board = KEYS[1]
local member = ARGV[1]
local order = ARGV[2]
local include_ttl = ARGV[3] == '1'
local ttl_key = ARGV[4]

local rank
if order == 'asc' then
    rank = redis.call('ZRANK', board, member)
else
    rank = redis.call('ZREVRANK', board, member)
end
local score = redis.call('ZSCORE', board, member)

if rank == false or score == false then
    return false
end

local expire_at = -1
if include_ttl then
    local e = redis.call('ZSCORE', ttl_key, member)
    if e ~= false then
        expire_at = e
    end
end

return {rank, score, expire_at}
"#;

/// Bulk get. `KEYS[1]` is the board key.
///
/// `ARGV` layout: `[order, include_ttl, ttl_key, n, member_1, ..,
/// member_n]` — ids are passed as individual `ARGV` entries rather than a
/// comma-joined string (the clean reimplementation invites; comma is
/// otherwise unsafe for member ids that themselves contain a comma).
///
/// Returns a flat table of `4*k` elements for the `k` members found:
/// `[member, rank, score, expire_at] * k`. Missing members are omitted.
pub const GET_MEMBERS: &str = r#"
local board = KEYS[1]
local order = ARGV[1]
local include_ttl = ARGV[2] == '1'
local ttl_key = ARGV[3]
local n = tonumber(ARGV[4])

local result = {}
for i = 1, n do
    local member = ARGV[4 + i]
    local rank
    if order == 'asc' then
        rank = redis.call('ZRANK', board, member)
    else
        rank = redis.call('ZREVRANK', board, member)
    end
    local score = redis.call('ZSCORE', board, member)
    if rank ~= false and score ~= false then
        local expire_at = -1
        if include_ttl then
            local e = redis.call('ZSCORE', ttl_key, member)
            if e ~= false then
                expire_at = e
            end
        end
        table.insert(result, member)
        table.insert(result, rank)
        table.insert(result, score)
        table.insert(result, expire_at)
    end
end
return result
"#;

/// Top percentage. `KEYS[1]` is the board key.
/// `ARGV` layout: `[percent, max_members, order]`.
/// Returns a flat table of `3*k` elements: `[member, rank, score] * k`.
pub const TOP_PERCENTAGE: &str = r#"
local board = KEYS[1]
local percent = tonumber(ARGV[1])
local max_members = tonumber(ARGV[2])
local order = ARGV[3]

local card = redis.call('ZCARD', board)
if card == 0 then
    return {}
end

local n = math.floor((percent / 100) * card)
if n < 1 then n = 1 end
if n > max_members then n = max_members end
if n > card then n = card end

local raw
if order == 'asc' then
    raw = redis.call('ZRANGE', board, 0, n - 1, 'WITHSCORES')
else
    raw = redis.call('ZREVRANGE', board, 0, n - 1, 'WITHSCORES')
end

local result = {}
local rank = 0
for i = 1, #raw, 2 do
    table.insert(result, raw[i])
    table.insert(result, rank)
    table.insert(result, raw[i + 1])
    rank = rank + 1
end
return result
"#;

pub(crate) fn flatten(value: Value) -> Vec<Value> {
    match value {
        Value::Bulk(items) => items,
        Value::Nil => Vec::new(),
        other => vec![other],
    }
}

pub(crate) fn as_string(value: &Value) -> Option<String> {
    match value {
        Value::Data(bytes) => String::from_utf8(bytes.clone()).ok(),
        Value::Status(s) => Some(s.clone()),
        Value::Int(i) => Some(i.to_string()),
        _ => None,
    }
}

pub(crate) fn as_int(value: &Value) -> Option<i64> {
    match value {
        Value::Int(i) => Some(*i),
        Value::Data(bytes) => std::str::from_utf8(bytes).ok()?.parse().ok(),
        Value::Nil => None,
        _ => None,
    }
}

/// Scores travel through Lua/RESP as decimal strings (`ZSCORE`'s bulk
/// reply); round to the nearest integer on the way back.
pub(crate) fn as_score(value: &Value) -> Option<i64> {
    match value {
        Value::Int(i) => Some(*i),
        Value::Data(bytes) => std::str::from_utf8(bytes)
            .ok()?
            .parse::<f64>()
            .ok()
            .map(|f| f.round() as i64),
        _ => None,
    }
}
