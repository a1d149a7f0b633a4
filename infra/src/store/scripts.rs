//! Lua scripts run server side so each row operation is atomic
//!
//! Rows are hashes with `value` and `etag` fields. Each partition keeps a
//! sorted set of its row keys, all with score 0, for lexicographic range
//! scans.

use once_cell::sync::Lazy;
use redis::Script;

/// KEYS: row, index. ARGV: value, etag, row_key, ttl in ms (0 = none)
///
/// An expiring row gets `PEXPIRE`; the index is only ever extended so it
/// outlives every row it lists. A row without expiry pins the index.
pub(crate) static UPSERT: Lazy<Script> = Lazy::new(|| {
    Script::new(
        r#"
local ttl = tonumber(ARGV[4])
local index_existed = redis.call('EXISTS', KEYS[2])
local index_ttl = redis.call('PTTL', KEYS[2])
redis.call('HSET', KEYS[1], 'value', ARGV[1], 'etag', ARGV[2])
redis.call('ZADD', KEYS[2], 0, ARGV[3])
if ttl > 0 then
  redis.call('PEXPIRE', KEYS[1], ttl)
  if index_existed == 0 or (index_ttl >= 0 and index_ttl < ttl) then
    redis.call('PEXPIRE', KEYS[2], ttl)
  end
else
  redis.call('PERSIST', KEYS[1])
  redis.call('PERSIST', KEYS[2])
end
return 1
"#,
    )
});

/// KEYS: row. ARGV: value, new etag, expected etag
pub(crate) static REPLACE_IF_MATCH: Lazy<Script> = Lazy::new(|| {
    Script::new(
        r#"
local current = redis.call('HGET', KEYS[1], 'etag')
if not current or current ~= ARGV[3] then
  return 0
end
redis.call('HSET', KEYS[1], 'value', ARGV[1], 'etag', ARGV[2])
return 1
"#,
    )
});

/// KEYS: row, index. ARGV: expected etag, row_key
pub(crate) static DELETE_IF_MATCH: Lazy<Script> = Lazy::new(|| {
    Script::new(
        r#"
local current = redis.call('HGET', KEYS[1], 'etag')
if not current or current ~= ARGV[1] then
  return 0
end
redis.call('DEL', KEYS[1])
redis.call('ZREM', KEYS[2], ARGV[2])
return 1
"#,
    )
});

/// KEYS: row, index. ARGV: row_key
pub(crate) static DELETE: Lazy<Script> = Lazy::new(|| {
    Script::new(
        r#"
local removed = redis.call('DEL', KEYS[1])
redis.call('ZREM', KEYS[2], ARGV[1])
return removed
"#,
    )
});

/// KEYS: index. ARGV: lex min, lex max, limit (0 = none), row key prefix
///
/// Returns a flat list of `row_key, value, etag` triples. Index entries
/// whose row has vanished are skipped.
pub(crate) static SCAN: Lazy<Script> = Lazy::new(|| {
    Script::new(
        r#"
local members
local limit = tonumber(ARGV[3])
if limit > 0 then
  members = redis.call('ZRANGEBYLEX', KEYS[1], ARGV[1], ARGV[2], 'LIMIT', 0, limit)
else
  members = redis.call('ZRANGEBYLEX', KEYS[1], ARGV[1], ARGV[2])
end
local out = {}
for _, member in ipairs(members) do
  local fields = redis.call('HMGET', ARGV[4] .. member, 'value', 'etag')
  if fields[1] then
    table.insert(out, member)
    table.insert(out, fields[1])
    table.insert(out, fields[2])
  end
end
return out
"#,
    )
});
