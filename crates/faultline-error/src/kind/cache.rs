use std::fmt;

use super::{KindGroup, first_match};

kind_enum!(
    /// Failures raised by the cache client (Redis).
    CacheKind => Cache, KindGroup::Cache, {
        #[default]
        Other => ("redis_other_error", 500),
        Permission => ("redis_permission_denied", 500),
        Io => ("redis_io_error", 503),
        NotExist => ("redis_not_exist", 404),
        Conflict => ("redis_conflict", 409),
    }
);

const PERMISSION: &[&str] = &[
    "noauth",
    "wrongpass",
    "noperm",
    "invalid password",
    "authentication required",
];

const IO: &[&str] = &[
    "connection refused",
    "connection reset",
    "broken pipe",
    "i/o timeout",
    "connection pool timeout",
    "pool timeout",
    "loading redis is loading",
    "clusterdown",
    "masterdown",
    "tryagain",
    "readonly you can't write against a read only replica",
];

// go-redis and redis-rs both surface a missing key as a nil reply.
const NOT_EXIST: &[&str] = &["redis: nil", "response was nil", "key not found"];

const CONFLICT: &[&str] = &["busykey", "wrongtype", "execabort", "transaction aborted"];

/// Evaluated in this order: permission, io, not exist, conflict.
const TABLES: &[(CacheKind, &[&str])] = &[
    (CacheKind::Permission, PERMISSION),
    (CacheKind::Io, IO),
    (CacheKind::NotExist, NOT_EXIST),
    (CacheKind::Conflict, CONFLICT),
];

/// Classify a raw cache client error by its message.
pub fn classify_cache<E: fmt::Display + ?Sized>(err: &E) -> CacheKind {
    first_match(&err.to_string(), TABLES, CacheKind::Other)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_fragments_map_to_buckets() {
        let cases = [
            ("NOAUTH Authentication required.", CacheKind::Permission),
            ("WRONGPASS invalid username-password pair or user is disabled.", CacheKind::Permission),
            ("dial tcp 127.0.0.1:6379: connect: connection refused", CacheKind::Io),
            ("CLUSTERDOWN The cluster is down", CacheKind::Io),
            ("redis: nil", CacheKind::NotExist),
            ("WRONGTYPE Operation against a key holding the wrong kind of value", CacheKind::Conflict),
            ("BUSYKEY Target key name already exists.", CacheKind::Conflict),
        ];
        for (msg, expected) in cases {
            assert_eq!(classify_cache(msg), expected, "{msg}");
        }
    }

    #[test]
    fn unrelated_and_empty_messages_are_other() {
        assert_eq!(classify_cache("OK"), CacheKind::Other);
        assert_eq!(classify_cache(""), CacheKind::Other);
    }

    #[test]
    fn fragments_are_lowercase_and_non_empty() {
        for (_, fragments) in TABLES {
            for f in *fragments {
                assert!(!f.is_empty());
                assert_eq!(*f, f.to_lowercase());
            }
        }
    }
}
