//! Raw driver errors as the integrations print them.

/// Stand-in for an error returned by a database, search, messaging, object
/// storage or cache client.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct RawError {
    pub message: String,
}

impl RawError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

pub mod db {
    pub const PERMISSION: &str = "0LP01: invalid_grant_operation";
    pub const AUTH: &str =
        "pq: password authentication failed for user \"svc\" (SQLSTATE 28P01)";
    pub const IO: &str = "dial tcp 10.0.0.5:5432: connect: connection refused";
    pub const NOT_EXIST: &str = "sql: no rows in result set";
    pub const CONFLICT: &str =
        "ERROR: duplicate key value violates unique constraint \"users_email_key\" (SQLSTATE 23505)";
    pub const CONSTRAINT: &str =
        "ERROR: null value in column \"name\" violates not-null constraint (SQLSTATE 23502)";
}

pub mod search {
    pub const PERMISSION: &str =
        "security_exception: action [indices:data/read/search] is unauthorized for user [svc]";
    pub const IO: &str = "dial tcp 10.0.0.9:9200: i/o timeout";
    pub const NOT_EXIST: &str = "index_not_found_exception: no such index [orders]";
    pub const CONFLICT: &str = "version_conflict_engine_exception: [1]: version conflict";
}

pub mod messaging {
    pub const PERMISSION: &str = "Broker: Topic authorization failed";
    pub const IO: &str = "Local: All brokers down";
    pub const NOT_EXIST: &str = "Broker: Unknown topic or partition";
    pub const TOO_LARGE: &str = "Broker: Message size too large";
}

pub mod object_storage {
    pub const PERMISSION: &str = "AccessDenied: Access Denied.";
    pub const NOT_EXIST: &str = "NoSuchKey: The specified key does not exist.";
    pub const TOO_LARGE: &str =
        "EntityTooLarge: Your proposed upload exceeds the maximum allowed object size.";
}

pub mod cache {
    pub const PERMISSION: &str = "NOAUTH Authentication required.";
    pub const IO: &str = "dial tcp 127.0.0.1:6379: connect: connection refused";
    pub const NOT_EXIST: &str = "redis: nil";
    pub const CONFLICT: &str =
        "WRONGTYPE Operation against a key holding the wrong kind of value";
}
