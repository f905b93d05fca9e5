use std::fmt;

use super::{KindGroup, first_match};

kind_enum!(
    /// Failures raised by the search cluster client (Elasticsearch/OpenSearch).
    SearchKind => Search, KindGroup::Search, {
        #[default]
        Other => ("elastic_other_error", 500),
        Permission => ("elastic_permission_denied", 500),
        Io => ("elastic_io_error", 503),
        NotExist => ("elastic_not_exist", 404),
        Conflict => ("elastic_conflict", 409),
        BadQuery => ("elastic_bad_query", 400),
    }
);

const PERMISSION: &[&str] = &[
    "security_exception",
    "authentication_exception",
    "is unauthorized for user",
    "unable to authenticate user",
    "missing authentication credentials",
];

const IO: &[&str] = &[
    "no living connections",
    "no alive nodes",
    "connection refused",
    "connection reset",
    "i/o timeout",
    "context deadline exceeded",
    "circuit_breaking_exception",
    "cluster_block_exception",
    "es_rejected_execution_exception",
    "master_not_discovered_exception",
    "node_disconnected_exception",
];

const NOT_EXIST: &[&str] = &[
    "index_not_found_exception",
    "resource_not_found_exception",
    "no such index",
    "document_missing_exception",
];

const CONFLICT: &[&str] = &[
    "version_conflict_engine_exception",
    "resource_already_exists_exception",
    "index_already_exists_exception",
];

const BAD_QUERY: &[&str] = &[
    "parsing_exception",
    "search_phase_execution_exception",
    "illegal_argument_exception",
    "mapper_parsing_exception",
    "query_shard_exception",
    "x_content_parse_exception",
];

/// Evaluated in this order: permission, io, not exist, conflict, bad query.
const TABLES: &[(SearchKind, &[&str])] = &[
    (SearchKind::Permission, PERMISSION),
    (SearchKind::Io, IO),
    (SearchKind::NotExist, NOT_EXIST),
    (SearchKind::Conflict, CONFLICT),
    (SearchKind::BadQuery, BAD_QUERY),
];

/// Classify a raw search client error by its message.
pub fn classify_search<E: fmt::Display + ?Sized>(err: &E) -> SearchKind {
    first_match(&err.to_string(), TABLES, SearchKind::Other)
}
