use std::fmt;

use super::{KindGroup, first_match};

kind_enum!(
    /// Failures raised by the S3-compatible object storage client (Minio).
    ObjectStorageKind => ObjectStorage, KindGroup::ObjectStorage, {
        #[default]
        Other => ("minio_other_error", 500),
        Permission => ("minio_permission_denied", 500),
        Io => ("minio_io_error", 503),
        NotExist => ("minio_not_exist", 404),
        Conflict => ("minio_conflict", 409),
        EntityTooLarge => ("minio_entity_too_large", 413),
    }
);

// S3 error codes are CamelCase (NoSuchKey); they are matched lowercased.
const PERMISSION: &[&str] = &[
    "accessdenied",
    "access denied",
    "invalidaccesskeyid",
    "signaturedoesnotmatch",
    "expiredtoken",
    "invalidtoken",
    "accountproblem",
];

const IO: &[&str] = &[
    "slowdown",
    "please reduce your request rate",
    "serviceunavailable",
    "xminioservernotinitialized",
    "requesttimeout",
    "connection refused",
    "connection reset",
    "i/o timeout",
    "broken pipe",
];

const NOT_EXIST: &[&str] = &[
    "nosuchkey",
    "nosuchbucket",
    "nosuchupload",
    "nosuchversion",
    "the specified key does not exist",
    "the specified bucket does not exist",
];

const CONFLICT: &[&str] = &[
    "bucketalreadyexists",
    "bucketalreadyownedbyyou",
    "bucketnotempty",
    "operationaborted",
    "preconditionfailed",
];

const ENTITY_TOO_LARGE: &[&str] = &["entitytoolarge", "your proposed upload exceeds the maximum"];

/// Evaluated in this order: permission, io, not exist, conflict, entity too large.
const TABLES: &[(ObjectStorageKind, &[&str])] = &[
    (ObjectStorageKind::Permission, PERMISSION),
    (ObjectStorageKind::Io, IO),
    (ObjectStorageKind::NotExist, NOT_EXIST),
    (ObjectStorageKind::Conflict, CONFLICT),
    (ObjectStorageKind::EntityTooLarge, ENTITY_TOO_LARGE),
];

/// Classify a raw object storage client error by its message.
pub fn classify_object_storage<E: fmt::Display + ?Sized>(err: &E) -> ObjectStorageKind {
    first_match(&err.to_string(), TABLES, ObjectStorageKind::Other)
}
