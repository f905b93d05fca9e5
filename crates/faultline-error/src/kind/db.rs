use std::fmt;

use super::{KindGroup, first_match};

kind_enum!(
    /// Failures raised by SQL drivers (Postgres SQLSTATE codes and driver phrases).
    DbKind => Db, KindGroup::Db, {
        #[default]
        Other => ("db_other_error", 500),
        Permission => ("db_permission_denied", 500),
        Io => ("db_io_error", 503),
        NotExist => ("db_not_exist", 404),
        Conflict => ("db_conflict", 409),
        Constraint => ("db_constraint_violation", 400),
    }
);

// SQLSTATE class 28 and 42501 plus the grant/grantor codes of class 0L/0P.
const PERMISSION: &[&str] = &[
    "42501",
    "0lp01",
    "0l000",
    "0p000",
    "28000",
    "28p01",
    "permission denied",
    "password authentication failed",
];

// Connection exceptions (08xxx), operator intervention (57Pxx), system and
// resource errors (53xxx, 58xxx).
const IO: &[&str] = &[
    "08000",
    "08001",
    "08003",
    "08004",
    "08006",
    "57p01",
    "57p02",
    "57p03",
    "53100",
    "53200",
    "53300",
    "58000",
    "58030",
    "connection refused",
    "connection reset",
    "broken pipe",
    "i/o timeout",
    "conn busy",
    "bad connection",
    "unexpected eof",
];

const NOT_EXIST: &[&str] = &[
    "42p01",
    "42703",
    "42883",
    "3d000",
    "3f000",
    "no rows in result set",
    "does not exist",
];

const CONFLICT: &[&str] = &[
    "23505",
    "40001",
    "40p01",
    "55p03",
    "duplicate key",
    "could not serialize access",
    "deadlock detected",
];

const CONSTRAINT: &[&str] = &[
    "23502",
    "23503",
    "23514",
    "23p01",
    "22001",
    "22p02",
    "violates not-null constraint",
    "violates foreign key constraint",
    "violates check constraint",
];

/// Evaluated in this order: permission, io, not exist, conflict, constraint.
const TABLES: &[(DbKind, &[&str])] = &[
    (DbKind::Permission, PERMISSION),
    (DbKind::Io, IO),
    (DbKind::NotExist, NOT_EXIST),
    (DbKind::Conflict, CONFLICT),
    (DbKind::Constraint, CONSTRAINT),
];

/// Classify a raw database driver error by its message.
pub fn classify_db<E: fmt::Display + ?Sized>(err: &E) -> DbKind {
    first_match(&err.to_string(), TABLES, DbKind::Other)
}
