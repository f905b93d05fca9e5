use faultline_error::{
    CacheKind, DbKind, ErrorKind, HttpKind, KindGroup, MessagingKind, ObjectStorageKind,
    SearchKind, classify,
};
use faultline_test_utils::RawError;
use faultline_test_utils::fixtures::{cache, db, messaging, object_storage, search};

#[test]
fn raw_driver_errors_land_in_their_buckets() {
    let cases: &[(KindGroup, &str, ErrorKind)] = &[
        (KindGroup::Db, db::PERMISSION, DbKind::Permission.into()),
        (KindGroup::Db, db::AUTH, DbKind::Permission.into()),
        (KindGroup::Db, db::IO, DbKind::Io.into()),
        (KindGroup::Db, db::NOT_EXIST, DbKind::NotExist.into()),
        (KindGroup::Db, db::CONFLICT, DbKind::Conflict.into()),
        (KindGroup::Db, db::CONSTRAINT, DbKind::Constraint.into()),
        (KindGroup::Search, search::PERMISSION, SearchKind::Permission.into()),
        (KindGroup::Search, search::IO, SearchKind::Io.into()),
        (KindGroup::Search, search::NOT_EXIST, SearchKind::NotExist.into()),
        (KindGroup::Search, search::CONFLICT, SearchKind::Conflict.into()),
        (KindGroup::Messaging, messaging::PERMISSION, MessagingKind::Permission.into()),
        (KindGroup::Messaging, messaging::IO, MessagingKind::Io.into()),
        (KindGroup::Messaging, messaging::NOT_EXIST, MessagingKind::NotExist.into()),
        (KindGroup::Messaging, messaging::TOO_LARGE, MessagingKind::MessageTooLarge.into()),
        (KindGroup::ObjectStorage, object_storage::PERMISSION, ObjectStorageKind::Permission.into()),
        (KindGroup::ObjectStorage, object_storage::NOT_EXIST, ObjectStorageKind::NotExist.into()),
        (KindGroup::ObjectStorage, object_storage::TOO_LARGE, ObjectStorageKind::EntityTooLarge.into()),
        (KindGroup::Cache, cache::PERMISSION, CacheKind::Permission.into()),
        (KindGroup::Cache, cache::IO, CacheKind::Io.into()),
        (KindGroup::Cache, cache::NOT_EXIST, CacheKind::NotExist.into()),
        (KindGroup::Cache, cache::CONFLICT, CacheKind::Conflict.into()),
    ];
    for (group, message, expected) in cases {
        let kind = classify(*group, &RawError::new(*message));
        assert_eq!(kind, *expected, "{message}");
        assert_eq!(kind.group(), *group);
    }
}

#[test]
fn classification_is_deterministic() {
    let raw = RawError::new(db::CONFLICT);
    let first = classify(KindGroup::Db, &raw);
    for _ in 0..10 {
        assert_eq!(classify(KindGroup::Db, &raw), first);
    }
}

#[test]
fn unmatched_errors_fall_back_to_other_in_every_group() {
    let raw = RawError::new("something unexpected");
    for group in KindGroup::ALL {
        let kind = classify(*group, &raw);
        assert_eq!(kind.group(), *group);
        assert_eq!(kind.http_code(), 500);
        assert!(kind.as_str().ends_with("other_error"), "{kind}");
    }
    assert_eq!(classify(KindGroup::Http, &raw), ErrorKind::Http(HttpKind::Other));
}

#[test]
fn kinds_parse_back_from_their_identifiers() {
    for id in ["db_not_exist", "kafka_message_too_large", "redis_conflict", "gateway_timeout"] {
        let kind: ErrorKind = id.parse().unwrap();
        assert_eq!(kind.as_str(), id);
    }
    let unknown: ErrorKind = "definitely_not_a_kind".parse().unwrap();
    assert_eq!(unknown, ErrorKind::Http(HttpKind::Other));
}
