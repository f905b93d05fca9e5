use std::fmt;

use super::{KindGroup, first_match};

kind_enum!(
    /// Failures raised by the message broker client (Kafka).
    MessagingKind => Messaging, KindGroup::Messaging, {
        #[default]
        Other => ("kafka_other_error", 500),
        Permission => ("kafka_permission_denied", 500),
        Io => ("kafka_io_error", 503),
        NotExist => ("kafka_not_exist", 404),
        Conflict => ("kafka_conflict", 409),
        MessageTooLarge => ("kafka_message_too_large", 413),
    }
);

// Kafka clients render broker error codes either as prose
// ("Topic Authorization Failed") or as constants (TOPIC_AUTHORIZATION_FAILED),
// so both spellings are listed.
const PERMISSION: &[&str] = &[
    "topic authorization failed",
    "topic_authorization_failed",
    "group authorization failed",
    "group_authorization_failed",
    "cluster authorization failed",
    "cluster_authorization_failed",
    "transactional id authorization failed",
    "transactional_id_authorization_failed",
    "sasl authentication failed",
    "sasl_authentication_failed",
];

const IO: &[&str] = &[
    "broker not available",
    "broker_not_available",
    "leader not available",
    "leader_not_available",
    "not leader for partition",
    "not_leader_for_partition",
    "network exception",
    "network_exception",
    "request timed out",
    "request_timed_out",
    "all brokers down",
    "connection refused",
    "i/o timeout",
    "broken pipe",
];

const NOT_EXIST: &[&str] = &[
    "unknown topic or partition",
    "unknown_topic_or_part",
    "unknown member id",
    "unknown_member_id",
    "group id not found",
    "group_id_not_found",
];

const CONFLICT: &[&str] = &[
    "rebalance in progress",
    "rebalance_in_progress",
    "topic already exists",
    "topic_already_exists",
    "concurrent transactions",
    "concurrent_transactions",
    "producer fenced",
    "producer_fenced",
    "invalid producer epoch",
    "invalid_producer_epoch",
];

const MESSAGE_TOO_LARGE: &[&str] = &[
    "message size too large",
    "message_too_large",
    "msg_size_too_large",
    "record list too large",
    "record_list_too_large",
];

/// Evaluated in this order: permission, io, not exist, conflict, message too large.
const TABLES: &[(MessagingKind, &[&str])] = &[
    (MessagingKind::Permission, PERMISSION),
    (MessagingKind::Io, IO),
    (MessagingKind::NotExist, NOT_EXIST),
    (MessagingKind::Conflict, CONFLICT),
    (MessagingKind::MessageTooLarge, MESSAGE_TOO_LARGE),
];

/// Classify a raw broker client error by its message.
pub fn classify_messaging<E: fmt::Display + ?Sized>(err: &E) -> MessagingKind {
    first_match(&err.to_string(), TABLES, MessagingKind::Other)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_fragments_map_to_buckets() {
        let cases = [
            ("kafka server: The client is not authorized to access this topic (Topic Authorization Failed)", MessagingKind::Permission),
            ("Broker: Topic authorization failed", MessagingKind::Permission),
            ("kafka: client has run out of available brokers to talk to: broker not available", MessagingKind::Io),
            ("Local: All brokers down", MessagingKind::Io),
            ("Broker: Unknown topic or partition", MessagingKind::NotExist),
            ("Broker: Group rebalance in progress", MessagingKind::Conflict),
            ("Broker: Message size too large", MessagingKind::MessageTooLarge),
            ("KafkaError{code=MSG_SIZE_TOO_LARGE}", MessagingKind::MessageTooLarge),
        ];
        for (msg, expected) in cases {
            assert_eq!(classify_messaging(msg), expected, "{msg}");
        }
    }

    #[test]
    fn unrelated_and_empty_messages_are_other() {
        assert_eq!(classify_messaging("offset committed"), MessagingKind::Other);
        assert_eq!(classify_messaging(""), MessagingKind::Other);
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
