//! Failure taxonomy.
//!
//! Every failure the crate reports is tagged with a kind: a stable snake_case
//! identifier, an HTTP status and a [`KindGroup`] naming the subsystem it came
//! from. There is one enum per family ([`HttpKind`] for generic HTTP-aligned
//! failures and one per integration), and [`ErrorKind`] wraps them so a single
//! value can travel on a [`crate::CError`].
//!
//! The integration modules also host the classifiers that turn raw driver error
//! text into a kind (see [`classify_db`] and friends).

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Declares one kind family: the enum, its identifier/status table and the
/// serde + `Display` glue. The identifiers are part of the log and wire
/// contract and must never be renamed.
macro_rules! kind_enum {
    (
        $(#[$meta:meta])*
        $name:ident => $wrap:ident, $group:expr, {
            $( $(#[$vmeta:meta])* $variant:ident => ($text:literal, $code:literal) ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
        pub enum $name {
            $( $(#[$vmeta])* $variant, )+
        }

        impl $name {
            /// Every value of the family, in declaration order.
            pub const ALL: &'static [$name] = &[ $( $name::$variant, )+ ];

            pub const GROUP: $crate::kind::KindGroup = $group;

            pub const fn as_str(&self) -> &'static str {
                match self {
                    $( Self::$variant => $text, )+
                }
            }

            pub const fn http_code(&self) -> u16 {
                match self {
                    $( Self::$variant => $code, )+
                }
            }

            pub const fn group(&self) -> $crate::kind::KindGroup {
                Self::GROUP
            }

            /// Look a value up by its identifier.
            pub fn from_name(name: &str) -> Option<Self> {
                match name {
                    $( $text => Some(Self::$variant), )+
                    _ => None,
                }
            }
        }

        impl $crate::kind::Kind for $name {
            fn as_str(&self) -> &'static str {
                $name::as_str(self)
            }

            fn http_code(&self) -> u16 {
                $name::http_code(self)
            }

            fn group(&self) -> $crate::kind::KindGroup {
                Self::GROUP
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl ::serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: ::serde::Serializer,
            {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> ::serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: ::serde::Deserializer<'de>,
            {
                let raw = <String as ::serde::Deserialize>::deserialize(deserializer)?;
                Ok(Self::from_name(&raw).unwrap_or_default())
            }
        }

        impl From<$name> for $crate::kind::ErrorKind {
            fn from(kind: $name) -> Self {
                $crate::kind::ErrorKind::$wrap(kind)
            }
        }
    };
}

mod cache;
mod db;
mod http;
mod messaging;
mod object_storage;
mod search;

pub use cache::{CacheKind, classify_cache};
pub use db::{DbKind, classify_db};
pub use http::HttpKind;
pub use messaging::{MessagingKind, classify_messaging};
pub use object_storage::{ObjectStorageKind, classify_object_storage};
pub use search::{SearchKind, classify_search};

/// Identity of a failure category.
///
/// `as_str` is the machine-readable identifier consumers key on, `http_code`
/// is always within `100..=599`, and `group` is constant for a family.
pub trait Kind: fmt::Debug + Send + Sync {
    fn as_str(&self) -> &'static str;
    fn http_code(&self) -> u16;
    fn group(&self) -> KindGroup;
}

/// Subsystem a kind originates from. Used for routing and filtering only, it
/// does not change HTTP semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum KindGroup {
    #[default]
    Http,
    Db,
    Search,
    Messaging,
    ObjectStorage,
    Cache,
}

impl KindGroup {
    pub const ALL: &'static [KindGroup] = &[
        KindGroup::Http,
        KindGroup::Db,
        KindGroup::Search,
        KindGroup::Messaging,
        KindGroup::ObjectStorage,
        KindGroup::Cache,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            KindGroup::Http => "http",
            KindGroup::Db => "db",
            KindGroup::Search => "search",
            KindGroup::Messaging => "messaging",
            KindGroup::ObjectStorage => "object_storage",
            KindGroup::Cache => "cache",
        }
    }
}

impl fmt::Display for KindGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for KindGroup {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

/// A kind from any family. This is what a [`crate::CError`] carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Http(HttpKind),
    Db(DbKind),
    Search(SearchKind),
    Messaging(MessagingKind),
    ObjectStorage(ObjectStorageKind),
    Cache(CacheKind),
}

impl Default for ErrorKind {
    fn default() -> Self {
        ErrorKind::Http(HttpKind::Other)
    }
}

impl ErrorKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Http(k) => k.as_str(),
            ErrorKind::Db(k) => k.as_str(),
            ErrorKind::Search(k) => k.as_str(),
            ErrorKind::Messaging(k) => k.as_str(),
            ErrorKind::ObjectStorage(k) => k.as_str(),
            ErrorKind::Cache(k) => k.as_str(),
        }
    }

    pub const fn http_code(&self) -> u16 {
        match self {
            ErrorKind::Http(k) => k.http_code(),
            ErrorKind::Db(k) => k.http_code(),
            ErrorKind::Search(k) => k.http_code(),
            ErrorKind::Messaging(k) => k.http_code(),
            ErrorKind::ObjectStorage(k) => k.http_code(),
            ErrorKind::Cache(k) => k.http_code(),
        }
    }

    pub const fn group(&self) -> KindGroup {
        match self {
            ErrorKind::Http(_) => KindGroup::Http,
            ErrorKind::Db(_) => KindGroup::Db,
            ErrorKind::Search(_) => KindGroup::Search,
            ErrorKind::Messaging(_) => KindGroup::Messaging,
            ErrorKind::ObjectStorage(_) => KindGroup::ObjectStorage,
            ErrorKind::Cache(_) => KindGroup::Cache,
        }
    }

    /// Whether this is the "does not exist" bucket of its family. HTTP handler
    /// logging downgrades these to warnings.
    pub const fn is_not_exist(&self) -> bool {
        matches!(
            self,
            ErrorKind::Http(HttpKind::NotExist)
                | ErrorKind::Db(DbKind::NotExist)
                | ErrorKind::Search(SearchKind::NotExist)
                | ErrorKind::Messaging(MessagingKind::NotExist)
                | ErrorKind::ObjectStorage(ObjectStorageKind::NotExist)
                | ErrorKind::Cache(CacheKind::NotExist)
        )
    }

    /// Look a kind up by identifier across every family.
    pub fn from_name(name: &str) -> Option<Self> {
        HttpKind::from_name(name)
            .map(ErrorKind::Http)
            .or_else(|| DbKind::from_name(name).map(ErrorKind::Db))
            .or_else(|| SearchKind::from_name(name).map(ErrorKind::Search))
            .or_else(|| MessagingKind::from_name(name).map(ErrorKind::Messaging))
            .or_else(|| ObjectStorageKind::from_name(name).map(ErrorKind::ObjectStorage))
            .or_else(|| CacheKind::from_name(name).map(ErrorKind::Cache))
    }
}

impl Kind for ErrorKind {
    fn as_str(&self) -> &'static str {
        ErrorKind::as_str(self)
    }

    fn http_code(&self) -> u16 {
        ErrorKind::http_code(self)
    }

    fn group(&self) -> KindGroup {
        ErrorKind::group(self)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown identifiers parse to `other_error` rather than failing.
impl FromStr for ErrorKind {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(ErrorKind::from_name(s).unwrap_or_default())
    }
}

impl Serialize for ErrorKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ErrorKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(ErrorKind::from_name(&raw).unwrap_or_default())
    }
}

/// Run the classifier of `group` over `err`. The HTTP group has no driver
/// errors to inspect and always yields `other_error`.
pub fn classify<E: fmt::Display + ?Sized>(group: KindGroup, err: &E) -> ErrorKind {
    match group {
        KindGroup::Http => ErrorKind::Http(HttpKind::Other),
        KindGroup::Db => classify_db(err).into(),
        KindGroup::Search => classify_search(err).into(),
        KindGroup::Messaging => classify_messaging(err).into(),
        KindGroup::ObjectStorage => classify_object_storage(err).into(),
        KindGroup::Cache => classify_cache(err).into(),
    }
}

/// First table with a fragment contained in the lowercased message wins.
/// Fragments must be lowercase.
pub(crate) fn first_match<K: Copy>(message: &str, tables: &[(K, &[&str])], fallback: K) -> K {
    let haystack = message.to_lowercase();
    tables
        .iter()
        .find(|(_, fragments)| fragments.iter().any(|f| haystack.contains(f)))
        .map(|(kind, _)| *kind)
        .unwrap_or(fallback)
}
