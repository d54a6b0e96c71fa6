//! Opaque identifiers for platform resources
//!
//! The platform hands out identifiers as strings, but older endpoints and
//! fixtures use plain integers. Every identifier type accepts both and
//! serializes back as the same JSON scalar it was read from. Equality,
//! ordering and hashing only look at the text, so `7` and `"7"` name the
//! same resource.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Text of an identifier plus the JSON scalar kind it arrived as
#[derive(Clone, Debug)]
enum RawId {
    Text(String),
    Number(String),
}

impl RawId {
    fn as_str(&self) -> &str {
        match self {
            Self::Text(s) | Self::Number(s) => s,
        }
    }

    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Number(n) => {
                if let Ok(v) = n.parse::<u64>() {
                    serializer.serialize_u64(v)
                } else if let Ok(v) = n.parse::<i64>() {
                    serializer.serialize_i64(v)
                } else {
                    serializer.serialize_str(n)
                }
            }
            Self::Text(s) => serializer.serialize_str(s),
        }
    }
}

macro_rules! opaque_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug)]
        pub struct $name(RawId);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(RawId::Text(id.into()))
            }

            pub fn as_str(&self) -> &str {
                self.0.as_str()
            }

            /// Whether the server sent this id as a JSON number
            pub fn is_numeric(&self) -> bool {
                matches!(self.0, RawId::Number(_))
            }
        }

        impl PartialEq for $name {
            fn eq(&self, other: &Self) -> bool {
                self.as_str() == other.as_str()
            }
        }

        impl Eq for $name {}

        impl Hash for $name {
            fn hash<H: Hasher>(&self, state: &mut H) {
                self.as_str().hash(state)
            }
        }

        impl PartialOrd for $name {
            fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
                Some(self.cmp(other))
            }
        }

        impl Ord for $name {
            fn cmp(&self, other: &Self) -> Ordering {
                self.as_str().cmp(other.as_str())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self::new(id)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self::new(id)
            }
        }

        impl From<u64> for $name {
            fn from(id: u64) -> Self {
                Self(RawId::Number(id.to_string()))
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                self.0.serialize(serializer)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                deserializer.deserialize_any(IdVisitor).map(Self)
            }
        }
    };
}

struct IdVisitor;

impl<'de> Visitor<'de> for IdVisitor {
    type Value = RawId;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a string or integer identifier")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<RawId, E> {
        Ok(RawId::Text(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<RawId, E> {
        Ok(RawId::Text(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<RawId, E> {
        Ok(RawId::Number(v.to_string()))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<RawId, E> {
        Ok(RawId::Number(v.to_string()))
    }
}

opaque_id!(
    /// Project identifier
    ProjectId
);
opaque_id!(
    /// Folder identifier
    FolderId
);
opaque_id!(
    /// File identifier
    FileId
);
opaque_id!(
    /// BCF topic identifier
    TopicId
);
opaque_id!(
    /// BCF comment identifier
    CommentId
);
opaque_id!(
    /// Organizer node identifier
    OrganizerId
);
opaque_id!(
    /// Platform user identifier (topic assignee, project member)
    UserId
);
