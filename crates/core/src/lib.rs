#![forbid(unsafe_code)]

pub mod confirm;
pub mod model;
pub mod search;
pub mod validate;
pub mod wire;

pub mod ids {
    use serde::de::{self, Visitor};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::fmt;
    use std::str::FromStr;

    /// Server-assigned identifier. The data service may hand out numbers or strings;
    /// both collapse to the same textual id so `1` and `"1"` compare equal.
    #[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
    pub struct EntityId(String);

    impl EntityId {
        pub fn as_str(&self) -> &str {
            &self.0
        }

        pub fn into_string(self) -> String {
            self.0
        }

        pub fn try_new(value: impl Into<String>) -> Result<Self, EntityIdError> {
            let value = value.into();
            let trimmed = value.trim();
            validate_entity_id(trimmed)?;
            Ok(Self(trimmed.to_string()))
        }

        /// Numeric view of the id, when the server assigned one.
        pub fn as_number(&self) -> Option<u64> {
            self.0.parse::<u64>().ok()
        }
    }

    impl From<u64> for EntityId {
        fn from(value: u64) -> Self {
            Self(value.to_string())
        }
    }

    impl FromStr for EntityId {
        type Err = EntityIdError;

        fn from_str(value: &str) -> Result<Self, Self::Err> {
            Self::try_new(value)
        }
    }

    impl fmt::Display for EntityId {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(&self.0)
        }
    }

    #[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
    pub enum EntityIdError {
        #[error("id must not be empty")]
        Empty,
        #[error("id is too long")]
        TooLong,
        #[error("id must not contain {ch:?} (index {index})")]
        ReservedChar { ch: char, index: usize },
        #[error("id contains control characters")]
        ContainsControl,
    }

    fn validate_entity_id(value: &str) -> Result<(), EntityIdError> {
        if value.is_empty() {
            return Err(EntityIdError::Empty);
        }
        if value.len() > 128 {
            return Err(EntityIdError::TooLong);
        }
        if value.chars().any(|c| c.is_control()) {
            return Err(EntityIdError::ContainsControl);
        }
        // Ids travel as a single URL path segment.
        for (index, ch) in value.chars().enumerate() {
            if matches!(ch, '/' | '?' | '#') {
                return Err(EntityIdError::ReservedChar { ch, index });
            }
        }
        Ok(())
    }

    impl Serialize for EntityId {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            serializer.serialize_str(&self.0)
        }
    }

    impl<'de> Deserialize<'de> for EntityId {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            deserializer.deserialize_any(EntityIdVisitor)
        }
    }

    struct EntityIdVisitor;

    impl<'de> Visitor<'de> for EntityIdVisitor {
        type Value = EntityId;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a string or integer id")
        }

        fn visit_u64<E: de::Error>(self, value: u64) -> Result<EntityId, E> {
            Ok(EntityId::from(value))
        }

        fn visit_i64<E: de::Error>(self, value: i64) -> Result<EntityId, E> {
            EntityId::try_new(value.to_string()).map_err(E::custom)
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<EntityId, E> {
            EntityId::try_new(value).map_err(E::custom)
        }
    }
}

pub mod kind {
    use std::fmt;

    /// How a collection accepts updates on the wire.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub enum UpdateMethod {
        /// Partial merge; absent fields stay untouched.
        Patch,
        /// Full replacement of every field but the id.
        Put,
    }

    impl UpdateMethod {
        pub fn as_str(self) -> &'static str {
            match self {
                UpdateMethod::Patch => "PATCH",
                UpdateMethod::Put => "PUT",
            }
        }
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
    pub enum EntityKind {
        Branch,
        Building,
        Floor,
        Space,
    }

    impl EntityKind {
        pub const ALL: [EntityKind; 4] = [
            EntityKind::Branch,
            EntityKind::Building,
            EntityKind::Floor,
            EntityKind::Space,
        ];

        /// Collection segment of the REST endpoint.
        pub fn collection(self) -> &'static str {
            match self {
                EntityKind::Branch => "branches",
                EntityKind::Building => "buildings",
                EntityKind::Floor => "floors",
                EntityKind::Space => "spaces",
            }
        }

        pub fn singular(self) -> &'static str {
            match self {
                EntityKind::Branch => "branch",
                EntityKind::Building => "building",
                EntityKind::Floor => "floor",
                EntityKind::Space => "space",
            }
        }

        pub fn title(self) -> &'static str {
            match self {
                EntityKind::Branch => "Branch",
                EntityKind::Building => "Building",
                EntityKind::Floor => "Floor",
                EntityKind::Space => "Space",
            }
        }

        pub fn update_method(self) -> UpdateMethod {
            match self {
                EntityKind::Branch | EntityKind::Building => UpdateMethod::Patch,
                EntityKind::Floor | EntityKind::Space => UpdateMethod::Put,
            }
        }

        pub fn from_collection(value: &str) -> Option<Self> {
            let value = value.trim();
            Self::ALL
                .into_iter()
                .find(|kind| kind.collection() == value)
        }
    }

    impl fmt::Display for EntityKind {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.collection())
        }
    }
}

pub use ids::{EntityId, EntityIdError};
pub use kind::{EntityKind, UpdateMethod};
pub use model::Entity;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_id_validation() {
        assert_eq!(EntityId::try_new("").unwrap_err(), EntityIdError::Empty);
        assert_eq!(EntityId::try_new("   ").unwrap_err(), EntityIdError::Empty);
        assert_eq!(
            EntityId::try_new("a/b").unwrap_err(),
            EntityIdError::ReservedChar { ch: '/', index: 1 }
        );
        assert_eq!(
            EntityId::try_new("bad\u{0007}").unwrap_err(),
            EntityIdError::ContainsControl
        );
        assert_eq!(
            EntityId::try_new("x".repeat(129)).unwrap_err(),
            EntityIdError::TooLong
        );
        assert_eq!(EntityId::try_new(" 42 ").unwrap().as_str(), "42");
        assert!(EntityId::try_new("a1f3").is_ok());
    }

    #[test]
    fn entity_id_accepts_numbers_and_strings_on_the_wire() {
        let from_number: EntityId = serde_json::from_str("7").unwrap();
        let from_string: EntityId = serde_json::from_str("\"7\"").unwrap();
        assert_eq!(from_number, from_string);
        assert_eq!(from_number.as_number(), Some(7));
        assert_eq!(serde_json::to_string(&from_number).unwrap(), "\"7\"");

        let hex: EntityId = serde_json::from_str("\"9c1e\"").unwrap();
        assert_eq!(hex.as_number(), None);
        assert!(serde_json::from_str::<EntityId>("\"\"").is_err());
        assert!(serde_json::from_str::<EntityId>("true").is_err());
    }

    #[test]
    fn kinds_map_to_collections_and_update_methods() {
        assert_eq!(EntityKind::Branch.collection(), "branches");
        assert_eq!(EntityKind::Building.update_method(), UpdateMethod::Patch);
        assert_eq!(EntityKind::Floor.update_method(), UpdateMethod::Put);
        assert_eq!(EntityKind::Space.update_method().as_str(), "PUT");
        assert_eq!(
            EntityKind::from_collection("floors"),
            Some(EntityKind::Floor)
        );
        assert_eq!(EntityKind::from_collection("rooms"), None);
    }
}
