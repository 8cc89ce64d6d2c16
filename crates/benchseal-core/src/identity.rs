//! # Identity Newtypes
//!
//! Identifiers that flow through the protocol. The uploader identity is
//! produced by an external authentication layer; the core treats it as an
//! opaque, validated string plus a role.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::IdentityError;

/// Maximum length of an uploader identifier, in bytes.
pub const MAX_UPLOADER_ID_LEN: usize = 255;

macro_rules! uuid_id {
    ($(#[$meta:meta])* $ty:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $ty(Uuid);

        impl $ty {
            /// Create a new random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            pub fn from_uuid(id: Uuid) -> Self {
                Self(id)
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $ty {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<Uuid> for $ty {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

uuid_id!(
    /// Identifier of a hash registration.
    RegistrationId
);

uuid_id!(
    /// Identifier of an accepted submission batch.
    SubmissionId
);

/// Opaque identity of an authenticated contributor.
///
/// Non-empty, at most [`MAX_UPLOADER_ID_LEN`] bytes, no control characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct UploaderId(String);

impl UploaderId {
    pub fn new(id: impl Into<String>) -> Result<Self, IdentityError> {
        let id = id.into();
        if id.is_empty() {
            return Err(IdentityError::EmptyUploaderId);
        }
        if id.len() > MAX_UPLOADER_ID_LEN {
            return Err(IdentityError::UploaderIdTooLong(id.len()));
        }
        if id.chars().any(char::is_control) {
            return Err(IdentityError::UploaderIdControlChar);
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for UploaderId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::new(raw).map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Display for UploaderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Roles an authenticated uploader may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Commits and reveals own content.
    Contributor,
    /// Reviews and scores content.
    Reviewer,
    /// Operates the platform.
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Contributor => "contributor",
            Self::Reviewer => "reviewer",
            Self::Admin => "admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "contributor" => Ok(Self::Contributor),
            "reviewer" => Ok(Self::Reviewer),
            "admin" => Ok(Self::Admin),
            other => Err(IdentityError::UnknownRole(other.to_string())),
        }
    }
}

/// The authenticated party submitting a batch.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Uploader {
    pub id: UploaderId,
    pub role: Role,
}

impl Uploader {
    pub fn new(id: UploaderId, role: Role) -> Self {
        Self { id, role }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uploader_id_validation() {
        assert!(UploaderId::new("alice").is_ok());
        assert_eq!(UploaderId::new(""), Err(IdentityError::EmptyUploaderId));
        assert!(matches!(
            UploaderId::new("a".repeat(256)),
            Err(IdentityError::UploaderIdTooLong(256))
        ));
        assert!(UploaderId::new("a".repeat(255)).is_ok());
        assert_eq!(
            UploaderId::new("bob\n"),
            Err(IdentityError::UploaderIdControlChar)
        );
    }

    #[test]
    fn uploader_id_deserialize_validates() {
        assert!(serde_json::from_str::<UploaderId>("\"\"").is_err());
        let id: UploaderId = serde_json::from_str("\"carol\"").unwrap();
        assert_eq!(id.as_str(), "carol");
    }

    #[test]
    fn role_parse_and_display() {
        for role in [Role::Contributor, Role::Reviewer, Role::Admin] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        assert!(matches!(
            "zone_admin".parse::<Role>(),
            Err(IdentityError::UnknownRole(_))
        ));
    }

    #[test]
    fn registration_ids_are_unique() {
        assert_ne!(RegistrationId::new(), RegistrationId::new());
    }

    #[test]
    fn uuid_ids_serialize_transparently() {
        let u = Uuid::nil();
        let id = SubmissionId::from_uuid(u);
        assert_eq!(
            serde_json::to_string(&id).unwrap(),
            "\"00000000-0000-0000-0000-000000000000\""
        );
    }
}
