//! Identifier newtypes.
//!
//! Every entity in the data model (§3) is a distinct UUID-backed type —
//! a [`SubmissionId`] cannot be passed where a [`JobId`] is expected.
//! All of them are always valid by construction; format validation
//! belongs to the string-based identifiers in `amtskern-validator`
//! (the social-security number, not the row's own primary key).

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! uuid_newtype {
    ($name:ident, $doc:literal) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(Uuid);

        impl $name {
            /// Create a new random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wrap an existing UUID.
            pub fn from_uuid(id: Uuid) -> Self {
                Self(id)
            }

            /// Access the underlying UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::from_str(s).map(Self)
            }
        }
    };
}

uuid_newtype!(TenantId, "Identifies a tenant. Every other row is scoped by this.");
uuid_newtype!(AccountId, "Identifies a government-account credential binding owned by a tenant.");
uuid_newtype!(SubmissionId, "Identifies one submission row.");
uuid_newtype!(LineItemId, "Identifies one submission line item row.");
uuid_newtype!(JobId, "Identifies one job-queue row.");
uuid_newtype!(UserId, "Identifies the user who created or last touched a row.");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrips_through_string() {
        let id = SubmissionId::new();
        let parsed: SubmissionId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn distinct_ids_are_not_equal() {
        assert_ne!(TenantId::new(), TenantId::new());
    }
}
