use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($name:ident, $sequence:ident) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u64);

        static $sequence: AtomicU64 = AtomicU64::new(1);

        impl $name {
            /// Allocate the next identifier from the process-wide sequence.
            pub fn next() -> Self {
                Self($sequence.fetch_add(1, Ordering::Relaxed))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }
    };
}

define_id!(ShelterId, SHELTER_SEQUENCE);
define_id!(PetId, PET_SEQUENCE);
define_id!(SponsorshipId, SPONSORSHIP_SEQUENCE);
define_id!(CommentId, COMMENT_SEQUENCE);
define_id!(ComparisonId, COMPARISON_SEQUENCE);
define_id!(ApplicationId, APPLICATION_SEQUENCE);

/// Opaque reference to an authenticated user, issued by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
