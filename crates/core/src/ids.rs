//! Identifier newtypes shared by every component.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::define_id;

define_id!(CaseId, "case-");

macro_rules! tag_type {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(SmolStr);

        impl $name {
            pub fn as_str(&self) -> &str {
                self.0.as_str()
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(SmolStr::new(s))
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(SmolStr::new(s))
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.as_str()
            }
        }

        impl PartialEq<str> for $name {
            fn eq(&self, other: &str) -> bool {
                self.as_str() == other
            }
        }
    };
}

tag_type!(UserGroup, "Tenant tag: cases are visible only within their group.");
tag_type!(
    Instance,
    "Partition tag used to isolate e.g. debug from production grids."
);
tag_type!(
    ApplicationId,
    "Identifier of the adapter required to process a case. MUST NOT contain '.'."
);
tag_type!(MachineId, "Identifier of a participating machine.");
tag_type!(UserId, "Identifier of the human or service submitting/receiving cases.");

impl ApplicationId {
    /// Per the shared folder layout, application ids must not contain `.`.
    pub fn is_valid(s: &str) -> bool {
        !s.is_empty() && !s.contains('.')
    }
}
