//! The version gate: an optional `versions` collection in the Case Registry
//! consulted once at startup.

use serde::{Deserialize, Serialize};

use crate::simple_display;

/// The verdict a `versions` record carries for a given build.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VersionStatus {
    Allowed,
    Warning,
    Refused,
}

simple_display!(VersionStatus {
    Allowed => "allowed",
    Warning => "warning",
    Refused => "refused",
});

/// A record in the `versions` collection.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionRecord {
    pub id: String,
    pub status: VersionStatus,
    pub message: Option<String>,
}

/// The result of the startup version handshake: `REFUSED` is fatal,
/// `WARNING` surfaces a message and continues, `ALLOWED`/`Uncontrolled` are
/// silent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VersionVerdict {
    Allowed,
    Warning { message: Option<String> },
    Refused { message: Option<String> },
    /// No `versions` collection / no matching record: treated as allowed.
    Uncontrolled,
}

impl VersionVerdict {
    pub fn from_record(record: Option<&VersionRecord>) -> Self {
        match record {
            None => VersionVerdict::Uncontrolled,
            Some(r) => match r.status {
                VersionStatus::Allowed => VersionVerdict::Allowed,
                VersionStatus::Warning => VersionVerdict::Warning {
                    message: r.message.clone(),
                },
                VersionStatus::Refused => VersionVerdict::Refused {
                    message: r.message.clone(),
                },
            },
        }
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, VersionVerdict::Refused { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_record_is_uncontrolled() {
        assert_eq!(VersionVerdict::from_record(None), VersionVerdict::Uncontrolled);
    }

    #[test]
    fn refused_is_fatal_others_are_not() {
        let refused = VersionRecord {
            id: "1.0.0".into(),
            status: VersionStatus::Refused,
            message: Some("too old".into()),
        };
        assert!(VersionVerdict::from_record(Some(&refused)).is_fatal());

        let allowed = VersionRecord {
            id: "1.0.0".into(),
            status: VersionStatus::Allowed,
            message: None,
        };
        assert!(!VersionVerdict::from_record(Some(&allowed)).is_fatal());
    }
}
