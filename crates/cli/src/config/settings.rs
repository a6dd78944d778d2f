//! `Settings/settings.txt`: line-oriented `key: value`, keys `mongodb
//! server`, `user group`, `password`, `instance`.

use std::collections::HashMap;
use std::path::Path;

use gc_core::{Instance, UserGroup};

use crate::error::CliError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    pub mongodb_server: String,
    pub user_group: UserGroup,
    pub password: String,
    pub instance: Instance,
}

impl Settings {
    pub fn parse(text: &str) -> Result<Self, CliError> {
        let mut fields: HashMap<String, String> = HashMap::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let (key, value) = line.split_once(':').ok_or_else(|| {
                CliError::Config(format!("malformed settings line (expected \"key: value\"): {line:?}"))
            })?;
            fields.insert(key.trim().to_ascii_lowercase(), value.trim().to_string());
        }

        let take = |key: &str| -> Result<String, CliError> {
            fields
                .get(key)
                .cloned()
                .ok_or_else(|| CliError::Config(format!("settings.txt missing required key {key:?}")))
        };

        Ok(Settings {
            mongodb_server: take("mongodb server")?,
            user_group: UserGroup::from(take("user group")?),
            password: take("password")?,
            instance: Instance::from(take("instance")?),
        })
    }

    pub async fn load(path: &Path) -> Result<Self, CliError> {
        let text = tokio::fs::read_to_string(path).await.map_err(|source| {
            CliError::Config(format!("reading {}: {source}", path.display()))
        })?;
        Self::parse(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_the_four_required_keys() {
        let text = "mongodb server: mongodb://db.lab.local:27017\nuser group: eng\npassword: hunter2\ninstance: prod\n";
        let settings = Settings::parse(text).expect("parse");
        assert_eq!(settings.mongodb_server, "mongodb://db.lab.local:27017");
        assert_eq!(settings.user_group, UserGroup::from("eng"));
        assert_eq!(settings.password, "hunter2");
        assert_eq!(settings.instance, Instance::from("prod"));
    }

    #[test]
    fn blank_lines_are_ignored() {
        let text = "mongodb server: db\n\nuser group: eng\n\npassword: x\ninstance: i\n";
        assert!(Settings::parse(text).is_ok());
    }

    #[test]
    fn missing_key_is_a_config_error() {
        let text = "mongodb server: db\nuser group: eng\npassword: x\n";
        let err = Settings::parse(text).unwrap_err();
        assert!(matches!(err, CliError::Config(_)));
    }

    #[test]
    fn malformed_line_is_a_config_error() {
        let text = "mongodb server db\n";
        let err = Settings::parse(text).unwrap_err();
        assert!(matches!(err, CliError::Config(_)));
    }
}
