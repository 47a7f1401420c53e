//! SDK configuration: which package and service actions to bind.

use std::fs;
use std::path::Path;

use messenger_ipc::Intent;
use serde::{Deserialize, Serialize};

use crate::error::SdkError;
use crate::permissions::MESSENGER_PACKAGE;

pub const IDENTITY_ACTION: &str = "org.ethereumhpone.messenger.action.BIND_IDENTITY";
pub const MESSAGING_ACTION: &str = "org.ethereumhpone.messenger.action.BIND_MESSAGING";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SdkConfig {
    pub messenger_package: String,
    pub identity_action: String,
    pub messaging_action: String,
}

impl Default for SdkConfig {
    fn default() -> Self {
        Self {
            messenger_package: MESSENGER_PACKAGE.to_owned(),
            identity_action: IDENTITY_ACTION.to_owned(),
            messaging_action: MESSAGING_ACTION.to_owned(),
        }
    }
}

impl SdkConfig {
    /// Parse and validate. Missing keys keep their defaults.
    pub fn from_toml(input: &str) -> Result<Self, SdkError> {
        let config: Self =
            toml::from_str(input).map_err(|err| SdkError::invalid_config(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, SdkError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|err| {
            SdkError::invalid_config(format!("cannot read {}: {err}", path.display()))
        })?;
        Self::from_toml(&contents)
    }

    pub fn validate(&self) -> Result<(), SdkError> {
        for (field, value) in [
            ("messenger_package", &self.messenger_package),
            ("identity_action", &self.identity_action),
            ("messaging_action", &self.messaging_action),
        ] {
            if value.trim().is_empty() {
                return Err(SdkError::invalid_config(format!("{field} must not be empty")));
            }
        }
        if self.identity_action == self.messaging_action {
            return Err(SdkError::invalid_config(
                "identity_action and messaging_action must differ",
            ));
        }
        Ok(())
    }

    pub fn identity_intent(&self) -> Intent {
        Intent::new(&self.identity_action).with_package(&self.messenger_package)
    }

    pub fn messaging_intent(&self) -> Intent {
        Intent::new(&self.messaging_action).with_package(&self.messenger_package)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_target_messenger() {
        let config = SdkConfig::default();
        assert_eq!(config.validate(), Ok(()));
        let intent = config.identity_intent();
        assert_eq!(intent.action, IDENTITY_ACTION);
        assert_eq!(intent.package.as_deref(), Some(MESSENGER_PACKAGE));
        assert_eq!(config.messaging_intent().action, MESSAGING_ACTION);
    }

    #[test]
    fn toml_overrides_only_given_keys() {
        let config = SdkConfig::from_toml(r#"messenger_package = "org.example.messenger.debug""#)
            .expect("valid toml");
        assert_eq!(config.messenger_package, "org.example.messenger.debug");
        assert_eq!(config.identity_action, IDENTITY_ACTION);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let err = SdkConfig::from_toml(r#"identity_action = "  ""#).expect_err("empty action");
        assert!(matches!(err, SdkError::InvalidConfig { .. }));

        let err = SdkConfig::from_toml(&format!(r#"identity_action = "{MESSAGING_ACTION}""#))
            .expect_err("duplicate action");
        assert!(matches!(err, SdkError::InvalidConfig { .. }));

        assert!(SdkConfig::from_toml("messenger_package = 3").is_err());
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        writeln!(file, r#"messaging_action = "org.example.BIND_MESSAGING""#).expect("write");
        let config = SdkConfig::from_path(file.path()).expect("config file");
        assert_eq!(config.messaging_action, "org.example.BIND_MESSAGING");

        let missing = SdkConfig::from_path(file.path().with_extension("missing"));
        assert!(matches!(missing, Err(SdkError::InvalidConfig { .. })));
    }
}
