//! Signing configs and build types
//!
//! Only the names and references are modelled. Keystore passwords never
//! pass through droidplan.

use droidplan_core::config::{BuildTypeEntry, SigningConfigEntry};
use droidplan_core::error::{Error, Result};
use droidplan_core::validation::{ValidationResult, Validator};
use serde::Serialize;
use std::str::FromStr;

/// Name of the signing config and build type the Android Gradle Plugin always creates
pub const DEBUG: &str = "debug";

/// Name of the build type whose signing reference is mandatory
pub const RELEASE: &str = "release";

/// Which keys a signing config uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SigningKind {
    /// The SDK debug keystore
    Debug,
    /// A release keystore
    Release,
}

impl FromStr for SigningKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "debug" => Ok(SigningKind::Debug),
            "release" => Ok(SigningKind::Release),
            other => Err(Error::invalid_value(
                "signingConfigs.kind",
                format!("Unknown signing kind '{}', expected debug or release", other),
            )),
        }
    }
}

/// A named entry of `signingConfigs {}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SigningConfig {
    /// Name in `signingConfigs {}`
    pub name: String,
    /// Debug or release keys
    pub kind: SigningKind,
    /// Keystore path
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    /// Key alias inside the keystore
    pub key_alias: Option<String>,
}

impl SigningConfig {
    /// Config without keystore details
    pub fn new(name: impl Into<String>, kind: SigningKind) -> Self {
        Self {
            name: name.into(),
            kind,
            store_file: None,
            key_alias: None,
        }
    }

    /// Config from its `[signing_configs.<name>]` table
    pub fn from_entry(name: &str, entry: &SigningConfigEntry) -> Result<Self> {
        Ok(Self {
            name: name.to_string(),
            kind: entry.kind.parse()?,
            store_file: entry.store_file.clone(),
            key_alias: entry.key_alias.clone(),
        })
    }
}

/// A named entry of `buildTypes {}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildType {
    /// Name in `buildTypes {}`
    pub name: String,
    /// Name of the signing config, if signed
    pub signing_config: Option<String>,
    /// `isMinifyEnabled`
    pub minify_enabled: bool,
}

impl BuildType {
    /// Build type with minification off
    pub fn new(name: impl Into<String>, signing_config: Option<&str>) -> Self {
        Self {
            name: name.into(),
            signing_config: signing_config.map(String::from),
            minify_enabled: false,
        }
    }

    /// Build type from its `[build_types.<name>]` table
    pub fn from_entry(name: &str, entry: &BuildTypeEntry) -> Self {
        Self {
            name: name.to_string(),
            signing_config: entry.signing_config.clone(),
            minify_enabled: entry.minify_enabled,
        }
    }
}

/// Signing configs together with the build types referencing them
#[derive(Debug, Clone)]
pub struct SigningSetup {
    configs: Vec<SigningConfig>,
    build_types: Vec<BuildType>,
}

impl Default for SigningSetup {
    fn default() -> Self {
        Self::new()
    }
}

impl SigningSetup {
    /// The implicit setup: a `debug` config and build type, and an unsigned `release`
    pub fn new() -> Self {
        Self {
            configs: vec![SigningConfig::new(DEBUG, SigningKind::Debug)],
            build_types: vec![
                BuildType::new(DEBUG, Some(DEBUG)),
                BuildType::new(RELEASE, None),
            ],
        }
    }

    /// The Flutter template setup, where `release` is signed with the debug keys
    pub fn debug_signed_release() -> Self {
        let mut setup = Self::new();
        setup.configure_build_type(BuildType::new(RELEASE, Some(DEBUG)));
        setup
    }

    /// Add a signing config, replacing one with the same name
    pub fn configure_signing(&mut self, config: SigningConfig) {
        match self.configs.iter_mut().find(|c| c.name == config.name) {
            Some(existing) => *existing = config,
            None => self.configs.push(config),
        }
    }

    /// Add a build type, replacing one with the same name
    pub fn configure_build_type(&mut self, build_type: BuildType) {
        match self.build_types.iter_mut().find(|b| b.name == build_type.name) {
            Some(existing) => *existing = build_type,
            None => self.build_types.push(build_type),
        }
    }

    /// Signing config by name
    pub fn config(&self, name: &str) -> Option<&SigningConfig> {
        self.configs.iter().find(|c| c.name == name)
    }

    /// Build type by name
    pub fn build_type(&self, name: &str) -> Option<&BuildType> {
        self.build_types.iter().find(|b| b.name == name)
    }

    /// Signing configs in declaration order
    pub fn configs(&self) -> &[SigningConfig] {
        &self.configs
    }

    /// Build types in declaration order
    pub fn build_types(&self) -> &[BuildType] {
        &self.build_types
    }

    /// Every signing reference must name an existing config; `release` must have one
    pub fn validate(&self) -> ValidationResult {
        let mut validator = Validator::new();

        if let Some(release) = self.build_type(RELEASE) {
            validator = validator.custom("buildTypes.release.signingConfig", || {
                release
                    .signing_config
                    .is_none()
                    .then(|| "release build type has no signingConfig".to_string())
            });
        }

        for build_type in &self.build_types {
            let Some(reference) = &build_type.signing_config else {
                continue;
            };
            let field = format!("buildTypes.{}.signingConfig", build_type.name);
            validator = validator.custom(&field, || {
                self.config(reference).is_none().then(|| {
                    format!(
                        "{} build type references unknown signingConfig '{}'",
                        build_type.name, reference
                    )
                })
            });
        }

        validator.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_release_is_unsigned() {
        let setup = SigningSetup::new();
        let result = setup.validate();
        assert!(!result.is_valid());
        assert_eq!(result.violations()[0].field, "buildTypes.release.signingConfig");
    }

    #[test]
    fn test_debug_signed_release_is_valid() {
        let setup = SigningSetup::debug_signed_release();
        assert!(setup.validate().is_valid());
        assert_eq!(
            setup.build_type(RELEASE).unwrap().signing_config.as_deref(),
            Some(DEBUG)
        );
    }

    #[test]
    fn test_unknown_reference() {
        let mut setup = SigningSetup::new();
        setup.configure_build_type(BuildType::new(RELEASE, Some("upload")));

        let result = setup.validate();
        assert_eq!(
            result.violations()[0].message,
            "release build type references unknown signingConfig 'upload'"
        );
    }

    #[test]
    fn test_named_release_config() {
        let mut setup = SigningSetup::new();
        let mut upload = SigningConfig::new("upload", SigningKind::Release);
        upload.store_file = Some("upload-keystore.jks".to_string());
        setup.configure_signing(upload);
        setup.configure_build_type(BuildType::new(RELEASE, Some("upload")));

        assert!(setup.validate().is_valid());
        assert_eq!(setup.configs().len(), 2);
    }

    #[test]
    fn test_configure_replaces_by_name() {
        let mut setup = SigningSetup::new();
        setup.configure_signing(SigningConfig::new(DEBUG, SigningKind::Debug));
        setup.configure_build_type(BuildType::new(DEBUG, None));
        assert_eq!(setup.configs().len(), 1);
        assert_eq!(setup.build_types().len(), 2);
    }

    #[test]
    fn test_signing_kind_parsing() {
        assert_eq!("release".parse::<SigningKind>().unwrap(), SigningKind::Release);
        assert!("profile".parse::<SigningKind>().is_err());
    }
}
