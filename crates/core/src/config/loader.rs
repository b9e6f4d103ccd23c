//! Configuration file loading

use super::schema::ConfigSchema;
use crate::error::{Error, Result, ResultExt};
use std::path::{Path, PathBuf};

/// Configuration wrapper
#[derive(Debug, Clone)]
pub struct Config {
    /// Parsed schema
    pub schema: ConfigSchema,
    /// File the schema was read from, if any
    pub path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a file path or use defaults
    ///
    /// An explicit path that does not exist is an error; when no path is
    /// given the standard locations are searched and defaults apply if none
    /// of them exists.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) if !p.exists() => return Err(Error::config_not_found(p)),
            Some(p) => Some(p.to_path_buf()),
            None => find_config_file(),
        };

        let schema = if let Some(ref p) = config_path {
            load_config_file(p)?
        } else {
            ConfigSchema::default()
        };

        Ok(Self {
            schema,
            path: config_path,
        })
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self> {
        Ok(Self {
            schema: toml::from_str(content)?,
            path: None,
        })
    }

    /// Load with defaults only (no file)
    pub fn default() -> Self {
        Self {
            schema: ConfigSchema::default(),
            path: None,
        }
    }
}

/// Find configuration file in standard locations
fn find_config_file() -> Option<PathBuf> {
    let candidates = [
        "droidplan.toml",
        ".droidplan.toml",
        "android/droidplan.toml",
    ];

    candidates
        .into_iter()
        .map(PathBuf::from)
        .find(|candidate| candidate.exists())
}

/// Load and parse a TOML configuration file
fn load_config_file(path: &Path) -> Result<ConfigSchema> {
    let content = std::fs::read_to_string(path)
        .map_err(Error::from)
        .context(format!("Failed to read config file {}", path.display()))?;

    let schema: ConfigSchema = toml::from_str(&content)
        .map_err(Error::from)
        .context(format!("Failed to parse config file {}", path.display()))?;

    Ok(schema)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{RepositoryEntry, SdkSetting};
    use crate::error::ErrorCode;
    use std::io::Write;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(config.path.is_none());
        assert_eq!(config.schema.android.java_version, 11);
        assert_eq!(config.schema.plugins.len(), 3);
        assert_eq!(config.schema.repositories.len(), 3);
    }

    #[test]
    fn test_config_load_explicit_missing_file() {
        let err = Config::load(Some(Path::new("/nonexistent/droidplan.toml"))).unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigNotFound);
    }

    #[test]
    fn test_config_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[android]
namespace = "com.example.step_counter"
compile_sdk = 34

[default_config]
application_id = "com.example.step_counter"
min_sdk = "flutter.minSdkVersion"

[resolution]
force = ["androidx.core:core-ktx:1.12.0"]
cache_dynamic_versions = {{ amount = 10, unit = "minutes" }}

[[repositories]]
type = "maven"
url = "https://storage.googleapis.com/download.flutter.io"
"#
        )
        .unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        let schema = &config.schema;

        assert_eq!(schema.android.compile_sdk, SdkSetting::Level(34));
        assert_eq!(schema.default_config.min_sdk, SdkSetting::symbol("flutter.minSdkVersion"));
        assert_eq!(schema.resolution.force, vec!["androidx.core:core-ktx:1.12.0"]);
        assert_eq!(schema.resolution.cache_dynamic_versions.as_ref().unwrap().amount, 10);
        assert_eq!(schema.repositories.len(), 1);
        assert!(matches!(schema.repositories[0], RepositoryEntry::Maven { .. }));
    }

    #[test]
    fn test_config_parse_error() {
        let err = Config::parse("plugins = 3").unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigParseError);
    }
}
