//! Configuration schema definitions
//!
//! The declarative description of an Android app build, mirroring the blocks
//! of a `build.gradle.kts` script.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Root configuration schema
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSchema {
    /// `[general]`
    #[serde(default)]
    pub general: GeneralConfig,

    /// `[android]`
    #[serde(default)]
    pub android: AndroidConfig,

    /// `[default_config]`
    #[serde(default)]
    pub default_config: DefaultConfig,

    /// Plugin ids in application order
    #[serde(default = "default_plugins")]
    pub plugins: Vec<String>,

    /// Signing configs by name
    #[serde(default)]
    pub signing_configs: BTreeMap<String, SigningConfigEntry>,

    /// Build types by name
    #[serde(default = "default_build_types")]
    pub build_types: BTreeMap<String, BuildTypeEntry>,

    /// `[resolution]`
    #[serde(default)]
    pub resolution: ResolutionConfig,

    /// Repositories in resolution order
    #[serde(default = "default_repositories")]
    pub repositories: Vec<RepositoryEntry>,

    /// `[[dependencies]]` in declaration order
    #[serde(default)]
    pub dependencies: Vec<DependencyEntry>,

    /// Values overriding the built-in Flutter platform descriptor
    #[serde(default)]
    pub platform: PlatformConfig,
}

impl Default for ConfigSchema {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            android: AndroidConfig::default(),
            default_config: DefaultConfig::default(),
            plugins: default_plugins(),
            signing_configs: BTreeMap::new(),
            build_types: default_build_types(),
            resolution: ResolutionConfig::default(),
            repositories: default_repositories(),
            dependencies: Vec::new(),
            platform: PlatformConfig::default(),
        }
    }
}

/// General tool configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Project name, used in output headers
    #[serde(default = "default_project_name")]
    pub project_name: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            project_name: default_project_name(),
        }
    }
}

fn default_project_name() -> String {
    "app".to_string()
}

/// A numeric SDK setting: either a literal level or a Flutter symbol such as
/// `flutter.minSdkVersion`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SdkSetting {
    /// A literal API level
    Level(u32),
    /// A Flutter symbol
    Symbol(String),
}

impl SdkSetting {
    /// Setting referring to the Flutter symbol `name`
    pub fn symbol(name: &str) -> Self {
        SdkSetting::Symbol(name.to_string())
    }
}

/// The `android {}` block outside of `defaultConfig`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AndroidConfig {
    /// Kotlin package of the generated `R` class
    #[serde(default)]
    pub namespace: String,

    /// Literal level or `flutter.compileSdkVersion`
    #[serde(default = "default_compile_sdk")]
    pub compile_sdk: SdkSetting,

    /// NDK version, literal or `flutter.ndkVersion`
    #[serde(default)]
    pub ndk_version: Option<String>,

    /// Java level for source/target compatibility and `jvmTarget`
    #[serde(default = "default_java_version")]
    pub java_version: u8,

    /// Path to the Flutter project root, relative to the app module
    #[serde(default = "default_flutter_source")]
    pub flutter_source: String,
}

impl Default for AndroidConfig {
    fn default() -> Self {
        Self {
            namespace: String::new(),
            compile_sdk: default_compile_sdk(),
            ndk_version: None,
            java_version: default_java_version(),
            flutter_source: default_flutter_source(),
        }
    }
}

fn default_compile_sdk() -> SdkSetting {
    SdkSetting::symbol("flutter.compileSdkVersion")
}

fn default_java_version() -> u8 {
    11
}

fn default_flutter_source() -> String {
    "../..".to_string()
}

/// The `defaultConfig {}` block
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultConfig {
    /// `applicationId`
    #[serde(default)]
    pub application_id: String,

    /// Literal level or `flutter.minSdkVersion`
    #[serde(default = "default_min_sdk")]
    pub min_sdk: SdkSetting,

    /// Literal level or `flutter.targetSdkVersion`
    #[serde(default = "default_target_sdk")]
    pub target_sdk: SdkSetting,

    /// Literal code or `flutter.versionCode`
    #[serde(default = "default_version_code")]
    pub version_code: SdkSetting,

    /// Literal version name or `flutter.versionName`
    #[serde(default = "default_version_name")]
    pub version_name: String,

    /// `multiDexEnabled`
    #[serde(default)]
    pub multidex: bool,
}

impl Default for DefaultConfig {
    fn default() -> Self {
        Self {
            application_id: String::new(),
            min_sdk: default_min_sdk(),
            target_sdk: default_target_sdk(),
            version_code: default_version_code(),
            version_name: default_version_name(),
            multidex: false,
        }
    }
}

fn default_min_sdk() -> SdkSetting {
    SdkSetting::symbol("flutter.minSdkVersion")
}

fn default_target_sdk() -> SdkSetting {
    SdkSetting::symbol("flutter.targetSdkVersion")
}

fn default_version_code() -> SdkSetting {
    SdkSetting::symbol("flutter.versionCode")
}

fn default_version_name() -> String {
    "flutter.versionName".to_string()
}

fn default_plugins() -> Vec<String> {
    vec![
        "com.android.application",
        "kotlin-android",
        "dev.flutter.flutter-gradle-plugin",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

/// A named entry under `signingConfigs`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SigningConfigEntry {
    /// `debug` or `release`
    pub kind: String,

    /// Keystore path; passwords are never read by droidplan
    #[serde(default)]
    pub store_file: Option<String>,

    /// Key alias inside the keystore
    #[serde(default)]
    pub key_alias: Option<String>,
}

/// A named entry under `buildTypes`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuildTypeEntry {
    /// Name of the signing config this build type signs with
    #[serde(default)]
    pub signing_config: Option<String>,

    /// `isMinifyEnabled`
    #[serde(default)]
    pub minify_enabled: bool,
}

fn default_build_types() -> BTreeMap<String, BuildTypeEntry> {
    let mut types = BTreeMap::new();
    types.insert(
        "debug".to_string(),
        BuildTypeEntry {
            signing_config: Some("debug".to_string()),
            minify_enabled: false,
        },
    );
    types.insert(
        "release".to_string(),
        BuildTypeEntry {
            signing_config: Some("debug".to_string()),
            minify_enabled: false,
        },
    );
    types
}

/// `configurations.all { resolutionStrategy {} }`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResolutionConfig {
    /// Gradle notation `group:artifact:version`
    #[serde(default)]
    pub force: Vec<String>,

    /// `cacheDynamicVersionsFor`
    #[serde(default)]
    pub cache_dynamic_versions: Option<TtlEntry>,

    /// `cacheChangingModulesFor`
    #[serde(default)]
    pub cache_changing_modules: Option<TtlEntry>,
}

/// A cache duration as Gradle spells it: `(10, "minutes")`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TtlEntry {
    /// Number of units
    pub amount: u64,
    /// `seconds`, `minutes`, `hours` or `days`
    pub unit: String,
}

/// A repository declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RepositoryEntry {
    /// `google()`
    Google,
    /// `mavenCentral()`
    MavenCentral,
    /// `maven { url = uri(...) }`
    Maven {
        /// Repository base URL
        url: String,
    },
}

fn default_repositories() -> Vec<RepositoryEntry> {
    vec![
        RepositoryEntry::Google,
        RepositoryEntry::MavenCentral,
        RepositoryEntry::Maven {
            url: "https://storage.googleapis.com/download.flutter.io".to_string(),
        },
    ]
}

/// A declared library dependency
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DependencyEntry {
    /// `group:artifact`
    pub coordinate: String,

    /// Exact, dynamic (`1.+`, `latest.release`) or absent
    #[serde(default)]
    pub version: Option<String>,

    /// Gradle configuration, `implementation` by default
    #[serde(default = "default_dependency_configuration")]
    pub configuration: String,
}

fn default_dependency_configuration() -> String {
    "implementation".to_string()
}

/// Platform descriptor overrides
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlatformConfig {
    /// `flutter.compileSdkVersion`
    #[serde(default)]
    pub compile_sdk: Option<u32>,
    /// `flutter.minSdkVersion`
    #[serde(default)]
    pub min_sdk: Option<u32>,
    /// `flutter.targetSdkVersion`
    #[serde(default)]
    pub target_sdk: Option<u32>,
    /// `flutter.ndkVersion`
    #[serde(default)]
    pub ndk_version: Option<String>,
    /// `flutter.versionCode`
    #[serde(default)]
    pub version_code: Option<u32>,
    /// `flutter.versionName`
    #[serde(default)]
    pub version_name: Option<String>,
}
