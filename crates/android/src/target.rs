//! Build target and `android {}` options

use droidplan_core::validation::{ValidationResult, Validator};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

static PACKAGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_]*(\.[A-Za-z][A-Za-z0-9_]*)+$").unwrap());

/// The resolved `defaultConfig` plus `compileSdk`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildTarget {
    /// `applicationId`
    pub application_id: String,
    /// `minSdk`
    pub min_sdk: u32,
    /// `targetSdk`
    pub target_sdk: u32,
    /// `compileSdk`
    pub compile_sdk: u32,
    /// `versionCode`
    pub version_code: u32,
    /// `versionName`
    pub version_name: String,
}

impl BuildTarget {
    /// Checks `minSdk <= targetSdk <= compileSdk` and the identity fields
    pub fn validate(&self) -> ValidationResult {
        Validator::new()
            .ordered("minSdk", self.min_sdk, "targetSdk", self.target_sdk)
            .ordered("targetSdk", self.target_sdk, "compileSdk", self.compile_sdk)
            .required("applicationId", &self.application_id)
            .pattern(
                "applicationId",
                &self.application_id,
                &PACKAGE_RE,
                "a dotted package name such as com.example.app",
            )
            .at_least("versionCode", self.version_code, 1)
            .required("versionName", &self.version_name)
            .validate()
    }
}

/// Everything in `android {}` that is not part of the build target
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AndroidOptions {
    /// Kotlin package of the generated `R` class
    pub namespace: String,
    /// Pinned NDK, if any
    pub ndk_version: Option<String>,
    /// Used for source/target compatibility and `jvmTarget`
    pub java_version: u8,
    /// `multiDexEnabled`
    pub multidex: bool,
    /// Path to the Flutter module root
    pub flutter_source: String,
}

impl AndroidOptions {
    /// Defaults for `namespace`
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            ndk_version: None,
            java_version: 11,
            multidex: false,
            flutter_source: "../..".to_string(),
        }
    }

    /// Checks the namespace and the Java version
    pub fn validate(&self) -> ValidationResult {
        Validator::new()
            .required("namespace", &self.namespace)
            .pattern("namespace", &self.namespace, &PACKAGE_RE, "a dotted package name")
            .at_least("javaVersion", self.java_version, 8)
            .required("flutter.source", &self.flutter_source)
            .validate()
    }
}
