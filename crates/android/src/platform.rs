//! Target platform resolution
//!
//! Resolves the symbolic values a Flutter Android build script reads from
//! the Flutter tooling (`flutter.compileSdkVersion`, `flutter.versionCode`,
//! ...) against a platform descriptor.

use droidplan_core::config::{PlatformConfig, SdkSetting};
use droidplan_core::error::{Error, Result, ResultExt};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Prefix under which the Flutter Gradle plugin exposes its values
pub const FLUTTER_PREFIX: &str = "flutter.";

static PROPERTY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*([^=:\s]+)\s*[=:]\s*(.*?)\s*$").unwrap());

/// A value the platform descriptor can supply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlatformSymbol {
    /// `flutter.compileSdkVersion`
    CompileSdk,
    /// `flutter.minSdkVersion`
    MinSdk,
    /// `flutter.targetSdkVersion`
    TargetSdk,
    /// `flutter.versionCode`
    VersionCode,
    /// `flutter.versionName`
    VersionName,
    /// `flutter.ndkVersion`
    NdkVersion,
}

impl PlatformSymbol {
    /// Every symbol, in `android {}` order
    pub const ALL: [PlatformSymbol; 6] = [
        PlatformSymbol::CompileSdk,
        PlatformSymbol::MinSdk,
        PlatformSymbol::TargetSdk,
        PlatformSymbol::VersionCode,
        PlatformSymbol::VersionName,
        PlatformSymbol::NdkVersion,
    ];

    /// Short name used by Gradle, e.g. `minSdk`
    pub fn as_str(&self) -> &'static str {
        match self {
            PlatformSymbol::CompileSdk => "compileSdk",
            PlatformSymbol::MinSdk => "minSdk",
            PlatformSymbol::TargetSdk => "targetSdk",
            PlatformSymbol::VersionCode => "versionCode",
            PlatformSymbol::VersionName => "versionName",
            PlatformSymbol::NdkVersion => "ndkVersion",
        }
    }

    /// Key used in Flutter's `local.properties` and Gradle extension
    pub fn flutter_property(&self) -> &'static str {
        match self {
            PlatformSymbol::CompileSdk => "flutter.compileSdkVersion",
            PlatformSymbol::MinSdk => "flutter.minSdkVersion",
            PlatformSymbol::TargetSdk => "flutter.targetSdkVersion",
            PlatformSymbol::VersionCode => "flutter.versionCode",
            PlatformSymbol::VersionName => "flutter.versionName",
            PlatformSymbol::NdkVersion => "flutter.ndkVersion",
        }
    }

    fn is_numeric(self) -> bool {
        !matches!(self, PlatformSymbol::VersionName | PlatformSymbol::NdkVersion)
    }
}

impl FromStr for PlatformSymbol {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let name = s.trim();
        let name = name.strip_prefix(FLUTTER_PREFIX).unwrap_or(name);
        match name {
            "compileSdk" | "compileSdkVersion" => Ok(PlatformSymbol::CompileSdk),
            "minSdk" | "minSdkVersion" => Ok(PlatformSymbol::MinSdk),
            "targetSdk" | "targetSdkVersion" => Ok(PlatformSymbol::TargetSdk),
            "versionCode" => Ok(PlatformSymbol::VersionCode),
            "versionName" => Ok(PlatformSymbol::VersionName),
            "ndkVersion" => Ok(PlatformSymbol::NdkVersion),
            _ => Err(Error::unknown_symbol(s.trim())),
        }
    }
}

impl fmt::Display for PlatformSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resolved descriptor value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PlatformValue {
    /// SDK level or version code
    Number(u32),
    /// Version names and the NDK version
    Text(String),
}

impl PlatformValue {
    /// The numeric value, if this is a number
    pub fn as_number(&self) -> Option<u32> {
        match self {
            PlatformValue::Number(n) => Some(*n),
            PlatformValue::Text(_) => None,
        }
    }
}

impl fmt::Display for PlatformValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlatformValue::Number(n) => write!(f, "{}", n),
            PlatformValue::Text(s) => f.write_str(s),
        }
    }
}

/// Source of concrete platform values
pub trait PlatformDescriptor {
    /// Value of `symbol`, or `None` if the descriptor lacks it
    fn lookup(&self, symbol: PlatformSymbol) -> Option<PlatformValue>;
}

impl PlatformDescriptor for HashMap<PlatformSymbol, PlatformValue> {
    fn lookup(&self, symbol: PlatformSymbol) -> Option<PlatformValue> {
        self.get(&symbol).cloned()
    }
}

/// Values the Flutter tooling exposes to an Android build
///
/// Starts from the Flutter SDK defaults; the config file's `[platform]`
/// table and the app's `local.properties` override them in that order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlutterDescriptor {
    /// `flutter.compileSdkVersion`
    pub compile_sdk: u32,
    /// `flutter.minSdkVersion`
    pub min_sdk: u32,
    /// `flutter.targetSdkVersion`
    pub target_sdk: u32,
    /// `flutter.ndkVersion`
    pub ndk_version: String,
    /// `flutter.versionCode`
    pub version_code: u32,
    /// `flutter.versionName`
    pub version_name: String,
}

impl Default for FlutterDescriptor {
    fn default() -> Self {
        Self {
            compile_sdk: 34,
            min_sdk: 21,
            target_sdk: 34,
            ndk_version: "26.3.11579264".to_string(),
            version_code: 1,
            version_name: "1.0".to_string(),
        }
    }
}

impl FlutterDescriptor {
    /// Apply the overrides of a `[platform]` table
    pub fn with_overrides(mut self, overrides: &PlatformConfig) -> Self {
        if let Some(v) = overrides.compile_sdk {
            self.compile_sdk = v;
        }
        if let Some(v) = overrides.min_sdk {
            self.min_sdk = v;
        }
        if let Some(v) = overrides.target_sdk {
            self.target_sdk = v;
        }
        if let Some(v) = &overrides.ndk_version {
            self.ndk_version.clone_from(v);
        }
        if let Some(v) = overrides.version_code {
            self.version_code = v;
        }
        if let Some(v) = &overrides.version_name {
            self.version_name.clone_from(v);
        }
        self
    }

    /// Apply a Flutter `local.properties` file
    pub fn with_local_properties(self, path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(Error::from)
            .context(format!("Failed to read {}", path.display()))?;
        self.with_properties(&content)
            .context(format!("In {}", path.display()))
    }

    /// Apply `key=value` properties; keys outside `flutter.*` are ignored
    pub fn with_properties(mut self, content: &str) -> Result<Self> {
        for line in content.lines() {
            let trimmed = line.trim_start();
            if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('!') {
                continue;
            }
            let Some(caps) = PROPERTY_RE.captures(line) else {
                continue;
            };
            let key = &caps[1];
            let value = unescape(&caps[2]);

            let Ok(symbol) = key.parse::<PlatformSymbol>() else {
                continue;
            };
            if key != symbol.flutter_property() {
                continue;
            }
            self.set(symbol, &value)?;
        }
        Ok(self)
    }

    fn set(&mut self, symbol: PlatformSymbol, value: &str) -> Result<()> {
        let number = || {
            value.parse::<u32>().map_err(|_| {
                Error::invalid_value(
                    symbol.flutter_property(),
                    format!("{} must be a number, got '{}'", symbol.flutter_property(), value),
                )
            })
        };
        match symbol {
            PlatformSymbol::CompileSdk => self.compile_sdk = number()?,
            PlatformSymbol::MinSdk => self.min_sdk = number()?,
            PlatformSymbol::TargetSdk => self.target_sdk = number()?,
            PlatformSymbol::VersionCode => self.version_code = number()?,
            PlatformSymbol::VersionName => self.version_name = value.to_string(),
            PlatformSymbol::NdkVersion => self.ndk_version = value.to_string(),
        }
        Ok(())
    }
}

impl PlatformDescriptor for FlutterDescriptor {
    fn lookup(&self, symbol: PlatformSymbol) -> Option<PlatformValue> {
        Some(match symbol {
            PlatformSymbol::CompileSdk => PlatformValue::Number(self.compile_sdk),
            PlatformSymbol::MinSdk => PlatformValue::Number(self.min_sdk),
            PlatformSymbol::TargetSdk => PlatformValue::Number(self.target_sdk),
            PlatformSymbol::VersionCode => PlatformValue::Number(self.version_code),
            PlatformSymbol::VersionName => PlatformValue::Text(self.version_name.clone()),
            PlatformSymbol::NdkVersion => PlatformValue::Text(self.ndk_version.clone()),
        })
    }
}

fn unescape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Resolves symbolic settings against a descriptor
#[derive(Debug, Clone)]
pub struct TargetPlatformResolver<D> {
    descriptor: D,
}

impl<D: PlatformDescriptor> TargetPlatformResolver<D> {
    /// Resolver over `descriptor`
    pub fn new(descriptor: D) -> Self {
        Self { descriptor }
    }

    /// The underlying descriptor
    pub fn descriptor(&self) -> &D {
        &self.descriptor
    }

    /// Resolve a symbol by name, e.g. `minSdk` or `flutter.minSdkVersion`
    pub fn resolve(&self, symbol: &str) -> Result<PlatformValue> {
        self.resolve_symbol(symbol.parse()?)
    }

    /// Look up a parsed symbol
    pub fn resolve_symbol(&self, symbol: PlatformSymbol) -> Result<PlatformValue> {
        let value = self.descriptor.lookup(symbol).ok_or_else(|| {
            Error::config(format!("Platform descriptor has no value for {}", symbol))
                .with_field(symbol.as_str())
        })?;
        tracing::trace!(%symbol, %value, "Resolved platform symbol");
        Ok(value)
    }

    /// Resolve a numeric setting for `field`
    pub fn resolve_number(&self, field: &str, setting: &SdkSetting) -> Result<u32> {
        match setting {
            SdkSetting::Level(level) => Ok(*level),
            SdkSetting::Symbol(name) => {
                let symbol: PlatformSymbol = name.parse()?;
                if !symbol.is_numeric() {
                    return Err(Error::invalid_value(
                        field,
                        format!("{} resolves to text, {} needs a number", name, field),
                    ));
                }
                self.resolve_symbol(symbol)?.as_number().ok_or_else(|| {
                    Error::invalid_value(field, format!("{} did not resolve to a number", name))
                })
            }
        }
    }

    /// Resolve a text setting; only values starting with `flutter.` are symbolic
    pub fn resolve_text(&self, value: &str) -> Result<String> {
        if value.starts_with(FLUTTER_PREFIX) {
            Ok(self.resolve(value)?.to_string())
        } else {
            Ok(value.to_string())
        }
    }
}
