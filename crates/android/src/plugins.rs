//! Gradle plugin registry
//!
//! Plugins are applied in registration order. Later plugins hook into
//! extensions installed by earlier ones, so the Kotlin and Flutter plugins
//! must come after an Android plugin.

use droidplan_core::error::{Error, Result};
use droidplan_core::validation::{ValidationResult, Validator};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Plugins that install the `android {}` extension
pub const ANDROID_PLUGINS: &[&str] = &["com.android.application", "com.android.library"];

/// Plugins that need the `android {}` extension to exist when applied
const NEEDS_ANDROID: &[&str] = &["org.jetbrains.kotlin.android", "dev.flutter.flutter-gradle-plugin"];

/// A plugin id as written in `plugins { id("...") }`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct PluginId(String);

impl PluginId {
    /// The id as written
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The id with legacy aliases mapped to their canonical form
    pub fn canonical(&self) -> &str {
        match self.0.as_str() {
            "kotlin-android" => "org.jetbrains.kotlin.android",
            "kotlin-kapt" => "org.jetbrains.kotlin.kapt",
            other => other,
        }
    }
}

impl FromStr for PluginId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let id = s.trim();
        if id.is_empty() || id.chars().any(char::is_whitespace) {
            return Err(Error::invalid_value(
                "plugins",
                format!("Invalid plugin id '{}'", s),
            ));
        }
        Ok(Self(id.to_string()))
    }
}

impl fmt::Display for PluginId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Ordered, duplicate-free set of plugins
#[derive(Debug, Clone, Default)]
pub struct PluginRegistry {
    plugins: Vec<PluginId>,
}

impl PluginRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a plugin after all previously registered ones
    ///
    /// Fails with a duplicate plugin error if the id, or an alias of it, is
    /// already present.
    pub fn register(&mut self, plugin_id: &str) -> Result<()> {
        let id: PluginId = plugin_id.parse()?;
        if self.position(id.canonical()).is_some() {
            return Err(Error::duplicate_plugin(id.as_str()));
        }
        tracing::debug!(plugin = %id, order = self.plugins.len(), "Registering plugin");
        self.plugins.push(id);
        Ok(())
    }

    /// Plugins in application order; call again to restart
    pub fn list(&self) -> impl Iterator<Item = &PluginId> + '_ {
        self.plugins.iter()
    }

    /// True if the id, or an alias of it, is registered
    pub fn contains(&self, plugin_id: &str) -> bool {
        plugin_id
            .parse::<PluginId>()
            .is_ok_and(|id| self.position(id.canonical()).is_some())
    }

    /// Number of plugins
    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    /// True if no plugin is registered
    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    fn position(&self, canonical: &str) -> Option<usize> {
        self.plugins.iter().position(|p| p.canonical() == canonical)
    }

    /// Check that every plugin needing the Android extension follows an Android plugin
    pub fn validate_order(&self) -> ValidationResult {
        let first_android = self
            .plugins
            .iter()
            .position(|p| ANDROID_PLUGINS.contains(&p.canonical()));

        let mut validator = Validator::new();
        for (index, plugin) in self.plugins.iter().enumerate() {
            if !NEEDS_ANDROID.contains(&plugin.canonical()) {
                continue;
            }
            let applied_after_android = first_android.is_some_and(|android| android < index);
            validator = validator.custom("plugins", || {
                (!applied_after_android)
                    .then(|| format!("{} applied before an Android plugin", plugin))
            });
        }
        validator.validate()
    }
}

impl<'a> IntoIterator for &'a PluginRegistry {
    type Item = &'a PluginId;
    type IntoIter = std::slice::Iter<'a, PluginId>;

    fn into_iter(self) -> Self::IntoIter {
        self.plugins.iter()
    }
}
