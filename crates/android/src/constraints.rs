//! Dependency version constraints
//!
//! The `resolutionStrategy {}` of a Gradle configuration: forced versions
//! and cache lifetimes for dynamic and changing modules.

use droidplan_core::error::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

static COORDINATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_.\-]+:[A-Za-z0-9_.\-]+$").unwrap());

/// Gradle caches dynamic versions and changing modules for 24 hours by default
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// A Maven `group:artifact` coordinate
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GroupArtifact {
    group: String,
    artifact: String,
}

impl GroupArtifact {
    /// Group part, e.g. `androidx.core`
    pub fn group(&self) -> &str {
        &self.group
    }

    /// Artifact part, e.g. `core-ktx`
    pub fn artifact(&self) -> &str {
        &self.artifact
    }
}

impl FromStr for GroupArtifact {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if !COORDINATE_RE.is_match(s) {
            return Err(Error::invalid_value(
                s,
                format!("Invalid coordinate '{}', expected group:artifact", s),
            ));
        }
        let (group, artifact) = s.split_once(':').unwrap_or((s, ""));
        Ok(Self {
            group: group.to_string(),
            artifact: artifact.to_string(),
        })
    }
}

impl TryFrom<String> for GroupArtifact {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<GroupArtifact> for String {
    fn from(value: GroupArtifact) -> Self {
        value.to_string()
    }
}

impl fmt::Display for GroupArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.group, self.artifact)
    }
}

/// The two cache lifetimes a resolution strategy controls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CacheKind {
    /// `cacheDynamicVersionsFor`
    DynamicVersions,
    /// `cacheChangingModulesFor`
    ChangingModules,
}

impl FromStr for CacheKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "dynamicVersions" | "dynamic_versions" => Ok(CacheKind::DynamicVersions),
            "changingModules" | "changing_modules" => Ok(CacheKind::ChangingModules),
            other => Err(Error::invalid_value(
                "cacheKind",
                format!("Unknown cache kind '{}', expected dynamicVersions or changingModules", other),
            )),
        }
    }
}

/// Time units accepted by `cacheDynamicVersionsFor(amount, unit)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    /// `"seconds"`
    Seconds,
    /// `"minutes"`
    Minutes,
    /// `"hours"`
    Hours,
    /// `"days"`
    Days,
}

impl TimeUnit {
    fn seconds(self) -> u64 {
        match self {
            TimeUnit::Seconds => 1,
            TimeUnit::Minutes => 60,
            TimeUnit::Hours => 60 * 60,
            TimeUnit::Days => 24 * 60 * 60,
        }
    }

    /// Duration of `amount` units
    pub fn duration(self, amount: u64) -> Result<Duration> {
        amount
            .checked_mul(self.seconds())
            .map(Duration::from_secs)
            .ok_or_else(|| Error::invalid_value("cacheTtl", format!("Cache duration {} overflows", amount)))
    }
}

impl FromStr for TimeUnit {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "second" | "seconds" => Ok(TimeUnit::Seconds),
            "minute" | "minutes" => Ok(TimeUnit::Minutes),
            "hour" | "hours" => Ok(TimeUnit::Hours),
            "day" | "days" => Ok(TimeUnit::Days),
            _ => Err(Error::invalid_value(
                "cacheTtl",
                format!("Unknown time unit '{}'", s),
            )),
        }
    }
}

/// Express a duration in the largest unit that divides it evenly
pub fn split_duration(ttl: Duration) -> (u64, &'static str) {
    let secs = ttl.as_secs();
    for (unit, name) in [
        (TimeUnit::Days, "days"),
        (TimeUnit::Hours, "hours"),
        (TimeUnit::Minutes, "minutes"),
    ] {
        if secs > 0 && secs % unit.seconds() == 0 {
            return (secs / unit.seconds(), name);
        }
    }
    (secs, "seconds")
}

/// A cache lifetime as Gradle spells it: `(10, "minutes")`
#[derive(Serialize)]
struct CacheTtl {
    amount: u64,
    unit: &'static str,
}

impl From<Duration> for CacheTtl {
    fn from(ttl: Duration) -> Self {
        let (amount, unit) = split_duration(ttl);
        Self { amount, unit }
    }
}

/// Serialize a duration as an `{amount, unit}` pair
pub(crate) fn serialize_ttl<S: Serializer>(ttl: &Duration, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    CacheTtl::from(*ttl).serialize(serializer)
}

#[allow(clippy::ref_option)]
fn serialize_optional_ttl<S: Serializer>(
    ttl: &Option<Duration>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    ttl.map(CacheTtl::from).serialize(serializer)
}

/// A forced version and the cache lifetime Gradle applies to it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencyConstraint {
    /// Coordinate the version applies to
    pub group_artifact: GroupArtifact,
    /// Version passed to `force()`
    pub forced_version: String,
    /// `None` for static versions, which Gradle caches indefinitely
    #[serde(serialize_with = "serialize_optional_ttl")]
    pub cache_ttl: Option<Duration>,
}

/// Outcome of looking up a coordinate in the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// A `force()` rule pins this version
    Forced(String),
    /// No forced version; defer to a repository lookup
    Unresolved,
}

/// Forced versions and cache lifetimes
#[derive(Debug, Clone)]
pub struct VersionConstraintStore {
    forced: Vec<(GroupArtifact, String)>,
    dynamic_versions_ttl: Duration,
    changing_modules_ttl: Duration,
}

impl Default for VersionConstraintStore {
    fn default() -> Self {
        Self::new()
    }
}

impl VersionConstraintStore {
    /// Empty store with Gradle's default cache lifetimes
    pub fn new() -> Self {
        Self {
            forced: Vec::new(),
            dynamic_versions_ttl: DEFAULT_CACHE_TTL,
            changing_modules_ttl: DEFAULT_CACHE_TTL,
        }
    }

    /// Force `version` for `group_artifact`
    ///
    /// Forcing the version already registered is a no-op; forcing a
    /// different one fails with a duplicate constraint error.
    pub fn add_force(&mut self, group_artifact: &str, version: &str) -> Result<()> {
        let coordinate: GroupArtifact = group_artifact.parse()?;
        let version = version.trim();
        if version.is_empty() {
            return Err(Error::invalid_value(
                group_artifact,
                format!("Forced version for {} is empty", coordinate),
            ));
        }

        if let Some((_, existing)) = self.forced.iter().find(|(c, _)| *c == coordinate) {
            if existing == version {
                return Ok(());
            }
            return Err(Error::duplicate_constraint(
                &coordinate.to_string(),
                existing,
                version,
            ));
        }

        tracing::debug!(coordinate = %coordinate, version, "Forcing dependency version");
        self.forced.push((coordinate, version.to_string()));
        Ok(())
    }

    /// Force from Gradle notation `group:artifact:version`
    pub fn add_force_notation(&mut self, notation: &str) -> Result<()> {
        match notation.trim().rsplit_once(':') {
            Some((coordinate, version)) if coordinate.contains(':') => {
                self.add_force(coordinate, version)
            }
            _ => Err(Error::invalid_value(
                notation,
                format!("Invalid force notation '{}', expected group:artifact:version", notation),
            )),
        }
    }

    /// Override one cache lifetime
    pub fn set_cache_ttl(&mut self, kind: CacheKind, ttl: Duration) {
        tracing::debug!(?kind, ttl_secs = ttl.as_secs(), "Setting cache TTL");
        match kind {
            CacheKind::DynamicVersions => self.dynamic_versions_ttl = ttl,
            CacheKind::ChangingModules => self.changing_modules_ttl = ttl,
        }
    }

    /// Current lifetime of `kind`
    pub fn cache_ttl(&self, kind: CacheKind) -> Duration {
        match kind {
            CacheKind::DynamicVersions => self.dynamic_versions_ttl,
            CacheKind::ChangingModules => self.changing_modules_ttl,
        }
    }

    /// Forced version of a coordinate, if any
    pub fn resolve(&self, group_artifact: &GroupArtifact) -> Resolution {
        self.forced
            .iter()
            .find(|(c, _)| c == group_artifact)
            .map_or(Resolution::Unresolved, |(_, v)| Resolution::Forced(v.clone()))
    }

    /// Forced versions in declaration order
    pub fn constraints(&self) -> impl Iterator<Item = DependencyConstraint> + '_ {
        self.forced.iter().map(|(coordinate, version)| DependencyConstraint {
            group_artifact: coordinate.clone(),
            forced_version: version.clone(),
            cache_ttl: self.ttl_for(version),
        })
    }

    /// Number of forced versions
    pub fn len(&self) -> usize {
        self.forced.len()
    }

    /// True if nothing is forced
    pub fn is_empty(&self) -> bool {
        self.forced.is_empty()
    }

    fn ttl_for(&self, version: &str) -> Option<Duration> {
        if version.ends_with("-SNAPSHOT") {
            Some(self.changing_modules_ttl)
        } else if version.contains('+') || version.starts_with("latest.") {
            Some(self.dynamic_versions_ttl)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use droidplan_core::ErrorCode;

    fn core_ktx() -> GroupArtifact {
        "androidx.core:core-ktx".parse().unwrap()
    }

    #[test]
    fn test_force_then_resolve() {
        let mut store = VersionConstraintStore::new();
        store.add_force("androidx.core:core-ktx", "1.12.0").unwrap();

        assert_eq!(store.resolve(&core_ktx()), Resolution::Forced("1.12.0".to_string()));
    }

    #[test]
    fn test_unforced_is_unresolved() {
        let store = VersionConstraintStore::new();
        assert_eq!(store.resolve(&core_ktx()), Resolution::Unresolved);
    }

    #[test]
    fn test_conflicting_force_fails() {
        let mut store = VersionConstraintStore::new();
        store.add_force("androidx.core:core-ktx", "1.12.0").unwrap();
        let err = store.add_force("androidx.core:core-ktx", "1.10.0").unwrap_err();

        assert_eq!(err.code, ErrorCode::DuplicateConstraint);
        assert_eq!(err.field.as_deref(), Some("androidx.core:core-ktx"));
        assert_eq!(store.resolve(&core_ktx()), Resolution::Forced("1.12.0".to_string()));
    }

    #[test]
    fn test_identical_force_is_idempotent() {
        let mut store = VersionConstraintStore::new();
        store.add_force("androidx.core:core-ktx", "1.12.0").unwrap();
        store.add_force("androidx.core:core-ktx", "1.12.0").unwrap();
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_force_notation() {
        let mut store = VersionConstraintStore::new();
        store.add_force_notation("androidx.core:core-ktx:1.12.0").unwrap();
        assert_eq!(store.resolve(&core_ktx()), Resolution::Forced("1.12.0".to_string()));

        let err = store.add_force_notation("core-ktx:1.12.0").unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidConfigValue);
    }

    #[test]
    fn test_invalid_coordinate() {
        let err = "not a coordinate".parse::<GroupArtifact>().unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidConfigValue);
    }

    #[test]
    fn test_cache_ttl_defaults_and_overrides() {
        let mut store = VersionConstraintStore::new();
        assert_eq!(store.cache_ttl(CacheKind::DynamicVersions), DEFAULT_CACHE_TTL);

        store.set_cache_ttl(CacheKind::DynamicVersions, TimeUnit::Minutes.duration(10).unwrap());
        store.set_cache_ttl(CacheKind::ChangingModules, TimeUnit::Hours.duration(4).unwrap());

        assert_eq!(store.cache_ttl(CacheKind::DynamicVersions), Duration::from_secs(600));
        assert_eq!(store.cache_ttl(CacheKind::ChangingModules), Duration::from_secs(4 * 3600));
    }

    #[test]
    fn test_constraint_ttl_follows_version_kind() {
        let mut store = VersionConstraintStore::new();
        store.set_cache_ttl(CacheKind::ChangingModules, Duration::from_secs(60));
        store.add_force("androidx.core:core-ktx", "1.12.0").unwrap();
        store.add_force("com.example:nightly", "2.0-SNAPSHOT").unwrap();

        let constraints: Vec<_> = store.constraints().collect();
        assert_eq!(constraints[0].cache_ttl, None);
        assert_eq!(constraints[1].cache_ttl, Some(Duration::from_secs(60)));
    }

    #[test]
    fn test_constraint_serializes_ttl_as_gradle_pair() {
        let mut store = VersionConstraintStore::new();
        store.set_cache_ttl(CacheKind::DynamicVersions, TimeUnit::Minutes.duration(10).unwrap());
        store.add_force("com.example:lib", "1.+").unwrap();

        let constraint = store.constraints().next().unwrap();
        let value = serde_json::to_value(&constraint).unwrap();
        assert_eq!(value["group_artifact"], "com.example:lib");
        assert_eq!(value["cache_ttl"], serde_json::json!({ "amount": 10, "unit": "minutes" }));
    }

    #[test]
    fn test_cache_kind_and_unit_parsing() {
        assert_eq!("dynamicVersions".parse::<CacheKind>().unwrap(), CacheKind::DynamicVersions);
        assert!("staleModules".parse::<CacheKind>().is_err());
        assert_eq!("MINUTES".parse::<TimeUnit>().unwrap(), TimeUnit::Minutes);
        assert!("fortnights".parse::<TimeUnit>().is_err());
    }

    #[test]
    fn test_split_duration() {
        assert_eq!(split_duration(Duration::from_secs(600)), (10, "minutes"));
        assert_eq!(split_duration(Duration::from_secs(4 * 3600)), (4, "hours"));
        assert_eq!(split_duration(DEFAULT_CACHE_TTL), (1, "days"));
        assert_eq!(split_duration(Duration::from_secs(90)), (90, "seconds"));
    }
}
