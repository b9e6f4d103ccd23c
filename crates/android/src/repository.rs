//! Repositories and the package repository index
//!
//! The index is the seam through which dependencies without a forced
//! version get a concrete one. droidplan never talks to a remote
//! repository; an offline index file stands in for it.

use crate::constraints::GroupArtifact;
use droidplan_core::config::RepositoryEntry;
use droidplan_core::error::{Error, Result, ResultExt};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

/// A declared repository, in resolution order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Repository {
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

impl Repository {
    /// Base URL of the repository
    pub fn url(&self) -> &str {
        match self {
            Repository::Google => "https://dl.google.com/dl/android/maven2/",
            Repository::MavenCentral => "https://repo.maven.apache.org/maven2/",
            Repository::Maven { url } => url,
        }
    }
}

impl From<&RepositoryEntry> for Repository {
    fn from(entry: &RepositoryEntry) -> Self {
        match entry {
            RepositoryEntry::Google => Repository::Google,
            RepositoryEntry::MavenCentral => Repository::MavenCentral,
            RepositoryEntry::Maven { url } => Repository::Maven { url: url.clone() },
        }
    }
}

/// Known versions of artifacts
pub trait RepositoryIndex {
    /// Versions known for `coordinate`, empty if it is unknown
    fn versions(&self, coordinate: &GroupArtifact) -> &[String];
}

/// An index held in memory, loadable from a TOML file of
/// `"group:artifact" = ["1.0.0", "1.1.0"]` entries
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct InMemoryIndex {
    artifacts: BTreeMap<String, Vec<String>>,
}

impl InMemoryIndex {
    /// Empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Load an index from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(Error::from)
            .context(format!("Failed to read repository index {}", path.display()))?;
        let index: Self = toml::from_str(&content)
            .map_err(Error::from)
            .context(format!("Failed to parse repository index {}", path.display()))?;
        tracing::debug!(artifacts = index.artifacts.len(), path = %path.display(), "Loaded repository index");
        Ok(index)
    }

    /// Add versions of `coordinate`
    pub fn insert(&mut self, coordinate: &GroupArtifact, versions: &[&str]) {
        self.artifacts
            .entry(coordinate.to_string())
            .or_default()
            .extend(versions.iter().map(|v| (*v).to_string()));
    }
}

impl RepositoryIndex for InMemoryIndex {
    fn versions(&self, coordinate: &GroupArtifact) -> &[String] {
        self.artifacts
            .get(&coordinate.to_string())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// How a dependency asked for its version
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionRequest {
    /// A plain version such as `1.10.0`
    Exact(String),
    /// `1.2.+`: any version starting with `1.2.`
    Prefix(String),
    /// `latest.release`, `+` or no version at all
    Latest,
}

impl VersionRequest {
    /// Parse a declared version; `None` asks for the latest
    pub fn parse(version: Option<&str>) -> Self {
        match version.map(str::trim) {
            None | Some("" | "+" | "latest.release" | "latest.integration") => VersionRequest::Latest,
            Some(v) => match v.strip_suffix('+') {
                Some(prefix) => VersionRequest::Prefix(prefix.to_string()),
                None => VersionRequest::Exact(v.to_string()),
            },
        }
    }

    /// True for anything but an exact version
    pub fn is_dynamic(&self) -> bool {
        !matches!(self, VersionRequest::Exact(_))
    }

    /// Highest version in `available` satisfying this request
    pub fn select<'a>(&self, available: &'a [String]) -> Option<&'a String> {
        available
            .iter()
            .filter(|v| match self {
                VersionRequest::Exact(exact) => *v == exact,
                VersionRequest::Prefix(prefix) => v.starts_with(prefix.as_str()),
                VersionRequest::Latest => !v.ends_with("-SNAPSHOT"),
            })
            .max_by(|a, b| compare_versions(a, b))
    }
}

impl fmt::Display for VersionRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionRequest::Exact(v) => f.write_str(v),
            VersionRequest::Prefix(p) => write!(f, "{}+", p),
            VersionRequest::Latest => f.write_str("latest.release"),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Component<'a> {
    Number(u64),
    Qualifier(&'a str),
}

fn components(version: &str) -> Vec<Component<'_>> {
    version
        .split(['.', '-', '_'])
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<u64>()
                .map_or(Component::Qualifier(part), Component::Number)
        })
        .collect()
}

/// Maven-style ordering: numeric components compare numerically, a
/// qualifier sorts below a number and below its absence (`1.0-rc1 < 1.0`)
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let left = components(a);
    let right = components(b);
    let len = left.len().max(right.len());

    for i in 0..len {
        let ordering = match (left.get(i), right.get(i)) {
            (Some(Component::Number(x)), Some(Component::Number(y))) => x.cmp(y),
            (Some(Component::Qualifier(x)), Some(Component::Qualifier(y))) => {
                x.to_ascii_lowercase().cmp(&y.to_ascii_lowercase())
            }
            (Some(Component::Number(_)), Some(Component::Qualifier(_))) => Ordering::Greater,
            (Some(Component::Qualifier(_)), Some(Component::Number(_))) => Ordering::Less,
            (Some(Component::Number(n)), None) => n.cmp(&0),
            (None, Some(Component::Number(n))) => 0.cmp(n),
            (Some(Component::Qualifier(_)), None) => Ordering::Less,
            (None, Some(Component::Qualifier(_))) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn lifecycle() -> GroupArtifact {
        "androidx.lifecycle:lifecycle-runtime-ktx".parse().unwrap()
    }

    #[test]
    fn test_compare_versions() {
        assert_eq!(compare_versions("1.12.0", "1.10.0"), Ordering::Greater);
        assert_eq!(compare_versions("1.2", "1.2.0"), Ordering::Equal);
        assert_eq!(compare_versions("1.0-rc1", "1.0"), Ordering::Less);
        assert_eq!(compare_versions("2.0-alpha01", "2.0-beta01"), Ordering::Less);
        assert_eq!(compare_versions("1.9", "1.10"), Ordering::Less);
    }

    #[test]
    fn test_parse_version_request() {
        assert_eq!(VersionRequest::parse(None), VersionRequest::Latest);
        assert_eq!(VersionRequest::parse(Some("latest.release")), VersionRequest::Latest);
        assert_eq!(VersionRequest::parse(Some("2.6.+")), VersionRequest::Prefix("2.6.".to_string()));
        assert_eq!(VersionRequest::parse(Some("2.6.1")), VersionRequest::Exact("2.6.1".to_string()));
        assert!(!VersionRequest::parse(Some("2.6.1")).is_dynamic());
    }

    #[test]
    fn test_select_highest_match() {
        let available: Vec<String> = ["2.5.1", "2.6.0", "2.6.2", "2.7.0-SNAPSHOT", "2.10.0-rc01"]
            .iter()
            .map(|v| v.to_string())
            .collect();

        assert_eq!(
            VersionRequest::parse(Some("2.6.+")).select(&available).map(String::as_str),
            Some("2.6.2")
        );
        assert_eq!(
            VersionRequest::Latest.select(&available).map(String::as_str),
            Some("2.10.0-rc01")
        );
        assert_eq!(VersionRequest::parse(Some("3.+")).select(&available), None);
    }

    #[test]
    fn test_in_memory_index() {
        let mut index = InMemoryIndex::new();
        index.insert(&lifecycle(), &["2.6.2", "2.7.0"]);

        assert_eq!(index.versions(&lifecycle()).len(), 2);
        assert!(index.versions(&"com.example:missing".parse().unwrap()).is_empty());
    }

    #[test]
    fn test_load_index_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#""androidx.lifecycle:lifecycle-runtime-ktx" = ["2.6.2", "2.7.0"]"#
        )
        .unwrap();

        let index = InMemoryIndex::load(file.path()).unwrap();
        assert_eq!(index.versions(&lifecycle()), ["2.6.2", "2.7.0"]);
    }

    #[test]
    fn test_repository_urls() {
        assert!(Repository::Google.url().contains("dl.google.com"));
        let entry = RepositoryEntry::Maven {
            url: "https://storage.googleapis.com/download.flutter.io".to_string(),
        };
        assert_eq!(
            Repository::from(&entry).url(),
            "https://storage.googleapis.com/download.flutter.io"
        );
    }
}
