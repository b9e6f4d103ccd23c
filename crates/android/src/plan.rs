//! Build plan assembly
//!
//! Composes the build target, constraints, plugins and signing setup into an
//! immutable [`BuildPlan`]. Cross-entity invariants are checked in a fixed
//! order and the first violation is returned unchanged; no partial plan is
//! ever produced.
//!
//! # Example
//!
//! ```rust
//! use droidplan_android::plan::assemble;
//! use droidplan_android::{BuildTarget, PluginRegistry, SigningSetup, VersionConstraintStore};
//!
//! let target = BuildTarget {
//!     application_id: "com.example.step_counter".to_string(),
//!     min_sdk: 21,
//!     target_sdk: 33,
//!     compile_sdk: 34,
//!     version_code: 1,
//!     version_name: "1.0.0".to_string(),
//! };
//! let mut plugins = PluginRegistry::new();
//! plugins.register("com.android.application").unwrap();
//!
//! let plan = assemble(target, VersionConstraintStore::new(), plugins, SigningSetup::debug_signed_release())
//!     .expect("valid build");
//! assert_eq!(plan.target().compile_sdk, 34);
//! ```

use crate::constraints::{
    serialize_ttl, CacheKind, DependencyConstraint, GroupArtifact, Resolution, TimeUnit,
    VersionConstraintStore,
};
use crate::platform::{PlatformDescriptor, PlatformSymbol, TargetPlatformResolver};
use crate::plugins::PluginRegistry;
use crate::repository::{Repository, RepositoryIndex, VersionRequest};
use crate::signing::{BuildType, SigningConfig, SigningSetup};
use crate::target::{AndroidOptions, BuildTarget};
use droidplan_core::config::{ConfigSchema, DependencyEntry, TtlEntry};
use droidplan_core::error::{Error, Result, ResultExt};
use droidplan_core::validation::ValidationResult;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::time::Duration;

static CONFIGURATION_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap());

/// A library dependency as declared
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyDeclaration {
    /// Artifact being requested
    pub coordinate: GroupArtifact,
    /// Version as written
    pub request: VersionRequest,
    /// Gradle configuration, e.g. `implementation`
    pub configuration: String,
}

impl DependencyDeclaration {
    /// An `implementation` dependency
    pub fn new(coordinate: &str, version: Option<&str>) -> Result<Self> {
        Ok(Self {
            coordinate: coordinate.parse()?,
            request: VersionRequest::parse(version),
            configuration: "implementation".to_string(),
        })
    }

    /// Build from a `[[dependencies]]` entry; the configuration must be a Kotlin identifier
    pub fn from_entry(entry: &DependencyEntry) -> Result<Self> {
        let mut declaration = Self::new(&entry.coordinate, entry.version.as_deref())?;
        if !CONFIGURATION_RE.is_match(&entry.configuration) {
            return Err(Error::invalid_value(
                "dependencies.configuration",
                format!(
                    "Invalid configuration '{}' for {}, expected an identifier such as implementation",
                    entry.configuration, entry.coordinate
                ),
            ));
        }
        declaration.configuration.clone_from(&entry.configuration);
        Ok(declaration)
    }
}

/// Where a resolved version came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VersionSource {
    /// A `force()` rule of the resolution strategy
    Forced,
    /// The exact declared version, trusted because no index was supplied
    Declared,
    /// Matched against the repository index
    Repository,
}

/// A dependency with its concrete version
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedDependency {
    /// Maven coordinate of the dependency
    pub coordinate: GroupArtifact,
    /// Gradle configuration, e.g. `implementation`
    pub configuration: String,
    /// The request as written, e.g. `2.6.+`
    pub requested: String,
    /// Concrete version that ends up on the classpath
    pub version: String,
    /// Where `version` came from
    pub source: VersionSource,
}

/// The resolution strategy as it ends up in the plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolutionPlan {
    /// `force()` rules in declaration order
    pub forced: Vec<DependencyConstraint>,
    /// Lifetime of cached dynamic versions
    #[serde(serialize_with = "serialize_ttl")]
    pub cache_dynamic_versions: Duration,
    /// Lifetime of cached changing modules
    #[serde(serialize_with = "serialize_ttl")]
    pub cache_changing_modules: Duration,
}

/// The fully resolved, immutable description of how to build the app
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildPlan {
    target: BuildTarget,
    android: AndroidOptions,
    plugins: Vec<String>,
    signing_configs: Vec<SigningConfig>,
    build_types: Vec<BuildType>,
    resolution: ResolutionPlan,
    repositories: Vec<Repository>,
    dependencies: Vec<ResolvedDependency>,
}

impl BuildPlan {
    /// Resolved `defaultConfig`
    pub fn target(&self) -> &BuildTarget {
        &self.target
    }

    /// Remaining `android {}` options
    pub fn android(&self) -> &AndroidOptions {
        &self.android
    }

    /// Plugin ids in application order
    pub fn plugins(&self) -> &[String] {
        &self.plugins
    }

    /// Signing configs, `debug` first
    pub fn signing_configs(&self) -> &[SigningConfig] {
        &self.signing_configs
    }

    /// Build types, `debug` and `release` first
    pub fn build_types(&self) -> &[BuildType] {
        &self.build_types
    }

    /// Forced versions and cache lifetimes
    pub fn resolution(&self) -> &ResolutionPlan {
        &self.resolution
    }

    /// Repositories in resolution order
    pub fn repositories(&self) -> &[Repository] {
        &self.repositories
    }

    /// Declared dependencies with their resolved versions
    pub fn dependencies(&self) -> &[ResolvedDependency] {
        &self.dependencies
    }

    /// Serialized form: entity name to resolved field values
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Assemble a plan from the four core entities
///
/// The namespace defaults to the application id, repositories and
/// dependencies are empty.
pub fn assemble(
    target: BuildTarget,
    constraints: VersionConstraintStore,
    plugins: PluginRegistry,
    signing: SigningSetup,
) -> Result<BuildPlan> {
    BuildPlanAssembler::new(target, constraints, plugins, signing).assemble()
}

/// Assembler with the optional parts of a build
pub struct BuildPlanAssembler<'a> {
    target: BuildTarget,
    constraints: VersionConstraintStore,
    plugins: PluginRegistry,
    signing: SigningSetup,
    android: AndroidOptions,
    repositories: Vec<Repository>,
    dependencies: Vec<DependencyDeclaration>,
    index: Option<&'a dyn RepositoryIndex>,
}

impl<'a> BuildPlanAssembler<'a> {
    /// Assembler with default options, no repositories, no dependencies and no index
    pub fn new(
        target: BuildTarget,
        constraints: VersionConstraintStore,
        plugins: PluginRegistry,
        signing: SigningSetup,
    ) -> Self {
        let android = AndroidOptions::new(target.application_id.clone());
        Self {
            target,
            constraints,
            plugins,
            signing,
            android,
            repositories: Vec::new(),
            dependencies: Vec::new(),
            index: None,
        }
    }

    /// Replace the `android {}` options
    pub fn with_android(mut self, android: AndroidOptions) -> Self {
        self.android = android;
        self
    }

    /// Set the declared repositories
    pub fn with_repositories(mut self, repositories: Vec<Repository>) -> Self {
        self.repositories = repositories;
        self
    }

    /// Set the declared dependencies
    pub fn with_dependencies(mut self, dependencies: Vec<DependencyDeclaration>) -> Self {
        self.dependencies = dependencies;
        self
    }

    /// Resolve unforced dependencies against `index`
    pub fn with_index(mut self, index: &'a dyn RepositoryIndex) -> Self {
        self.index = Some(index);
        self
    }

    /// Validate every invariant, resolve dependencies and freeze the plan
    pub fn assemble(self) -> Result<BuildPlan> {
        let mut result = ValidationResult::new();
        result.merge(self.target.validate());
        result.merge(self.android.validate());
        result.merge(self.plugins.validate_order());
        result.merge(self.signing.validate());
        if let Err(err) = result.into_result() {
            tracing::warn!(invariant = %err.message, field = ?err.field, "Build plan rejected");
            return Err(err);
        }

        let dependencies = self
            .dependencies
            .iter()
            .map(|declaration| self.resolve_dependency(declaration))
            .collect::<Result<Vec<_>>>()?;

        let plan = BuildPlan {
            plugins: self.plugins.list().map(ToString::to_string).collect(),
            signing_configs: self.signing.configs().to_vec(),
            build_types: self.signing.build_types().to_vec(),
            resolution: ResolutionPlan {
                forced: self.constraints.constraints().collect(),
                cache_dynamic_versions: self.constraints.cache_ttl(CacheKind::DynamicVersions),
                cache_changing_modules: self.constraints.cache_ttl(CacheKind::ChangingModules),
            },
            repositories: self.repositories,
            dependencies,
            target: self.target,
            android: self.android,
        };

        tracing::info!(
            application_id = %plan.target.application_id,
            compile_sdk = plan.target.compile_sdk,
            plugins = plan.plugins.len(),
            dependencies = plan.dependencies.len(),
            "Build plan assembled"
        );
        Ok(plan)
    }

    fn resolve_dependency(&self, declaration: &DependencyDeclaration) -> Result<ResolvedDependency> {
        let coordinate = &declaration.coordinate;
        let request = &declaration.request;
        let unresolved = || {
            Error::unresolved_dependency(&coordinate.to_string())
                .with_context(format!("requested {}", request))
        };
        let (version, source) = match (self.constraints.resolve(coordinate), self.index) {
            (Resolution::Forced(version), _) => (version, VersionSource::Forced),
            (Resolution::Unresolved, Some(index)) => {
                let version = request.select(index.versions(coordinate)).ok_or_else(unresolved)?;
                (version.clone(), VersionSource::Repository)
            }
            (Resolution::Unresolved, None) => match request {
                VersionRequest::Exact(version) => (version.clone(), VersionSource::Declared),
                _ => return Err(unresolved()),
            },
        };

        tracing::debug!(%coordinate, %version, ?source, "Resolved dependency");
        Ok(ResolvedDependency {
            coordinate: coordinate.clone(),
            configuration: declaration.configuration.clone(),
            requested: declaration.request.to_string(),
            version,
            source,
        })
    }
}

fn ttl(entry: &TtlEntry) -> Result<Duration> {
    entry.unit.parse::<TimeUnit>()?.duration(entry.amount)
}

/// Build a plan from a configuration schema
///
/// Symbolic values are resolved through `resolver`; plugins and forced
/// versions are registered in declaration order so duplicate errors name
/// the second occurrence. Without an `index` only forced and exact declared
/// versions resolve.
pub fn plan_from_config<D: PlatformDescriptor>(
    schema: &ConfigSchema,
    resolver: &TargetPlatformResolver<D>,
    index: Option<&dyn RepositoryIndex>,
) -> Result<BuildPlan> {
    let defaults = &schema.default_config;
    let target = BuildTarget {
        application_id: defaults.application_id.clone(),
        min_sdk: resolver.resolve_number("minSdk", &defaults.min_sdk)?,
        target_sdk: resolver.resolve_number("targetSdk", &defaults.target_sdk)?,
        compile_sdk: resolver.resolve_number("compileSdk", &schema.android.compile_sdk)?,
        version_code: resolver.resolve_number("versionCode", &defaults.version_code)?,
        version_name: resolver.resolve_text(&defaults.version_name)?,
    };

    let ndk_version = match &schema.android.ndk_version {
        Some(ndk) => Some(resolver.resolve_text(ndk)?),
        None => None,
    };
    let namespace = if schema.android.namespace.is_empty() {
        defaults.application_id.clone()
    } else {
        schema.android.namespace.clone()
    };
    let android = AndroidOptions {
        namespace,
        ndk_version,
        java_version: schema.android.java_version,
        multidex: defaults.multidex,
        flutter_source: schema.android.flutter_source.clone(),
    };

    let mut plugins = PluginRegistry::new();
    for plugin in &schema.plugins {
        plugins.register(plugin)?;
    }

    let mut constraints = VersionConstraintStore::new();
    for notation in &schema.resolution.force {
        constraints.add_force_notation(notation)?;
    }
    if let Some(entry) = &schema.resolution.cache_dynamic_versions {
        constraints.set_cache_ttl(
            CacheKind::DynamicVersions,
            ttl(entry).context("In resolution.cache_dynamic_versions")?,
        );
    }
    if let Some(entry) = &schema.resolution.cache_changing_modules {
        constraints.set_cache_ttl(
            CacheKind::ChangingModules,
            ttl(entry).context("In resolution.cache_changing_modules")?,
        );
    }

    let mut signing = SigningSetup::new();
    for (name, entry) in &schema.signing_configs {
        signing.configure_signing(SigningConfig::from_entry(name, entry)?);
    }
    for (name, entry) in &schema.build_types {
        signing.configure_build_type(BuildType::from_entry(name, entry));
    }

    let dependencies = schema
        .dependencies
        .iter()
        .map(DependencyDeclaration::from_entry)
        .collect::<Result<Vec<_>>>()?;

    let mut assembler = BuildPlanAssembler::new(target, constraints, plugins, signing)
        .with_android(android)
        .with_repositories(schema.repositories.iter().map(Repository::from).collect())
        .with_dependencies(dependencies);
    assembler.index = index;
    assembler.assemble()
}

/// Value of every platform symbol, in a stable order
pub fn describe_platform<D: PlatformDescriptor>(
    resolver: &TargetPlatformResolver<D>,
) -> Result<Vec<(PlatformSymbol, String)>> {
    PlatformSymbol::ALL
        .iter()
        .map(|symbol| Ok((*symbol, resolver.resolve_symbol(*symbol)?.to_string())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::FlutterDescriptor;
    use crate::repository::InMemoryIndex;
    use droidplan_core::config::Config;
    use droidplan_core::ErrorCode;

    const STEP_COUNTER: &str = r#"
[android]
namespace = "com.example.step_counter"
ndk_version = "26.3.11579264"
java_version = 11

[default_config]
application_id = "com.example.step_counter"
multidex = true

[build_types.release]
signing_config = "debug"

[resolution]
force = ["androidx.core:core-ktx:1.12.0"]
cache_dynamic_versions = { amount = 10, unit = "minutes" }
cache_changing_modules = { amount = 4, unit = "hours" }

[[dependencies]]
coordinate = "androidx.core:core-ktx"
version = "1.10.0"

[[dependencies]]
coordinate = "androidx.lifecycle:lifecycle-runtime-ktx"
version = "2.6.+"
"#;

    fn target(min_sdk: u32, target_sdk: u32, compile_sdk: u32) -> BuildTarget {
        BuildTarget {
            application_id: "com.example.step_counter".to_string(),
            min_sdk,
            target_sdk,
            compile_sdk,
            version_code: 1,
            version_name: "1.0.0".to_string(),
        }
    }

    fn flutter_plugins() -> PluginRegistry {
        let mut plugins = PluginRegistry::new();
        plugins.register("com.android.application").unwrap();
        plugins.register("kotlin-android").unwrap();
        plugins.register("dev.flutter.flutter-gradle-plugin").unwrap();
        plugins
    }

    fn index() -> InMemoryIndex {
        let mut index = InMemoryIndex::new();
        index.insert(
            &"androidx.lifecycle:lifecycle-runtime-ktx".parse().unwrap(),
            &["2.5.1", "2.6.1", "2.6.2", "2.7.0"],
        );
        index.insert(&"com.google.code.gson:gson".parse().unwrap(), &["2.9.0", "2.10.1"]);
        index
    }

    #[test]
    fn test_assemble_valid_target() {
        let plan = assemble(
            target(21, 33, 34),
            VersionConstraintStore::new(),
            flutter_plugins(),
            SigningSetup::debug_signed_release(),
        )
        .unwrap();

        assert_eq!(plan.target().min_sdk, 21);
        assert_eq!(plan.android().namespace, "com.example.step_counter");
        assert_eq!(plan.plugins().len(), 3);
    }

    #[test]
    fn test_assemble_min_above_target() {
        let err = assemble(
            target(34, 21, 34),
            VersionConstraintStore::new(),
            flutter_plugins(),
            SigningSetup::debug_signed_release(),
        )
        .unwrap_err();

        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.message, "minSdk>targetSdk");
    }

    #[test]
    fn test_assemble_reports_first_violation_only() {
        let err = assemble(
            target(34, 21, 34),
            VersionConstraintStore::new(),
            flutter_plugins(),
            SigningSetup::new(),
        )
        .unwrap_err();
        assert_eq!(err.message, "minSdk>targetSdk");
    }

    #[test]
    fn test_assemble_unsigned_release() {
        let err = assemble(
            target(21, 33, 34),
            VersionConstraintStore::new(),
            flutter_plugins(),
            SigningSetup::new(),
        )
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.field.as_deref(), Some("buildTypes.release.signingConfig"));
    }

    #[test]
    fn test_assemble_plugin_order() {
        let mut plugins = PluginRegistry::new();
        plugins.register("dev.flutter.flutter-gradle-plugin").unwrap();
        plugins.register("com.android.application").unwrap();

        let err = assemble(
            target(21, 33, 34),
            VersionConstraintStore::new(),
            plugins,
            SigningSetup::debug_signed_release(),
        )
        .unwrap_err();
        assert_eq!(err.field.as_deref(), Some("plugins"));
    }

    #[test]
    fn test_dependency_resolution_sources() {
        let mut constraints = VersionConstraintStore::new();
        constraints.add_force("androidx.core:core-ktx", "1.12.0").unwrap();
        let index = index();

        let plan = BuildPlanAssembler::new(
            target(21, 33, 34),
            constraints,
            flutter_plugins(),
            SigningSetup::debug_signed_release(),
        )
        .with_dependencies(vec![
            DependencyDeclaration::new("androidx.core:core-ktx", Some("1.10.0")).unwrap(),
            DependencyDeclaration::new("androidx.lifecycle:lifecycle-runtime-ktx", Some("2.6.+")).unwrap(),
            DependencyDeclaration::new("com.google.code.gson:gson", Some("2.10.1")).unwrap(),
        ])
        .with_index(&index)
        .assemble()
        .unwrap();

        let deps = plan.dependencies();
        assert_eq!((deps[0].version.as_str(), deps[0].source), ("1.12.0", VersionSource::Forced));
        assert_eq!((deps[1].version.as_str(), deps[1].source), ("2.6.2", VersionSource::Repository));
        assert_eq!((deps[2].version.as_str(), deps[2].source), ("2.10.1", VersionSource::Repository));
    }

    #[test]
    fn test_exact_version_unknown_to_index() {
        let mut index = InMemoryIndex::new();
        index.insert(&"com.example:lib".parse().unwrap(), &["1.0.0"]);

        let err = BuildPlanAssembler::new(
            target(21, 33, 34),
            VersionConstraintStore::new(),
            flutter_plugins(),
            SigningSetup::debug_signed_release(),
        )
        .with_dependencies(vec![DependencyDeclaration::new("com.example:lib", Some("9.9.9")).unwrap()])
        .with_index(&index)
        .assemble()
        .unwrap_err();

        assert_eq!(err.code, ErrorCode::UnresolvedDependency);
        assert_eq!(err.field.as_deref(), Some("com.example:lib"));
        assert_eq!(err.context.as_deref(), Some("requested 9.9.9"));
    }

    #[test]
    fn test_exact_version_trusted_without_index() {
        let plan = BuildPlanAssembler::new(
            target(21, 33, 34),
            VersionConstraintStore::new(),
            flutter_plugins(),
            SigningSetup::debug_signed_release(),
        )
        .with_dependencies(vec![
            DependencyDeclaration::new("com.google.code.gson:gson", Some("2.10.1")).unwrap(),
        ])
        .assemble()
        .unwrap();

        let dep = &plan.dependencies()[0];
        assert_eq!((dep.version.as_str(), dep.source), ("2.10.1", VersionSource::Declared));
    }

    #[test]
    fn test_dependency_configuration_must_be_identifier() {
        let entry = DependencyEntry {
            coordinate: "androidx.core:core-ktx".to_string(),
            version: Some("1.12.0".to_string()),
            configuration: "implementation(\"evil\")\nfoo".to_string(),
        };
        let err = DependencyDeclaration::from_entry(&entry).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidConfigValue);
        assert_eq!(err.field.as_deref(), Some("dependencies.configuration"));

        let entry = DependencyEntry {
            configuration: "testImplementation".to_string(),
            ..entry
        };
        assert_eq!(DependencyDeclaration::from_entry(&entry).unwrap().configuration, "testImplementation");
    }

    #[test]
    fn test_unresolved_dependency() {
        let err = BuildPlanAssembler::new(
            target(21, 33, 34),
            VersionConstraintStore::new(),
            flutter_plugins(),
            SigningSetup::debug_signed_release(),
        )
        .with_dependencies(vec![DependencyDeclaration::new("com.example:missing", None).unwrap()])
        .assemble()
        .unwrap_err();

        assert_eq!(err.code, ErrorCode::UnresolvedDependency);
        assert_eq!(err.field.as_deref(), Some("com.example:missing"));
    }

    #[test]
    fn test_plan_from_step_counter_config() {
        let config = Config::parse(STEP_COUNTER).unwrap();
        let resolver = TargetPlatformResolver::new(FlutterDescriptor::default());

        let plan = plan_from_config(&config.schema, &resolver, Some(&index())).unwrap();

        assert_eq!(plan.target().compile_sdk, 34);
        assert_eq!(plan.target().version_name, "1.0");
        assert!(plan.android().multidex);
        assert_eq!(plan.android().ndk_version.as_deref(), Some("26.3.11579264"));
        assert_eq!(plan.resolution().cache_dynamic_versions, Duration::from_secs(600));
        assert_eq!(plan.resolution().cache_changing_modules, Duration::from_secs(4 * 3600));
        assert_eq!(plan.repositories().len(), 3);
        assert_eq!(plan.dependencies()[0].version, "1.12.0");
        assert_eq!(plan.dependencies()[1].version, "2.6.2");
    }

    #[test]
    fn test_plan_from_config_duplicate_plugin() {
        let mut config = Config::parse(STEP_COUNTER).unwrap();
        config.schema.plugins.push("com.android.application".to_string());
        let resolver = TargetPlatformResolver::new(FlutterDescriptor::default());

        let err = plan_from_config(&config.schema, &resolver, Some(&index())).unwrap_err();
        assert_eq!(err.code, ErrorCode::DuplicatePlugin);
    }

    #[test]
    fn test_plan_from_config_conflicting_force() {
        let mut config = Config::parse(STEP_COUNTER).unwrap();
        config.schema.resolution.force.push("androidx.core:core-ktx:1.10.0".to_string());
        let resolver = TargetPlatformResolver::new(FlutterDescriptor::default());

        let err = plan_from_config(&config.schema, &resolver, Some(&index())).unwrap_err();
        assert_eq!(err.code, ErrorCode::DuplicateConstraint);
    }

    #[test]
    fn test_plan_from_config_unknown_symbol() {
        let mut config = Config::parse(STEP_COUNTER).unwrap();
        config.schema.default_config.min_sdk =
            droidplan_core::config::SdkSetting::symbol("flutter.minimumSdk");
        let resolver = TargetPlatformResolver::new(FlutterDescriptor::default());

        let err = plan_from_config(&config.schema, &resolver, Some(&index())).unwrap_err();
        assert_eq!(err.code, ErrorCode::UnknownSymbol);
    }

    #[test]
    fn test_plan_from_config_bad_ttl_unit() {
        let mut config = Config::parse(STEP_COUNTER).unwrap();
        config.schema.resolution.cache_changing_modules = Some(TtlEntry {
            amount: 4,
            unit: "fortnights".to_string(),
        });
        let resolver = TargetPlatformResolver::new(FlutterDescriptor::default());

        let err = plan_from_config(&config.schema, &resolver, Some(&index())).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidConfigValue);
        assert!(err.context.unwrap().contains("cache_changing_modules"));
    }

    #[test]
    fn test_plan_json_is_keyed_by_entity() {
        let config = Config::parse(STEP_COUNTER).unwrap();
        let resolver = TargetPlatformResolver::new(FlutterDescriptor::default());
        let plan = plan_from_config(&config.schema, &resolver, Some(&index())).unwrap();

        let value: serde_json::Value = serde_json::from_str(&plan.to_json().unwrap()).unwrap();
        for key in [
            "target",
            "android",
            "plugins",
            "signing_configs",
            "build_types",
            "resolution",
            "repositories",
            "dependencies",
        ] {
            assert!(value.get(key).is_some(), "missing {}", key);
        }
        assert_eq!(value["target"]["application_id"], "com.example.step_counter");
        assert_eq!(
            value["resolution"]["forced"][0]["group_artifact"],
            "androidx.core:core-ktx"
        );
        assert_eq!(
            value["resolution"]["cache_dynamic_versions"],
            serde_json::json!({ "amount": 10, "unit": "minutes" })
        );
        assert_eq!(
            value["resolution"]["cache_changing_modules"],
            serde_json::json!({ "amount": 4, "unit": "hours" })
        );
        assert!(value["resolution"]["forced"][0]["cache_ttl"].is_null());
    }

    #[test]
    fn test_describe_platform() {
        let resolver = TargetPlatformResolver::new(FlutterDescriptor::default());
        let values = describe_platform(&resolver).unwrap();
        assert_eq!(values.len(), PlatformSymbol::ALL.len());
        assert_eq!(values[0], (PlatformSymbol::CompileSdk, "34".to_string()));
    }
}
