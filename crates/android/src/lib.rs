//! Android build planning for Flutter apps
//!
//! This crate turns the declarative description of an app module into a
//! validated build plan:
//! - Version constraints and cache lifetimes of the resolution strategy
//! - The ordered plugin registry
//! - Platform symbol resolution against the Flutter tooling's values
//! - Signing configs and build types
//! - Dependency resolution through a repository index
//! - Plan assembly and Gradle Kotlin DSL output

#![warn(missing_docs)]

pub mod constraints;
pub mod gradle;
pub mod plan;
pub mod platform;
pub mod plugins;
pub mod repository;
pub mod signing;
pub mod target;

pub use constraints::{CacheKind, GroupArtifact, Resolution, VersionConstraintStore};
pub use plan::{assemble, plan_from_config, BuildPlan, BuildPlanAssembler};
pub use platform::{FlutterDescriptor, PlatformDescriptor, PlatformSymbol, TargetPlatformResolver};
pub use plugins::PluginRegistry;
pub use repository::{InMemoryIndex, RepositoryIndex};
pub use signing::SigningSetup;
pub use target::{AndroidOptions, BuildTarget};
