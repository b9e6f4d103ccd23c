//! Gradle Kotlin DSL output
//!
//! Renders a build plan as an app-module `build.gradle.kts`.

use crate::constraints::split_duration;
use crate::plan::BuildPlan;
use crate::repository::Repository;
use crate::signing::{DEBUG, RELEASE};

const INDENT: &str = "    ";

/// Line-oriented writer that tracks block nesting
struct Script {
    out: String,
    depth: usize,
}

impl Script {
    fn new() -> Self {
        Self {
            out: String::new(),
            depth: 0,
        }
    }

    fn line(&mut self, text: impl AsRef<str>) {
        for _ in 0..self.depth {
            self.out.push_str(INDENT);
        }
        self.out.push_str(text.as_ref());
        self.out.push('\n');
    }

    fn blank(&mut self) {
        self.out.push('\n');
    }

    fn open(&mut self, header: &str) {
        self.line(format!("{} {{", header));
        self.depth += 1;
    }

    fn close(&mut self) {
        self.depth = self.depth.saturating_sub(1);
        self.line("}");
    }
}

/// Accessor for a named container entry; AGP predefines `debug` and `release`
fn named_entry(name: &str) -> String {
    if name == DEBUG || name == RELEASE {
        format!("getByName({})", quoted(name))
    } else {
        format!("create({})", quoted(name))
    }
}

fn quoted(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '$' => out.push_str("\\$"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Render `plan` as a `build.gradle.kts` script
pub fn render_kotlin_dsl(plan: &BuildPlan) -> String {
    let mut s = Script::new();
    let target = plan.target();
    let android = plan.android();
    let java = format!("JavaVersion.VERSION_{}", android.java_version);

    s.open("plugins");
    for plugin in plan.plugins() {
        s.line(format!("id({})", quoted(plugin)));
    }
    s.close();
    s.blank();

    s.open("android");
    s.line(format!("namespace = {}", quoted(&android.namespace)));
    s.line(format!("compileSdk = {}", target.compile_sdk));
    if let Some(ndk) = &android.ndk_version {
        s.line(format!("ndkVersion = {}", quoted(ndk)));
    }
    s.blank();

    s.open("compileOptions");
    s.line(format!("sourceCompatibility = {}", java));
    s.line(format!("targetCompatibility = {}", java));
    s.close();
    s.blank();

    s.open("kotlinOptions");
    s.line(format!("jvmTarget = {}.toString()", java));
    s.close();
    s.blank();

    s.open("defaultConfig");
    s.line(format!("applicationId = {}", quoted(&target.application_id)));
    s.line(format!("minSdk = {}", target.min_sdk));
    s.line(format!("targetSdk = {}", target.target_sdk));
    s.line(format!("versionCode = {}", target.version_code));
    s.line(format!("versionName = {}", quoted(&target.version_name)));
    if android.multidex {
        s.line("multiDexEnabled = true");
    }
    s.close();

    let custom_signing: Vec<_> = plan
        .signing_configs()
        .iter()
        .filter(|c| c.store_file.is_some() || c.key_alias.is_some())
        .collect();
    if !custom_signing.is_empty() {
        s.blank();
        s.open("signingConfigs");
        for config in custom_signing {
            s.open(&named_entry(&config.name));
            if let Some(store) = &config.store_file {
                s.line(format!("storeFile = file({})", quoted(store)));
            }
            if let Some(alias) = &config.key_alias {
                s.line(format!("keyAlias = {}", quoted(alias)));
            }
            s.close();
        }
        s.close();
    }

    let configured: Vec<_> = plan
        .build_types()
        .iter()
        .filter(|b| b.name != DEBUG || b.signing_config.as_deref() != Some(DEBUG) || b.minify_enabled)
        .collect();
    if !configured.is_empty() {
        s.blank();
        s.open("buildTypes");
        for build_type in configured {
            s.open(&named_entry(&build_type.name));
            if let Some(signing) = &build_type.signing_config {
                s.line(format!("signingConfig = signingConfigs.getByName({})", quoted(signing)));
            }
            if build_type.minify_enabled {
                s.line("isMinifyEnabled = true");
            }
            s.close();
        }
        s.close();
    }

    let resolution = plan.resolution();
    s.blank();
    s.open("configurations.all");
    s.open("resolutionStrategy");
    for constraint in &resolution.forced {
        s.line(format!(
            "force({})",
            quoted(&format!("{}:{}", constraint.group_artifact, constraint.forced_version))
        ));
    }
    let (amount, unit) = split_duration(resolution.cache_dynamic_versions);
    s.line(format!("cacheDynamicVersionsFor({}, {})", amount, quoted(unit)));
    let (amount, unit) = split_duration(resolution.cache_changing_modules);
    s.line(format!("cacheChangingModulesFor({}, {})", amount, quoted(unit)));
    s.close();
    s.close();

    s.close();
    s.blank();

    s.open("flutter");
    s.line(format!("source = {}", quoted(&android.flutter_source)));
    s.close();

    if !plan.repositories().is_empty() {
        s.blank();
        s.open("repositories");
        for repository in plan.repositories() {
            match repository {
                Repository::Google => s.line("google()"),
                Repository::MavenCentral => s.line("mavenCentral()"),
                Repository::Maven { url } => {
                    s.open("maven");
                    s.line(format!("url = uri({})", quoted(url)));
                    s.close();
                }
            }
        }
        s.close();
    }

    if !plan.dependencies().is_empty() {
        s.blank();
        s.open("dependencies");
        for dependency in plan.dependencies() {
            let notation = format!("{}:{}", dependency.coordinate, dependency.version);
            s.line(format!("{}({})", dependency.configuration, quoted(&notation)));
        }
        s.close();
    }

    s.out
}
