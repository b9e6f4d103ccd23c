//! droidplan CLI
//!
//! Resolves and validates the Android build of a Flutter app.

use anyhow::Result;
use clap::{Parser, Subcommand};
use droidplan_android::gradle::render_kotlin_dsl;
use droidplan_android::plan::describe_platform;
use droidplan_android::{
    plan_from_config, BuildPlan, FlutterDescriptor, InMemoryIndex, RepositoryIndex,
    TargetPlatformResolver,
};
use droidplan_cli::logging::{self, LogConfig};
use droidplan_cli::output::{format_count, format_ttl, OutputFormat, Status};
use droidplan_core::config::Config;
use droidplan_core::error::{exit_codes, Error};
use owo_colors::OwoColorize;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "droidplan")]
#[command(about = "Resolve and validate the Android build of a Flutter app")]
#[command(version)]
struct Cli {
    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Flutter local.properties overriding platform values
    #[arg(long, global = true)]
    local_properties: Option<PathBuf>,

    /// Offline repository index (TOML)
    #[arg(long, global = true)]
    index: Option<PathBuf>,

    /// Increase output verbosity
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Log line format on stderr
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    log_format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Assemble and print the build plan
    Plan {
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate the build without printing the plan
    Check,

    /// Print the platform value of a symbol, or all of them
    Resolve {
        /// Symbol such as minSdk or flutter.versionName
        symbol: Option<String>,
    },

    /// Render the plan as build.gradle.kts
    Render {
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List plugins in application order
    Plugins,
}

/// Everything a command needs, loaded once
struct Context {
    config: Config,
    resolver: TargetPlatformResolver<FlutterDescriptor>,
    index: Option<InMemoryIndex>,
}

impl Context {
    fn load(cli: &Cli) -> droidplan_core::Result<Self> {
        let config = Config::load(cli.config.as_deref())?;
        tracing::debug!(path = ?config.path, "Loaded configuration");

        let mut descriptor = FlutterDescriptor::default().with_overrides(&config.schema.platform);
        if let Some(path) = &cli.local_properties {
            descriptor = descriptor.with_local_properties(path)?;
        }

        let index = cli.index.as_deref().map(InMemoryIndex::load).transpose()?;

        Ok(Self {
            config,
            resolver: TargetPlatformResolver::new(descriptor),
            index,
        })
    }

    fn plan(&self) -> droidplan_core::Result<BuildPlan> {
        let index = self.index.as_ref().map(|index| index as &dyn RepositoryIndex);
        plan_from_config(&self.config.schema, &self.resolver, index)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.no_color {
        owo_colors::set_override(false);
    }

    logging::init(&LogConfig::from_flags(cli.verbose, cli.quiet, cli.log_format))?;

    let exit_code = match Context::load(&cli) {
        Ok(ctx) => {
            match &cli.command {
                Commands::Plan { format, output } => run_plan(&ctx, *format, output.as_deref(), cli.quiet),
                Commands::Check => run_check(&ctx, cli.quiet),
                Commands::Resolve { symbol } => run_resolve(&ctx, symbol.as_deref()),
                Commands::Render { output } => run_render(&ctx, output.as_deref(), cli.quiet),
                Commands::Plugins => run_plugins(&ctx),
            }
        }
        Err(e) => fail(&e, OutputFormat::Text),
    };

    std::process::exit(exit_code);
}

fn fail(err: &Error, format: OutputFormat) -> i32 {
    Status::report(err, format);
    err.code.exit_code()
}

fn write_output(content: &str, output: Option<&Path>, quiet: bool) -> i32 {
    match output {
        Some(path) => match std::fs::write(path, content) {
            Ok(()) => {
                if !quiet {
                    Status::success(&format!("Wrote {}", path.display()));
                }
                exit_codes::SUCCESS
            }
            Err(e) => fail(&Error::from(e).with_context(format!("Writing {}", path.display())), OutputFormat::Text),
        },
        None => {
            print!("{}", content);
            exit_codes::SUCCESS
        }
    }
}

fn run_plan(ctx: &Context, format: OutputFormat, output: Option<&Path>, quiet: bool) -> i32 {
    let plan = match ctx.plan() {
        Ok(plan) => plan,
        Err(e) => return fail(&e, format),
    };

    match format {
        OutputFormat::Json => match plan.to_json() {
            Ok(mut json) => {
                json.push('\n');
                write_output(&json, output, quiet)
            }
            Err(e) => fail(&e, format),
        },
        OutputFormat::Text => {
            if let Some(path) = output {
                return write_output(&render_summary(&plan), Some(path), quiet);
            }
            print_summary(&ctx.config.schema.general.project_name, &plan);
            exit_codes::SUCCESS
        }
    }
}

fn run_check(ctx: &Context, quiet: bool) -> i32 {
    match ctx.plan() {
        Ok(plan) => {
            if !quiet {
                Status::success(&format!(
                    "{} is valid ({}, {})",
                    plan.target().application_id,
                    format_count(plan.plugins().len(), "plugin", "plugins"),
                    format_count(plan.dependencies().len(), "dependency", "dependencies"),
                ));
            }
            exit_codes::SUCCESS
        }
        Err(e) => fail(&e, OutputFormat::Text),
    }
}

fn run_resolve(ctx: &Context, symbol: Option<&str>) -> i32 {
    match symbol {
        Some(symbol) => match ctx.resolver.resolve(symbol) {
            Ok(value) => {
                println!("{}", value);
                exit_codes::SUCCESS
            }
            Err(e) => fail(&e, OutputFormat::Text),
        },
        None => match describe_platform(&ctx.resolver) {
            Ok(values) => {
                for (symbol, value) in values {
                    Status::field(symbol.as_str(), value, 11);
                }
                exit_codes::SUCCESS
            }
            Err(e) => fail(&e, OutputFormat::Text),
        },
    }
}

fn run_render(ctx: &Context, output: Option<&Path>, quiet: bool) -> i32 {
    match ctx.plan() {
        Ok(plan) => write_output(&render_kotlin_dsl(&plan), output, quiet),
        Err(e) => fail(&e, OutputFormat::Text),
    }
}

fn run_plugins(ctx: &Context) -> i32 {
    match ctx.plan() {
        Ok(plan) => {
            for (i, plugin) in plan.plugins().iter().enumerate() {
                println!("{} {}", format!("{:>2}.", i + 1).dimmed(), plugin);
            }
            exit_codes::SUCCESS
        }
        Err(e) => fail(&e, OutputFormat::Text),
    }
}

fn print_summary(project_name: &str, plan: &BuildPlan) {
    let target = plan.target();
    let resolution = plan.resolution();

    Status::header(&format!("Build plan: {}", project_name));
    Status::field("applicationId", &target.application_id, 13);
    Status::field("namespace", &plan.android().namespace, 13);
    Status::field(
        "sdk",
        format!("min {} / target {} / compile {}", target.min_sdk, target.target_sdk, target.compile_sdk),
        13,
    );
    Status::field("version", format!("{} ({})", target.version_name, target.version_code), 13);
    if let Some(ndk) = &plan.android().ndk_version {
        Status::field("ndkVersion", ndk, 13);
    }

    Status::header("Plugins");
    for plugin in plan.plugins() {
        println!("  {}", plugin);
    }

    Status::header("Build types");
    for build_type in plan.build_types() {
        let signing = build_type.signing_config.as_deref().unwrap_or("unsigned");
        Status::field(&build_type.name, format!("signed with {}", signing), 13);
    }

    Status::header("Resolution strategy");
    for constraint in &resolution.forced {
        Status::field("force", format!("{}:{}", constraint.group_artifact, constraint.forced_version), 13);
    }
    Status::field("dynamic", format_ttl(resolution.cache_dynamic_versions), 13);
    Status::field("changing", format_ttl(resolution.cache_changing_modules), 13);

    if !plan.dependencies().is_empty() {
        Status::header("Dependencies");
        for dependency in plan.dependencies() {
            println!(
                "  {}:{} {}",
                dependency.coordinate,
                dependency.version.green(),
                format!("({:?}, requested {})", dependency.source, dependency.requested).dimmed()
            );
        }
    }
}

fn render_summary(plan: &BuildPlan) -> String {
    let target = plan.target();
    let mut lines = vec![
        format!("applicationId: {}", target.application_id),
        format!("minSdk: {}", target.min_sdk),
        format!("targetSdk: {}", target.target_sdk),
        format!("compileSdk: {}", target.compile_sdk),
        format!("versionCode: {}", target.version_code),
        format!("versionName: {}", target.version_name),
    ];
    lines.extend(plan.plugins().iter().map(|p| format!("plugin: {}", p)));
    lines.extend(
        plan.dependencies()
            .iter()
            .map(|d| format!("dependency: {}:{}", d.coordinate, d.version)),
    );
    lines.push(String::new());
    lines.join("\n")
}
