use std::path::PathBuf;

use clap::Parser;
use tracing::error;

use engine_range::app::{collect_requests, run};
use engine_range::config::{RunConfig, detect_node_version, discover_registry, manifest_path};
use engine_range::engine::VersionFilter;
use engine_range::version::registries::NpmRegistry;

#[derive(Parser)]
#[command(name = "engine-range")]
#[command(
    version,
    about = "Find the dependency versions whose engines.node accepts a Node.js version"
)]
struct Cli {
    /// Packages to write into "dependencies"
    #[arg(long, num_args = 1..)]
    deps: Vec<String>,

    /// Packages to write into "devDependencies"
    #[arg(long = "dev-deps", num_args = 1..)]
    dev_deps: Vec<String>,

    /// Include prerelease and otherwise non-canonical versions
    #[arg(long)]
    all_version: bool,

    /// Target Node.js version (defaults to `node --version`)
    #[arg(long)]
    node: Option<String>,

    /// Only print the ranges, do not modify package.json
    #[arg(long)]
    view: bool,

    /// Registry URL (defaults to npm_config_registry, .npmrc, then registry.npmjs.org)
    #[arg(long)]
    registry: Option<String>,

    /// Path to package.json (defaults to ./package.json)
    #[arg(long)]
    manifest: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Write logs to this file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _guard = engine_range::logging::init(cli.verbose, cli.log_file.as_deref())?;

    let cwd = std::env::current_dir()?;
    let config = RunConfig {
        registry_url: discover_registry(cli.registry.as_deref(), &cwd),
        node_version: detect_node_version(cli.node.as_deref())?,
        version_filter: VersionFilter::from_all_versions_flag(cli.all_version),
        view_only: cli.view,
        manifest_path: manifest_path(cli.manifest, &cwd),
    };

    let requests = collect_requests(&config, &cli.deps, &cli.dev_deps)?;
    if requests.is_empty() {
        error!("No dependencies to check");
        return Ok(());
    }

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(async {
            let registry = NpmRegistry::new(&config.registry_url);
            let mut stdout = std::io::stdout();
            run(&config, requests, &registry, &mut stdout).await
        })?;

    Ok(())
}
