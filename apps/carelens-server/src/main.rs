use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;
use modkit::runtime::{run, DbFactory, DbOptions, RunOptions, ShutdownOptions};
use modkit::{ModuleRegistry, RegistryBuilder};
use modkit_db::{sqlite, ConnectOpts, DbHandle};
use runtime::{AppConfig, AppConfigProvider, CliArgs, ConfigProvider, DatabaseConfig};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

// Adapter to make AppConfigProvider implement modkit::ConfigProvider
struct ModkitConfigAdapter(Arc<AppConfigProvider>);

impl modkit::ConfigProvider for ModkitConfigAdapter {
    fn get_module_config(&self, module_name: &str) -> Option<&serde_json::Value> {
        self.0.get_module_config(module_name)
    }
}

/// CareLens Server - preventive-care health profiles and guidance
#[derive(Parser)]
#[command(name = "carelens-server")]
#[command(about = "CareLens Server - preventive-care health profiles and guidance")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port for HTTP server (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Print current configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Use an in-memory SQLite database
    #[arg(long)]
    mock: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Run,
    /// Check configuration
    Check,
}

/// Every module the server ships, in dependency order.
fn build_registry() -> Result<ModuleRegistry> {
    let mut b = RegistryBuilder::default();
    api_ingress::register(&mut b);
    health_profile::register(&mut b);
    care_guidance::register(&mut b);
    Ok(b.build_topo_sorted()?)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // CLI args passed down to config/app
    let args = CliArgs {
        config: cli.config.as_ref().map(|p| p.to_string_lossy().to_string()),
        port: cli.port,
        print_config: cli.print_config,
        verbose: cli.verbose,
        mock: cli.mock,
    };

    // Load configuration (normalized home_dir is applied inside)
    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;

    // Apply CLI overrides (port / verbosity)
    config.apply_cli_overrides(&args);

    if cli.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    let logging_config = config.logging.clone().unwrap_or_default();
    runtime::logging::init_logging_from_config(&logging_config, Path::new(&config.server.home_dir));
    tracing::info!(home_dir = %config.server.home_dir, "CareLens Server starting");

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(config, args).await,
        Commands::Check => check_config(config),
    }
}

/// Detect DB backend from URL scheme.
fn detect_from_dsn(cfg: &DatabaseConfig) -> Result<&'static str> {
    let raw = cfg.url.trim();
    if raw.is_empty() {
        return Err(anyhow!("Database URL not configured"));
    }
    if sqlite::is_memory_dsn(raw) {
        return Ok("sqlite");
    }

    let url = Url::parse(raw).map_err(|e| anyhow!("Invalid database DSN '{}': {}", raw, e))?;

    match url.scheme() {
        "sqlite" => Ok("sqlite"),
        "postgres" | "postgresql" => Ok("postgres"),
        other => Err(anyhow!("Unsupported database type: {}", other)),
    }
}

/// DSN the server will actually open: `--mock` wins, relative SQLite paths
/// are anchored at `home_dir`.
fn effective_dsn(db_config: &DatabaseConfig, mock: bool, base_dir: &Path) -> Result<String> {
    if mock {
        return Ok(sqlite::MEMORY_DSN.to_string());
    }
    detect_from_dsn(db_config)?;
    let dsn = db_config.url.trim();
    if dsn.starts_with("sqlite:") {
        return Ok(sqlite::absolutize_dsn(dsn, base_dir)?);
    }
    Ok(dsn.to_string())
}

fn connect_opts(db_config: &DatabaseConfig) -> ConnectOpts {
    ConnectOpts {
        max_conns: db_config.max_conns,
        acquire_timeout: Some(Duration::from_secs(5)),
        sqlite_busy_timeout: db_config
            .busy_timeout_ms
            .map(|ms| Duration::from_millis(u64::from(ms))),
        create_sqlite_dirs: true,
        ..Default::default()
    }
}

async fn run_server(config: AppConfig, args: CliArgs) -> Result<()> {
    tracing::info!("Initializing modules...");
    let registry = build_registry()?;

    // Provide module configs to modkit
    let config_provider = Arc::new(ModkitConfigAdapter(Arc::new(AppConfigProvider::new(
        config.clone(),
    ))));

    // Base dir for resolving relative sqlite paths (already absolute & created)
    let base_dir = PathBuf::from(&config.server.home_dir);

    let db_config = match (config.database.clone(), args.mock) {
        (Some(db), _) => Some(db),
        (None, true) => Some(DatabaseConfig {
            url: sqlite::MEMORY_DSN.to_string(),
            max_conns: None,
            busy_timeout_ms: None,
        }),
        (None, false) => None,
    };

    let db_options = if let Some(db_config) = db_config {
        let mock = args.mock;
        let factory: DbFactory = Box::new(move || {
            Box::pin(async move {
                let dsn = effective_dsn(&db_config, mock, &base_dir)?;
                tracing::info!("Connecting to database: {}", dsn);
                let db = DbHandle::connect(&dsn, connect_opts(&db_config)).await?;
                tracing::info!("Connected DB backend: {:?}", db.engine());
                Ok(Arc::new(db))
            })
        });
        DbOptions::Auto(factory)
    } else {
        tracing::warn!("No database configuration found, running without database");
        DbOptions::None
    };

    let run_options = RunOptions {
        registry,
        modules_cfg: config_provider,
        db: db_options,
        shutdown: ShutdownOptions::Signals,
    };

    run(run_options).await
}

fn check_config(config: AppConfig) -> Result<()> {
    tracing::info!("Checking configuration...");

    if let Some(db) = &config.database {
        let backend = detect_from_dsn(db)?;
        tracing::info!(backend, "Database DSN is valid");
    }

    let registry = build_registry()?;
    let order: Vec<&str> = registry.modules().iter().map(|m| m.name()).collect();
    tracing::info!(?order, "Module graph is valid");

    println!("Configuration check passed");
    println!("Modules: {}", order.join(" -> "));
    println!("{}", config.to_yaml()?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn db(url: &str) -> DatabaseConfig {
        DatabaseConfig {
            url: url.to_string(),
            max_conns: Some(4),
            busy_timeout_ms: Some(250),
        }
    }

    #[test]
    fn registry_orders_ingress_first() {
        let registry = build_registry().unwrap();
        let names: Vec<_> = registry.modules().iter().map(|m| m.name()).collect();
        assert_eq!(names, ["api_ingress", "health_profile", "care_guidance"]);
    }

    #[test]
    fn dsn_schemes() {
        assert_eq!(detect_from_dsn(&db("sqlite://data/app.db")).unwrap(), "sqlite");
        assert_eq!(detect_from_dsn(&db("sqlite::memory:")).unwrap(), "sqlite");
        assert_eq!(
            detect_from_dsn(&db("postgres://u:p@localhost/carelens")).unwrap(),
            "postgres"
        );
        assert!(detect_from_dsn(&db("mysql://localhost/x")).is_err());
        assert!(detect_from_dsn(&db("  ")).is_err());
    }

    #[test]
    fn mock_forces_memory_and_relative_paths_use_home_dir() {
        let home = Path::new("/srv/carelens");
        assert_eq!(
            effective_dsn(&db("postgres://u:p@h/x"), true, home).unwrap(),
            sqlite::MEMORY_DSN
        );

        let dsn = effective_dsn(&db("sqlite://database/carelens.db"), false, home).unwrap();
        assert!(dsn.starts_with("sqlite://"));
        assert!(dsn.contains("/srv/carelens"));
        assert!(dsn.ends_with("database/carelens.db"));

        let pg = "postgres://u:p@localhost/carelens";
        assert_eq!(effective_dsn(&db(pg), false, home).unwrap(), pg);
    }

    #[test]
    fn connect_opts_follow_config() {
        let opts = connect_opts(&db("sqlite::memory:"));
        assert_eq!(opts.max_conns, Some(4));
        assert_eq!(opts.sqlite_busy_timeout, Some(Duration::from_millis(250)));
    }
}
