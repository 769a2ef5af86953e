//! declaro CLI
//!
//! Command-line tool for reconciling a MySQL database with declared DDL.

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use declaro_mysql::prelude::*;

/// Declarative schema reconciliation for MySQL.
#[derive(Parser)]
#[command(name = "declaro")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON connection configuration; replaces the connection flags.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// SQL dialect.
    #[arg(long, env = "DECLARO_DIALECT", default_value = "mysql")]
    dialect: String,

    /// Server as `host` or `host:port`.
    #[arg(long, env = "DECLARO_HOST")]
    host: Option<String>,

    /// User name.
    #[arg(short, long, env = "DECLARO_USER")]
    user: Option<String>,

    /// Password.
    #[arg(short, long, env = "DECLARO_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Target database.
    #[arg(short, long, env = "DECLARO_DATABASE")]
    database: Option<String>,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the live schema.
    Fetch,

    /// Print what a schema file normalizes to, without connecting.
    Read {
        /// DDL file, or `-` for standard input.
        schema: PathBuf,
    },

    /// Print the statements that reconcile the database with a schema file.
    Plan {
        /// DDL file, or `-` for standard input.
        schema: PathBuf,

        /// Print a JSON document instead of SQL.
        #[arg(long)]
        json: bool,
    },

    /// Execute the statements that reconcile the database with a schema file.
    Apply {
        /// DDL file, or `-` for standard input.
        schema: PathBuf,

        /// Show SQL without executing (dry run).
        #[arg(long)]
        dry_run: bool,
    },

    /// Drop every table of the target database.
    Teardown {
        /// Show SQL without executing (dry run).
        #[arg(long)]
        dry_run: bool,
    },
}

#[derive(Serialize)]
struct PlanDocument<'a> {
    database: &'a str,
    has_changes: bool,
    statements: &'a [String],
    actual: &'a [String],
    desired: &'a [String],
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match &cli.command {
        Commands::Fetch => {
            print_statements(&reconciler(&cli)?.fetch_schemas().await?);
        }

        Commands::Read { schema } => {
            let ddl = read_schema(schema)?;
            print_statements(&declaro_mysql::declaro_core::read_schemas(&ddl)?);
        }

        Commands::Plan { schema, json } => {
            let reconciler = reconciler(&cli)?;
            let reconciliation = reconciler.get_alterations(&read_schema(schema)?).await?;
            if *json {
                let document = PlanDocument {
                    database: &reconciler.config().database,
                    has_changes: reconciliation.has_changes(),
                    statements: reconciliation.alteration.statements(),
                    actual: &reconciliation.actual,
                    desired: &reconciliation.desired,
                };
                println!("{}", serde_json::to_string_pretty(&document)?);
            } else if reconciliation.has_changes() {
                print!("{}", reconciliation.alteration);
            } else {
                println!("-- no changes");
            }
        }

        Commands::Apply { schema, dry_run } => {
            let ddl = read_schema(schema)?;
            let report = reconciler(&cli)?.dry_run(*dry_run).apply(&ddl).await?;
            report_applied(&report);
        }

        Commands::Teardown { dry_run } => {
            let report = reconciler(&cli)?.dry_run(*dry_run).teardown().await?;
            report_applied(&report);
        }
    }

    Ok(())
}

fn reconciler(cli: &Cli) -> anyhow::Result<Reconciler> {
    Ok(Reconciler::new(connection_config(cli)?)?)
}

fn connection_config(cli: &Cli) -> anyhow::Result<ConnectionConfig> {
    if let Some(path) = &cli.config {
        return ConnectionConfig::from_json_file(path)
            .with_context(|| format!("loading {}", path.display()));
    }
    let host = cli.host.clone().context("--host or DECLARO_HOST is required")?;
    let user = cli.user.clone().context("--user or DECLARO_USER is required")?;
    let database = cli
        .database
        .clone()
        .context("--database or DECLARO_DATABASE is required")?;

    let mut config = ConnectionConfig::new(host, user, database);
    config.dialect = cli.dialect.parse()?;
    config.password.clone_from(&cli.password);
    Ok(config)
}

fn read_schema(path: &Path) -> anyhow::Result<String> {
    if path.as_os_str() == "-" {
        let mut ddl = String::new();
        std::io::stdin().read_to_string(&mut ddl)?;
        return Ok(ddl);
    }
    std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

fn print_statements(statements: &[String]) {
    for statement in statements {
        println!("{statement};\n");
    }
}

fn report_applied(report: &ApplyReport) {
    if report.statements.is_empty() {
        println!("-- no changes");
        return;
    }
    for statement in &report.statements {
        println!("{statement};");
    }
    if report.dry_run {
        info!("Dry run - {} statements not executed.", report.statements.len());
    } else {
        info!(
            "Applied {} statements at {}.",
            report.statements.len(),
            report.applied_at.format("%Y-%m-%d %H:%M:%S")
        );
    }
}
