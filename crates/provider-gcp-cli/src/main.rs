mod cmd;
mod output;

use clap::{Parser, Subcommand};
use cmd::config::ConfigSubcommand;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "provider-gcp",
    about = "Reconcile GCP compute addresses from a directory of managed records",
    version,
    propagate_version = true
)]
struct Cli {
    /// Directory of managed records, one YAML file per record
    #[arg(long, global = true, env = "PROVIDER_GCP_RECORDS", default_value = "records")]
    records: PathBuf,

    /// Provider config file
    #[arg(long, global = true, env = "PROVIDER_GCP_CONFIG", default_value = "provider.yaml")]
    config: PathBuf,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Look up external objects and refresh record status without changing them
    Observe {
        /// Record name (omit for every Address record)
        name: Option<String>,
    },

    /// Run one reconcile pass: create, delete or confirm external objects
    Reconcile {
        /// Record name (omit for every Address record)
        name: Option<String>,

        /// Seconds to wait after a change or failure
        #[arg(long, default_value = "10")]
        short_wait: u64,

        /// Seconds to wait between checks of a converged record
        #[arg(long, default_value = "60")]
        poll_interval: u64,
    },

    /// Show record conditions from the store
    Status {
        /// Record name (shows the full condition log)
        name: Option<String>,
    },

    /// Request deletion of a record's external object
    Delete { name: String },

    /// Create or check the provider config
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Reconcile { .. } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Observe { name } => {
            cmd::observe::run(&cli.records, &cli.config, name.as_deref(), cli.json)
        }
        Commands::Reconcile {
            name,
            short_wait,
            poll_interval,
        } => cmd::reconcile::run(
            &cli.records,
            &cli.config,
            name.as_deref(),
            cmd::reconcile::options(short_wait, poll_interval),
            cli.json,
        ),
        Commands::Status { name } => cmd::status::run(&cli.records, name.as_deref(), cli.json),
        Commands::Delete { name } => cmd::delete::run(&cli.records, &name, cli.json),
        Commands::Config { subcommand } => cmd::config::run(&cli.config, subcommand, cli.json),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
