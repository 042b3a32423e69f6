use crate::output::print_json;
use anyhow::Context;
use clap::Subcommand;
use provider_gcp_core::config::{ProviderConfig, WarnLevel};
use std::path::Path;

// ---------------------------------------------------------------------------
// Subcommand types
// ---------------------------------------------------------------------------

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Write a starter config file
    Init {
        /// GCP project that owns the addresses
        #[arg(long)]
        project: String,
        /// Region used by records that leave it unset
        #[arg(long)]
        region: Option<String>,
        /// Compute API base URL override
        #[arg(long)]
        endpoint: Option<String>,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the effective config, defaults included
    Show,

    /// Validate the config for common mistakes
    Validate,
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn run(path: &Path, subcmd: ConfigSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        ConfigSubcommand::Init {
            project,
            region,
            endpoint,
            force,
        } => init(path, project, region, endpoint, force),
        ConfigSubcommand::Show => show(path, json),
        ConfigSubcommand::Validate => validate(path, json),
    }
}

fn init(
    path: &Path,
    project: String,
    region: Option<String>,
    endpoint: Option<String>,
    force: bool,
) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("{} already exists (use --force to overwrite)", path.display());
    }
    let mut config = ProviderConfig::new(project);
    if let Some(region) = region {
        config.default_region = region;
    }
    if let Some(endpoint) = endpoint {
        config.endpoint = endpoint;
    }
    config
        .save(path)
        .with_context(|| format!("failed to write {}", path.display()))?;
    println!("Wrote {}", path.display());
    Ok(())
}

fn show(path: &Path, json: bool) -> anyhow::Result<()> {
    let config = ProviderConfig::load(path).context("failed to load config")?;
    if json {
        print_json(&config)?;
    } else {
        println!("project_id:     {}", config.project_id);
        println!("default_region: {}", config.default_region);
        println!("endpoint:       {}", config.endpoint);
        println!("credentials:    {:?}", config.credentials.source);
        println!("timeout_secs:   {}", config.timeout_secs);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// validate
// ---------------------------------------------------------------------------

fn validate(path: &Path, json: bool) -> anyhow::Result<()> {
    let config = ProviderConfig::load(path).context("failed to load config")?;
    let warnings = config.validate();

    if json {
        let value = serde_json::json!({
            "warnings": warnings,
        });
        print_json(&value)?;
    } else if warnings.is_empty() {
        println!("Config is valid. No warnings.");
    } else {
        for w in &warnings {
            let prefix = match w.level {
                WarnLevel::Warning => "warning",
                WarnLevel::Error => "error",
            };
            println!("[{prefix}] {}", w.message);
        }
    }

    if config.has_errors() {
        anyhow::bail!("config validation found errors");
    }
    Ok(())
}
