//! Configuration view and validation commands: `interview config`.

use anyhow::Result;
use std::path::{Path, PathBuf};

use interview_orchestrator::config::{
    CONFIG_FILE_NAME, InterviewConfig, InterviewToml, base_url_from_env,
};

use super::super::ConfigCommands;

pub fn cmd_config(
    config: &InterviewConfig,
    explicit: Option<&Path>,
    cwd: &Path,
    command: Option<ConfigCommands>,
) -> Result<()> {
    match command {
        None | Some(ConfigCommands::Show) => show(config),
        Some(ConfigCommands::Validate) => {
            println!();
            println!("Validating configuration...");
            println!();

            if config.path.is_none() {
                println!("No {} found. Using defaults (valid).", CONFIG_FILE_NAME);
                return Ok(());
            }

            let warnings = config.validate();
            if warnings.is_empty() {
                println!("Configuration is valid.");
            } else {
                println!("Configuration warnings:");
                for warning in warnings {
                    println!("  - {}", warning);
                }
            }
            println!();
            Ok(())
        }
        Some(ConfigCommands::Init) => {
            let path: PathBuf = explicit
                .map(Path::to_path_buf)
                .unwrap_or_else(|| cwd.join(CONFIG_FILE_NAME));
            if path.exists() {
                println!("{} already exists at {}", CONFIG_FILE_NAME, path.display());
                println!("Delete it first if you want to recreate it.");
                return Ok(());
            }

            InterviewToml::default().save(&path)?;

            println!("Created {} at {}", CONFIG_FILE_NAME, path.display());
            println!();
            println!("You can now customize:");
            println!("  - [backend] base_url, request_timeout_secs");
            println!("  - [polling] initial_delay_ms, interval_ms, max_attempts");
            println!("  - [candidate] role, name");
            println!("  - [logging] format, file");
            println!();
            Ok(())
        }
    }
}

fn show(config: &InterviewConfig) -> Result<()> {
    let toml = &config.toml;

    println!();
    println!("Interview Configuration");
    println!("=======================");
    println!();
    match &config.path {
        Some(path) => println!("Config file: {}", path.display()),
        None => println!("No {} found; using defaults.", CONFIG_FILE_NAME),
    }
    println!();

    println!("[backend]");
    println!("  base_url = \"{}\"", toml.backend.base_url);
    println!("  request_timeout_secs = {}", toml.backend.request_timeout_secs);
    println!();

    println!("[polling]");
    println!("  initial_delay_ms = {}", toml.polling.initial_delay_ms);
    println!("  interval_ms = {}", toml.polling.interval_ms);
    println!("  max_attempts = {}", toml.polling.max_attempts);
    println!();

    if toml.candidate.role.is_some() || toml.candidate.name.is_some() {
        println!("[candidate]");
        if let Some(role) = &toml.candidate.role {
            println!("  role = \"{}\"", role);
        }
        if let Some(name) = &toml.candidate.name {
            println!("  name = \"{}\"", name);
        }
        println!();
    }

    println!("[logging]");
    println!("  format = \"{}\"", toml.logging.format);
    if let Some(file) = &toml.logging.file {
        println!("  file = \"{}\"", file.display());
    }
    println!();

    println!("Effective values (with env/CLI overrides):");
    println!("  base_url = \"{}\"", config.base_url());
    if config.cli_base_url.is_some() {
        println!("    (from --base-url)");
    } else if base_url_from_env().is_some() {
        println!("    (from environment)");
    }
    println!("  role = {}", config.role().as_deref().unwrap_or("(prompted)"));
    println!(
        "  poll budget = {:.1}s",
        config.retry_policy().total_budget().as_secs_f64()
    );
    println!();

    if config.path.is_none() {
        println!("Run 'interview config init' to create an {} file.", CONFIG_FILE_NAME);
        println!();
    }
    Ok(())
}
