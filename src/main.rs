use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use interview_orchestrator::config::InterviewConfig;
use interview_orchestrator::logging::{LogFormat, init_logging};

mod cmd;

#[derive(Parser)]
#[command(name = "interview")]
#[command(version, about = "Phased AI interview client")]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to interview.toml. Defaults to ./interview.toml, then the user config directory
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Backend URL, e.g. http://localhost:8000/api/interview. Overrides env and file settings
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    #[arg(long, global = true, value_enum)]
    pub log_format: Option<LogFormat>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Take an interview
    Run {
        /// Role you are interviewing for
        #[arg(short, long)]
        role: Option<String>,
        /// Your name, passed to the interviewer
        #[arg(short, long)]
        name: Option<String>,
        /// Give consent without prompting
        #[arg(short, long)]
        yes: bool,
        /// Save the local transcript to this file (or directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Experience level expected for the offer
        #[arg(long)]
        experience_level: Option<String>,
        /// Technical skills expected for the offer (comma-separated)
        #[arg(long, value_delimiter = ',')]
        tech_skills: Vec<String>,
        /// Education expected for the offer
        #[arg(long)]
        education: Option<String>,
        /// Soft skills expected for the offer (comma-separated)
        #[arg(long, value_delimiter = ',')]
        soft_skills: Vec<String>,
    },
    /// Fetch the backend transcript of a session
    Report {
        session_id: String,
        /// Write the report to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// View or validate configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Validate configuration file
    Validate,
    /// Create a default interview.toml
    Init,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let cwd = std::env::current_dir().context("Failed to get current directory")?;

    let config = match &cli.command {
        Commands::Config {
            command: Some(ConfigCommands::Init),
        } => InterviewConfig::default(),
        _ => InterviewConfig::load(cli.config.as_deref(), &cwd)?,
    }
    .with_cli_args(cli.verbose, cli.base_url.clone(), cli.log_format);

    let _log_guard = init_logging(&config.logging_options())?;

    match cli.command {
        Commands::Run {
            role,
            name,
            yes,
            output,
            experience_level,
            tech_skills,
            education,
            soft_skills,
        } => {
            let config = config.with_candidate(role, name);
            let opts = cmd::RunOptions {
                yes,
                output,
                experience_level,
                tech_skills,
                education,
                soft_skills,
            };
            cmd::cmd_run(&config, opts).await?
        }
        Commands::Report { session_id, output } => {
            cmd::cmd_report(&config, &session_id, output.as_deref()).await?
        }
        Commands::Config { command } => {
            cmd::cmd_config(&config, cli.config.as_deref(), &cwd, command)?
        }
    }

    Ok(())
}
