//! Resume matcher: resume and job description matching with skill-gap
//! analysis

use clap::Parser;
use log::{error, info};
use resume_matcher::cli::{self, Cli, Commands, ConfigAction};
use resume_matcher::config::{Config, EmbeddingBackendKind};
use resume_matcher::error::MatcherError;
use resume_matcher::output::format_report;
use resume_matcher::processing::analyzer::MatchEngine;
use resume_matcher::Result;
use std::process;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = run_command(cli.command, config).await {
        error!("Command failed: {}", e);
        process::exit(1);
    }
}

async fn run_command(command: Commands, config: Config) -> Result<()> {
    match command {
        Commands::Analyze {
            resume,
            job,
            role,
            output,
            detailed,
            save,
            offline,
        } => {
            info!("Starting resume match analysis");

            cli::validate_file_extension(&resume, &["txt", "md"])
                .map_err(|e| MatcherError::InvalidInput(format!("Resume file: {}", e)))?;
            cli::validate_file_extension(&job, &["txt", "md"])
                .map_err(|e| MatcherError::InvalidInput(format!("Job description file: {}", e)))?;
            let output_format = cli::parse_output_format(&output).map_err(MatcherError::InvalidInput)?;

            let resume_text = tokio::fs::read_to_string(&resume).await?;
            let job_text = tokio::fs::read_to_string(&job).await?;
            info!(
                "Read resume ({} chars) and job description ({} chars)",
                resume_text.len(),
                job_text.len()
            );

            let mut config = config;
            if offline {
                config.embedding.backend = EmbeddingBackendKind::Hash;
            }

            let engine = MatchEngine::new(&config).await?;
            let report = engine.analyze(&resume_text, &job_text, role.as_deref())?;

            let rendered = format_report(
                &report,
                output_format,
                config.output.color_output,
                detailed || config.output.detailed,
            )?;

            match save {
                Some(path) => {
                    tokio::fs::write(&path, &rendered).await?;
                    info!("Report saved to {}", path.display());
                }
                None => println!("{}", rendered),
            }
        }

        Commands::Roles => {
            for profile in &config.roles.catalog {
                let marker = if profile.key == config.roles.default_role {
                    " (default)"
                } else {
                    ""
                };
                println!("{}{}", profile.key, marker);
                println!("  required: {}", profile.required_skills.join(", "));
                println!("  critical: {}", profile.critical_skills.join(", "));
            }
        }

        Commands::Config { action } => match action.unwrap_or(ConfigAction::Show) {
            ConfigAction::Show => {
                let rendered = toml::to_string_pretty(&config).map_err(|e| {
                    MatcherError::Configuration(format!("Failed to render config: {}", e))
                })?;
                println!("{}", rendered);
            }
            ConfigAction::Reset => {
                let defaults = Config::default();
                defaults.save()?;
                println!("Configuration reset to defaults");
            }
        },
    }

    Ok(())
}
