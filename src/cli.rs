//! Command-line front end.
//!
//! `judge` runs one submission through the full pipeline and prints the
//! JSON response; `sweep` reclaims workspaces abandoned by a previous
//! process; `languages` lists the registered tags.

use crate::config::JudgeConfig;
use crate::judge::{Language, Request, SubmissionFile};
use crate::observability;
use crate::sandbox::docker::DockerEngine;
use crate::service::{JudgeReply, JudgeService, THROTTLED_MESSAGE};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Judge one submission and print the JSON response
    Judge {
        /// Language tag (java, python, c, cpp, go, cs)
        #[arg(long)]
        language: String,
        /// Source code file
        #[arg(long)]
        source: PathBuf,
        /// Expected output file
        #[arg(long)]
        expected_output: PathBuf,
        /// Optional stdin payload file
        #[arg(long)]
        input: Option<PathBuf>,
        /// Time limit in seconds
        #[arg(long)]
        time_limit: u64,
        /// Memory limit in MB
        #[arg(long)]
        memory_limit: u64,
    },
    /// Remove stale workspaces left behind by a previous run
    Sweep {
        /// Only remove workspaces older than this many seconds
        #[arg(long, default_value_t = 3600)]
        max_age_secs: u64,
    },
    /// List registered language tags
    Languages,
}

pub fn run() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = JudgeConfig::from_env().context("invalid configuration")?;
    let engine = Arc::new(DockerEngine::new(
        config.output_cap_bytes,
        config.build_budget,
    ));
    let service = JudgeService::new(config, engine, observability::get_metrics())
        .context("failed to initialize judge service")?;

    match cli.command {
        Commands::Judge {
            language,
            source,
            expected_output,
            input,
            time_limit,
            memory_limit,
        } => {
            let language: Language = language
                .parse()
                .map_err(|e| anyhow::anyhow!("{}", e))?;
            let request = Request {
                source_code: read_submission_file(&source)?,
                expected_output: read_submission_file(&expected_output)?,
                input: input.as_deref().map(read_submission_file).transpose()?,
                time_limit,
                memory_limit,
                language,
            };

            match service.judge(request) {
                JudgeReply::Completed(response) => {
                    println!("{}", serde_json::to_string_pretty(&response)?);
                    Ok(())
                }
                JudgeReply::BadRequest(message) => {
                    eprintln!("{}", message);
                    std::process::exit(2);
                }
                JudgeReply::Throttled => {
                    eprintln!("{}", THROTTLED_MESSAGE);
                    std::process::exit(3);
                }
                JudgeReply::Unavailable(message) => {
                    eprintln!("sandbox unavailable: {}", message);
                    std::process::exit(1);
                }
            }
        }
        Commands::Sweep { max_age_secs } => {
            let removed = service.sweep_stale_workspaces(Duration::from_secs(max_age_secs))?;
            println!("removed {} stale workspace(s)", removed);
            Ok(())
        }
        Commands::Languages => {
            for language in service.registry().languages() {
                println!("{}", language);
            }
            Ok(())
        }
    }
}

fn read_submission_file(path: &Path) -> Result<SubmissionFile> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .with_context(|| format!("{} has no file name", path.display()))?;
    let content =
        std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    Ok(SubmissionFile { file_name, content })
}
