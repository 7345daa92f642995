mod config;
mod errors;
mod form;
mod models;
mod parser_client;
mod session;
#[cfg(test)]
mod test_support;
mod upload;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::models::file::SelectedFile;
use crate::parser_client::ParserClient;
use crate::session::Session;

#[derive(Parser, Debug)]
#[command(version, about = "Upload a résumé and autofill a job application from it")]
struct Args {
    /// Parsing API origin; overrides PARSER_API_BASE.
    #[arg(long)]
    api_base: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Upload a résumé, autofill the form and print it as JSON.
    Parse {
        file: PathBuf,
        /// Replace the skills text before printing or submitting.
        #[arg(long)]
        skills: Option<String>,
        /// Submit the application after autofill.
        #[arg(long)]
        submit: bool,
    },
    /// Report parser backend status.
    Health,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = Config::from_env()?.with_api_base(args.api_base);

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let client = ParserClient::new(&config);
    info!("Using parser at {}", client.api_base());

    match args.command {
        Command::Parse {
            file,
            skills,
            submit,
        } => run_parse(client, file, skills, submit).await,
        Command::Health => run_health(client).await,
    }
}

async fn run_parse(
    client: ParserClient,
    path: PathBuf,
    skills: Option<String>,
    submit: bool,
) -> Result<()> {
    let file = SelectedFile::from_path(&path)
        .await
        .with_context(|| format!("Could not read {}", path.display()))?;

    let mut session = Session::new(client);
    session.upload.select_file(file);
    session.upload_and_wait().await;

    if let Some(message) = session.upload.error_message() {
        bail!("{message}");
    }
    if let Some(message) = session.upload.success_message() {
        eprintln!("{message}");
    }

    if let Some(text) = skills {
        session.form.set_skills_text(text);
    }

    if submit {
        let submission = session.submit();
        println!("{}", serde_json::to_string_pretty(&submission)?);
        eprintln!("Application submitted successfully!");
    } else {
        println!("{}", serde_json::to_string_pretty(&session.form.snapshot())?);
    }
    Ok(())
}

async fn run_health(client: ParserClient) -> Result<()> {
    let health = client.health().await.context("Parser health check failed")?;
    let backend = client
        .backend_config()
        .await
        .context("Parser config check failed")?;
    println!(
        "status={} cohere_configured={} cohere_available={}",
        health.status, backend.cohere_configured, health.cohere_available
    );
    Ok(())
}
