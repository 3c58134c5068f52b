mod app;
mod config;
mod logging;
mod render;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracker_engine::IndexJobRequest;

use crate::config::{AppConfig, DEFAULT_CONFIG_FILE};

/// Terminal view of background indexing jobs.
#[derive(Debug, Parser)]
#[command(name = "tracker", version)]
struct Cli {
    /// RON config file (defaults to ./tracker.ron when present).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Overrides `api_base_url` from the config file.
    #[arg(long)]
    api: Option<String>,

    /// Job id to track from the start; may be repeated.
    #[arg(long = "track", value_name = "JOB_ID")]
    track: Vec<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Start an index job for an uploaded file, then keep watching.
    Submit {
        #[arg(long)]
        upload: String,
        #[arg(long)]
        collection: String,
        #[arg(long = "text-field", required = true)]
        text_fields: Vec<String>,
        #[arg(long)]
        title_field: Option<String>,
        #[arg(long)]
        id_field: Option<String>,
        #[arg(long = "metadata-field")]
        metadata_fields: Vec<String>,
    },
}

impl Command {
    fn into_request(self) -> IndexJobRequest {
        match self {
            Command::Submit {
                upload,
                collection,
                text_fields,
                title_field,
                id_field,
                metadata_fields,
            } => IndexJobRequest {
                upload_id: upload,
                collection_name: collection,
                text_fields,
                title_field,
                id_field,
                metadata_fields,
            },
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => AppConfig::load(path, true)?,
        None => AppConfig::load(&PathBuf::from(DEFAULT_CONFIG_FILE), false)?,
    };
    if let Some(api) = cli.api {
        config.api_base_url = api;
    }
    logging::initialize(
        config.log_destination,
        config.level_filter()?,
        &config.log_file,
    );

    let submission = cli.command.map(Command::into_request);
    app::run_app(config, cli.track, submission).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn submit_arguments_become_request() {
        let cli = Cli::try_parse_from([
            "tracker",
            "--api",
            "http://localhost:9000/api",
            "--track",
            "j1",
            "submit",
            "--upload",
            "up-1",
            "--collection",
            "papers",
            "--text-field",
            "title",
            "--text-field",
            "body",
        ])
        .expect("valid arguments");

        assert_eq!(cli.api.as_deref(), Some("http://localhost:9000/api"));
        assert_eq!(cli.track, vec!["j1".to_string()]);
        let request = cli.command.expect("submit").into_request();
        assert_eq!(request.upload_id, "up-1");
        assert_eq!(request.text_fields, vec!["title".to_string(), "body".to_string()]);
        assert!(request.metadata_fields.is_empty());
    }

    #[test]
    fn submit_requires_a_text_field() {
        let result = Cli::try_parse_from([
            "tracker", "submit", "--upload", "up-1", "--collection", "papers",
        ]);
        assert!(result.is_err());
    }
}
