use crate::client::OteClient;
use crate::config::{ClientConfig, Settings};
use crate::error::{OteError, Result};
use crate::backends::Backend;
use crate::pipeline::{Strategy, compose};
use clap::{Parser, Subcommand};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Subcommand)]
#[command(version, about, long_about = None)]
pub enum Commands {
    /// Run the pipeline described by a JSON file
    Run {
        /// Pipeline file
        #[arg(required = true)]
        pipeline: PathBuf,
        /// Backend: "python" for in-process, or the base URL of an OTE service
        #[clap(short, long, default_value = "python")]
        source: String,
        /// Run in an existing session instead of creating one (remote sources only: the
        /// local store lives only as long as this process)
        #[clap(long)]
        session_id: Option<String>,
        /// Debug mode
        #[clap(short = 't', long)]
        debug: bool,
        /// Print the session document after the run
        #[clap(long)]
        show_session: bool,
        /// Also write debug logs to this file
        #[clap(long)]
        log_file: Option<PathBuf>,
    },

    /// List the strategy kinds a backend implements
    Kinds {
        /// Backend: "python" for in-process, or the base URL of an OTE service
        #[clap(short, long, default_value = "python")]
        source: String,
    },
}

/// otelib Command
#[derive(Parser)]
#[command(about=None)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Commands,
}

/// One stage of a pipeline file
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineStage {
    pub kind: String,
    pub config: Value,
}

/// Pipeline file: stages listed upstream first
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineFile {
    #[serde(default)]
    pub headers: HashMap<String, String>,
    pub stages: Vec<PipelineStage>,
}

impl PipelineFile {
    pub fn from_json(raw: &str) -> Result<Self> {
        let file: Self = serde_json::from_str(raw)?;
        if file.stages.is_empty() {
            return Err(OteError::config("pipeline file lists no stages"));
        }
        Ok(file)
    }

    pub async fn load(path: &Path) -> Result<Self> {
        let raw = tokio::fs::read_to_string(path).await?;
        Self::from_json(&raw)
    }
}

/// Create every stage on `client` and pipe them together, returning the terminal stage
pub async fn build_pipeline(
    client: &OteClient,
    file: &PipelineFile,
    session_id: Option<&str>,
) -> Result<Box<dyn Strategy>> {
    let mut terminal: Option<Box<dyn Strategy>> = None;
    for stage in &file.stages {
        let strategy = match session_id {
            Some(session_id) => {
                client
                    .create_strategy_in_session(&stage.kind, stage.config.clone(), session_id)
                    .await?
            }
            None => {
                client
                    .create_strategy(&stage.kind, stage.config.clone())
                    .await?
            }
        };
        debug!(
            "Created {} '{}'",
            strategy.kind(),
            strategy.id().unwrap_or_default()
        );
        terminal = Some(match terminal {
            Some(upstream) => compose(upstream, strategy),
            None => strategy,
        });
    }
    terminal.ok_or_else(|| OteError::config("pipeline file lists no stages"))
}

/// Render a stage result: pretty JSON when it parses, raw text otherwise
pub fn render_output(bytes: &[u8]) -> String {
    match serde_json::from_slice::<Value>(bytes) {
        Ok(value) => serde_json::to_string_pretty(&value)
            .unwrap_or_else(|_| String::from_utf8_lossy(bytes).into_owned()),
        Err(_) => String::from_utf8_lossy(bytes).into_owned(),
    }
}

/// Settings for a run: `--debug` turns debug mode on, it never turns `OTELIB_DEBUG` off
pub fn run_settings(settings: Settings, is_debug: bool) -> Settings {
    let debug = settings.debug || is_debug;
    settings.with_debug(debug)
}

/// A session id can only name a session that outlives the process, so never a local one
pub fn check_session_source(backend: Backend, session_id: Option<&str>) -> Result<()> {
    match (backend, session_id) {
        (Backend::Local, Some(session_id)) => Err(OteError::config(format!(
            "--session-id {session_id:?} needs a remote source: local sessions do not outlive the process"
        ))),
        _ => Ok(()),
    }
}

pub async fn run_command(
    pipeline: PathBuf,
    source: String,
    session_id: Option<String>,
    is_debug: bool,
    show_session: bool,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    debug!("Starting run command");
    debug!("Pipeline: {:?}", pipeline);
    debug!("Source: {}", source);
    debug!("Session: {:?}", session_id);

    let file = PipelineFile::load(&pipeline).await?;
    let mut config = ClientConfig::new(run_settings(Settings::from_env()?, is_debug));
    config.headers = file.headers.clone();
    let client = OteClient::with_config(&source, config)?;
    check_session_source(client.backend(), session_id.as_deref())?;

    let terminal = build_pipeline(&client, &file, session_id.as_deref()).await?;
    let output = terminal.get(session_id.as_deref()).await?;
    let session_id = terminal.last_session_id().unwrap_or_default();
    info!(
        "Pipeline of {} stage(s) completed in session '{}'",
        file.stages.len(),
        session_id
    );

    println!("{}", render_output(&output));

    if show_session {
        let session = client.read_session(&session_id).await?;
        println!("{}", serde_json::to_string_pretty(&session)?);
    }

    Ok(())
}

pub async fn kinds_command(source: String) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let client = OteClient::with_config(&source, ClientConfig::new(Settings::from_env()?))?;
    info!("Strategy kinds on the {} backend", client.backend());
    for kind in client.kinds() {
        println!("{}", kind.class_name());
    }
    Ok(())
}
