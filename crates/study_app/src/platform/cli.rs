use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use chrono::{SecondsFormat, Utc};
use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use study_core::{AppViewModel, Section};
use study_engine::{
    build_report_document, report_filename, BackendSettings, ReportWriter, ReqwestBackend,
    RestSubmissionStore, SortSubmission, StoreSettings, SubmissionStore,
};
use study_logging::{study_info, study_warn};

use super::app::{Coordinator, StartOutcome};
use super::config::{load_file_config, Settings};
use super::logging;
use super::ui::render::{render, status_line};

#[derive(Debug, Parser)]
#[command(
    name = "q-study",
    version,
    about = "Run Q-methodology analyses against the study backend"
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Default, Args)]
pub struct GlobalArgs {
    /// RON config file (defaults to ./study.ron when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Base URL of the analysis backend
    #[arg(long, global = true)]
    pub backend_url: Option<String>,

    /// Status poll period in milliseconds
    #[arg(long, global = true)]
    pub poll_interval_ms: Option<u64>,

    /// Elapsed-time refresh period in milliseconds
    #[arg(long, global = true)]
    pub tick_interval_ms: Option<u64>,

    /// Write the finished report as Markdown into this directory
    #[arg(long, global = true)]
    pub export_dir: Option<PathBuf>,

    /// Log file path
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    /// Mirror debug logs to stderr
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Base URL of the survey-sort store
    #[arg(long, global = true, env = "STUDY_STORE_URL")]
    pub store_url: Option<String>,

    /// Access key for the survey-sort store
    #[arg(long, global = true, env = "STUDY_STORE_KEY", hide_env_values = true)]
    pub store_key: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Submit a research topic and follow the analysis until it finishes
    Run(RunArgs),
    /// Store one participant's Q-sort in the remote table
    SubmitSort(SubmitSortArgs),
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Research topic; prompts interactively when omitted
    #[arg(long)]
    pub topic: Option<String>,

    /// Language-model API key forwarded to the backend
    #[arg(long, env = "STUDY_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,
}

#[derive(Debug, Args)]
pub struct SubmitSortArgs {
    /// Participant name
    #[arg(long)]
    pub respondent: String,

    /// JSON file with the statement placements
    #[arg(long)]
    pub sort_file: PathBuf,

    /// Seconds the participant spent sorting
    #[arg(long, default_value_t = 0)]
    pub duration_secs: u64,

    /// JSON file with post-sort interview answers
    #[arg(long)]
    pub interview_file: Option<PathBuf>,

    /// Target table, overriding the configured one
    #[arg(long)]
    pub table: Option<String>,
}

pub async fn run(cli: Cli) -> Result<()> {
    let file_config = load_file_config(cli.global.config.as_deref())?;
    let config_source = file_config.source.clone();
    let settings = Settings::resolve(&cli.global, file_config);
    logging::initialize(&settings.log_file, cli.global.verbose);
    if let Some(path) = config_source {
        study_info!("Loaded config from {}", path.display());
    }

    match cli.command {
        Command::Run(args) => run_jobs(&settings, args).await,
        Command::SubmitSort(args) => submit_sort(&settings, args).await,
    }
}

async fn run_jobs(settings: &Settings, args: RunArgs) -> Result<()> {
    let backend_settings = BackendSettings::parse(&settings.backend_url)
        .with_context(|| format!("bad backend url {}", settings.backend_url))?;
    let backend = ReqwestBackend::new(backend_settings).context("failed to build http client")?;
    let mut coordinator = Coordinator::new(Arc::new(backend), settings.engine);

    let interactive = args.topic.is_none();
    let mut topic = args.topic;

    loop {
        let topic_text = match topic.take() {
            Some(text) => text,
            None => prompt("연구 주제: ")?,
        };
        let key_text = match &args.api_key {
            Some(key) => key.clone(),
            None => prompt("API Key: ")?,
        };

        match coordinator.start(&topic_text, &key_text) {
            Ok(StartOutcome::Submitted) => {}
            Ok(StartOutcome::Ignored) => bail!("a job is already in progress"),
            Err(err) => {
                print!("{}", render(&coordinator.view()));
                if interactive {
                    continue;
                }
                return Err(err.into());
            }
        }

        let view = follow_job(&mut coordinator).await?;
        println!("{}", render(&view));

        if let Some(dir) = &settings.export_dir {
            if let Some(path) = export_report(dir, &view)? {
                println!("리포트 저장: {}", path.display());
            }
        }

        if !interactive {
            return match view.section {
                Section::Error => Err(anyhow!(
                    "analysis failed: {}",
                    view.error_message.unwrap_or_default()
                )),
                _ => Ok(()),
            };
        }
        let again = prompt("새 분석을 시작할까요? (y/N): ")?;
        if !again.eq_ignore_ascii_case("y") {
            return Ok(());
        }
        coordinator.reset();
    }
}

async fn follow_job(coordinator: &mut Coordinator) -> Result<AppViewModel> {
    let mut last_line = String::new();
    let outcome = tokio::select! {
        view = coordinator.run_until_settled(|view| {
            let line = status_line(view);
            if line != last_line {
                println!("{line}");
                last_line = line;
            }
        }) => Ok(view),
        signal = tokio::signal::ctrl_c() => Err(signal),
    };

    match outcome {
        Ok(view) => Ok(view),
        Err(signal) => {
            signal.context("failed to listen for ctrl-c")?;
            study_warn!("Interrupted; cancelling timers");
            coordinator.reset();
            bail!("interrupted")
        }
    }
}

fn export_report(dir: &Path, view: &AppViewModel) -> Result<Option<PathBuf>> {
    let (Some(report), Some(job_id)) = (&view.report, &view.job_id) else {
        return Ok(None);
    };
    let generated_utc = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
    let document = build_report_document(report, job_id.as_str(), &generated_utc);
    let filename = report_filename(&report.summary.topic, job_id.as_str());
    let path = ReportWriter::new(dir)
        .write(&filename, &document)
        .with_context(|| format!("failed to export report into {}", dir.display()))?;
    Ok(Some(path))
}

async fn submit_sort(settings: &Settings, args: SubmitSortArgs) -> Result<()> {
    let url = settings
        .store_url
        .as_deref()
        .context("store url missing: pass --store-url or set STUDY_STORE_URL")?;
    let key = settings
        .store_key
        .as_ref()
        .context("store key missing: pass --store-key or set STUDY_STORE_KEY")?;

    let mut store_settings = StoreSettings::new(url, key.expose())?;
    store_settings.table = args.table.unwrap_or_else(|| settings.store_table.clone());
    let store = RestSubmissionStore::new(store_settings)?;

    let submission = SortSubmission {
        respondent_name: args.respondent,
        sort_data: read_json(&args.sort_file)?,
        duration: args.duration_secs,
        interview_responses: match &args.interview_file {
            Some(path) => read_json(path)?,
            None => Value::Object(Default::default()),
        },
    };

    let stored = store
        .insert(&submission)
        .await
        .context("Q-sort was not stored; see the log for details")?;
    let id = stored
        .id
        .map(|id| id.to_string())
        .unwrap_or_else(|| "-".to_string());
    study_info!("Q-sort stored with id {id}");
    println!("저장 완료 (id: {id})");
    Ok(())
}

fn read_json(path: &Path) -> Result<Value> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("{} is not valid JSON", path.display()))
}

fn prompt(label: &str) -> Result<String> {
    let mut stdout = io::stdout();
    write!(stdout, "{label}")?;
    stdout.flush()?;

    let mut line = String::new();
    let read = io::stdin().lock().read_line(&mut line)?;
    if read == 0 {
        bail!("input closed");
    }
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
