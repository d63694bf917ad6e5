//! Retail insight command line entry point

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use ri_data::{Backend, Upload};
use ri_llm::{InsightRequester, OpenAiClient};
use ri_views::ChartRenderer;

mod config;
mod error;
mod pipeline;
mod session;

use config::AppConfig;
use pipeline::{Answer, InsightPipeline};
use session::Session;

/// Ask questions about uploaded retail CSV files
#[derive(Parser, Debug)]
#[command(name = "retail-insight", version, about)]
struct Cli {
    /// CSV file to upload (repeat for several tables)
    #[arg(short = 'f', long = "file")]
    files: Vec<PathBuf>,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// SQLite database path, overrides the configuration
    #[arg(long)]
    database: Option<PathBuf>,

    /// Directory charts are written to
    #[arg(long, default_value = "charts")]
    chart_dir: PathBuf,

    /// Answer this question and exit instead of reading from stdin
    question: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(database) = &cli.database {
        config.backend.database_path = database.clone();
    }

    let backend = Backend::open(config.backend.clone())?;
    let mut session = Session::new(backend, config.ingest.clone());

    let uploads = read_uploads(&cli.files)?;
    session.sync_uploads(&uploads)?;

    let client = OpenAiClient::new(config.model.clone())?;
    let requester = InsightRequester::new(Arc::new(client), &config.model);
    let pipeline = InsightPipeline::new(requester, ChartRenderer::new(config.charts.clone()));

    info!("Starting retail insight with {} tables", session.stores().len());

    let mut charts_written = 0usize;
    if let Some(question) = &cli.question {
        let answer = pipeline.respond(&mut session, question).await;
        show(&answer, &cli.chart_dir, &mut charts_written);
        return Ok(());
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        eprint!("> ");
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let question = line.trim();
        if question.is_empty() {
            continue;
        }
        if question.eq_ignore_ascii_case("exit") {
            break;
        }
        let answer = pipeline.respond(&mut session, question).await;
        show(&answer, &cli.chart_dir, &mut charts_written);
    }

    info!("Session ended after {} messages", session.conversation().len());
    Ok(())
}

fn read_uploads(paths: &[PathBuf]) -> Result<Vec<Upload>> {
    paths
        .iter()
        .map(|path| {
            let bytes = std::fs::read(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            Ok(Upload::new(name, bytes))
        })
        .collect()
}

fn show(answer: &Answer, chart_dir: &Path, charts_written: &mut usize) {
    if let Some(sql) = &answer.sql {
        debug!("Answered with query: {}", sql);
    }
    println!("{}", answer.text);

    let Some(chart) = &answer.chart else {
        return;
    };
    *charts_written += 1;
    let path = chart_dir.join(format!("chart_{}.svg", charts_written));
    let written =
        std::fs::create_dir_all(chart_dir).and_then(|_| std::fs::write(&path, &chart.svg));
    match written {
        Ok(()) => println!("[{} chart '{}' saved to {}]", chart.kind, chart.title, path.display()),
        Err(e) => warn!("Could not save chart to {}: {}", path.display(), e),
    }
}
