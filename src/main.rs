use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};

use ecomed_client::controller::Analysis;
use ecomed_client::dispatch::{self, Category};
use ecomed_client::render;
use ecomed_client::settings::Settings;
use ecomed_client::upload::{FileHandle, PreviewStore};
use ecomed_client::{AnalysisClient, AnalysisView, BomAnalysis, UploadController, WasteClassification};

#[derive(Parser)]
#[command(name = "ecomed", about = "Submit BOM spreadsheets and waste images to the EcoMedAI service")]
struct Cli {
    /// Service base URL (overrides ECOMED_BASE_URL and ecomed.toml)
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload a bill-of-materials CSV and show the footprint table
    Bom {
        file: PathBuf,
        /// Print the projected table as JSON
        #[arg(long)]
        json: bool,
    },
    /// Classify an image of medical waste and show disposal guidance
    Classify { image: PathBuf },
    /// Show disposal guidance for a bin colour (Red, Grey, Blue, White)
    Categories { category: Option<String> },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let settings = Settings::load().context("Failed to load settings")?;
    let client = AnalysisClient::new(cli.base_url.unwrap_or(settings.base_url));

    let result = match cli.command {
        Commands::Bom { file, json } => {
            let ctl = analyze::<BomAnalysis>(client, &file, render::BOM_LOADING).await?;
            match ctl.view() {
                AnalysisView::Ready(report) if json => {
                    println!("{}", serde_json::to_string_pretty(&report.table)?);
                    Ok(())
                }
                AnalysisView::Ready(report) => {
                    println!("{}", render::report(report));
                    Ok(())
                }
                AnalysisView::Failed(message) => Err(anyhow::anyhow!("{}", message)),
                AnalysisView::Empty | AnalysisView::Loading => {
                    println!("{}", render::UPLOAD_PROMPT);
                    Ok(())
                }
            }
        }
        Commands::Classify { image } => {
            let ctl = analyze::<WasteClassification>(client, &image, render::IMAGE_LOADING).await?;
            match ctl.view() {
                AnalysisView::Ready(diagnosis) => {
                    let preview = ctl.session().map(|s| s.preview_url());
                    println!("{}", render::diagnosis(diagnosis, preview));
                    Ok(())
                }
                AnalysisView::Failed(message) => {
                    Err(anyhow::anyhow!("Failed to analyze image: {}", message))
                }
                AnalysisView::Empty | AnalysisView::Loading => Ok(()),
            }
        }
        Commands::Categories { category } => {
            let categories = match category {
                Some(label) => vec![Category::KNOWN
                    .into_iter()
                    .find(|c| c.label().eq_ignore_ascii_case(label.trim()))
                    .unwrap_or(Category::Unknown)],
                None => Category::KNOWN.to_vec(),
            };
            for cat in categories {
                println!("== {} ==", cat.label());
                println!("{}\n", render::guidance(dispatch::bundle_for(cat)));
            }
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

/// Read, validate and submit one file, with a spinner while the request is out.
async fn analyze<A: Analysis>(
    client: AnalysisClient,
    path: &Path,
    loading: &'static str,
) -> anyhow::Result<UploadController<A>> {
    let file = FileHandle::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let mut ctl = UploadController::<A>::new(client, PreviewStore::new());
    let pending = ctl.begin(file)?;

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")?);
    pb.set_message(loading);
    pb.enable_steady_tick(Duration::from_millis(120));

    let body = ctl.dispatch(&pending).await;
    pb.finish_and_clear();
    ctl.complete(pending, body);
    Ok(ctl)
}

fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else {
        format!("{}m {}s", secs / 60, secs % 60)
    }
}
