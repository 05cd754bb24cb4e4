mod analyzer;
mod config;
mod errors;
mod extract;
mod greenhouse;
mod report;
mod scorer;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analyzer::{AnalysisOptions, CandidateAnalyzer};
use crate::config::Config;
use crate::greenhouse::GreenhouseClient;
use crate::report::ReportGenerator;
use crate::scorer::AiScorer;

#[derive(Parser, Debug)]
#[command(
    name = "hirescope",
    about = "AI-powered candidate analysis for Greenhouse: score every applicant \
             against the job description and surface hidden gems among rejections",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List jobs that have at least one application
    Jobs,
    /// Analyze every candidate for a job and write ranked reports
    Analyze(AnalyzeArgs),
}

#[derive(Args, Debug)]
struct AnalyzeArgs {
    /// Greenhouse job id (see `hirescope jobs`)
    job_id: i64,
    /// Number of top candidates to highlight in the reports
    #[arg(long, default_value_t = 10)]
    top: usize,
    /// File with free-text company culture/values context for scoring
    #[arg(long)]
    context_file: Option<PathBuf>,
    /// Cap the number of applications analyzed (default: all)
    #[arg(long)]
    limit: Option<usize>,
    /// Disable periodic progress checkpoints
    #[arg(long)]
    no_checkpoints: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("HireScope v{}", env!("CARGO_PKG_VERSION"));

    let cli = Cli::parse();
    match cli.command {
        Command::Jobs => run_jobs(&config).await,
        Command::Analyze(args) => run_analyze(&config, args).await,
    }
}

async fn run_jobs(config: &Config) -> Result<()> {
    let client = GreenhouseClient::new(config.greenhouse_api_key.clone());
    let jobs = client.jobs_with_applications().await?;

    if jobs.is_empty() {
        println!("No jobs with applications found.");
        return Ok(());
    }

    println!("{:<10} {:<8} {:<12} {:<25} NAME", "ID", "STATUS", "CREATED", "DEPARTMENT");
    for job in jobs {
        println!(
            "{:<10} {:<8} {:<12} {:<25} {}",
            job.id, job.status, job.created_at, job.department, job.name
        );
    }
    Ok(())
}

async fn run_analyze(config: &Config, args: AnalyzeArgs) -> Result<()> {
    let company_context = match &args.context_file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read context file {}", path.display()))?,
        None => String::new(),
    };

    let source = Arc::new(GreenhouseClient::new(config.greenhouse_api_key.clone()));
    let scorer = Arc::new(AiScorer::new(
        config.openai_api_key.clone(),
        config.cost_rates.clone(),
    ));
    let reports = ReportGenerator::new(config.output_dir.clone());

    let mut analyzer = CandidateAnalyzer::new(source, scorer, reports);
    let options = AnalysisOptions {
        company_context,
        num_top_candidates: args.top,
        save_progress: !args.no_checkpoints,
        limit: args.limit,
    };

    match analyzer.analyze_job(args.job_id, &options).await {
        Ok(summary) => {
            println!(
                "\nAnalyzed {} candidates in {:.1} minutes (total cost ${:.2})",
                summary.total_candidates, summary.analysis_time_minutes, summary.total_cost
            );
            if let Some(top) = &summary.top_candidate {
                println!("Top candidate: {} ({}/100)", top.name, top.evaluation.score);
            }
            println!("Reports: {}", summary.report_paths.output_folder.display());
            Ok(())
        }
        Err(e) => {
            error!("Analysis failed: {e}");
            error!(
                "Check that GREENHOUSE_API_KEY is valid and has Harvest permissions \
                 for jobs, applications and candidates, that OPENAI_API_KEY is valid, \
                 and that the network can reach both services."
            );
            Err(e.into())
        }
    }
}
