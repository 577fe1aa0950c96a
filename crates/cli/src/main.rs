use anyhow::{Context, Result, anyhow};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use clap::{Parser, Subcommand};
use colored::Colorize;
use llm_client::anthropic::AnthropicClient;
use llm_client::LlmClient;
use pipeline::{ordering_from_value, ValidationPipeline};
use serde_json::Value;
use server::{ImageAnalyzer, SequencePlanner, ServiceConfig};
use shot_types::normalize::items_from_values;
use shot_types::{FinalPlan, ItemSet, PhotoInput, PlannerKind};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// reel-plan - plan photo sequences from the command line
#[derive(Parser)]
#[command(name = "reel-plan")]
#[command(about = "Analyze photos and order them into a short narrative sequence", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Plan a sequence from a file of analysis results
    Plan {
        /// JSON file: an array of analysis results, or {"analysisResults": [...]}
        #[arg(short, long)]
        input: PathBuf,

        /// Creative direction passed to the planner
        #[arg(short, long)]
        prompt: Option<String>,

        /// Print the plan as JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Analyze local image files
    Analyze {
        /// Image files to analyze
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Check an ordering against a file of analysis results, offline
    Validate {
        /// JSON file with the analysis results
        #[arg(short, long)]
        input: PathBuf,

        /// JSON file with the candidate ordering (array of ids)
        #[arg(short, long)]
        order: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Plan {
            input,
            prompt,
            json,
        } => handle_plan(&input, prompt.as_deref(), json).await?,
        Commands::Analyze { files } => handle_analyze(&files).await?,
        Commands::Validate { input, order } => {
            if !handle_validate(&input, &order)? {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

/// Handle the 'plan' command
async fn handle_plan(input: &Path, prompt: Option<&str>, json: bool) -> Result<()> {
    let items = load_items(input)?;
    let config = ServiceConfig::from_env();
    let client = model_client()?;
    let planner = SequencePlanner::new(client, config.planner_config());

    let start = Instant::now();
    let plan = planner
        .plan(&items, prompt.map(str::trim).filter(|p| !p.is_empty()))
        .await;
    eprintln!("{} Planned {} shots in {:?}", "✓".green(), plan.ordered_ids.len(), start.elapsed());

    if json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
    } else {
        print_plan(&plan);
    }
    Ok(())
}

/// Handle the 'analyze' command
async fn handle_analyze(files: &[PathBuf]) -> Result<()> {
    let photos = files
        .iter()
        .map(|path| load_photo(path))
        .collect::<Result<Vec<_>>>()?;

    let config = ServiceConfig::from_env();
    let analyzer = ImageAnalyzer::new(model_client()?, config.analyzer_config());

    let start = Instant::now();
    let results = analyzer.analyze_batch(&photos).await?;
    eprintln!("{} Analyzed {} photos in {:?}", "✓".green(), results.len(), start.elapsed());

    println!("{}", serde_json::to_string_pretty(&results)?);
    Ok(())
}

/// Handle the 'validate' command. Returns whether the ordering is valid.
fn handle_validate(input: &Path, order_path: &Path) -> Result<bool> {
    let items = load_items(input)?;
    let order = read_json(order_path)?;
    let ordered_ids = ordering_from_value(&order);
    if ordered_ids.is_none() {
        warn!("{} is not an array of ids", order_path.display());
    }

    match ValidationPipeline::standard().validate(ordered_ids.as_deref(), &items, items.len()) {
        Ok(()) => {
            println!("{} ordering of {} ids is valid", "OK".green().bold(), items.len());
            Ok(true)
        }
        Err(violation) => {
            println!("{} {}", "INVALID".red().bold(), violation);
            Ok(false)
        }
    }
}

fn model_client() -> Result<Arc<dyn LlmClient>> {
    let client = AnthropicClient::from_env().context("Failed to configure model client")?;
    Ok(Arc::new(client))
}

fn read_json(path: &Path) -> Result<Value> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("{} is not valid JSON", path.display()))
}

fn load_items(path: &Path) -> Result<ItemSet> {
    let value = read_json(path)?;
    let entries = value
        .get("analysisResults")
        .unwrap_or(&value)
        .as_array()
        .ok_or_else(|| anyhow!("{} does not contain an array of analysis results", path.display()))?;
    if entries.is_empty() {
        return Err(anyhow!("{} has no analysis results", path.display()));
    }
    let items = items_from_values(entries);
    debug!("Loaded {} items from {}", items.len(), path.display());
    Ok(items)
}

fn load_photo(path: &Path) -> Result<PhotoInput> {
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    debug!("Encoding {} ({} bytes)", path.display(), bytes.len());
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    Ok(PhotoInput {
        filename,
        data: STANDARD.encode(bytes),
        mime_type: mime_type_for(path).to_string(),
    })
}

fn mime_type_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "image/jpeg",
    }
}

/// Helper function to format and print a plan
fn print_plan(plan: &FinalPlan) {
    let planner = match plan.used_planner {
        PlannerKind::Ai => "ai".green(),
        PlannerKind::Fallback => "fallback".yellow(),
    };
    println!("{} [{}]", format!("Sequence: {}", plan.theme).bold().blue(), planner);
    if let Some(error) = &plan.error {
        println!("   {}", format!("model error: {}", error).red());
    }

    for (rank, (shot, duration)) in plan.shots.iter().zip(&plan.durations).enumerate() {
        println!(
            "{}. {} ({}) {:.1}s",
            (rank + 1).to_string().green(),
            shot.id,
            shot.role.cyan(),
            duration
        );
        if !shot.reason.is_empty() {
            println!("   {}", shot.reason);
        }
    }

    if !plan.emotion_arc.is_empty() {
        println!("{}", "Emotion arc:".bold());
        for beat in &plan.emotion_arc {
            println!("  - {}: {}", beat.beat, beat.ids.join(", "));
        }
    }
}
