use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use data_loader::{Catalog, PriceCategory, SkinTone, SkinType};
use engine::{EngineConfig, ProductRecommendation, RecommendationOrchestrator, RecommendationResult};
use pipeline::UserSelection;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::debug;

/// SkinSync - Skincare Recommendation Engine
#[derive(Parser)]
#[command(name = "skinsync")]
#[command(about = "Recommends skincare products for a skin type, tone and budget", long_about = None)]
struct Cli {
    /// Path to the product catalog CSV
    #[arg(long, env = "SKINSYNC_CATALOG", default_value = engine::config::DEFAULT_CATALOG_PATH)]
    catalog: PathBuf,

    /// Path to the exported rating model (JSON)
    #[arg(long, env = "SKINSYNC_MODEL", default_value = engine::config::DEFAULT_MODEL_PATH)]
    model: PathBuf,

    /// Number of recommendations to return
    #[arg(long, default_value_t = pipeline::DEFAULT_TOP_K)]
    top_k: usize,

    /// Prediction timeout in milliseconds (0 disables it)
    #[arg(long, default_value_t = 5000)]
    timeout_ms: u64,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            catalog_path: self.catalog.clone(),
            model_path: self.model.clone(),
            top_k: self.top_k,
            predict_timeout: (self.timeout_ms > 0).then(|| Duration::from_millis(self.timeout_ms)),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Get product recommendations
    Recommend {
        /// Combination, Dry or Oily
        #[arg(long, default_value = "Combination")]
        skin_type: SkinType,

        /// One of the tones listed by `skinsync tones`
        #[arg(long, default_value = "medium")]
        skin_tone: SkinTone,

        /// Low, Medium or High
        #[arg(long, default_value = "Low")]
        budget: PriceCategory,

        /// Show whether each product is recorded for the selected tone
        #[arg(long)]
        explain: bool,

        /// Print a JSON report with status, recommendations and any error
        #[arg(long)]
        json: bool,
    },

    /// List the supported skin tones and skin types
    Tones,

    /// Summarize the product catalog
    Catalog,

    /// Run benchmark to test performance
    Benchmark {
        /// Number of requests to make
        #[arg(long, default_value = "100")]
        requests: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing; logs go to stderr so stdout stays clean for --json
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    debug!("Engine configuration: {:?}", cli.engine_config());

    match cli.command {
        Commands::Recommend {
            skin_type,
            skin_tone,
            budget,
            explain,
            json,
        } => {
            let orchestrator = load_engine(&cli.engine_config(), json)?;
            let selection = UserSelection::new(skin_type, skin_tone, budget);
            handle_recommend(&orchestrator, &selection, explain, json).await?
        }
        Commands::Tones => handle_tones(),
        Commands::Catalog => handle_catalog(&cli.catalog)?,
        Commands::Benchmark { requests } => {
            let orchestrator = load_engine(&cli.engine_config(), false)?;
            handle_benchmark(orchestrator, requests).await?
        }
    }

    Ok(())
}

/// Load the catalog and model; the app cannot run without both.
///
/// Progress goes to stderr when stdout carries JSON.
fn load_engine(config: &EngineConfig, json: bool) -> Result<RecommendationOrchestrator> {
    let progress = |line: String| {
        if json {
            eprintln!("{}", line)
        } else {
            println!("{}", line)
        }
    };

    progress(format!(
        "Loading catalog from {} and model from {}...",
        config.catalog_path.display(),
        config.model_path.display()
    ));
    let start = Instant::now();
    let orchestrator = RecommendationOrchestrator::from_config(config)
        .context("Failed to load the product catalog or rating model")?;
    progress(format!(
        "{} Loaded {} products in {:?}",
        "✓".green(),
        orchestrator.catalog().len(),
        start.elapsed()
    ));
    Ok(orchestrator)
}

/// Handle the 'recommend' command
///
/// Request failures are reported and swallowed; only startup failures end
/// the process with an error.
async fn handle_recommend(
    orchestrator: &RecommendationOrchestrator,
    selection: &UserSelection,
    explain: bool,
    json: bool,
) -> Result<()> {
    let result = orchestrator.recommend(selection).await;

    if json {
        let output = serde_json::to_string_pretty(&result.report())
            .context("Failed to serialize recommendations")?;
        println!("{}", output);
        match &result {
            RecommendationResult::NoMatch => {
                eprintln!("No recommendations found for the given criteria.")
            }
            RecommendationResult::Failure(e) => {
                eprintln!("Error generating recommendations: {}", e)
            }
            RecommendationResult::Success(_) => {}
        }
        return Ok(());
    }

    match result {
        RecommendationResult::Success(recommendations) => {
            print_recommendations(&recommendations, selection, explain);
            if explain {
                println!(
                    "\nScored by the '{}' model using your tone ({}) for every product.",
                    orchestrator.predictor_name(),
                    selection.skin_tone.display_name()
                );
            }
        }
        RecommendationResult::NoMatch => {
            println!("{}", "No recommendations found for the given criteria.".yellow());
        }
        RecommendationResult::Failure(e) => {
            println!("{}", format!("Error generating recommendations: {}", e).red());
        }
    }
    Ok(())
}

/// Handle the 'tones' command
fn handle_tones() {
    println!("{}", "Skin tones:".bold().blue());
    for tone in SkinTone::ALL {
        println!(
            "  {} {:<13} --skin-tone {:<13} [{}]",
            tone.emoji(),
            tone.display_name(),
            tone.key(),
            tone.feature_column()
        );
    }

    println!("\n{}", "Skin types:".bold().blue());
    for skin_type in SkinType::ALL {
        println!("  {} {}", format!("{:<12}", skin_type.as_str()).green(), skin_type.description());
    }
}

/// Handle the 'catalog' command
fn handle_catalog(path: &Path) -> Result<()> {
    let start = Instant::now();
    let catalog = Catalog::load_from_file(path)
        .with_context(|| format!("Failed to load catalog from {}", path.display()))?;
    println!(
        "{} Loaded {} products in {:?}",
        "✓".green(),
        catalog.len(),
        start.elapsed()
    );

    println!("{}", format!("Catalog: {}", path.display()).bold().blue());
    println!("{}Products: {}", "• ".green(), catalog.len());
    println!("{}Columns ({}): {}", "• ".green(), catalog.headers().len(), catalog.headers().join(", "));

    println!("\n{:<12} {:>8} {:>8} {:>8}", "Skin type", "Low", "Medium", "High");
    for skin_type in SkinType::ALL {
        let counts: Vec<usize> = PriceCategory::ALL
            .iter()
            .map(|budget| catalog.count_matching(skin_type, *budget))
            .collect();
        println!(
            "{:<12} {:>8} {:>8} {:>8}",
            skin_type.as_str(),
            counts[0],
            counts[1],
            counts[2]
        );
    }

    let unmatched = catalog
        .products()
        .iter()
        .filter(|p| p.skin_type.is_none() || p.price_category.is_none())
        .count();
    if unmatched > 0 {
        println!(
            "{}",
            format!("{} products have an unrecognized skin type or price category", unmatched).yellow()
        );
    }
    Ok(())
}

/// Handle the 'benchmark' command
async fn handle_benchmark(orchestrator: RecommendationOrchestrator, requests: usize) -> Result<()> {
    if requests == 0 {
        bail!("--requests must be at least 1");
    }

    // Random selections across every skin type, tone and budget
    let selections: Vec<UserSelection> = (0..requests)
        .map(|_| {
            let skin_type = SkinType::ALL[rand::random::<u32>() as usize % SkinType::ALL.len()];
            let skin_tone = SkinTone::ALL[rand::random::<u32>() as usize % SkinTone::ALL.len()];
            let budget = PriceCategory::ALL[rand::random::<u32>() as usize % PriceCategory::ALL.len()];
            UserSelection::new(skin_type, skin_tone, budget)
        })
        .collect();

    // Use tokio::spawn to make concurrent requests
    let run_start = Instant::now();
    let mut handles = vec![];
    for selection in selections {
        let orchestrator = orchestrator.clone();
        let handle = tokio::spawn(async move {
            let start = Instant::now();
            let result = orchestrator.recommend(&selection).await;
            (start.elapsed(), result)
        });
        handles.push(handle);
    }

    let mut timings = vec![];
    let mut no_match = 0;
    let mut failures = 0;
    for handle in handles {
        let (elapsed, result) = handle.await.context("Benchmark task panicked")?;
        match result {
            RecommendationResult::Success(_) => {}
            RecommendationResult::NoMatch => no_match += 1,
            RecommendationResult::Failure(_) => failures += 1,
        }
        timings.push(elapsed);
    }
    let wall_time = run_start.elapsed();

    let total_latency: Duration = timings.iter().sum();
    let avg_latency = total_latency / (timings.len() as u32);
    timings.sort();
    let p50 = timings[timings.len() / 2];
    let p95 = timings[((timings.len() as f32 * 0.95) as usize).min(timings.len() - 1)];
    let p99 = timings[((timings.len() as f32 * 0.99) as usize).min(timings.len() - 1)];
    let throughput = requests as f32 / wall_time.as_secs_f32();

    println!("{}", "Benchmark results:".bold().blue());
    println!("Requests: {} ({} no match, {} failed)", requests, no_match, failures);
    println!("Total time: {:?}", wall_time);
    println!("Average latency: {:?}", avg_latency);
    println!("P50 latency: {:?}", p50);
    println!("P95 latency: {:?}", p95);
    println!("P99 latency: {:?}", p99);
    println!("Throughput: {:.2} requests/second", throughput);

    Ok(())
}

/// Helper function to format and print recommendations
fn print_recommendations(
    recommendations: &[ProductRecommendation],
    selection: &UserSelection,
    explain: bool,
) {
    println!(
        "{}",
        format!(
            "Recommended for {} skin, {} tone {}, {} budget:",
            selection.skin_type,
            selection.skin_tone.display_name(),
            selection.skin_tone.emoji(),
            selection.budget
        )
        .bold()
        .blue()
    );
    for rec in recommendations {
        println!("{}. {}", rec.rank.to_string().green(), rec.product_name.bold());
        println!("   Predicted Rating: {:.2}/5", rec.predicted_rating);
        if explain {
            let tone_note = if rec.suits_tone {
                "recorded for this tone".green()
            } else {
                "not recorded for this tone".yellow()
            };
            println!("   Catalog row {}: {}", rec.position, tone_note);
        }
    }
}
