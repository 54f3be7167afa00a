use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use flyerforge_common::{defaults, AssetInventory, Brief, BrandIdentity, CampaignBrief, Config};
use flyerforge_engine::{export_run, Forge, LlmGenerator, RunOutcome};

#[derive(Parser)]
#[command(name = "flyerforge", about = "Generate brand-compliant flyers with a hosted model")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the full workflow for a brief and export the result
    Run {
        /// Brand identity JSON
        #[arg(long)]
        brand: PathBuf,
        /// Campaign brief JSON
        #[arg(long)]
        campaign: PathBuf,
        /// Asset inventory JSON (defaults to no assets)
        #[arg(long)]
        assets: Option<PathBuf>,
        /// Export root (defaults to $DATA_DIR/forge-runs)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Write the sample brand, campaign and asset files to start from
    Defaults {
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("flyerforge=info".parse()?))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Run {
            brand,
            campaign,
            assets,
            out,
        } => run(&brand, &campaign, assets.as_deref(), out).await,
        Command::Defaults { out } => write_defaults(&out).await,
    }
}

async fn run(
    brand: &Path,
    campaign: &Path,
    assets: Option<&Path>,
    out: Option<PathBuf>,
) -> Result<()> {
    let config = Config::from_env()?;
    config.log_redacted();

    let brand: BrandIdentity = read_json(brand).await?;
    let campaign: CampaignBrief = read_json(campaign).await?;
    let assets: AssetInventory = match assets {
        Some(path) => read_json(path).await?,
        None => defaults::empty_assets(),
    };
    let brief = Brief::new(brand, campaign, assets);
    brief.check()?;

    let missing = brief.campaign.missing_required_fields();
    if !missing.is_empty() {
        warn!(fields = ?missing, "Brief has blank required fields, the service will likely ask about them");
    }

    let generator = LlmGenerator::from_config(&config)?;
    let forge = Forge::new(Arc::new(generator), config.limits);

    // Print each new phase label as the session moves.
    let mut rx = forge.session().subscribe();
    let progress = tokio::spawn(async move {
        let mut last = String::new();
        while rx.changed().await.is_ok() {
            let status = rx.borrow_and_update().status.clone();
            let label = status.label();
            if label != last {
                println!("» {label}");
                last = label;
            }
            if status.is_terminal() {
                break;
            }
        }
    });

    // Every outcome ends in a terminal status, which stops the printer.
    let outcome = forge.run(&brief).await;
    progress.await.ok();

    match outcome? {
        RunOutcome::NeedsClarification { questions, .. } => {
            println!("\nThe brief needs clarification before design can start:");
            for (i, question) in questions.iter().enumerate() {
                println!("  {}. {question}", i + 1);
            }
        }
        RunOutcome::Completed { state, .. } => {
            for report in state.audit_timeline() {
                println!(
                    "  QA {}: score {}{}",
                    report.iteration,
                    report.score,
                    if report.is_perfect { " (perfect)" } else { "" }
                );
            }

            let root = out.unwrap_or_else(|| config.data_dir.join("forge-runs"));
            let run_id = Uuid::new_v4();
            let export = export_run(&root, run_id, &state, brief.campaign.output_format).await?;
            info!(run_id = %run_id, "Export complete");
            println!("\nExported to {}", export.dir.display());
        }
    }

    Ok(())
}

async fn write_defaults(out: &Path) -> Result<()> {
    tokio::fs::create_dir_all(out).await?;
    let files = [
        ("brand.json", serde_json::to_vec_pretty(&defaults::sample_brand())?),
        ("campaign.json", serde_json::to_vec_pretty(&defaults::sample_campaign())?),
        ("assets.json", serde_json::to_vec_pretty(&defaults::empty_assets())?),
    ];
    for (name, bytes) in files {
        let path = out.join(name);
        tokio::fs::write(&path, bytes)
            .await
            .with_context(|| format!("writing {}", path.display()))?;
        println!("Wrote {}", path.display());
    }
    Ok(())
}

async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_slice(&bytes).with_context(|| format!("parsing {}", path.display()))
}
