use anyhow::Context;
use clap::{Parser, Subcommand};
use stadium_etl::config::Config;
use stadium_etl::infra::handoff::FileHandoff;
use stadium_etl::infra::secrets::EnvSecretProvider;
use stadium_etl::logging;
use stadium_etl::pipeline::Pipeline;
use std::path::PathBuf;
use tracing::error;

#[derive(Parser)]
#[command(name = "stadium_etl")]
#[command(about = "Extracts the stadium table from a wiki page and uploads a cleaned CSV")]
#[command(version)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, default_value = "config.toml", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run extract, transform and load in one process
    Run {
        /// Page to scrape (defaults to source.url from the config)
        #[arg(long)]
        url: Option<String>,
    },
    /// Fetch the page and publish extracted records to the handoff directory
    Extract {
        #[arg(long)]
        url: Option<String>,
        #[arg(long, default_value = "handoff")]
        handoff_dir: PathBuf,
    },
    /// Clean the extracted records and publish the result table
    Transform {
        #[arg(long, default_value = "handoff")]
        handoff_dir: PathBuf,
    },
    /// Upload the result table as a CSV blob
    Load {
        #[arg(long, default_value = "handoff")]
        handoff_dir: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let config = Config::load(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    let _guard = logging::init_logging(&config.logging.dir);

    // Only the stages that upload need storage credentials
    let pipeline = match cli.command {
        Commands::Run { .. } | Commands::Load { .. } => {
            Pipeline::from_config(&config, &EnvSecretProvider)?
        }
        Commands::Extract { .. } | Commands::Transform { .. } => Pipeline::without_store(&config)?,
    };

    let outcome = match cli.command {
        Commands::Run { url } => {
            let url = url.unwrap_or_else(|| config.source.url.clone());
            pipeline.run(&url).await.map(|result| {
                println!("✅ Pipeline finished");
                println!("   Rows seen: {}", result.rows_seen);
                println!("   Records: {}", result.records);
                println!("   Blob: {}/{}", result.receipt.container, result.receipt.blob_name);
            })
        }
        Commands::Extract { url, handoff_dir } => {
            let url = url.unwrap_or_else(|| config.source.url.clone());
            let handoff = FileHandoff::new(handoff_dir);
            pipeline
                .extract_stage(&url, &handoff)
                .await
                .map(|run_id| println!("📥 Extracted (run {run_id})"))
        }
        Commands::Transform { handoff_dir } => {
            let handoff = FileHandoff::new(handoff_dir);
            pipeline
                .transform_stage(&handoff)
                .await
                .map(|run_id| println!("🔧 Transformed (run {run_id})"))
        }
        Commands::Load { handoff_dir } => {
            let handoff = FileHandoff::new(handoff_dir);
            pipeline
                .load_stage(&handoff)
                .await
                .map(|receipt| println!("💾 Uploaded {}/{}", receipt.container, receipt.blob_name))
        }
    };

    if let Err(e) = outcome {
        error!(kind = ?e.kind(), "Pipeline failed: {}", e);
        return Err(e.into());
    }
    Ok(())
}
