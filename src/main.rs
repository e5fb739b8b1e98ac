use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use metabolens::config::{Config, LogFormat};
use metabolens::session::Session;
use metabolens::workflows::{HypothesisFocus, HypothesisQuery};

#[derive(Parser)]
#[command(name = "metabolens", version, about = "Differential-metabolomics hypothesis engine")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Parse a dataset and print its statistical summary (no API calls)
    Summary {
        /// Path to the differential-metabolomics CSV
        csv: std::path::PathBuf,
    },
    /// Generate ranked hypotheses for a dataset
    Hypotheses {
        /// Path to the differential-metabolomics CSV
        csv: std::path::PathBuf,
        /// Preset research focus
        #[arg(long)]
        focus: Option<HypothesisFocus>,
        /// Custom research question (overrides --focus)
        #[arg(long, default_value = "")]
        question: String,
    },
    /// Generate hypotheses, then design a validation experiment for one
    Design {
        /// Path to the differential-metabolomics CSV
        csv: std::path::PathBuf,
        /// Preset research focus
        #[arg(long)]
        focus: Option<HypothesisFocus>,
        /// Custom research question (overrides --focus)
        #[arg(long, default_value = "")]
        question: String,
        /// Rank of the hypothesis to validate
        #[arg(long, default_value_t = 1)]
        rank: u32,
    },
    /// Summarize the literature relevant to a dataset
    Literature {
        /// Path to the differential-metabolomics CSV
        csv: std::path::PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env();
    init_logging(&config);

    info!(version = env!("CARGO_PKG_VERSION"), "Metabolens starting");

    let cli = Cli::parse();

    let mut session = match Session::new(config) {
        Ok(s) => s,
        Err(e) => {
            error!(error = %e, "Failed to initialize session");
            return Err(e.into());
        }
    };

    match cli.command {
        Command::Summary { csv } => {
            load(&mut session, &csv).await?;
            match session.summary() {
                Some(summary) => println!("{}", serde_json::to_string_pretty(summary)?),
                None => println!("dataset has no rows"),
            }
        }
        Command::Hypotheses { csv, focus, question } => {
            load(&mut session, &csv).await?;
            let query = HypothesisQuery::from_parts(focus, &question);
            if query.is_none() {
                anyhow::bail!("select a --focus or supply a --question");
            }
            session.generate_hypotheses(query).await?;
            println!(
                "{}",
                serde_json::to_string_pretty(&session.hypotheses().unwrap_or_default())?
            );
        }
        Command::Design { csv, focus, question, rank } => {
            load(&mut session, &csv).await?;
            let query = HypothesisQuery::from_parts(focus, &question);
            if query.is_none() {
                anyhow::bail!("select a --focus or supply a --question");
            }
            session.generate_hypotheses(query).await?;
            let hypothesis = session
                .hypotheses()
                .and_then(|hs| hs.iter().find(|h| h.rank == rank))
                .cloned()
                .ok_or_else(|| anyhow::anyhow!("no hypothesis with rank {}", rank))?;
            session.design_experiment(&hypothesis).await?;
            let protocol = session
                .protocol()
                .ok_or_else(|| anyhow::anyhow!("experimental design produced no protocol"))?;
            println!("{}", serde_json::to_string_pretty(protocol)?);
        }
        Command::Literature { csv } => {
            load(&mut session, &csv).await?;
            session.analyze_literature().await?;
            let literature = session
                .literature()
                .ok_or_else(|| anyhow::anyhow!("literature analysis produced no summary"))?;
            println!("{}", serde_json::to_string_pretty(literature)?);
        }
    }

    Ok(())
}

async fn load(session: &mut Session, path: &std::path::Path) -> anyhow::Result<()> {
    let text = tokio::fs::read_to_string(path).await?;
    session.load_dataset(&text)?;
    Ok(())
}

fn init_logging(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.level.clone()));

    match config.logging.format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
}
