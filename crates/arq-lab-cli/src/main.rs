mod runner;

use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use arq_lab_abstract::{ArqConfig, TestScenario};
use arq_lab_engine::{SimulationReport, Simulator};

#[derive(Parser, Debug)]
#[command(author, version, about = "Selective-repeat ARQ simulator")]
struct Args {
    /// Run a scenario file instead of the plain configuration.
    #[arg(long)]
    scenario: Option<PathBuf>,

    /// Number of frames in the stream.
    #[arg(long)]
    frames: Option<u32>,

    /// Sender window size.
    #[arg(long)]
    window: Option<u32>,

    /// Probability that an attempt is lost in transit.
    #[arg(long)]
    loss: Option<f64>,

    /// Probability that a delivered attempt is reordered (delayed further).
    #[arg(long)]
    reorder: Option<f64>,

    /// Retransmit timeout in milliseconds.
    #[arg(long)]
    timeout_ms: Option<u64>,

    #[arg(long)]
    min_delay_ms: Option<u64>,
    #[arg(long)]
    max_delay_ms: Option<u64>,

    /// Send attempts allowed per frame before the run is declared
    /// non-convergent.
    #[arg(long)]
    max_attempts: Option<u32>,

    /// Seed for the channel's fault draws; a run is reproducible from it.
    #[arg(long)]
    seed: Option<u64>,

    /// Write a JSON trace of the finished run.
    #[arg(long)]
    trace_out: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();
    info!("arq-lab starting…");

    let report = if let Some(path) = &args.scenario {
        let scenario = load_scenario(path)?;
        runner::run_scenario(scenario).await?
    } else {
        let config = args.build_config();
        let sim = Simulator::new(config).context("invalid configuration")?;
        sim.run().await.context("simulation failed")?
    };

    if let Some(path) = &args.trace_out {
        write_trace(path, &report)?;
    }

    Ok(())
}

impl Args {
    fn build_config(&self) -> ArqConfig {
        let mut config = ArqConfig::default();
        if let Some(v) = self.frames {
            config.total_frames = v;
        }
        if let Some(v) = self.window {
            config.window_size = v;
        }
        if let Some(v) = self.loss {
            config.loss_probability = v;
        }
        if let Some(v) = self.reorder {
            config.reorder_probability = v;
        }
        if let Some(v) = self.timeout_ms {
            config.timeout_ms = v;
        }
        if let Some(v) = self.min_delay_ms {
            config.min_delay_ms = v;
        }
        if let Some(v) = self.max_delay_ms {
            config.max_delay_ms = v;
        }
        if let Some(v) = self.max_attempts {
            config.max_attempts = v;
        }
        if let Some(v) = self.seed {
            config.seed = v;
        }
        config
    }
}

fn load_scenario(path: &Path) -> Result<TestScenario> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read scenario file {}", path.display()))?;
    let scenario: TestScenario =
        toml::from_str(&content).context("Failed to parse scenario file")?;
    Ok(scenario)
}

fn write_trace(path: &Path, report: &SimulationReport) -> Result<()> {
    let data = serde_json::to_vec_pretty(report).context("Failed to serialize run trace")?;
    fs::write(path, &data)
        .with_context(|| format!("Failed to write trace file {}", path.display()))?;
    Ok(())
}
