//! Command-line interface
//!
//! `train` runs the offline pipeline, `predict` scores a single record
//! from a JSON file, `serve` starts the API + dashboard.

use clap::{Parser, Subcommand};
use colored::*;
use std::path::PathBuf;
use std::time::Instant;

use crate::artifact::ArtifactStore;
use crate::data::LoanRecord;
use crate::predictor::Predictor;
use crate::server::{run_server, ServerConfig};
use crate::training::{Trainer, TrainerConfig};

fn dim(s: &str) -> ColoredString {
    s.truecolor(120, 120, 120)
}

fn ok(s: &str) -> ColoredString {
    s.truecolor(100, 210, 120)
}

fn step_ok(msg: &str) {
    println!("  {} {}", ok("✓"), msg);
}

fn kv(key: &str, val: &str) {
    println!("  {} {}", dim(key), val.white());
}

#[derive(Parser)]
#[command(name = "loan-predictor")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Loan approval prediction: training, inference, and serving")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Train the ensemble and persist the artifact bundle
    Train {
        /// Training dataset (CSV)
        #[arg(short, long)]
        data: PathBuf,

        /// Directory for the artifact bundle
        #[arg(short, long, default_value = "models")]
        artifacts: PathBuf,

        /// Number of cross-validation folds
        #[arg(long, default_value = "5")]
        cv_folds: usize,

        /// Random seed for the split, folds, and models
        #[arg(long, default_value = "42")]
        seed: u64,
    },

    /// Score a single application from a JSON file
    Predict {
        /// Directory holding the artifact bundle
        #[arg(short, long, default_value = "models")]
        artifacts: PathBuf,

        /// JSON file with the eleven applicant fields
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Start the prediction API and dashboard
    Serve {
        /// Bind host
        #[arg(long, default_value = "0.0.0.0")]
        host: String,

        /// Bind port
        #[arg(short, long, default_value = "8080")]
        port: u16,

        /// Directory holding the artifact bundle
        #[arg(short, long, default_value = "models")]
        artifacts: PathBuf,
    },
}

pub fn cmd_train(data: &PathBuf, artifacts: &PathBuf, cv_folds: usize, seed: u64) -> anyhow::Result<()> {
    println!();
    println!("  {}", "Training loan approval ensemble".white().bold());
    println!("  {}", dim(&"─".repeat(48)));

    let start = Instant::now();
    let mut config = TrainerConfig::new(data, artifacts);
    config.cv_folds = cv_folds;
    config.seed = seed;

    let report = Trainer::new(config).run()?;

    step_ok("training complete");
    kv("rows", &report.n_rows.to_string());
    kv("features", &report.n_features.to_string());
    kv(
        "best params",
        &format!(
            "forest_trees={} boosting_rounds={} boosting_depth={}",
            report.best_params.forest_trees,
            report.best_params.boosting_rounds,
            report.best_params.boosting_depth
        ),
    );
    kv("cv accuracy", &format!("{:.4} ± {:.4}", report.cv.mean, report.cv.std));
    kv("test accuracy", &format!("{:.4}", report.test_accuracy));
    kv("artifacts", &artifacts.display().to_string());
    kv("elapsed", &format!("{:.1}s", start.elapsed().as_secs_f64()));

    Ok(())
}

pub fn cmd_predict(artifacts: &PathBuf, input: &PathBuf) -> anyhow::Result<()> {
    let store = ArtifactStore::new(artifacts);
    let predictor = Predictor::open(&store)?;

    let json = std::fs::read_to_string(input)?;
    let record: LoanRecord = serde_json::from_str(&json)?;

    let prediction = predictor.predict(&record)?;

    println!();
    if prediction.loan_status == "Y" {
        step_ok("loan approved");
    } else {
        println!("  {} loan rejected", "✗".truecolor(220, 90, 90));
    }
    kv(
        "approval probability",
        &format!("{:.2}%", prediction.approval_probability * 100.0),
    );

    Ok(())
}

pub async fn cmd_serve(host: &str, port: u16, artifacts: &PathBuf) -> anyhow::Result<()> {
    let config = ServerConfig {
        host: host.to_string(),
        port,
        artifact_dir: artifacts.display().to_string(),
    };
    run_server(config).await
}
