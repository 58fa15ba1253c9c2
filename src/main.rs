//! Loan approval predictor entry point

use clap::Parser;
use loan_predictor::cli::{cmd_predict, cmd_serve, cmd_train, Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "loan_predictor=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Train {
            data,
            artifacts,
            cv_folds,
            seed,
        } => {
            cmd_train(&data, &artifacts, cv_folds, seed)?;
        }
        Commands::Predict { artifacts, input } => {
            cmd_predict(&artifacts, &input)?;
        }
        Commands::Serve {
            host,
            port,
            artifacts,
        } => {
            cmd_serve(&host, port, &artifacts).await?;
        }
    }

    Ok(())
}
