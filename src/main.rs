use anyhow::Result;
use clap::Parser;

use cosmic_orders::cli::{
    execute_edge_cases, execute_pool_sim, execute_run, Cli, Commands, PoolSimConfig, RunConfig,
};

#[tokio::main]
async fn main() -> Result<()> {
    // RUST_LOG未設定ならinfo
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            pool_size,
            fan_out,
            orders,
            ingredients,
            quiet,
            json,
        } => {
            execute_run(RunConfig {
                pool_size,
                fan_out,
                orders,
                ingredients,
                quiet,
                json,
            })
            .await
        }
        Commands::PoolSim {
            orders,
            ingredients,
            pool_size,
        } => {
            execute_pool_sim(PoolSimConfig {
                orders,
                ingredients,
                pool_size,
            })
            .await
        }
        Commands::EdgeCases => execute_edge_cases().await,
    }
}
