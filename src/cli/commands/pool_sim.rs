use crate::core::TaskGenerator;
use crate::engine::{simulate_worker_pool, SimulationSummary};
use crate::services::{DefaultPipelineConfig, RandomTaskGenerator};
use crate::App;
use anyhow::{Context, Result};
use std::sync::Arc;

use super::print_catalog_summary;

/// Configuration struct for the pool-sim command
pub struct PoolSimConfig {
    pub orders: usize,
    pub ingredients: usize,
    pub pool_size: usize,
}

/// Execute the worker-pool-only simulation
pub async fn execute_pool_sim(config: PoolSimConfig) -> Result<()> {
    let app = App::new();
    let pipeline_config = DefaultPipelineConfig::default().with_pool_size(config.pool_size);
    let generator: Arc<dyn TaskGenerator> =
        Arc::new(RandomTaskGenerator::from_config(&pipeline_config));

    println!(
        "🚀 Submitting {} order jobs and {} ingredient jobs (pool size {})...",
        config.orders, config.ingredients, config.pool_size
    );

    let summary = run_simulation(&app, &pipeline_config, generator, &config).await?;

    println!("✅ Simulation finished in {}ms", summary.elapsed_ms);
    println!("   - Orders submitted: {}", summary.orders_submitted);
    println!("   - Ingredients submitted: {}", summary.ingredients_submitted);
    if summary.rejected > 0 {
        println!("⚠️  {} jobs were rejected", summary.rejected);
    }
    println!("📦 Orders in list: {:?}", app.orders.snapshot());

    print_catalog_summary(&app);
    Ok(())
}

async fn run_simulation(
    app: &App,
    pipeline_config: &DefaultPipelineConfig,
    generator: Arc<dyn TaskGenerator>,
    config: &PoolSimConfig,
) -> Result<SimulationSummary> {
    simulate_worker_pool(
        pipeline_config,
        generator,
        Arc::clone(&app.orders),
        Arc::clone(&app.catalog),
        config.orders,
        config.ingredients,
    )
    .await
    .context("worker pool simulation failed")
}
