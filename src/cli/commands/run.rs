use crate::core::{PipelineReport, ProgressReporter};
use crate::services::{ConsoleProgressReporter, DefaultPipelineConfig, RandomTaskGenerator};
use crate::App;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use super::print_catalog_summary;

/// Configuration struct for the run command
pub struct RunConfig {
    pub pool_size: usize,
    pub fan_out: usize,
    pub orders: usize,
    pub ingredients: usize,
    pub quiet: bool,
    pub json: Option<PathBuf>,
}

impl RunConfig {
    fn pipeline_config(&self) -> DefaultPipelineConfig {
        DefaultPipelineConfig::default()
            .with_pool_size(self.pool_size)
            .with_fan_out_workers(self.fan_out)
            .with_order_tasks(self.orders)
            .with_ingredient_tasks(self.ingredients)
    }
}

/// Execute the full pipeline and print the final catalog state
pub async fn execute_run(config: RunConfig) -> Result<()> {
    let app = App::new();
    let reporter = if config.quiet {
        ConsoleProgressReporter::quiet()
    } else {
        ConsoleProgressReporter::new()
    };

    let report = run_with_reporter(&app, config.pipeline_config(), reporter).await?;

    if let Some(path) = &config.json {
        write_report(&report, path)?;
        if !config.quiet {
            println!("📄 Report saved to {}", path.display());
        }
    }

    print_catalog_summary(&app);
    Ok(())
}

async fn run_with_reporter<R>(
    app: &App,
    pipeline_config: DefaultPipelineConfig,
    reporter: R,
) -> Result<PipelineReport>
where
    R: ProgressReporter + 'static,
{
    let generator = RandomTaskGenerator::from_config(&pipeline_config);
    let pipeline = app.create_custom_pipeline(pipeline_config, reporter);
    pipeline
        .run_generated(&generator)
        .await
        .context("pipeline run failed")
}

/// Serialize the report to a pretty-printed JSON file
pub fn write_report(report: &PipelineReport, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(report).context("failed to serialize report")?;
    std::fs::write(path, json)
        .with_context(|| format!("failed to write report: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::NoOpDiagnosticSink;
    use std::sync::Arc;
    use tempfile::TempDir;

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_run_writes_json_report() {
        let temp_dir = TempDir::new().unwrap();
        let output = temp_dir.path().join("report.json");

        let app = App::with_diagnostics(Arc::new(NoOpDiagnosticSink));
        let config = RunConfig {
            pool_size: 2,
            fan_out: 2,
            orders: 4,
            ingredients: 3,
            quiet: true,
            json: Some(output.clone()),
        };
        let report = run_with_reporter(&app, config.pipeline_config(), ConsoleProgressReporter::quiet())
            .await
            .unwrap();
        write_report(&report, &output).unwrap();

        let saved: PipelineReport =
            serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
        // 追加4 + 削除2 + 挿入3 + 検索3
        assert_eq!(saved.tasks_dispatched, 12);
        assert_eq!(saved.catalog_values, report.catalog_values);
        assert_eq!(saved.special_item, "Antimatter Pizza");
    }

    #[test]
    fn test_write_report_to_missing_directory_fails() {
        let temp_dir = TempDir::new().unwrap();
        let output = temp_dir.path().join("missing").join("report.json");
        let report = PipelineReport {
            surviving_orders: Vec::new(),
            surviving_ingredients: Vec::new(),
            special_item: "Antimatter Pizza".to_string(),
            special_item_present: false,
            order_snapshot: Vec::new(),
            catalog_values: Vec::new(),
            catalog_summary: Default::default(),
            tasks_dispatched: 0,
            elapsed_ms: 0,
            generated_at: chrono::Utc::now(),
        };

        assert!(write_report(&report, &output).is_err());
    }
}
