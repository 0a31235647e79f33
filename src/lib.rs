pub mod cli;
pub mod containers;
pub mod core;
pub mod engine;
pub mod services;

use crate::containers::{IngredientCatalog, OrderSequence};
use crate::core::{CatalogSummary, DiagnosticSink, PipelineConfig, PipelineReport, ProgressReporter};
use crate::engine::Pipeline;
use crate::services::{
    ConsoleProgressReporter, DefaultPipelineConfig, NoOpProgressReporter, RandomTaskGenerator,
    TracingDiagnosticSink,
};
use std::sync::Arc;

// DIコンテナの役割を果たすApp構造体
// 共有コンテナを1組だけ所有し、作成する全パイプラインへArcで渡す
pub struct App {
    pub orders: Arc<OrderSequence>,
    pub catalog: Arc<IngredientCatalog>,
}

impl App {
    /// 診断をtracingへ流すAppを作成
    pub fn new() -> Self {
        Self::with_diagnostics(Arc::new(TracingDiagnosticSink::new()))
    }

    /// 診断の通知先を指定してAppを作成（コンストラクタインジェクション）
    pub fn with_diagnostics(diagnostics: Arc<dyn DiagnosticSink>) -> Self {
        Self {
            orders: Arc::new(OrderSequence::with_diagnostics(Arc::clone(&diagnostics))),
            catalog: Arc::new(IngredientCatalog::with_diagnostics(diagnostics)),
        }
    }

    // ========================================
    // パイプライン作成メソッド
    // ========================================

    /// デフォルト設定のパイプラインを作成
    pub fn create_pipeline(&self) -> Pipeline<DefaultPipelineConfig, ConsoleProgressReporter> {
        self.create_custom_pipeline(
            DefaultPipelineConfig::default(),
            ConsoleProgressReporter::new(),
        )
    }

    /// 静音版のパイプラインを作成（テスト・バックグラウンド用）
    pub fn create_quiet_pipeline(&self) -> Pipeline<DefaultPipelineConfig, NoOpProgressReporter> {
        self.create_custom_pipeline(DefaultPipelineConfig::default(), NoOpProgressReporter::new())
    }

    /// カスタム設定でパイプラインを作成
    pub fn create_custom_pipeline<C, R>(&self, config: C, reporter: R) -> Pipeline<C, R>
    where
        C: PipelineConfig,
        R: ProgressReporter + 'static,
    {
        Pipeline::new(
            Arc::clone(&self.orders),
            Arc::clone(&self.catalog),
            config,
            Arc::new(reporter),
        )
    }

    /// デフォルト設定のランダムなタスクバッチを静音パイプラインで流す
    pub async fn run_quiet(&self) -> anyhow::Result<PipelineReport> {
        let pipeline = self.create_quiet_pipeline();
        let generator = RandomTaskGenerator::from_config(pipeline.config());
        pipeline
            .run_generated(&generator)
            .await
            .map_err(|e| anyhow::anyhow!("静音パイプライン実行エラー: {e}"))
    }

    /// カタログの最終状態（昇順の値と集計値）
    pub fn catalog_summary(&self) -> (Vec<i64>, CatalogSummary) {
        (
            self.catalog.traverse_in_order(),
            self.catalog.find_min_max_sum(),
        )
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}
