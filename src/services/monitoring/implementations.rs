// 進捗監視・診断の具象実装

use crate::core::{DiagnosticSink, PipelineError, PipelineReport, ProgressReporter};
use async_trait::async_trait;
use std::sync::{Mutex, PoisonError};

/// コンソール出力による進捗報告実装
#[derive(Debug, Default, Clone)]
pub struct ConsoleProgressReporter {
    quiet: bool,
}

impl ConsoleProgressReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn quiet() -> Self {
        Self { quiet: true }
    }
}

#[async_trait]
impl ProgressReporter for ConsoleProgressReporter {
    async fn report_started(&self, total_tasks: usize) {
        if !self.quiet {
            println!("🚀 Dispatching {total_tasks} tasks...");
        }
    }

    async fn report_progress(&self, dispatched: usize, total: usize) {
        if !self.quiet && (dispatched % 10 == 0 || dispatched == total) {
            let percentage = if total > 0 {
                (dispatched as f64 / total as f64) * 100.0
            } else {
                100.0
            };
            println!("📊 Progress: {dispatched}/{total} ({percentage:.1}%)");
        }
    }

    async fn report_error(&self, context: &str, error: &str) {
        if !self.quiet {
            eprintln!("❌ Error in {context}: {error}");
        }
    }

    async fn report_completed(&self, report: &PipelineReport) {
        if self.quiet {
            return;
        }
        println!("✅ Completed! Dispatched: {}", report.tasks_dispatched);
        println!("📦 Final orders in list: {:?}", report.surviving_orders);
        println!("🧂 Final ingredients in tree: {:?}", report.surviving_ingredients);
        if report.special_item_present {
            println!("🍕 {} is still available!", report.special_item);
        } else {
            println!("⚠️  Warning: {} is missing from the menu!", report.special_item);
        }
    }
}

/// 何もしない進捗報告実装（テスト・ベンチマーク用）
#[derive(Debug, Default, Clone)]
pub struct NoOpProgressReporter;

impl NoOpProgressReporter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProgressReporter for NoOpProgressReporter {
    async fn report_started(&self, _total_tasks: usize) {
        // 何もしない
    }

    async fn report_progress(&self, _dispatched: usize, _total: usize) {
        // 何もしない
    }

    async fn report_error(&self, _context: &str, _error: &str) {
        // 何もしない
    }

    async fn report_completed(&self, _report: &PipelineReport) {
        // 何もしない
    }
}

/// tracing へ診断を流す実装（コンテナのデフォルト）
#[derive(Debug, Default, Clone)]
pub struct TracingDiagnosticSink;

impl TracingDiagnosticSink {
    pub fn new() -> Self {
        Self
    }
}

impl DiagnosticSink for TracingDiagnosticSink {
    fn report(&self, diagnostic: &PipelineError) {
        if diagnostic.is_recoverable() {
            tracing::warn!(code = diagnostic.code(), "{diagnostic}");
        } else {
            tracing::error!(code = diagnostic.code(), "{diagnostic}");
        }
    }
}

/// 収集された診断1件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticRecord {
    pub code: &'static str,
    pub message: String,
}

/// 診断をメモリに記録する実装
///
/// テストやCLIのサマリー表示で、何件の操作が破棄されたかを確認するために使う。
#[derive(Debug, Default)]
pub struct CollectingDiagnosticSink {
    records: Mutex<Vec<DiagnosticRecord>>,
}

impl CollectingDiagnosticSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// 記録済みの診断を取得
    pub fn records(&self) -> Vec<DiagnosticRecord> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// 指定コードの診断件数
    pub fn count(&self, code: &str) -> usize {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|record| record.code == code)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_empty()
    }
}

impl DiagnosticSink for CollectingDiagnosticSink {
    fn report(&self, diagnostic: &PipelineError) {
        tracing::debug!(code = diagnostic.code(), "{diagnostic}");
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(DiagnosticRecord {
                code: diagnostic.code(),
                message: diagnostic.to_string(),
            });
    }
}

/// 診断を捨てる実装
#[derive(Debug, Default, Clone)]
pub struct NoOpDiagnosticSink;

impl DiagnosticSink for NoOpDiagnosticSink {
    fn report(&self, _diagnostic: &PipelineError) {
        // 何もしない
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::CatalogSummary;
    use chrono::Utc;

    fn empty_report() -> PipelineReport {
        PipelineReport {
            surviving_orders: vec![],
            surviving_ingredients: vec![],
            special_item: "Antimatter Pizza".to_string(),
            special_item_present: false,
            order_snapshot: vec![],
            catalog_values: vec![],
            catalog_summary: CatalogSummary::default(),
            tasks_dispatched: 0,
            elapsed_ms: 0,
            generated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_console_progress_reporter() {
        // 出力キャプチャは複雑なため、基本的な呼び出しテストのみ
        let reporter = ConsoleProgressReporter::quiet();

        reporter.report_started(19).await;
        reporter.report_progress(10, 19).await;
        reporter.report_error("dispatcher-0", "test error").await;
        reporter.report_completed(&empty_report()).await;
    }

    #[tokio::test]
    async fn test_console_progress_reporter_creation() {
        let reporter1 = ConsoleProgressReporter::new();
        let reporter2 = ConsoleProgressReporter::quiet();

        assert!(!reporter1.quiet);
        assert!(reporter2.quiet);
    }

    #[tokio::test]
    async fn test_noop_progress_reporter() {
        let reporter = NoOpProgressReporter::new();

        // 全てのメソッドを呼び出してもパニックしない
        reporter.report_started(100).await;
        reporter.report_progress(0, 0).await;
        reporter.report_error("collector", "test error").await;
        reporter.report_completed(&empty_report()).await;
    }

    #[test]
    fn test_collecting_diagnostic_sink() {
        let sink = CollectingDiagnosticSink::new();
        assert!(sink.is_empty());

        sink.report(&PipelineError::duplicate_ingredient(7));
        sink.report(&PipelineError::index_out_of_range(100, 2));
        sink.report(&PipelineError::duplicate_ingredient(9));

        assert_eq!(sink.records().len(), 3);
        assert_eq!(sink.count("duplicate_ingredient"), 2);
        assert_eq!(sink.count("index_out_of_range"), 1);
        assert!(sink.records()[1].message.contains("index=100"));
    }

    #[test]
    fn test_tracing_and_noop_sinks_do_not_panic() {
        TracingDiagnosticSink::new().report(&PipelineError::PoolClosed);
        TracingDiagnosticSink::new().report(&PipelineError::configuration("bad"));
        NoOpDiagnosticSink.report(&PipelineError::DistributorStopped);
    }
}
