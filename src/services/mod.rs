// サービス層 - 機能別のロジック
// 設定・診断/進捗・タスク生成・結果集計をそれぞれ独立して提供する

pub mod aggregation;
pub mod config;
pub mod generation;
pub mod monitoring;

// 公開API - 各サービスの主要機能を明示的にエクスポート
pub use aggregation::{spawn_result_collector, AggregatedView};
pub use config::{validate, DefaultPipelineConfig};
pub use generation::{generate_batch, RandomTaskGenerator, TaskMix};
pub use monitoring::{
    CollectingDiagnosticSink, ConsoleProgressReporter, NoOpDiagnosticSink, NoOpProgressReporter,
    TracingDiagnosticSink,
};
