// 進捗監視・診断機能
// 処理進捗の報告、非致命的な診断の通知、完了通知

pub mod implementations;

// 公開API
pub use implementations::{
    CollectingDiagnosticSink, ConsoleProgressReporter, DiagnosticRecord, NoOpDiagnosticSink,
    NoOpProgressReporter, TracingDiagnosticSink,
};
