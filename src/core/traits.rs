// パイプラインのトレイト定義
// 設定・診断・進捗報告・タスク生成の抽象化インターフェース

use super::error::PipelineError;
use super::types::{OrderRecord, PipelineReport, Task};
use async_trait::async_trait;
use mockall::automock;
use std::time::Duration;

/// パイプラインの設定を抽象化するトレイト
#[automock]
pub trait PipelineConfig: Send + Sync {
    /// ワーカープールの実行ユニット数
    fn pool_size(&self) -> usize;

    /// 分配器の出力ストリーム数
    fn fan_out_workers(&self) -> usize;

    /// ソース・結果チャンネルのバッファサイズ
    fn channel_buffer_size(&self) -> usize;

    /// 追加する注文タスク数（削除タスクはこの半分）
    fn order_task_count(&self) -> usize;

    /// 挿入・検索それぞれの食材タスク数
    fn ingredient_task_count(&self) -> usize;

    /// 生成する食材の最大値
    fn max_ingredient_value(&self) -> i64;

    /// 最終レポートで存在確認する商品名
    fn special_item(&self) -> String;

    /// プールシミュレーションでの注文処理時間
    fn order_process_time(&self) -> Duration;

    /// プールシミュレーションでの食材処理時間
    fn ingredient_process_time(&self) -> Duration;
}

impl PipelineConfig for Box<dyn PipelineConfig> {
    fn pool_size(&self) -> usize {
        self.as_ref().pool_size()
    }

    fn fan_out_workers(&self) -> usize {
        self.as_ref().fan_out_workers()
    }

    fn channel_buffer_size(&self) -> usize {
        self.as_ref().channel_buffer_size()
    }

    fn order_task_count(&self) -> usize {
        self.as_ref().order_task_count()
    }

    fn ingredient_task_count(&self) -> usize {
        self.as_ref().ingredient_task_count()
    }

    fn max_ingredient_value(&self) -> i64 {
        self.as_ref().max_ingredient_value()
    }

    fn special_item(&self) -> String {
        self.as_ref().special_item()
    }

    fn order_process_time(&self) -> Duration {
        self.as_ref().order_process_time()
    }

    fn ingredient_process_time(&self) -> Duration {
        self.as_ref().ingredient_process_time()
    }
}

/// 非致命的な診断の通知先
///
/// コンテナ操作は同期的に呼ばれるため、このトレイトも同期API。
#[automock]
pub trait DiagnosticSink: Send + Sync {
    fn report(&self, diagnostic: &PipelineError);
}

/// 進捗報告の抽象化トレイト
#[automock]
#[async_trait]
pub trait ProgressReporter: Send + Sync {
    /// 処理開始時の報告
    async fn report_started(&self, total_tasks: usize);

    /// 結果ストリームに届いたタスク数の報告
    async fn report_progress(&self, dispatched: usize, total: usize);

    /// エラー発生時の報告
    async fn report_error(&self, context: &str, error: &str);

    /// 処理完了時の報告
    async fn report_completed(&self, report: &PipelineReport);
}

#[async_trait]
impl ProgressReporter for Box<dyn ProgressReporter> {
    async fn report_started(&self, total_tasks: usize) {
        self.as_ref().report_started(total_tasks).await
    }

    async fn report_progress(&self, dispatched: usize, total: usize) {
        self.as_ref().report_progress(dispatched, total).await
    }

    async fn report_error(&self, context: &str, error: &str) {
        self.as_ref().report_error(context, error).await
    }

    async fn report_completed(&self, report: &PipelineReport) {
        self.as_ref().report_completed(report).await
    }
}

/// テストデータ生成の外部コラボレーター
///
/// 非決定性は乱数源のみ。コア側はブラックボックスとして扱う。
#[automock]
pub trait TaskGenerator: Send + Sync {
    /// 指定IDのランダムな注文を生成
    fn generate_order(&self, order_id: u64) -> OrderRecord;

    /// ランダムな食材値を生成
    fn generate_ingredient(&self) -> i64;

    /// `1..=upper` から削除対象の注文IDを選ぶ
    fn pick_order_id(&self, upper: u64) -> u64;

    /// ランダムな種類のタスクを1件生成
    fn generate_task(&self) -> Task;
}
