// Producer - タスク配信機能（キャンセル可能な入力ストリーム）

use crate::core::Task;
use anyhow::Result;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Producer: タスクバッチを先頭から順に入力ストリームへ流す
///
/// キャンセルされた時点で残りのタスクは送らずに終了する。
pub fn spawn_producer(
    tasks: Vec<Task>,
    source_tx: mpsc::Sender<Task>,
    cancel: CancellationToken,
) -> tokio::task::JoinHandle<Result<()>> {
    tokio::spawn(async move {
        let total = tasks.len();
        for (sent, task) in tasks.into_iter().enumerate() {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::debug!(sent, total, "キャンセルにより配信を打ち切ります");
                    break;
                }
                result = source_tx.send(task) => {
                    if result.is_err() {
                        // チャンネルが閉じられた場合は正常終了
                        break;
                    }
                }
            }
        }
        // source_txをドロップしてチャンネル終了シグナル
        Ok(())
    })
}
