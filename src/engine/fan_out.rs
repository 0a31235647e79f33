// FanOutDistributor - 1本の入力ストリームをN本の出力ストリームへ分配
// 各中継ループは入力を奪い合い、取得したタスクは自分専用の出力にだけ書き込む

use crate::core::{PipelineError, PipelineResult, Task};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// 出力チャンネルの容量（受け手が準備できるまで中継ループを待たせる）
const OUTPUT_CAPACITY: usize = 1;

type SharedSource = Arc<tokio::sync::Mutex<mpsc::Receiver<Task>>>;

/// ワークスティーリング型の分配器
///
/// 各タスクはちょうど1本の出力に届く（ブロードキャストではない）。
/// `shutdown` 時に入力から取り出し済みで未配送のタスクは破棄されることがある。
pub struct FanOutDistributor {
    feeder: mpsc::WeakSender<Task>,
    cancel: CancellationToken,
    outputs: Mutex<Vec<mpsc::Receiver<Task>>>,
    relays: tokio::sync::Mutex<Vec<JoinHandle<()>>>,
    workers: usize,
}

impl FanOutDistributor {
    /// 中継ループを `workers` 個起動する（tokioランタイム内で呼ぶこと）
    ///
    /// 入力の送信側は弱参照でしか保持しないため、呼び出し側の送信側が
    /// すべてdropされると入力が閉じ、中継ループは残りを流して終了する。
    pub fn new(
        source_tx: &mpsc::Sender<Task>,
        source_rx: mpsc::Receiver<Task>,
        workers: usize,
    ) -> Self {
        Self::with_cancellation(source_tx, source_rx, workers, CancellationToken::new())
    }

    /// 外部のキャンセルトークンに連動させて作成
    pub fn with_cancellation(
        source_tx: &mpsc::Sender<Task>,
        source_rx: mpsc::Receiver<Task>,
        workers: usize,
        cancel: CancellationToken,
    ) -> Self {
        let workers = workers.max(1);
        let source: SharedSource = Arc::new(tokio::sync::Mutex::new(source_rx));

        let mut outputs = Vec::with_capacity(workers);
        let mut relays = Vec::with_capacity(workers);
        for relay_id in 0..workers {
            let (output_tx, output_rx) = mpsc::channel(OUTPUT_CAPACITY);
            outputs.push(output_rx);
            relays.push(tokio::spawn(run_relay(
                relay_id,
                Arc::clone(&source),
                output_tx,
                cancel.clone(),
            )));
        }

        Self {
            feeder: source_tx.downgrade(),
            cancel,
            outputs: Mutex::new(outputs),
            relays: tokio::sync::Mutex::new(relays),
            workers,
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// 出力ストリームを取り出す（2回目以降は空）
    pub fn take_outputs(&self) -> Vec<mpsc::Receiver<Task>> {
        std::mem::take(&mut *self.outputs.lock().unwrap_or_else(PoisonError::into_inner))
    }

    /// 入力ストリームへタスクを追加
    ///
    /// 停止済み、または入力が既に閉じている場合は黙って破棄し `false` を返す。
    pub async fn add_data(&self, task: Task) -> bool {
        let kind = task.kind();
        match self.try_add_data(task).await {
            Ok(()) => true,
            Err(error) => {
                tracing::debug!(?kind, "{error}");
                false
            }
        }
    }

    /// `add_data` のエラーを返す版
    pub async fn try_add_data(&self, task: Task) -> PipelineResult<()> {
        if self.cancel.is_cancelled() {
            return Err(PipelineError::DistributorStopped);
        }
        let feeder = self
            .feeder
            .upgrade()
            .ok_or_else(|| PipelineError::channel("入力ストリームは閉じています"))?;

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(PipelineError::DistributorStopped),
            sent = feeder.send(task) => {
                sent.map_err(|_| PipelineError::channel("入力ストリームは閉じています"))
            }
        }
    }

    /// 全中継ループに停止を通知し、終了を待機
    pub async fn shutdown(&self) {
        self.cancel.cancel();

        let relays = std::mem::take(&mut *self.relays.lock().await);
        for relay in relays {
            if let Err(error) = relay.await {
                tracing::error!(error = %error, "中継ループが異常終了しました");
            }
        }
    }

    pub fn is_shutdown(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

/// 中継ループ: 入力の受信と停止通知を競わせ、取得したタスクを自分の出力へ送る
async fn run_relay(
    relay_id: usize,
    source: SharedSource,
    output: mpsc::Sender<Task>,
    cancel: CancellationToken,
) {
    loop {
        let task = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            received = async { source.lock().await.recv().await } => match received {
                Some(task) => task,
                None => break, // 入力が閉じられた
            },
        };

        // send(task) は select! の評価時点でtaskをムーブする
        let kind = task.kind();
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::debug!(relay_id, ?kind, "停止通知により未配送のタスクを破棄しました");
                break;
            }
            sent = output.send(task) => {
                if sent.is_err() {
                    break; // 出力の受け手がいない
                }
            }
        }
    }
    // outputがdropされ、受け手側にストリーム終端が伝わる
    tracing::debug!(relay_id, "中継ループを終了します");
}
