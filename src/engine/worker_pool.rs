// WorkerPool - 固定数の実行ユニットによるジョブ実行
// セマフォの許可数 = 空いている実行ユニット数。submit は許可を得るまで待機する

use crate::core::{PipelineError, PipelineResult};
use futures::future::BoxFuture;
use futures::FutureExt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{mpsc, oneshot, OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinHandle;

type JobAction = Box<dyn FnOnce() -> BoxFuture<'static, anyhow::Result<()>> + Send>;

/// プールで実行する1件のジョブ
pub struct PoolJob {
    action: JobAction,
    completion: Option<oneshot::Sender<()>>,
}

impl PoolJob {
    /// 完了通知なしのジョブを作成
    pub fn new<F, Fut>(action: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        Self {
            action: Box::new(move || action().boxed()),
            completion: None,
        }
    }

    /// 完了通知付きのジョブを作成
    ///
    /// 受信側はアクションが戻った時点（成功・失敗を問わず）で解決する。
    pub fn with_completion<F, Fut>(action: F) -> (Self, oneshot::Receiver<()>)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let (done_tx, done_rx) = oneshot::channel();
        let mut job = Self::new(action);
        job.completion = Some(done_tx);
        (job, done_rx)
    }
}

/// プールの状態遷移: Created → Running → ShuttingDown → Stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolState {
    Created,
    Running,
    ShuttingDown,
    Stopped,
}

struct Dispatch {
    job: PoolJob,
    _permit: OwnedSemaphorePermit,
}

/// 固定サイズのワーカープール
///
/// 全ユニットは構築時に起動する。停止後の `submit` は呼び出し側の誤用であり、
/// パニックはせず `PipelineError::PoolClosed` を返す。
pub struct WorkerPool {
    job_tx: Mutex<Option<mpsc::Sender<Dispatch>>>,
    idle_units: Arc<Semaphore>,
    units: tokio::sync::Mutex<Vec<JoinHandle<()>>>,
    state: Mutex<PoolState>,
    size: usize,
}

impl WorkerPool {
    /// 実行ユニットを `size` 個起動する（tokioランタイム内で呼ぶこと）
    pub fn new(size: usize) -> Self {
        let size = size.max(1);
        let (job_tx, job_rx) = mpsc::channel::<Dispatch>(size);
        let job_rx = Arc::new(tokio::sync::Mutex::new(job_rx));

        let handles = (0..size)
            .map(|unit_id| tokio::spawn(run_unit(unit_id, Arc::clone(&job_rx))))
            .collect();

        let pool = Self {
            job_tx: Mutex::new(Some(job_tx)),
            idle_units: Arc::new(Semaphore::new(size)),
            units: tokio::sync::Mutex::new(handles),
            state: Mutex::new(PoolState::Created),
            size,
        };
        pool.set_state(PoolState::Running);
        pool
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn state(&self) -> PoolState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_state(&self, state: PoolState) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = state;
    }

    /// ジョブを投入
    ///
    /// 空いているユニットが出るまで待機する（内部キューによるバッファリングはしない）。
    pub async fn submit(&self, job: PoolJob) -> PipelineResult<()> {
        let sender = self
            .job_tx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(PipelineError::PoolClosed)?;

        let permit = Arc::clone(&self.idle_units)
            .acquire_owned()
            .await
            .map_err(|_| PipelineError::PoolClosed)?;

        sender
            .send(Dispatch {
                job,
                _permit: permit,
            })
            .await
            .map_err(|_| PipelineError::PoolClosed)
    }

    /// 投入口を閉じ、全ユニットが残りのジョブを処理して終了するまで待機
    ///
    /// 同時に複数回呼ばれても、後続の呼び出しは最初の停止が完了するまで待つ。
    pub async fn shutdown(&self) -> PipelineResult<()> {
        // 終了待ちの間 units のロックを保持し続ける
        let mut units = self.units.lock().await;
        if self.state() == PoolState::Stopped {
            return Ok(());
        }
        self.set_state(PoolState::ShuttingDown);

        // 送信側を落とすと、投入済みのジョブを処理し終えたユニットから順に終了する
        self.job_tx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        self.idle_units.close();

        let mut first_error = None;
        for handle in units.drain(..) {
            if let Err(error) = handle.await {
                tracing::error!(error = %error, "実行ユニットが異常終了しました");
                first_error.get_or_insert(PipelineError::task(error));
            }
        }

        self.set_state(PoolState::Stopped);
        first_error.map_or(Ok(()), Err)
    }
}

/// 実行ユニット: 受信 → 実行 → 失敗はログのみ → 完了通知 のループ
async fn run_unit(unit_id: usize, job_rx: Arc<tokio::sync::Mutex<mpsc::Receiver<Dispatch>>>) {
    loop {
        let dispatch = {
            let mut rx = job_rx.lock().await;
            match rx.recv().await {
                Some(dispatch) => dispatch,
                None => break, // 投入口が閉じられた
            }
        };

        let Dispatch { job, _permit } = dispatch;
        let PoolJob { action, completion } = job;

        match AssertUnwindSafe(action()).catch_unwind().await {
            Ok(Ok(())) => {}
            Ok(Err(error)) => {
                let error = PipelineError::action_failed(error);
                tracing::warn!(unit_id, "{error}");
            }
            Err(_) => {
                tracing::error!(unit_id, "ジョブ実行中にパニックが発生しました");
            }
        }

        if let Some(done) = completion {
            let _ = done.send(());
        }
        // _permit はここでdropされ、ユニットが空いたことになる
    }
    tracing::debug!(unit_id, "実行ユニットを終了します");
}
