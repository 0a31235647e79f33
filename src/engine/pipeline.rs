// Pipeline - 生成 → 分配 → プール実行 → 集計 のオーケストレーション

use super::{
    consumer::{spawn_dispatchers, DispatchTargets},
    fan_out::FanOutDistributor,
    producer::spawn_producer,
    worker_pool::WorkerPool,
};
use crate::{
    containers::{IngredientCatalog, OrderSequence},
    core::{PipelineConfig, PipelineReport, PipelineResult, ProgressReporter, Task, TaskGenerator},
    services::{
        aggregation::{spawn_result_collector, AggregatedView},
        config::validate,
        generation::{generate_batch, TaskMix},
    },
};
use anyhow::Result;
use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use tokio::{sync::mpsc, task::JoinHandle};
use tokio_util::sync::CancellationToken;

/// 共有コンテナに対してタスクバッチを並列に流すパイプライン
///
/// コンテナは外部から注入され、実行後もそのまま最終状態を保持する。
pub struct Pipeline<C, R: ?Sized> {
    orders: Arc<OrderSequence>,
    catalog: Arc<IngredientCatalog>,
    config: Arc<C>,
    reporter: Arc<R>,
}

impl<C, R> Pipeline<C, R>
where
    C: PipelineConfig,
    R: ProgressReporter + ?Sized + 'static,
{
    pub fn new(
        orders: Arc<OrderSequence>,
        catalog: Arc<IngredientCatalog>,
        config: C,
        reporter: Arc<R>,
    ) -> Self {
        Self {
            orders,
            catalog,
            config: Arc::new(config),
            reporter,
        }
    }

    pub fn orders(&self) -> &Arc<OrderSequence> {
        &self.orders
    }

    pub fn catalog(&self) -> &Arc<IngredientCatalog> {
        &self.catalog
    }

    pub fn config(&self) -> &C {
        &self.config
    }

    /// 設定の比率でタスクを生成して実行
    pub async fn run_generated(
        &self,
        generator: &dyn TaskGenerator,
    ) -> PipelineResult<PipelineReport> {
        let mix = TaskMix::from_config(self.config.as_ref());
        self.run(generate_batch(generator, &mix)).await
    }

    /// タスクバッチを最後まで流し、全ステージを静止させてからレポートを作る
    pub async fn run(&self, tasks: Vec<Task>) -> PipelineResult<PipelineReport> {
        validate(self.config.as_ref())?;

        let start_time = Instant::now();
        let total_tasks = tasks.len();
        let special_item = self.config.special_item();
        self.reporter.report_started(total_tasks).await;

        let buffer_size = self.config.channel_buffer_size();
        let cancel = CancellationToken::new();
        let pool = Arc::new(WorkerPool::new(self.config.pool_size()));

        // 入力ストリームと分配器
        let (source_tx, source_rx) = mpsc::channel::<Task>(buffer_size);
        let distributor = FanOutDistributor::with_cancellation(
            &source_tx,
            source_rx,
            self.config.fan_out_workers(),
            cancel.child_token(),
        );
        let (processed_tx, processed_rx) = mpsc::channel::<Task>(buffer_size);

        // Producer起動
        let producer_handle = spawn_producer(tasks, source_tx, cancel.clone());

        // 出力1本につき1ディスパッチャ
        let dispatcher_handles = spawn_dispatchers(
            distributor.take_outputs(),
            DispatchTargets {
                pool: Arc::clone(&pool),
                orders: Arc::clone(&self.orders),
                catalog: Arc::clone(&self.catalog),
            },
            processed_tx,
        );

        // Result Collector起動
        let collector_handle = spawn_result_collector(
            processed_rx,
            special_item.clone(),
            Arc::clone(&self.reporter),
            total_tasks,
        );

        let outcome = await_stages(producer_handle, dispatcher_handles, collector_handle).await;

        // 成否に関わらず分配器とプールを止める（プールの停止で投入済みジョブが全て完了する）
        distributor.shutdown().await;
        cancel.cancel();
        let pool_result = pool.shutdown().await;

        let view = match outcome.and_then(|view| pool_result.map(|()| view)) {
            Ok(view) => view,
            Err(error) => {
                self.reporter
                    .report_error("pipeline", &error.to_string())
                    .await;
                return Err(error);
            }
        };

        let report = PipelineReport {
            surviving_orders: view.surviving_orders,
            surviving_ingredients: view.ingredients,
            special_item,
            special_item_present: view.special_item_present,
            order_snapshot: self.orders.snapshot(),
            catalog_values: self.catalog.traverse_in_order(),
            catalog_summary: self.catalog.find_min_max_sum(),
            tasks_dispatched: view.tasks_observed,
            elapsed_ms: start_time.elapsed().as_millis() as u64,
            generated_at: Utc::now(),
        };

        tracing::info!(
            tasks = report.tasks_dispatched,
            orders = report.order_snapshot.len(),
            ingredients = report.catalog_values.len(),
            elapsed_ms = report.elapsed_ms,
            "パイプライン完了"
        );
        self.reporter.report_completed(&report).await;
        Ok(report)
    }
}

/// Producer → Dispatcher → Collector の順に完了を待機
async fn await_stages(
    producer_handle: JoinHandle<Result<()>>,
    dispatcher_handles: Vec<JoinHandle<Result<()>>>,
    collector_handle: JoinHandle<Result<AggregatedView>>,
) -> PipelineResult<AggregatedView> {
    producer_handle.await??;

    // 全ディスパッチャが終わると結果ストリームの送信側が全て落ち、Collectorが終了する
    for handle in dispatcher_handles {
        handle.await??;
    }

    Ok(collector_handle.await??)
}
