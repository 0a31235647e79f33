// Simulation - ワーカープール単体のシミュレーションとエッジケースの実演

use super::fan_out::FanOutDistributor;
use super::worker_pool::{PoolJob, WorkerPool};
use crate::containers::{IngredientCatalog, OrderSequence};
use crate::core::{OrderRecord, PipelineConfig, PipelineResult, Task, TaskGenerator};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::task::JoinSet;

/// プールシミュレーションの結果
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SimulationSummary {
    pub orders_submitted: usize,
    pub ingredients_submitted: usize,
    pub rejected: usize,
    pub elapsed_ms: u64,
}

/// 注文用・食材用の2つのプールへジョブを同時に投入する
///
/// 各ジョブはコンテナを変更した後、設定された処理時間だけ待機する。
/// 食材ジョブは生成値に1を足した値を挿入する。
pub async fn simulate_worker_pool(
    config: &dyn PipelineConfig,
    generator: Arc<dyn TaskGenerator>,
    orders: Arc<OrderSequence>,
    catalog: Arc<IngredientCatalog>,
    order_count: usize,
    ingredient_count: usize,
) -> PipelineResult<SimulationSummary> {
    let start_time = Instant::now();
    let order_pool = Arc::new(WorkerPool::new(config.pool_size()));
    let ingredient_pool = Arc::new(WorkerPool::new(config.pool_size()));
    let order_time = config.order_process_time();
    let ingredient_time = config.ingredient_process_time();

    let mut submissions: JoinSet<(bool, PipelineResult<()>)> = JoinSet::new();

    for order_id in 1..=order_count as u64 {
        let pool = Arc::clone(&order_pool);
        let generator = Arc::clone(&generator);
        let orders = Arc::clone(&orders);
        submissions.spawn(async move {
            let record = generator.generate_order(order_id);
            let job = PoolJob::new(move || order_job(orders, record, order_time));
            (true, pool.submit(job).await)
        });
    }

    for _ in 0..ingredient_count {
        let pool = Arc::clone(&ingredient_pool);
        let generator = Arc::clone(&generator);
        let catalog = Arc::clone(&catalog);
        submissions.spawn(async move {
            let value = generator.generate_ingredient();
            let job = PoolJob::new(move || ingredient_job(catalog, value, ingredient_time));
            (false, pool.submit(job).await)
        });
    }

    let mut summary = SimulationSummary::default();
    while let Some(joined) = submissions.join_next().await {
        let (is_order, submitted) = joined?;
        match submitted {
            Ok(()) if is_order => summary.orders_submitted += 1,
            Ok(()) => summary.ingredients_submitted += 1,
            Err(error) => {
                tracing::warn!("{error}");
                summary.rejected += 1;
            }
        }
    }

    // 停止で投入済みジョブの完了を待つ
    order_pool.shutdown().await?;
    ingredient_pool.shutdown().await?;

    summary.elapsed_ms = start_time.elapsed().as_millis() as u64;
    Ok(summary)
}

async fn order_job(
    orders: Arc<OrderSequence>,
    record: OrderRecord,
    process_time: Duration,
) -> anyhow::Result<()> {
    tracing::info!(
        order_id = record.order_id,
        origin = %record.origin,
        item_type = %record.item_type,
        "注文を処理しました"
    );
    orders.append_record(record);
    tokio::time::sleep(process_time).await;
    Ok(())
}

async fn ingredient_job(
    catalog: Arc<IngredientCatalog>,
    value: i64,
    process_time: Duration,
) -> anyhow::Result<()> {
    catalog.insert(value + 1);
    tracing::info!(value, "食材を挿入しました");
    tokio::time::sleep(process_time).await;
    Ok(())
}

/// エッジケース実演の結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EdgeCaseOutcome {
    /// 範囲外挿入の前後で注文数が変わらなかったか
    pub out_of_range_ignored: bool,
    /// 同じ食材を2回挿入して1件だけ残ったか
    pub duplicate_stored_once: bool,
    /// 停止後の分配器への追加が破棄されたか
    pub late_task_discarded: bool,
}

/// 非致命的なエラー経路を実際に通す
///
/// いずれも呼び出し元にはエラーを返さず、診断チャネルに通知されるだけ。
pub async fn demonstrate_edge_cases(
    orders: &OrderSequence,
    catalog: &IngredientCatalog,
) -> EdgeCaseOutcome {
    let before = orders.snapshot();
    orders.insert_at(10_000_000, 3, "Venus", "Quantum Anchoa");
    let out_of_range_ignored = orders.snapshot() == before;

    let count_sevens = || catalog.traverse_in_order().iter().filter(|&&v| v == 7).count();
    let already_present = count_sevens();
    catalog.insert(7);
    catalog.insert(7);
    let duplicate_stored_once = already_present <= 1 && count_sevens() == 1;

    let (source_tx, source_rx) = mpsc::channel(1);
    let distributor = FanOutDistributor::new(&source_tx, source_rx, 1);
    distributor.shutdown().await;
    let late_task_discarded = !distributor.add_data(Task::InsertIngredient { value: 7 }).await;

    EdgeCaseOutcome {
        out_of_range_ignored,
        duplicate_stored_once,
        late_task_discarded,
    }
}
