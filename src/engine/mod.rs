// エンジン層 - 並列処理とオーケストレーション
// プール・分配器・ディスパッチャを組み合わせてパイプラインを構成する

pub mod consumer;
pub mod fan_out;
mod pipeline;
pub mod producer;
pub mod simulation;
pub mod worker_pool;

// 公開API - 主要エンジンクラス
pub use consumer::{apply_task, DispatchTargets};
pub use fan_out::FanOutDistributor;
pub use pipeline::Pipeline;
pub use simulation::{demonstrate_edge_cases, simulate_worker_pool, EdgeCaseOutcome, SimulationSummary};
pub use worker_pool::{PoolJob, PoolState, WorkerPool};
