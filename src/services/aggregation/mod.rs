// 結果集計機能

pub mod collector;

// 公開API
pub use collector::{spawn_result_collector, AggregatedView, ResultAggregator};
