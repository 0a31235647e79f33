// 設定管理の具象実装

use crate::core::{PipelineConfig, PipelineError, PipelineResult};
use std::time::Duration;

/// デフォルト設定実装
#[derive(Debug, Clone)]
pub struct DefaultPipelineConfig {
    pool_size: usize,
    fan_out_workers: usize,
    buffer_size: usize,
    order_tasks: usize,
    ingredient_tasks: usize,
    max_ingredient: i64,
    special_item: String,
    order_process_time: Duration,
    ingredient_process_time: Duration,
}

impl DefaultPipelineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pool_size(mut self, pool_size: usize) -> Self {
        self.pool_size = pool_size;
        self
    }

    pub fn with_fan_out_workers(mut self, workers: usize) -> Self {
        self.fan_out_workers = workers;
        self
    }

    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size;
        self
    }

    pub fn with_order_tasks(mut self, count: usize) -> Self {
        self.order_tasks = count;
        self
    }

    pub fn with_ingredient_tasks(mut self, count: usize) -> Self {
        self.ingredient_tasks = count;
        self
    }

    pub fn with_max_ingredient(mut self, max: i64) -> Self {
        self.max_ingredient = max;
        self
    }

    pub fn with_special_item(mut self, item: impl Into<String>) -> Self {
        self.special_item = item.into();
        self
    }

    /// シミュレーション用の処理時間をまとめて設定
    pub fn with_process_times(mut self, order: Duration, ingredient: Duration) -> Self {
        self.order_process_time = order;
        self.ingredient_process_time = ingredient;
        self
    }
}

impl Default for DefaultPipelineConfig {
    fn default() -> Self {
        Self {
            pool_size: 10,
            fan_out_workers: 5,
            buffer_size: 1,
            order_tasks: 5,
            ingredient_tasks: 6,
            max_ingredient: 100,
            special_item: "Antimatter Pizza".to_string(),
            order_process_time: Duration::from_millis(500),
            ingredient_process_time: Duration::from_millis(300),
        }
    }
}

impl PipelineConfig for DefaultPipelineConfig {
    fn pool_size(&self) -> usize {
        self.pool_size
    }

    fn fan_out_workers(&self) -> usize {
        self.fan_out_workers
    }

    fn channel_buffer_size(&self) -> usize {
        self.buffer_size
    }

    fn order_task_count(&self) -> usize {
        self.order_tasks
    }

    fn ingredient_task_count(&self) -> usize {
        self.ingredient_tasks
    }

    fn max_ingredient_value(&self) -> i64 {
        self.max_ingredient
    }

    fn special_item(&self) -> String {
        self.special_item.clone()
    }

    fn order_process_time(&self) -> Duration {
        self.order_process_time
    }

    fn ingredient_process_time(&self) -> Duration {
        self.ingredient_process_time
    }
}

/// 設定値の検証
pub fn validate(config: &dyn PipelineConfig) -> PipelineResult<()> {
    if config.pool_size() == 0 {
        return Err(PipelineError::configuration(
            "プールサイズは1以上である必要があります",
        ));
    }
    if config.fan_out_workers() == 0 {
        return Err(PipelineError::configuration(
            "分配ワーカー数は1以上である必要があります",
        ));
    }
    if config.channel_buffer_size() == 0 {
        return Err(PipelineError::configuration(
            "チャンネルバッファサイズは1以上である必要があります",
        ));
    }
    if config.max_ingredient_value() < 1 {
        return Err(PipelineError::configuration(
            "食材の最大値は1以上である必要があります",
        ));
    }
    Ok(())
}
