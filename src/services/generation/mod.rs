// タスク生成機能
// 固定比率のタスクバッチを外部コラボレーター（TaskGenerator）から組み立てる

pub mod random;

use crate::core::{PipelineConfig, Task, TaskGenerator};

// 公開API
pub use random::{RandomTaskGenerator, ITEM_TYPES, ORIGINS};

/// タスク種別ごとの生成数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskMix {
    pub add_orders: usize,
    pub remove_orders: usize,
    pub insert_ingredients: usize,
    pub search_ingredients: usize,
}

impl TaskMix {
    /// 設定から比率を決める（削除は追加の半分）
    pub fn from_config(config: &dyn PipelineConfig) -> Self {
        let orders = config.order_task_count();
        let ingredients = config.ingredient_task_count();
        Self {
            add_orders: orders,
            remove_orders: orders / 2,
            insert_ingredients: ingredients,
            search_ingredients: ingredients,
        }
    }

    pub fn total(&self) -> usize {
        self.add_orders + self.remove_orders + self.insert_ingredients + self.search_ingredients
    }
}

/// タスクバッチを生成
///
/// 追加（ID 1..=add_orders）→ 削除 → 食材挿入 → 食材検索 の順に並べる。
pub fn generate_batch(generator: &dyn TaskGenerator, mix: &TaskMix) -> Vec<Task> {
    let mut tasks = Vec::with_capacity(mix.total());

    for order_id in 1..=mix.add_orders as u64 {
        tasks.push(Task::AddOrder(generator.generate_order(order_id)));
    }

    for _ in 0..mix.remove_orders {
        tasks.push(Task::RemoveOrder {
            order_id: generator.pick_order_id(mix.add_orders as u64),
        });
    }

    for _ in 0..mix.insert_ingredients {
        tasks.push(Task::InsertIngredient {
            value: generator.generate_ingredient(),
        });
    }

    for _ in 0..mix.search_ingredients {
        tasks.push(Task::SearchIngredient {
            value: generator.generate_ingredient(),
        });
    }

    tasks
}
