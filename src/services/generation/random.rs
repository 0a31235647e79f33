// ランダムなテストデータ生成

use crate::core::{OrderRecord, PipelineConfig, Task, TaskGenerator};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use std::sync::{Mutex, PoisonError};

/// 注文元の惑星
pub const ORIGINS: &[&str] = &[
    "Mars",
    "Venus",
    "Jupiter",
    "Saturn",
    "Neptune",
    "Pluto",
    "Andromeda Nebula",
];

/// 商品の種類
pub const ITEM_TYPES: &[&str] = &[
    "BlackHole Pepperoni",
    "Galactic Cheese",
    "Quantum Anchoa",
    "Nebula Deluxe",
    "Supernova Supreme",
    "Dark Matter Veggie",
    "Antimatter Pizza",
];

/// 乱数ベースのタスク生成器
///
/// 乱数源はMutexで保護し、複数タスクから共有できるようにする。
pub struct RandomTaskGenerator {
    rng: Mutex<StdRng>,
    max_ingredient: i64,
    max_order_id: u64,
}

impl RandomTaskGenerator {
    pub fn new(max_ingredient: i64) -> Self {
        Self::from_rng(StdRng::from_os_rng(), max_ingredient)
    }

    /// 再現可能な系列を生成（テスト用）
    pub fn seeded(seed: u64, max_ingredient: i64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed), max_ingredient)
    }

    pub fn from_config(config: &dyn PipelineConfig) -> Self {
        Self::new(config.max_ingredient_value())
    }

    fn from_rng(rng: StdRng, max_ingredient: i64) -> Self {
        Self {
            rng: Mutex::new(rng),
            max_ingredient: max_ingredient.max(1),
            max_order_id: 100,
        }
    }

    fn with_rng<T>(&self, f: impl FnOnce(&mut StdRng) -> T) -> T {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut *rng)
    }
}

impl TaskGenerator for RandomTaskGenerator {
    fn generate_order(&self, order_id: u64) -> OrderRecord {
        self.with_rng(|rng| {
            let origin = ORIGINS.choose(rng).copied().unwrap_or("Mars");
            let item_type = ITEM_TYPES.choose(rng).copied().unwrap_or("Galactic Cheese");
            OrderRecord::new(order_id, origin, item_type)
        })
    }

    fn generate_ingredient(&self) -> i64 {
        let max = self.max_ingredient;
        self.with_rng(|rng| rng.random_range(1..=max))
    }

    fn pick_order_id(&self, upper: u64) -> u64 {
        let upper = upper.max(1);
        self.with_rng(|rng| rng.random_range(1..=upper))
    }

    fn generate_task(&self) -> Task {
        let kind = self.with_rng(|rng| rng.random_range(0..4u8));
        match kind {
            0 => {
                let order_id = self.pick_order_id(self.max_order_id);
                Task::AddOrder(self.generate_order(order_id))
            }
            1 => Task::RemoveOrder {
                order_id: self.pick_order_id(self.max_order_id),
            },
            2 => Task::InsertIngredient {
                value: self.generate_ingredient(),
            },
            _ => Task::SearchIngredient {
                value: self.generate_ingredient(),
            },
        }
    }
}
