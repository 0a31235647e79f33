// パイプラインで扱うデータ型定義

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 注文レコード
///
/// 同一IDの重複はコンテナ側では禁止しない。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub order_id: u64,
    pub origin: String,
    pub item_type: String,
}

impl OrderRecord {
    pub fn new(order_id: u64, origin: impl Into<String>, item_type: impl Into<String>) -> Self {
        Self {
            order_id,
            origin: origin.into(),
            item_type: item_type.into(),
        }
    }
}

/// タスクの種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskKind {
    AddOrder,
    RemoveOrder,
    InsertIngredient,
    SearchIngredient,
}

/// 分配ステージを流れる作業単位
///
/// 生成後は不変で、ディスパッチ段でちょうど1回だけ消費される。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Task {
    AddOrder(OrderRecord),
    RemoveOrder { order_id: u64 },
    InsertIngredient { value: i64 },
    SearchIngredient { value: i64 },
}

impl Task {
    pub fn kind(&self) -> TaskKind {
        match self {
            Self::AddOrder(_) => TaskKind::AddOrder,
            Self::RemoveOrder { .. } => TaskKind::RemoveOrder,
            Self::InsertIngredient { .. } => TaskKind::InsertIngredient,
            Self::SearchIngredient { .. } => TaskKind::SearchIngredient,
        }
    }

    /// 注文系タスクの注文ID
    pub fn order_id(&self) -> Option<u64> {
        match self {
            Self::AddOrder(record) => Some(record.order_id),
            Self::RemoveOrder { order_id } => Some(*order_id),
            _ => None,
        }
    }

    /// 食材系タスクの値
    pub fn ingredient(&self) -> Option<i64> {
        match self {
            Self::InsertIngredient { value } | Self::SearchIngredient { value } => Some(*value),
            _ => None,
        }
    }
}

/// 食材カタログの集計値
///
/// 空のカタログは (0, 0, 0) になり、実際に0を保持している場合と区別できない。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogSummary {
    pub min: i64,
    pub max: i64,
    pub sum: i64,
}

/// パイプライン実行の最終レポート
///
/// `surviving_orders` / `surviving_ingredients` は結果ストリームから再構成した
/// ベストエフォートの値。正確な状態は `order_snapshot` / `catalog_values` を参照。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineReport {
    pub surviving_orders: Vec<OrderRecord>,
    pub surviving_ingredients: Vec<i64>,
    pub special_item: String,
    pub special_item_present: bool,
    pub order_snapshot: Vec<OrderRecord>,
    pub catalog_values: Vec<i64>,
    pub catalog_summary: CatalogSummary,
    pub tasks_dispatched: usize,
    pub elapsed_ms: u64,
    pub generated_at: DateTime<Utc>,
}
