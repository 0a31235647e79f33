// IngredientCatalog - 食材値の二分探索木
// ノードごとにMutexを持つ細粒度ロック。子の判断へ進む前に親のロックは解放する

use crate::core::{CatalogSummary, DiagnosticSink, PipelineError, PipelineResult};
use crate::services::monitoring::TracingDiagnosticSink;
use std::cmp::Ordering as ValueOrdering;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

/// 木のノード
///
/// 子スロットは一度だけ埋まる `OnceLock`。埋める判断は `gate` を保持した状態で行い、
/// 検索・走査はロックなしで読む。
struct IngredientNode {
    value: AtomicI64,
    left: OnceLock<Box<IngredientNode>>,
    right: OnceLock<Box<IngredientNode>>,
    gate: Mutex<()>,
}

impl IngredientNode {
    fn new(value: i64) -> Self {
        Self {
            value: AtomicI64::new(value),
            left: OnceLock::new(),
            right: OnceLock::new(),
            gate: Mutex::new(()),
        }
    }

    fn value(&self) -> i64 {
        self.value.load(Ordering::Acquire)
    }

    fn left(&self) -> Option<&IngredientNode> {
        self.left.get().map(|node| node.as_ref())
    }

    fn right(&self) -> Option<&IngredientNode> {
        self.right.get().map(|node| node.as_ref())
    }

    fn is_leaf(&self) -> bool {
        self.left.get().is_none() && self.right.get().is_none()
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        self.gate.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// 並行挿入可能な食材カタログ
///
/// 構築直後のルートは値0・子なしの「空スロット」。値0をルートに入れても空と区別できない。
/// 検索・走査・集計はこの状態のルートを空として扱う。
/// ルート以下に値0の葉があれば、次にそこへ到達した挿入で上書きされる。
pub struct IngredientCatalog {
    root: IngredientNode,
    diagnostics: Arc<dyn DiagnosticSink>,
}

impl IngredientCatalog {
    pub fn new() -> Self {
        Self::with_diagnostics(Arc::new(TracingDiagnosticSink::new()))
    }

    /// 診断の通知先を指定して作成
    pub fn with_diagnostics(diagnostics: Arc<dyn DiagnosticSink>) -> Self {
        Self {
            root: IngredientNode::new(0),
            diagnostics,
        }
    }

    fn root_is_empty_slot(&self) -> bool {
        self.root.value() == 0 && self.root.is_leaf()
    }

    /// 値を挿入。重複は破棄して診断を通知する
    pub fn insert(&self, value: i64) {
        if let Err(diagnostic) = self.try_insert(value) {
            self.diagnostics.report(&diagnostic);
        }
    }

    /// `insert` のエラーを返す版
    ///
    /// 値0・子なしのノードはどの深さでも空スロットとして扱い、到達した挿入で上書きする。
    /// 空スロットへの0の挿入は既存値との重複として `DuplicateIngredient` を返す。
    pub fn try_insert(&self, value: i64) -> PipelineResult<()> {
        let mut node = &self.root;

        loop {
            let gate = node.lock();
            let current = node.value();

            if current == 0 && node.is_leaf() {
                if value == 0 {
                    return Err(PipelineError::duplicate_ingredient(value));
                }
                node.value.store(value, Ordering::Release);
                return Ok(());
            }

            let slot = match value.cmp(&current) {
                ValueOrdering::Less => &node.left,
                ValueOrdering::Greater => &node.right,
                ValueOrdering::Equal => return Err(PipelineError::duplicate_ingredient(value)),
            };

            match slot.get() {
                Some(child) => {
                    drop(gate);
                    node = child.as_ref();
                }
                None => {
                    // gate保持中はこのスロットを他のスレッドが埋めることはない
                    let _ = slot.set(Box::new(IngredientNode::new(value)));
                    return Ok(());
                }
            }
        }
    }

    /// 値が存在するか
    ///
    /// ロックを取らないため、並行中の挿入は見えないことがある。
    pub fn search(&self, value: i64) -> bool {
        if self.root_is_empty_slot() {
            return false;
        }

        let mut current = Some(&self.root);
        while let Some(node) = current {
            current = match value.cmp(&node.value()) {
                ValueOrdering::Less => node.left(),
                ValueOrdering::Greater => node.right(),
                ValueOrdering::Equal => return true,
            };
        }
        false
    }

    /// 昇順の値一覧（中順走査）
    ///
    /// 並行挿入とは同期しない。一貫した結果が必要なら呼び出し側で静止させること。
    pub fn traverse_in_order(&self) -> Vec<i64> {
        let mut values = Vec::new();
        if self.root_is_empty_slot() {
            return values;
        }

        let mut stack: Vec<&IngredientNode> = Vec::new();
        let mut current = Some(&self.root);
        while current.is_some() || !stack.is_empty() {
            while let Some(node) = current {
                stack.push(node);
                current = node.left();
            }
            if let Some(node) = stack.pop() {
                values.push(node.value());
                current = node.right();
            }
        }
        values
    }

    /// 最小値・最大値・合計
    ///
    /// 空のカタログは (0, 0, 0)。
    pub fn find_min_max_sum(&self) -> CatalogSummary {
        if self.root_is_empty_slot() {
            return CatalogSummary::default();
        }

        let mut leftmost = &self.root;
        while let Some(node) = leftmost.left() {
            leftmost = node;
        }

        let mut rightmost = &self.root;
        while let Some(node) = rightmost.right() {
            rightmost = node;
        }

        let mut sum = 0i64;
        let mut stack = vec![&self.root];
        while let Some(node) = stack.pop() {
            sum = sum.wrapping_add(node.value());
            stack.extend(node.left());
            stack.extend(node.right());
        }

        CatalogSummary {
            min: leftmost.value(),
            max: rightmost.value(),
            sum,
        }
    }

    pub fn len(&self) -> usize {
        self.traverse_in_order().len()
    }

    pub fn is_empty(&self) -> bool {
        self.root_is_empty_slot()
    }
}

impl Default for IngredientCatalog {
    fn default() -> Self {
        Self::new()
    }
}
