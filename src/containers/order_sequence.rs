// OrderSequence - 挿入順を保持する注文の単方向連結リスト
// 全操作を構造全体のMutex1つで直列化する（粗粒度ロック）

use crate::core::{DiagnosticSink, OrderRecord, PipelineError, PipelineResult};
use crate::services::monitoring::TracingDiagnosticSink;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

struct OrderNode {
    record: OrderRecord,
    next: Option<Box<OrderNode>>,
}

#[derive(Default)]
struct OrderChain {
    head: Option<Box<OrderNode>>,
}

impl OrderChain {
    fn iter(&self) -> impl Iterator<Item = &OrderRecord> {
        std::iter::successors(self.head.as_deref(), |node| node.next.as_deref())
            .map(|node| &node.record)
    }

    fn len(&self) -> usize {
        self.iter().count()
    }

    /// `index` 番目の要素を指すスロット（末尾なら空スロット）
    fn slot_mut(&mut self, index: usize) -> &mut Option<Box<OrderNode>> {
        let mut cursor = &mut self.head;
        let mut remaining = index;
        while remaining > 0 {
            match cursor {
                Some(node) => {
                    cursor = &mut node.next;
                    remaining -= 1;
                }
                None => break,
            }
        }
        cursor
    }
}

impl Drop for OrderChain {
    // 長いチェーンで再帰的なdropがスタックを食い潰さないよう、ループで解放する
    fn drop(&mut self) {
        let mut cursor = self.head.take();
        while let Some(mut node) = cursor {
            cursor = node.next.take();
        }
    }
}

/// 並行アクセス可能な注文シーケンス
///
/// ノードは外部に公開しない。読み出しは常に `snapshot` のコピー経由。
pub struct OrderSequence {
    chain: Mutex<OrderChain>,
    diagnostics: Arc<dyn DiagnosticSink>,
}

impl OrderSequence {
    pub fn new() -> Self {
        Self::with_diagnostics(Arc::new(TracingDiagnosticSink::new()))
    }

    /// 診断の通知先を指定して作成
    pub fn with_diagnostics(diagnostics: Arc<dyn DiagnosticSink>) -> Self {
        Self {
            chain: Mutex::new(OrderChain::default()),
            diagnostics,
        }
    }

    fn lock(&self) -> MutexGuard<'_, OrderChain> {
        self.chain.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// 末尾に追加（末尾ポインタは持たず毎回O(n)で走査する）
    pub fn append(&self, order_id: u64, origin: impl Into<String>, item_type: impl Into<String>) {
        self.append_record(OrderRecord::new(order_id, origin, item_type));
    }

    pub fn append_record(&self, record: OrderRecord) {
        let mut chain = self.lock();
        let len = chain.len();
        *chain.slot_mut(len) = Some(Box::new(OrderNode { record, next: None }));
    }

    /// `index` 番目（0始まり）に挿入
    ///
    /// 長さを超えるインデックスは操作を破棄し、診断だけを通知する。
    /// 呼び出し元にはエラーを返さない。
    pub fn insert_at(
        &self,
        index: usize,
        order_id: u64,
        origin: impl Into<String>,
        item_type: impl Into<String>,
    ) {
        let record = OrderRecord::new(order_id, origin, item_type);
        if let Err(diagnostic) = self.try_insert_at(index, record) {
            self.diagnostics.report(&diagnostic);
        }
    }

    /// `insert_at` のエラーを返す版
    pub fn try_insert_at(&self, index: usize, record: OrderRecord) -> PipelineResult<()> {
        let mut chain = self.lock();
        let len = chain.len();
        if index > len {
            return Err(PipelineError::index_out_of_range(index, len));
        }

        let slot = chain.slot_mut(index);
        let next = slot.take();
        *slot = Some(Box::new(OrderNode { record, next }));
        Ok(())
    }

    /// 先頭から探して最初に一致した注文だけを削除
    ///
    /// 見つからない場合や空の場合は何もしない。削除したかどうかを返す。
    pub fn remove_by_id(&self, order_id: u64) -> bool {
        let mut chain = self.lock();
        let Some(position) = chain.iter().position(|record| record.order_id == order_id) else {
            return false;
        };

        let slot = chain.slot_mut(position);
        if let Some(removed) = slot.take() {
            let OrderNode { next, .. } = *removed;
            *slot = next;
        }
        true
    }

    /// 指定IDの注文が存在するか
    pub fn contains(&self, order_id: u64) -> bool {
        self.lock().iter().any(|record| record.order_id == order_id)
    }

    /// 現在の並び順でコピーを取得
    pub fn snapshot(&self) -> Vec<OrderRecord> {
        self.lock().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().head.is_none()
    }
}

impl Default for OrderSequence {
    fn default() -> Self {
        Self::new()
    }
}
