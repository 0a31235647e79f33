// 共有コンテナ層 - 並行に変更される注文シーケンスと食材カタログ
// どちらもArcで共有し、同期化されたメソッド経由でのみ変更する

pub mod ingredient_catalog;
pub mod order_sequence;

// 公開API
pub use ingredient_catalog::IngredientCatalog;
pub use order_sequence::OrderSequence;
