// コンテナ・プール・分配器で共通に使うエラー型定義

use thiserror::Error;

/// パイプライン固有のエラー型
///
/// コンテナ操作のエラーは呼び出し元へは返さず、診断チャネルへ流す。
/// `try_*` 系の内部APIだけがこの型を直接返す。
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("インデックス範囲外: index={index} (len={len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("重複した食材: {value} は既にカタログに存在します")]
    DuplicateIngredient { value: i64 },

    #[error("ワーカープールは停止済みです")]
    PoolClosed,

    #[error("分配器は停止済みです")]
    DistributorStopped,

    #[error("ジョブ実行エラー: {source}")]
    ActionFailed {
        #[source]
        source: anyhow::Error,
    },

    #[error("設定エラー: {message}")]
    Configuration { message: String },

    #[error("チャンネルエラー: {message}")]
    Channel { message: String },

    #[error("タスクエラー: {source}")]
    Task {
        #[source]
        source: tokio::task::JoinError,
    },

    #[error("内部エラー: {source}")]
    Internal {
        #[source]
        source: anyhow::Error,
    },
}

impl PipelineError {
    /// インデックス範囲外エラーの作成
    pub fn index_out_of_range(index: usize, len: usize) -> Self {
        Self::IndexOutOfRange { index, len }
    }

    /// 重複食材エラーの作成
    pub fn duplicate_ingredient(value: i64) -> Self {
        Self::DuplicateIngredient { value }
    }

    /// ジョブ実行エラーの作成
    pub fn action_failed(source: anyhow::Error) -> Self {
        Self::ActionFailed { source }
    }

    /// 設定エラーの作成
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// チャンネルエラーの作成
    pub fn channel(message: impl Into<String>) -> Self {
        Self::Channel {
            message: message.into(),
        }
    }

    /// タスクエラーの作成
    pub fn task(source: tokio::task::JoinError) -> Self {
        Self::Task { source }
    }

    /// 内部エラーの作成
    pub fn internal(source: anyhow::Error) -> Self {
        Self::Internal { source }
    }

    /// ログや集計で使う識別子
    pub fn code(&self) -> &'static str {
        match self {
            Self::IndexOutOfRange { .. } => "index_out_of_range",
            Self::DuplicateIngredient { .. } => "duplicate_ingredient",
            Self::PoolClosed => "pool_closed",
            Self::DistributorStopped => "distributor_stopped",
            Self::ActionFailed { .. } => "action_failed",
            Self::Configuration { .. } => "configuration",
            Self::Channel { .. } => "channel",
            Self::Task { .. } => "task",
            Self::Internal { .. } => "internal",
        }
    }

    /// 診断として握りつぶしてよいエラーかどうか
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::IndexOutOfRange { .. }
            | Self::DuplicateIngredient { .. }
            | Self::ActionFailed { .. }
            | Self::DistributorStopped
            | Self::PoolClosed
            | Self::Channel { .. } => true,
            Self::Configuration { .. } | Self::Task { .. } | Self::Internal { .. } => false,
        }
    }
}

impl From<tokio::task::JoinError> for PipelineError {
    fn from(source: tokio::task::JoinError) -> Self {
        Self::task(source)
    }
}

impl From<anyhow::Error> for PipelineError {
    fn from(source: anyhow::Error) -> Self {
        Self::internal(source)
    }
}

/// パイプライン処理の結果型
pub type PipelineResult<T> = Result<T, PipelineError>;
