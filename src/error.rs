//! # Error Types
//!
//! 送信結果（`SubmissionOutcome`）に含まれないローカルエラー

use thiserror::Error;

/// ローカル処理のエラー
///
/// サーバー由来の失敗は `SubmissionOutcome` の値として扱い、ここには含めない
#[derive(Debug, Error)]
pub enum SubmitError {
    /// 送信前の検証に失敗したリクエスト
    #[error("invalid submission request: {0}")]
    InvalidRequest(String),

    /// 成果物の保存・表示に失敗
    #[error("failed to materialize '{filename}': {source}")]
    Sink {
        filename: String,
        #[source]
        source: anyhow::Error,
    },

    /// ZIPアーカイブの生成に失敗
    #[error("failed to build archive: {0}")]
    ArchiveBuild(#[source] anyhow::Error),

    /// 設定ファイルの不備
    #[error("invalid configuration: {0}")]
    Config(String),
}
