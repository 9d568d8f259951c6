//! # Download Sink Trait
//!
//! 成果物の実体化（保存・表示）を抽象化

use anyhow::Result;
use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use crate::domain::entities::aggregation::{DeliveryMode, MaterializedDownload};
use crate::domain::entities::outcome::Artifact;

/// ダウンロード先
///
/// 一時的な参照の取得から解放までを1回の呼び出しの中で完結させる
#[cfg_attr(test, automock)]
#[async_trait]
pub trait DownloadSink: Send + Sync {
    /// 成果物を実体化する
    ///
    /// # Errors
    ///
    /// 書き込みに失敗した場合
    async fn materialize(
        &self,
        artifact: &Artifact,
        mode: DeliveryMode,
    ) -> Result<MaterializedDownload>;
}
