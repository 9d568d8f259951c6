//! # Submission Gateway Trait
//!
//! リクエスト1件分のHTTP送信を抽象化

use anyhow::Result;
use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use crate::domain::entities::http_response::HttpResponse;
use crate::domain::entities::submission_request::SubmissionRequest;

/// 送信ゲートウェイ
///
/// 1回の呼び出しで必ず1回だけリクエストを送る。リトライはしない。
#[cfg_attr(test, automock)]
#[async_trait]
pub trait SubmissionGateway: Send + Sync {
    /// フォームをPOSTし、完了した応答を返す
    ///
    /// # Arguments
    ///
    /// * `endpoint` - 送信先（絶対URLまたはベースURLからのパス）
    /// * `request` - 送信するフォーム
    ///
    /// # Errors
    ///
    /// 応答が得られなかった場合（ネットワークエラーなど）
    async fn send(&self, endpoint: &str, request: &SubmissionRequest) -> Result<HttpResponse>;
}
