//! # SubmissionOutcome
//!
//! 1回の送信結果の分類

use std::fmt;

/// サーバーから返却された成果物
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub filename: String,
    pub payload: Vec<u8>,
    pub content_type: String,
}

impl Artifact {
    pub fn new(
        filename: impl Into<String>,
        payload: Vec<u8>,
        content_type: impl Into<String>,
    ) -> Self {
        Self {
            filename: filename.into(),
            payload,
            content_type: content_type.into(),
        }
    }

    /// ブラウザ的に表示可能な種類（PDFまたは画像）かどうか
    pub fn is_viewable(&self) -> bool {
        let content_type = self.content_type.to_ascii_lowercase();
        content_type.contains("application/pdf") || content_type.contains("image/")
    }
}

/// 送信結果
///
/// 完了した送信ごとに必ずいずれか1つのバリアントになる
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    /// 成功（成果物あり）
    Success(Artifact),
    /// セッション切れ（HTTP 401）
    AuthExpired,
    /// サーバーが報告した処理エラー
    DomainError {
        status: u16,
        error_code: String,
        message: String,
        trace: String,
    },
    /// パスワード保護されたPDF
    PasswordRequired,
    /// 通信エラー、または構造化されていないエラー応答
    TransportError(String),
}

impl SubmissionOutcome {
    #[inline]
    pub fn is_success(&self) -> bool {
        matches!(self, SubmissionOutcome::Success(_))
    }

    /// バッチ全体を止めるべき結果かどうか
    #[inline]
    pub fn is_fatal(&self) -> bool {
        matches!(self, SubmissionOutcome::AuthExpired)
    }

    /// テレメトリ用のエラー表現
    ///
    /// HTTPステータスが分かる場合はステータス、それ以外はメッセージ
    pub fn error_summary(&self) -> Option<String> {
        match self {
            SubmissionOutcome::Success(_) => None,
            SubmissionOutcome::AuthExpired => Some("401".to_string()),
            SubmissionOutcome::DomainError { status, .. } => Some(status.to_string()),
            SubmissionOutcome::PasswordRequired => Some("password required".to_string()),
            SubmissionOutcome::TransportError(message) => Some(message.clone()),
        }
    }
}

impl fmt::Display for SubmissionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmissionOutcome::Success(artifact) => write!(f, "success ({})", artifact.filename),
            SubmissionOutcome::AuthExpired => write!(f, "session expired"),
            SubmissionOutcome::DomainError {
                status,
                error_code,
                message,
                ..
            } => write!(f, "{} {}: {}", status, error_code, message),
            SubmissionOutcome::PasswordRequired => write!(f, "password required"),
            SubmissionOutcome::TransportError(message) => write!(f, "{}", message),
        }
    }
}
