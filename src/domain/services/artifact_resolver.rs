//! # Artifact Resolver
//!
//! HTTP応答を送信結果に分類するドメインサービス（リトライなし）

use serde::Deserialize;

use crate::domain::entities::http_response::HttpResponse;
use crate::domain::entities::outcome::{Artifact, SubmissionOutcome};

/// Content-Dispositionから取得できない場合のファイル名
pub const DEFAULT_FILENAME: &str = "download";

/// Content-Typeが無い成功応答に使う型
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// パスワード関連エラーのメッセージ（小文字で比較）
const PASSWORD_MARKERS: [&str; 3] = [
    "the password is incorrect",
    "password is not provided",
    "pdf contains an encryption dictionary",
];

/// サーバーのエラーJSON
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ErrorBody {
    error: Option<String>,
    message: Option<String>,
    trace: Option<String>,
}

/// 成果物リゾルバ
pub struct ArtifactResolver;

impl ArtifactResolver {
    /// 応答を分類する
    ///
    /// 同じ応答に対しては常に同じ結果を返す
    pub fn resolve(response: &HttpResponse) -> SubmissionOutcome {
        if response.status == 401 {
            return SubmissionOutcome::AuthExpired;
        }

        if !response.is_success() {
            if response.is_json() {
                return Self::classify_json_error(response);
            }
            return SubmissionOutcome::TransportError(format!(
                "HTTP error: status {}",
                response.status
            ));
        }

        let filename = Self::filename_from_content_disposition(
            response.content_disposition.as_deref(),
        );
        let content_type = response
            .content_type
            .clone()
            .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());

        SubmissionOutcome::Success(Artifact::new(filename, response.body.clone(), content_type))
    }

    /// JSONエラー応答を分類
    fn classify_json_error(response: &HttpResponse) -> SubmissionOutcome {
        let value: serde_json::Value = match serde_json::from_slice(&response.body) {
            Ok(value) => value,
            Err(e) => {
                return SubmissionOutcome::TransportError(format!(
                    "HTTP error: status {} (unreadable error body: {})",
                    response.status, e
                ))
            }
        };

        if Self::is_password_error(&value) {
            return SubmissionOutcome::PasswordRequired;
        }

        let body: ErrorBody = serde_json::from_value(value).unwrap_or_default();
        SubmissionOutcome::DomainError {
            status: response.status,
            error_code: body.error.unwrap_or_default(),
            message: body.message.unwrap_or_default(),
            trace: body.trace.unwrap_or_default(),
        }
    }

    /// エラー本文のどこかにパスワード関連のメッセージが含まれているか
    fn is_password_error(value: &serde_json::Value) -> bool {
        let text = value.to_string().to_lowercase();
        PASSWORD_MARKERS.iter().any(|marker| text.contains(marker))
    }

    /// Content-Dispositionからファイル名を取り出す
    ///
    /// `attachment` 形式のみ対象。`filename="..."` を優先し、
    /// 無ければ `filename*=charset''encoded` を使う。
    /// ヘッダが無い・不正・空の場合は `"download"`。
    pub fn filename_from_content_disposition(header: Option<&str>) -> String {
        let Some(header) = header else {
            return DEFAULT_FILENAME.to_string();
        };
        if !header.to_ascii_lowercase().contains("attachment") {
            return DEFAULT_FILENAME.to_string();
        }

        let mut extended = None;
        for part in split_parameters(header) {
            if let Some(value) = strip_prefix_ignore_case(part, "filename=") {
                if let Some(name) = decode_filename(&value.replace('"', "")) {
                    return name;
                }
            } else if let Some(value) = strip_prefix_ignore_case(part, "filename*=") {
                // charset'lang'encoded
                if let Some(idx) = value.rfind('\'') {
                    extended = decode_filename(&value[idx + 1..].replace('"', ""));
                }
            }
        }

        extended.unwrap_or_else(|| DEFAULT_FILENAME.to_string())
    }
}

/// `;` で区切る（引用符内の `;` は区切りとみなさない）
fn split_parameters(header: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut in_quotes = false;
    let mut start = 0;

    for (idx, ch) in header.char_indices() {
        match ch {
            '"' => in_quotes = !in_quotes,
            ';' if !in_quotes => {
                parts.push(header[start..idx].trim());
                start = idx + 1;
            }
            _ => {}
        }
    }
    parts.push(header[start..].trim());
    parts
}

fn strip_prefix_ignore_case<'a>(value: &'a str, prefix: &str) -> Option<&'a str> {
    match value.get(..prefix.len()) {
        Some(head) if head.eq_ignore_ascii_case(prefix) => Some(&value[prefix.len()..]),
        _ => None,
    }
}

fn decode_filename(raw: &str) -> Option<String> {
    let decoded = urlencoding::decode(raw).ok()?;
    let trimmed = decoded.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
