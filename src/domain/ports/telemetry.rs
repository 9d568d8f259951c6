//! # Telemetry Recorder Trait
//!
//! ファイル処理ごとの計測イベント

use chrono::{DateTime, Utc};
use serde::Serialize;

#[cfg(test)]
use mockall::automock;

/// 1回の送信に対する計測イベント
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileProcessingEvent {
    pub success: bool,
    /// 送信元ファイルの宣言MIMEタイプ（不明なら "unknown"）
    pub file_type: String,
    pub file_size: u64,
    pub processing_time_ms: u64,
    pub error_message: Option<String>,
    /// PDFのページ数（PDF以外、または解析失敗時は `None`）
    pub pdf_pages: Option<u32>,
    pub recorded_at: DateTime<Utc>,
}

/// 計測イベントの記録先
#[cfg_attr(test, automock)]
pub trait TelemetryRecorder: Send + Sync {
    fn record(&self, event: &FileProcessingEvent);
}
