//! Log Telemetry
//!
//! 計測イベントをJSONとしてログに出力する

use log::{info, warn};

use crate::domain::ports::telemetry::{FileProcessingEvent, TelemetryRecorder};

/// 計測ログのターゲット（`RUST_LOG=telemetry=info` で絞り込める）
pub const TELEMETRY_TARGET: &str = "telemetry";

/// イベントを `telemetry` ターゲットのログとして記録する
pub struct LogTelemetryRecorder;

impl LogTelemetryRecorder {
    pub fn new() -> Self {
        Self
    }

    pub fn to_json(event: &FileProcessingEvent) -> Option<String> {
        match serde_json::to_string(event) {
            Ok(json) => Some(json),
            Err(e) => {
                warn!("Failed to serialize telemetry event: {}", e);
                None
            }
        }
    }
}

impl Default for LogTelemetryRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl TelemetryRecorder for LogTelemetryRecorder {
    fn record(&self, event: &FileProcessingEvent) {
        if let Some(json) = Self::to_json(event) {
            info!(target: TELEMETRY_TARGET, "file_processing {}", json);
        }
    }
}

/// 分析が無効な場合の記録先（何もしない）
pub struct NoopTelemetryRecorder;

impl TelemetryRecorder for NoopTelemetryRecorder {
    fn record(&self, _event: &FileProcessingEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono::Utc;

    fn event() -> FileProcessingEvent {
        FileProcessingEvent {
            success: false,
            file_type: "application/pdf".to_string(),
            file_size: 2048,
            processing_time_ms: 153,
            error_message: Some("422".to_string()),
            pdf_pages: Some(3),
            recorded_at: Utc.with_ymd_and_hms(2024, 12, 25, 10, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_event_serializes_to_json() {
        let json = LogTelemetryRecorder::to_json(&event()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["success"], false);
        assert_eq!(value["file_size"], 2048);
        assert_eq!(value["processing_time_ms"], 153);
        assert_eq!(value["error_message"], "422");
        assert_eq!(value["pdf_pages"], 3);
    }

    #[test]
    fn test_recorders_accept_events() {
        LogTelemetryRecorder::new().record(&event());
        NoopTelemetryRecorder.record(&event());
    }
}
