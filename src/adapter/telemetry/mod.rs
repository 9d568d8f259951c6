//! Telemetry Adapter
//!
//! TelemetryRecorderの実装

pub mod log_telemetry;
