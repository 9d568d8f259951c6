//! # Domain Ports
//!
//! 外部コラボレーター（HTTP送信、ダウンロード、画面表示など）の trait 定義
//!
//! ## 特徴
//!
//! - Domain層では実装を持たない（traitの定義のみ）
//! - Adapter層で具体的な実装を提供
//! - 依存性逆転の原則（DIP）を実現

pub mod archive_writer;
pub mod download_sink;
pub mod presenter;
pub mod progress_reporter;
pub mod submission_gateway;
pub mod telemetry;
