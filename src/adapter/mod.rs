//! Adapter Layer
//!
//! 外部システム（HTTP, ファイルシステム, 端末）との統合

pub mod archive;
pub mod config;
pub mod http;
pub mod presenter;
pub mod sink;
pub mod telemetry;
