//! Download Sink Adapter
//!
//! DownloadSinkのファイルシステム実装

pub mod file_download_sink;
