//! # Submit Configuration DTO
//!
//! 送信処理の設定のData Transfer Object

use serde::{Deserialize, Serialize};

use crate::domain::entities::aggregation::DeliveryMode;
use crate::domain::entities::batch_job::{DEFAULT_CONCURRENCY_LIMIT, DEFAULT_ZIP_THRESHOLD};
use crate::domain::entities::submission_request::DEFAULT_FILE_FIELD;

/// 表示可能な単一の成果物をどう扱うか
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DownloadOption {
    /// 同じウィンドウで表示
    SameWindow,
    /// 新しいウィンドウで表示
    NewWindow,
    /// 常に保存
    #[default]
    Download,
}

impl DownloadOption {
    /// 表示可能な単一成果物に対する受け渡し方法
    pub fn delivery_mode(self) -> DeliveryMode {
        match self {
            DownloadOption::SameWindow => DeliveryMode::ViewInPlace,
            DownloadOption::NewWindow => DeliveryMode::ViewInNewWindow,
            DownloadOption::Download => DeliveryMode::Download,
        }
    }
}

/// 待ち時間ヒントの有効/無効（表示のみの設定）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum BoredWaiting {
    Enabled,
    #[default]
    Disabled,
}

/// 複数ファイルの扱いを強制する指定
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SubmitOverride {
    /// ファイルごとに送信
    Multi,
    /// 全ファイルを1リクエストで送信
    Single,
}

/// 送信設定
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitConfig {
    /// このファイル数を超えるとZIPにまとめる
    pub zip_threshold: usize,
    /// 同時送信数（チャンクサイズ）
    pub concurrency_limit: usize,
    pub download_option: DownloadOption,
    pub bored_waiting: BoredWaiting,
    /// 操作が複数ファイルを1リクエストで受け付けるか（結合など）
    pub multiple_inputs_for_single_request: bool,
    pub file_field: String,
    /// 送信後にファイル選択をクリアするか
    pub clear_selection: bool,
}

impl Default for SubmitConfig {
    fn default() -> Self {
        Self {
            zip_threshold: DEFAULT_ZIP_THRESHOLD,
            concurrency_limit: DEFAULT_CONCURRENCY_LIMIT,
            download_option: DownloadOption::default(),
            bored_waiting: BoredWaiting::default(),
            multiple_inputs_for_single_request: false,
            file_field: DEFAULT_FILE_FIELD.to_string(),
            clear_selection: true,
        }
    }
}
