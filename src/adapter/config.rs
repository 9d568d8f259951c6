//! Configuration Loading
//!
//! JSON設定ファイルの読み込みと、アプリケーション層の設定への変換

use anyhow::{Context, Result};
use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::application::dto::submit_config::{BoredWaiting, DownloadOption, SubmitConfig};
use crate::domain::entities::batch_job::{DEFAULT_CONCURRENCY_LIMIT, DEFAULT_ZIP_THRESHOLD};
use crate::domain::entities::submission_request::DEFAULT_FILE_FIELD;
use crate::error::SubmitError;

/// 設定ファイルの内容
///
/// 未指定の項目はすべてデフォルト値になる
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// 相対パスのエンドポイントを解決する基準URL
    pub base_url: String,
    /// 0以下はデフォルト値として扱う
    pub zip_threshold: i64,
    pub concurrency_limit: usize,
    pub download_option: DownloadOption,
    pub bored_waiting: BoredWaiting,
    pub output_dir: String,
    pub analytics_enabled: bool,
    pub multiple_inputs_for_single_request: bool,
    pub file_field: String,
    pub request_timeout_secs: u64,
    pub clear_selection: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            zip_threshold: DEFAULT_ZIP_THRESHOLD as i64,
            concurrency_limit: DEFAULT_CONCURRENCY_LIMIT,
            download_option: DownloadOption::default(),
            bored_waiting: BoredWaiting::default(),
            output_dir: "./downloads".to_string(),
            analytics_enabled: false,
            multiple_inputs_for_single_request: false,
            file_field: DEFAULT_FILE_FIELD.to_string(),
            request_timeout_secs: 300,
            clear_selection: true,
        }
    }
}

impl Config {
    /// 設定ファイルを読み込む
    ///
    /// ファイルが存在しない場合はデフォルト設定を返す
    pub fn load(path: &str) -> Result<Self> {
        let expanded = shellexpand::tilde(path);
        let path = Path::new(expanded.as_ref());

        if !path.exists() {
            info!(
                "No config file at {}, using defaults",
                path.display()
            );
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;
        let config: Config = serde_json::from_str(&content)
            .context(format!("Failed to parse config file: {}", path.display()))?;
        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> Result<(), SubmitError> {
        if self.base_url.trim().is_empty() {
            return Err(SubmitError::Config("base_url must not be empty".to_string()));
        }
        if self.file_field.trim().is_empty() {
            return Err(SubmitError::Config("file_field must not be empty".to_string()));
        }
        Ok(())
    }

    /// ZIP化しきい値（0以下はデフォルト）
    pub fn effective_zip_threshold(&self) -> usize {
        if self.zip_threshold > 0 {
            self.zip_threshold as usize
        } else {
            DEFAULT_ZIP_THRESHOLD
        }
    }

    /// 出力ディレクトリ（`~` 展開済み）
    pub fn output_dir(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.output_dir).as_ref())
    }

    /// アプリケーション層の送信設定に変換
    pub fn to_submit_config(&self) -> SubmitConfig {
        SubmitConfig {
            zip_threshold: self.effective_zip_threshold(),
            concurrency_limit: if self.concurrency_limit == 0 {
                DEFAULT_CONCURRENCY_LIMIT
            } else {
                self.concurrency_limit
            },
            download_option: self.download_option,
            bored_waiting: self.bored_waiting,
            multiple_inputs_for_single_request: self.multiple_inputs_for_single_request,
            file_field: self.file_field.clone(),
            clear_selection: self.clear_selection,
        }
    }
}
