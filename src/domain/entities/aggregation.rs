//! # Aggregation Types
//!
//! 成果物の集約結果とバッチ全体のレポート

use std::path::PathBuf;

use super::outcome::SubmissionOutcome;

/// ZIPアーカイブのデフォルト名
pub const ARCHIVE_NAME: &str = "files.zip";

/// 成果物の受け渡し方法
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryMode {
    /// 保存（ダウンロード）
    Download,
    /// 同じウィンドウで表示
    ViewInPlace,
    /// 新しいウィンドウで表示
    ViewInNewWindow,
}

/// 実体化された成果物
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterializedDownload {
    pub filename: String,
    pub path: PathBuf,
    pub size: u64,
    pub mode: DeliveryMode,
}

/// アーカイブの1エントリ
///
/// 同名エントリも別エントリとして保持する
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub name: String,
    pub payload: Vec<u8>,
}

/// 集約結果
///
/// バッチごとに、ファイル数がしきい値を超えるかどうかで一度だけ決まる
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AggregationResult {
    /// ZIPアーカイブとして1つにまとめた
    Archive {
        name: String,
        entries: Vec<ArchiveEntry>,
        download: MaterializedDownload,
    },
    /// 個別にダウンロードした
    Individual(Vec<MaterializedDownload>),
}

impl AggregationResult {
    /// 成功した成果物の数
    pub fn success_count(&self) -> usize {
        match self {
            AggregationResult::Archive { entries, .. } => entries.len(),
            AggregationResult::Individual(downloads) => downloads.len(),
        }
    }
}

/// 1ファイル分の失敗
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFailure {
    /// バッチ内でのファイル位置
    pub index: usize,
    pub file_name: String,
    pub outcome: SubmissionOutcome,
}

/// バッチ全体の結果
///
/// 成功した集約結果と、ファイル位置順の失敗リストの両方を持つ
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// 集約結果（ファイル0件、アーカイブを作らなかった・作れなかった場合は `None`）
    pub aggregation: Option<AggregationResult>,
    pub failures: Vec<FileFailure>,
    /// 送信前の検証や成果物の保存に失敗したファイルのエラー
    pub local_errors: Vec<String>,
    pub total: usize,
    pub completed: usize,
    /// 中断により送信されなかったファイル数
    pub skipped: usize,
    /// セッション切れで中断したかどうか
    pub halted: bool,
    pub archive_error: Option<String>,
    pub chunk_sizes: Vec<usize>,
}

impl BatchReport {
    /// 成功したファイル数
    pub fn success_count(&self) -> usize {
        self.aggregation
            .as_ref()
            .map(AggregationResult::success_count)
            .unwrap_or(0)
    }

    /// 失敗が無く中断もしていないか
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
            && self.local_errors.is_empty()
            && !self.halted
            && self.archive_error.is_none()
    }
}
