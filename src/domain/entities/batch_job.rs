//! # BatchJob Entity
//!
//! 複数ファイルの一括送信ジョブ

use super::submission_request::{FilePart, SubmissionRequest, DEFAULT_FILE_FIELD};
use crate::domain::services::progress::ProgressCounter;
use crate::error::SubmitError;

/// デフォルトの同時送信数
pub const DEFAULT_CONCURRENCY_LIMIT: usize = 8;
/// デフォルトのZIP化しきい値
pub const DEFAULT_ZIP_THRESHOLD: usize = 4;

/// チャンク内の1ファイル分のリクエスト
#[derive(Debug)]
pub struct ChunkItem {
    /// バッチ内でのファイル位置（0始まり）
    pub index: usize,
    /// 元のファイル名
    pub file_name: String,
    /// ファイル1つだけを含むリクエスト
    ///
    /// 検証に失敗したファイルはエラーのまま保持し、そのファイルだけを失敗扱いにする
    pub request: Result<SubmissionRequest, SubmitError>,
}

/// 一括送信ジョブ
///
/// 送信順のファイル列・共有フィールド・同時送信数・ZIPしきい値と、
/// 進捗カウンタを排他的に所有する。バッチ完了後に破棄される。
#[derive(Debug)]
pub struct BatchJob {
    files: Vec<FilePart>,
    shared_fields: Vec<(String, String)>,
    file_field: String,
    concurrency_limit: usize,
    zip_threshold: usize,
    progress: ProgressCounter,
}

impl BatchJob {
    /// 新しいジョブを作成
    ///
    /// `concurrency_limit` が0の場合はデフォルト値を使う
    pub fn new(
        files: Vec<FilePart>,
        shared_fields: Vec<(String, String)>,
        concurrency_limit: usize,
        zip_threshold: usize,
    ) -> Self {
        let total = files.len();
        let concurrency_limit = if concurrency_limit == 0 {
            DEFAULT_CONCURRENCY_LIMIT
        } else {
            concurrency_limit
        };

        Self {
            files,
            shared_fields,
            file_field: DEFAULT_FILE_FIELD.to_string(),
            concurrency_limit,
            zip_threshold,
            progress: ProgressCounter::new(total),
        }
    }

    /// ファイルフィールド名を変更
    pub fn with_file_field(mut self, file_field: impl Into<String>) -> Self {
        self.file_field = file_field.into();
        self
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn concurrency_limit(&self) -> usize {
        self.concurrency_limit
    }

    pub fn zip_threshold(&self) -> usize {
        self.zip_threshold
    }

    /// ZIPにまとめるかどうか
    ///
    /// ファイル数がしきい値を「超える」場合のみ。同数は個別ダウンロード。
    pub fn zip_files(&self) -> bool {
        self.files.len() > self.zip_threshold
    }

    /// 各チャンクのサイズ
    pub fn chunk_sizes(&self) -> Vec<usize> {
        self.files
            .chunks(self.concurrency_limit)
            .map(|chunk| chunk.len())
            .collect()
    }

    /// ファイルを連続したチャンクに分割し、ファイルごとのリクエストを構築
    pub fn chunks(&self) -> Vec<Vec<ChunkItem>> {
        let mut chunks = Vec::with_capacity(self.files.len().div_ceil(self.concurrency_limit));

        for (chunk_num, chunk) in self.files.chunks(self.concurrency_limit).enumerate() {
            let mut items = Vec::with_capacity(chunk.len());
            for (offset, file) in chunk.iter().enumerate() {
                let request = SubmissionRequest::builder()
                    .file_field(self.file_field.clone())
                    .fields(self.shared_fields.iter().cloned())
                    .file(file.clone())
                    .build();
                items.push(ChunkItem {
                    index: chunk_num * self.concurrency_limit + offset,
                    file_name: file.name.clone(),
                    request,
                });
            }
            chunks.push(items);
        }

        chunks
    }

    /// 進捗カウンタ
    pub fn progress(&self) -> &ProgressCounter {
        &self.progress
    }

    /// 1ファイル完了として進捗を進め、表示用の割合を返す
    pub fn advance_progress(&mut self) -> f64 {
        self.progress.advance()
    }

    /// 進捗を100%に固定
    pub fn complete_progress(&mut self) {
        self.progress.force_complete();
    }
}
