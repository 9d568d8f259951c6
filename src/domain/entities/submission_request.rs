//! # SubmissionRequest Value Object
//!
//! 1回のPOSTで送信するフォーム（共有フィールド + ファイル）

use crate::error::SubmitError;

/// デフォルトのファイルフィールド名
pub const DEFAULT_FILE_FIELD: &str = "fileInput";

/// 送信対象のファイル
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart {
    /// ファイル名
    pub name: String,
    /// 宣言されたMIMEタイプ（不明な場合は空文字）
    pub content_type: String,
    /// ファイル内容
    pub data: Vec<u8>,
}

impl FilePart {
    /// 新しいファイルパートを作成
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            data,
        }
    }

    /// ファイルサイズ（バイト）
    #[inline]
    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    /// PDFとして宣言されているかどうか
    pub fn is_pdf(&self) -> bool {
        self.content_type.eq_ignore_ascii_case("application/pdf")
    }
}

/// 送信リクエスト
///
/// 共有フィールドは宣言順を保持する。ファイルは `file_field` の名前で送信される。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionRequest {
    fields: Vec<(String, String)>,
    file_field: String,
    files: Vec<FilePart>,
}

impl SubmissionRequest {
    /// ビルダーを作成
    pub fn builder() -> SubmissionRequestBuilder {
        SubmissionRequestBuilder::default()
    }

    /// 共有フィールド（key, value）
    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    /// ファイルフィールド名
    pub fn file_field(&self) -> &str {
        &self.file_field
    }

    /// 添付ファイル
    pub fn files(&self) -> &[FilePart] {
        &self.files
    }

    /// 計測対象となる先頭ファイル
    pub fn primary_file(&self) -> Option<&FilePart> {
        self.files.first()
    }
}

/// `SubmissionRequest` のビルダー
///
/// 送信前に「ファイル1つ + 共有フィールドN個」を検証する。
/// 複数ファイルを1リクエストで送る操作（結合など）は `allow_multiple_files` で明示する。
#[derive(Debug, Clone)]
pub struct SubmissionRequestBuilder {
    fields: Vec<(String, String)>,
    file_field: String,
    files: Vec<FilePart>,
    allow_multiple_files: bool,
}

impl Default for SubmissionRequestBuilder {
    fn default() -> Self {
        Self {
            fields: Vec::new(),
            file_field: DEFAULT_FILE_FIELD.to_string(),
            files: Vec::new(),
            allow_multiple_files: false,
        }
    }
}

impl SubmissionRequestBuilder {
    /// 共有フィールドを追加
    pub fn field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((key.into(), value.into()));
        self
    }

    /// 共有フィールドをまとめて追加
    pub fn fields<I, K, V>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.fields
            .extend(fields.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// ファイルフィールド名を変更
    pub fn file_field(mut self, name: impl Into<String>) -> Self {
        self.file_field = name.into();
        self
    }

    /// ファイルを追加
    ///
    /// 名前が空のファイルは未選択の入力欄として扱い、無視する
    pub fn file(mut self, file: FilePart) -> Self {
        if file.name.trim().is_empty() {
            log::debug!("Dropping empty file entry");
            return self;
        }
        self.files.push(file);
        self
    }

    /// 1リクエストに複数ファイルを許可
    pub fn allow_multiple_files(mut self) -> Self {
        self.allow_multiple_files = true;
        self
    }

    /// リクエストを検証して構築
    ///
    /// # Errors
    ///
    /// ファイルが無い場合、ファイルフィールドが共有フィールドと衝突する場合、
    /// または複数ファイルが許可されていないのに2つ以上ある場合
    pub fn build(self) -> Result<SubmissionRequest, SubmitError> {
        if self.file_field.is_empty() {
            return Err(SubmitError::InvalidRequest(
                "file field name must not be empty".to_string(),
            ));
        }
        if self.fields.iter().any(|(k, _)| k == &self.file_field) {
            return Err(SubmitError::InvalidRequest(format!(
                "shared field '{}' collides with the file field",
                self.file_field
            )));
        }
        match self.files.len() {
            0 => {
                return Err(SubmitError::InvalidRequest(
                    "request has no file attached".to_string(),
                ))
            }
            1 => {}
            n if !self.allow_multiple_files => {
                return Err(SubmitError::InvalidRequest(format!(
                    "expected exactly one file, got {}",
                    n
                )))
            }
            _ => {}
        }

        Ok(SubmissionRequest {
            fields: self.fields,
            file_field: self.file_field,
            files: self.files,
        })
    }
}
