//! File Download Sink
//!
//! 成果物を出力ディレクトリに保存する。書き込みは同じディレクトリ内の
//! 一時ファイルに行い、完了後に衝突しない名前で確定させる。

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::info;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use crate::domain::entities::aggregation::{DeliveryMode, MaterializedDownload};
use crate::domain::entities::outcome::Artifact;
use crate::domain::ports::download_sink::DownloadSink;

const FALLBACK_NAME: &str = "download";

/// ファイルシステムベースのダウンロード先
pub struct FileDownloadSink {
    output_dir: PathBuf,
}

impl FileDownloadSink {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// パスの最後の要素だけを残し、サーバー指定の名前で出力先の外に書かせない
    fn safe_file_name(name: &str) -> String {
        let candidate = name.rsplit(['/', '\\']).next().unwrap_or_default().trim();
        if candidate.is_empty() || candidate == "." || candidate == ".." {
            FALLBACK_NAME.to_string()
        } else {
            candidate.to_string()
        }
    }

    /// 衝突回避用の候補名（`name.ext`, `name (1).ext`, `name (2).ext`, ...）
    fn candidate_name(file_name: &str, attempt: usize) -> String {
        if attempt == 0 {
            return file_name.to_string();
        }
        let path = Path::new(file_name);
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(file_name);
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) => format!("{} ({}).{}", stem, attempt, ext),
            None => format!("{} ({})", stem, attempt),
        }
    }

    /// 保存処理（同期処理）
    ///
    /// 失敗した場合、一時ファイルはドロップ時に削除される
    fn materialize_sync(
        output_dir: &Path,
        filename: &str,
        payload: &[u8],
        mode: DeliveryMode,
    ) -> Result<MaterializedDownload> {
        fs::create_dir_all(output_dir).context(format!(
            "Failed to create output directory: {}",
            output_dir.display()
        ))?;

        let mut staged = NamedTempFile::new_in(output_dir)
            .context("Failed to create staging file")?;
        staged
            .write_all(payload)
            .context("Failed to write artifact")?;
        staged.flush().context("Failed to flush artifact")?;

        let file_name = Self::safe_file_name(filename);
        let mut attempt = 0;
        loop {
            let name = Self::candidate_name(&file_name, attempt);
            let target = output_dir.join(&name);
            match staged.persist_noclobber(&target) {
                Ok(_) => {
                    info!("Saved {} ({} bytes)", target.display(), payload.len());
                    return Ok(MaterializedDownload {
                        filename: name,
                        path: target,
                        size: payload.len() as u64,
                        mode,
                    });
                }
                Err(e) if e.error.kind() == std::io::ErrorKind::AlreadyExists => {
                    staged = e.file;
                    attempt += 1;
                }
                Err(e) => {
                    return Err(e.error)
                        .context(format!("Failed to save artifact to {}", target.display()));
                }
            }
        }
    }
}

#[async_trait]
impl DownloadSink for FileDownloadSink {
    async fn materialize(
        &self,
        artifact: &Artifact,
        mode: DeliveryMode,
    ) -> Result<MaterializedDownload> {
        let output_dir = self.output_dir.clone();
        let filename = artifact.filename.clone();
        let payload = artifact.payload.clone();

        let download = tokio::task::spawn_blocking(move || {
            Self::materialize_sync(&output_dir, &filename, &payload, mode)
        })
        .await
        .map_err(|e| anyhow::anyhow!("Failed to spawn blocking task: {}", e))??;

        if mode != DeliveryMode::Download {
            info!(
                "{} is ready for viewing at {}",
                download.filename,
                download.path.display()
            );
        }

        Ok(download)
    }
}
