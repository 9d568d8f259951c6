//! # Run Batch Use Case
//!
//! 複数ファイルを同時送信数で区切って順に送信し、成果物を集約するユースケース

use std::sync::Arc;

use anyhow::Result;
use futures::stream::{FuturesUnordered, StreamExt};
use log::{debug, info, warn};

use crate::application::dto::submit_config::SubmitConfig;
use crate::application::use_cases::submit_single::{SubmitOptions, SubmitSingleUseCase};
use crate::domain::entities::aggregation::{
    AggregationResult, ArchiveEntry, BatchReport, DeliveryMode, FileFailure, ARCHIVE_NAME,
};
use crate::domain::entities::batch_job::BatchJob;
use crate::domain::entities::outcome::{Artifact, SubmissionOutcome};
use crate::domain::entities::submission_request::FilePart;
use crate::domain::ports::archive_writer::ArchiveWriter;
use crate::domain::ports::download_sink::DownloadSink;
use crate::domain::ports::progress_reporter::ProgressReporter;
use crate::domain::services::outcome_router::OutcomeRouter;
use crate::error::SubmitError;

const ARCHIVE_CONTENT_TYPE: &str = "application/zip";

/// バッチ送信ユースケース
///
/// チャンクは厳密に順番に処理し、チャンク内の送信はすべて同じタスク上で
/// 同時に進める。進捗とアーカイブのエントリはこのユースケースだけが変更する。
pub struct RunBatchUseCase {
    submitter: Arc<SubmitSingleUseCase>,
    router: Arc<OutcomeRouter>,
    sink: Arc<dyn DownloadSink>,
    archive_writer: Arc<dyn ArchiveWriter>,
    progress: Arc<dyn ProgressReporter>,
}

impl RunBatchUseCase {
    /// 新しいユースケースを作成
    pub fn new(
        submitter: Arc<SubmitSingleUseCase>,
        router: Arc<OutcomeRouter>,
        sink: Arc<dyn DownloadSink>,
        archive_writer: Arc<dyn ArchiveWriter>,
        progress: Arc<dyn ProgressReporter>,
    ) -> Self {
        Self {
            submitter,
            router,
            sink,
            archive_writer,
            progress,
        }
    }

    /// バッチを実行
    ///
    /// # Arguments
    ///
    /// * `endpoint` - 送信先
    /// * `files` - 送信順のファイル
    /// * `shared_fields` - 全リクエスト共通のフォームフィールド
    /// * `config` - 送信設定
    ///
    /// # Returns
    ///
    /// 集約結果と、ファイル位置順の失敗リストを含むレポート
    ///
    /// 個々の送信の失敗はレポートに記録され、バッチは続行する。
    /// セッション切れの場合は後続チャンクを送らず、アーカイブも作らない。
    pub async fn execute(
        &self,
        endpoint: &str,
        files: Vec<FilePart>,
        shared_fields: Vec<(String, String)>,
        config: &SubmitConfig,
    ) -> Result<BatchReport> {
        let mut job = BatchJob::new(
            files,
            shared_fields,
            config.concurrency_limit,
            config.zip_threshold,
        )
        .with_file_field(config.file_field.clone());

        let total = job.len();
        let mut report = BatchReport {
            total,
            chunk_sizes: job.chunk_sizes(),
            ..Default::default()
        };

        if job.is_empty() {
            debug!("No files to submit");
            return Ok(report);
        }

        let zip_files = job.zip_files();
        let chunks = job.chunks();

        info!(
            "Submitting {} files to {} in chunks {:?} (zip: {})",
            total, endpoint, report.chunk_sizes, zip_files
        );
        self.progress.start(total);

        let options = SubmitOptions::batch(zip_files);
        let mut entries: Vec<ArchiveEntry> = Vec::new();
        let mut downloads = Vec::new();
        let mut dispatched = 0;

        for chunk in chunks {
            if report.halted {
                break;
            }
            dispatched += chunk.len();

            let mut in_flight: FuturesUnordered<_> = chunk
                .into_iter()
                .map(|item| async move {
                    let result = match item.request {
                        Ok(request) => self.submitter.execute(endpoint, &request, options).await,
                        Err(e) => Err(e),
                    };
                    (item.index, item.file_name, result)
                })
                .collect();

            while let Some((index, file_name, result)) = in_flight.next().await {
                let percent = job.advance_progress();
                self.progress
                    .advance(job.progress().completed(), total, percent);

                // 中断後に返ってきた結果は表示しないが、保存済みのファイルは記録する
                if report.halted {
                    match result.ok().and_then(|submitted| submitted.delivered) {
                        Some(download) => {
                            debug!(
                                "{} was saved after session expiry: {}",
                                file_name,
                                download.path.display()
                            );
                            downloads.push(download);
                        }
                        None => debug!("Discarding result for {} after session expiry", file_name),
                    }
                    continue;
                }

                match result {
                    Ok(submitted) => match submitted.outcome {
                        SubmissionOutcome::Success(artifact) => {
                            if zip_files {
                                entries.push(ArchiveEntry {
                                    name: artifact.filename,
                                    payload: artifact.payload,
                                });
                            } else if let Some(download) = submitted.delivered {
                                downloads.push(download);
                            }
                        }
                        outcome => {
                            warn!("{} failed: {}", file_name, outcome);
                            self.router.route(&outcome);
                            if outcome.is_fatal() {
                                report.halted = true;
                            }
                            report.failures.push(FileFailure {
                                index,
                                file_name,
                                outcome,
                            });
                        }
                    },
                    Err(e) => {
                        warn!("{}: {}", file_name, e);
                        self.router.report_error(e.to_string());
                        report.local_errors.push(format!("{}: {}", file_name, e));
                    }
                }
            }
        }

        report.completed = job.progress().completed();
        report.skipped = total - dispatched;
        report.failures.sort_by_key(|failure| failure.index);

        if report.halted {
            warn!(
                "Session expired; {} files were not submitted",
                report.skipped
            );
        } else if zip_files {
            self.aggregate_archive(entries, &mut report).await;
        }

        if !zip_files {
            report.aggregation = Some(AggregationResult::Individual(downloads));
        }

        job.complete_progress();
        self.progress.finish(total);

        info!(
            "Batch finished: {} succeeded, {} failed",
            report.success_count(),
            report.failures.len()
        );

        Ok(report)
    }

    /// エントリをZIPにまとめて保存する
    ///
    /// 失敗は表示とレポートへの記録のみで、再送信はしない
    async fn aggregate_archive(&self, entries: Vec<ArchiveEntry>, report: &mut BatchReport) {
        if entries.is_empty() {
            debug!("No successful artifacts to archive");
            return;
        }

        let bytes = match self
            .archive_writer
            .build(&entries)
            .map_err(SubmitError::ArchiveBuild)
        {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("{}", e);
                self.router.report_error(e.to_string());
                report.archive_error = Some(e.to_string());
                return;
            }
        };

        let archive = Artifact::new(ARCHIVE_NAME, bytes, ARCHIVE_CONTENT_TYPE);
        match self.sink.materialize(&archive, DeliveryMode::Download).await {
            Ok(download) => {
                report.aggregation = Some(AggregationResult::Archive {
                    name: ARCHIVE_NAME.to_string(),
                    entries,
                    download,
                });
            }
            Err(source) => {
                let e = SubmitError::Sink {
                    filename: ARCHIVE_NAME.to_string(),
                    source,
                };
                warn!("{}", e);
                self.router.report_error(e.to_string());
                report.archive_error = Some(e.to_string());
            }
        }
    }
}
