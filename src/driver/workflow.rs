//! Workflow Orchestration
//!
//! 入力ファイルの収集、依存性の組み立て、送信の実行

use anyhow::{Context, Result};
use log::{info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use walkdir::WalkDir;

use crate::adapter::archive::zip_writer::ZipArchiveWriter;
use crate::adapter::config::Config;
use crate::adapter::http::reqwest_gateway::ReqwestSubmissionGateway;
use crate::adapter::presenter::console_presenter::ConsolePresenter;
use crate::adapter::presenter::console_progress::ConsoleProgress;
use crate::adapter::sink::file_download_sink::FileDownloadSink;
use crate::adapter::telemetry::log_telemetry::{LogTelemetryRecorder, NoopTelemetryRecorder};
use crate::application::dto::submit_config::{SubmitConfig, SubmitOverride};
use crate::application::use_cases::run_batch::RunBatchUseCase;
use crate::application::use_cases::submit_form::{
    dispatches_per_file, FormSubmission, SubmissionSummary, SubmitFormUseCase,
};
use crate::application::use_cases::submit_single::SubmitSingleUseCase;
use crate::domain::entities::aggregation::{AggregationResult, BatchReport};
use crate::domain::entities::batch_job::BatchJob;
use crate::domain::entities::outcome::SubmissionOutcome;
use crate::domain::entities::submission_request::FilePart;
use crate::domain::ports::presenter::Presenter;
use crate::domain::ports::progress_reporter::ProgressReporter;
use crate::domain::ports::telemetry::TelemetryRecorder;
use crate::domain::services::outcome_router::OutcomeRouter;

use super::cli::Args;

/// 拡張子から宣言するMIMEタイプを推定する
pub fn guess_content_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "pdf" => "application/pdf",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "html" | "htm" => "text/html",
        "md" => "text/markdown",
        "txt" => "text/plain",
        "csv" => "text/csv",
        "xml" => "application/xml",
        "json" => "application/json",
        "zip" => "application/zip",
        "epub" => "application/epub+zip",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "xls" => "application/vnd.ms-excel",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "ppt" => "application/vnd.ms-powerpoint",
        "pptx" => "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        "odt" => "application/vnd.oasis.opendocument.text",
        "rtf" => "application/rtf",
        _ => "application/octet-stream",
    }
}

/// 入力パスを送信順のファイル一覧に展開する
///
/// ディレクトリは再帰的に走査し、名前順に並べる。隠しファイルは除外する。
pub fn collect_input_files(inputs: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for input in inputs {
        let expanded = shellexpand::tilde(input);
        let path = PathBuf::from(expanded.as_ref());

        if path.is_file() {
            files.push(path);
        } else if path.is_dir() {
            let before = files.len();
            for entry in WalkDir::new(&path)
                .follow_links(true)
                .sort_by_file_name()
                .into_iter()
                .filter_entry(|e| e.depth() == 0 || !is_hidden(e.file_name()))
                .filter_map(|e| e.ok())
            {
                if entry.file_type().is_file() {
                    files.push(entry.into_path());
                }
            }
            info!(
                "Found {} files in {}",
                files.len() - before,
                path.display()
            );
        } else {
            anyhow::bail!("Input not found: {}", path.display());
        }
    }

    Ok(files)
}

fn is_hidden(name: &std::ffi::OsStr) -> bool {
    name.to_str().map(|s| s.starts_with('.')).unwrap_or(false)
}

/// ファイルを読み込み、送信用のパートにする
pub async fn read_file_parts(paths: &[PathBuf]) -> Result<Vec<FilePart>> {
    let mut parts = Vec::with_capacity(paths.len());
    for path in paths {
        let data = tokio::fs::read(path)
            .await
            .context(format!("Failed to read input file: {}", path.display()))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        parts.push(FilePart::new(name, guess_content_type(path), data));
    }
    Ok(parts)
}

/// Document Submission Workflow
pub struct SubmissionWorkflow {
    config: Config,
}

impl SubmissionWorkflow {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Wire adapters into the form submission use case
    pub fn build_use_case(
        &self,
        presenter: Arc<dyn Presenter>,
        progress: Arc<dyn ProgressReporter>,
    ) -> Result<SubmitFormUseCase> {
        let submit_config = self.config.to_submit_config();

        let gateway = Arc::new(ReqwestSubmissionGateway::new(
            self.config.base_url.clone(),
            Duration::from_secs(self.config.request_timeout_secs),
        )?);
        let sink = Arc::new(FileDownloadSink::new(self.config.output_dir()));
        let telemetry: Arc<dyn TelemetryRecorder> = if self.config.analytics_enabled {
            Arc::new(LogTelemetryRecorder::new())
        } else {
            Arc::new(NoopTelemetryRecorder)
        };

        let submitter = Arc::new(
            SubmitSingleUseCase::new(gateway, sink.clone(), presenter.clone(), telemetry)
                .with_download_option(submit_config.download_option)
                .with_clear_selection(submit_config.clear_selection),
        );
        let router = Arc::new(OutcomeRouter::new(presenter));
        let batch = Arc::new(RunBatchUseCase::new(
            submitter.clone(),
            router.clone(),
            sink,
            Arc::new(ZipArchiveWriter::new()),
            progress,
        ));

        Ok(SubmitFormUseCase::new(submitter, batch, router, submit_config))
    }

    /// Execute the submission workflow
    pub async fn execute(&self, args: Args) -> Result<()> {
        let submission_id = uuid::Uuid::new_v4().to_string();
        info!("Starting submission {}", submission_id);
        info!("Dry run: {}", args.dry_run);

        let submit_config = self.config.to_submit_config();
        let submit_override = args.submit_override.map(SubmitOverride::from);

        println!("✓ Using configuration:");
        println!("  Base URL: {}", self.config.base_url);
        println!("  Output: {}", self.config.output_dir().display());

        let paths = collect_input_files(&args.files)?;
        println!("✓ Found {} input files", paths.len());

        if paths.is_empty() {
            println!("No files to submit. Exiting.");
            return Ok(());
        }

        let files = read_file_parts(&paths).await?;

        if args.dry_run {
            println!("✓ Dry-run mode (not actually submitting)");
            for line in plan_lines(&submit_config, &files, &args.fields, submit_override) {
                println!("  {}", line);
            }
            return Ok(());
        }

        let use_case = self.build_use_case(
            Arc::new(ConsolePresenter::new()),
            Arc::new(ConsoleProgress::new()),
        )?;

        let summary = use_case
            .execute(FormSubmission {
                endpoint: args.endpoint.clone(),
                files,
                fields: args.fields.clone(),
                submit_override,
            })
            .await?;

        print_summary(&summary);

        if !summary.is_clean() {
            anyhow::bail!("Submission {} finished with failures", submission_id);
        }

        println!("✓ Submission complete!");
        Ok(())
    }
}

/// 送信せずに実行計画を文字列で返す
pub fn plan_lines(
    config: &SubmitConfig,
    files: &[FilePart],
    fields: &[(String, String)],
    submit_override: Option<SubmitOverride>,
) -> Vec<String> {
    let mut lines = Vec::new();

    for (key, value) in fields {
        lines.push(format!("Field: {}={}", key, value));
    }

    if !dispatches_per_file(config, files.len(), submit_override) {
        lines.push(format!(
            "Would send {} file(s) in a single request",
            files.len()
        ));
        return lines;
    }

    let job = BatchJob::new(
        files.to_vec(),
        fields.to_vec(),
        config.concurrency_limit,
        config.zip_threshold,
    );
    lines.push(format!(
        "Would send {} files one per request in chunks {:?}",
        job.len(),
        job.chunk_sizes()
    ));
    if job.zip_files() {
        lines.push("Results would be combined into files.zip".to_string());
    } else {
        lines.push("Results would be downloaded individually".to_string());
    }
    lines
}

fn print_summary(summary: &SubmissionSummary) {
    match summary {
        SubmissionSummary::Single(result) => match (&result.outcome, &result.delivered) {
            (SubmissionOutcome::Success(_), Some(download)) => {
                println!("✓ Saved {}", download.path.display());
            }
            (SubmissionOutcome::Success(artifact), None) => {
                println!("✓ Received {}", artifact.filename);
            }
            (outcome, _) => println!("✗ {}", outcome),
        },
        SubmissionSummary::Batch(report) => print_batch_report(report),
    }
}

fn print_batch_report(report: &BatchReport) {
    match &report.aggregation {
        Some(AggregationResult::Archive { entries, download, .. }) => {
            println!(
                "✓ Saved {} results to {}",
                entries.len(),
                download.path.display()
            );
        }
        Some(AggregationResult::Individual(downloads)) => {
            println!("✓ Saved {} files", downloads.len());
            for download in downloads {
                println!("  - {}", download.path.display());
            }
        }
        None => {}
    }

    for failure in &report.failures {
        println!("✗ {}: {}", failure.file_name, failure.outcome);
    }
    for error in &report.local_errors {
        println!("✗ {}", error);
    }
    if let Some(error) = &report.archive_error {
        println!("✗ {}", error);
    }
    if report.halted {
        warn!("Stopped after session expiry");
        println!(
            "⚠ Stopped early: {} of {} files were not submitted",
            report.skipped, report.total
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn parts(n: usize) -> Vec<FilePart> {
        (0..n)
            .map(|i| FilePart::new(format!("{}.pdf", i), "application/pdf", vec![]))
            .collect()
    }

    #[test]
    fn test_guess_content_type() {
        assert_eq!(guess_content_type(Path::new("a.PDF")), "application/pdf");
        assert_eq!(guess_content_type(Path::new("scan.jpeg")), "image/jpeg");
        assert_eq!(guess_content_type(Path::new("README")), "application/octet-stream");
    }

    #[test]
    fn test_collect_input_files_expands_directories_in_order() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("docs");
        fs::create_dir_all(dir.join("nested")).unwrap();
        fs::write(dir.join("b.pdf"), b"b").unwrap();
        fs::write(dir.join("a.pdf"), b"a").unwrap();
        fs::write(dir.join(".hidden.pdf"), b"h").unwrap();
        fs::write(dir.join("nested").join("c.pdf"), b"c").unwrap();
        let single = temp_dir.path().join("z.pdf");
        fs::write(&single, b"z").unwrap();

        let files = collect_input_files(&[
            single.to_string_lossy().to_string(),
            dir.to_string_lossy().to_string(),
        ])
        .unwrap();

        let names: Vec<String> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["z.pdf", "a.pdf", "b.pdf", "c.pdf"]);
    }

    #[test]
    fn test_collect_input_files_missing_path() {
        let result = collect_input_files(&["/nonexistent/input.pdf".to_string()]);
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_read_file_parts() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("scan.png");
        fs::write(&path, b"\x89PNG").unwrap();

        let parts = read_file_parts(&[path]).await.unwrap();

        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].name, "scan.png");
        assert_eq!(parts[0].content_type, "image/png");
        assert_eq!(parts[0].data, b"\x89PNG");
    }

    #[test]
    fn test_plan_for_single_request() {
        let lines = plan_lines(&SubmitConfig::default(), &parts(1), &[], None);
        assert_eq!(lines, vec!["Would send 1 file(s) in a single request"]);
    }

    #[test]
    fn test_plan_for_zipped_batch() {
        let fields = vec![("angle".to_string(), "90".to_string())];
        let lines = plan_lines(&SubmitConfig::default(), &parts(10), &fields, None);
        assert_eq!(
            lines,
            vec![
                "Field: angle=90",
                "Would send 10 files one per request in chunks [8, 2]",
                "Results would be combined into files.zip",
            ]
        );
    }

    #[test]
    fn test_plan_respects_override() {
        let lines = plan_lines(
            &SubmitConfig::default(),
            &parts(3),
            &[],
            Some(SubmitOverride::Single),
        );
        assert_eq!(lines, vec!["Would send 3 file(s) in a single request"]);

        let lines = plan_lines(
            &SubmitConfig::default(),
            &parts(1),
            &[],
            Some(SubmitOverride::Multi),
        );
        assert_eq!(lines[1], "Results would be downloaded individually");
    }
}
