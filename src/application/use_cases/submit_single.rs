//! # Submit Single Use Case
//!
//! ファイル1件分の送信ユースケース（応答分類・受け渡し・計測）

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use log::{debug, warn};

use crate::application::dto::submit_config::DownloadOption;
use crate::domain::entities::aggregation::{DeliveryMode, MaterializedDownload};
use crate::domain::entities::outcome::{Artifact, SubmissionOutcome};
use crate::domain::entities::submission_request::SubmissionRequest;
use crate::domain::ports::download_sink::DownloadSink;
use crate::domain::ports::presenter::Presenter;
use crate::domain::ports::submission_gateway::SubmissionGateway;
use crate::domain::ports::telemetry::{FileProcessingEvent, TelemetryRecorder};
use crate::domain::services::artifact_resolver::ArtifactResolver;
use crate::domain::services::page_count::count_pdf_pages;
use crate::error::SubmitError;

/// 送信オプション
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubmitOptions {
    /// バッチの一部として送信しているか（インライン表示を行わない）
    pub is_part_of_batch: bool,
    /// 成功しても個別に実体化しない（ZIPにまとめる場合）
    pub suppress_individual_download: bool,
}

impl SubmitOptions {
    /// 単独送信
    pub fn standalone() -> Self {
        Self::default()
    }

    /// バッチ内の送信
    pub fn batch(zip_files: bool) -> Self {
        Self {
            is_part_of_batch: true,
            suppress_individual_download: zip_files,
        }
    }
}

/// 1件分の送信結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitResult {
    pub outcome: SubmissionOutcome,
    /// 実体化された成果物（抑制された場合や失敗時は `None`）
    pub delivered: Option<MaterializedDownload>,
}

/// 単一送信ユースケース
///
/// 1回の呼び出しで必ず1回だけリクエストを送り、結果にかかわらず
/// 計測イベントを記録してファイル選択をクリアする
pub struct SubmitSingleUseCase {
    gateway: Arc<dyn SubmissionGateway>,
    sink: Arc<dyn DownloadSink>,
    presenter: Arc<dyn Presenter>,
    telemetry: Arc<dyn TelemetryRecorder>,
    download_option: DownloadOption,
    clear_selection: bool,
}

impl SubmitSingleUseCase {
    /// 新しいユースケースを作成
    pub fn new(
        gateway: Arc<dyn SubmissionGateway>,
        sink: Arc<dyn DownloadSink>,
        presenter: Arc<dyn Presenter>,
        telemetry: Arc<dyn TelemetryRecorder>,
    ) -> Self {
        Self {
            gateway,
            sink,
            presenter,
            telemetry,
            download_option: DownloadOption::default(),
            clear_selection: true,
        }
    }

    /// 表示可能な成果物の扱いを設定
    pub fn with_download_option(mut self, option: DownloadOption) -> Self {
        self.download_option = option;
        self
    }

    /// 送信後のファイル選択クリアを設定
    pub fn with_clear_selection(mut self, clear: bool) -> Self {
        self.clear_selection = clear;
        self
    }

    /// 1件送信する
    ///
    /// # Arguments
    ///
    /// * `endpoint` - 送信先
    /// * `request` - 送信するフォーム
    /// * `options` - バッチ内かどうか、個別保存を抑制するか
    ///
    /// # Errors
    ///
    /// 成果物の実体化に失敗した場合のみ。サーバー側・通信の失敗は
    /// `SubmissionOutcome` として返す。
    pub async fn execute(
        &self,
        endpoint: &str,
        request: &SubmissionRequest,
        options: SubmitOptions,
    ) -> Result<SubmitResult, SubmitError> {
        let started = Instant::now();

        let outcome = match self.gateway.send(endpoint, request).await {
            Ok(response) => ArtifactResolver::resolve(&response),
            Err(e) => {
                warn!("Request to {} failed: {:#}", endpoint, e);
                SubmissionOutcome::TransportError(format!("{:#}", e))
            }
        };

        let delivered = match &outcome {
            SubmissionOutcome::Success(artifact) if !options.suppress_individual_download => {
                let mode = self.delivery_mode(artifact, options);
                self.sink
                    .materialize(artifact, mode)
                    .await
                    .map(Some)
                    .map_err(|source| SubmitError::Sink {
                        filename: artifact.filename.clone(),
                        source,
                    })
            }
            _ => Ok(None),
        };

        if self.clear_selection {
            self.presenter.clear_file_selection();
        }

        let error_message = match &delivered {
            Ok(_) => outcome.error_summary(),
            Err(e) => Some(e.to_string()),
        };
        self.record(
            request,
            outcome.is_success() && delivered.is_ok(),
            error_message,
            started,
        );

        debug!("Submission to {} finished: {}", endpoint, outcome);

        Ok(SubmitResult {
            outcome,
            delivered: delivered?,
        })
    }

    /// 受け渡し方法を決める
    ///
    /// バッチ内では常に保存。単独送信かつ表示可能な型の場合のみ設定に従う。
    fn delivery_mode(&self, artifact: &Artifact, options: SubmitOptions) -> DeliveryMode {
        if options.is_part_of_batch || !artifact.is_viewable() {
            return DeliveryMode::Download;
        }
        self.download_option.delivery_mode()
    }

    fn record(
        &self,
        request: &SubmissionRequest,
        success: bool,
        error_message: Option<String>,
        started: Instant,
    ) {
        let file = request.primary_file();
        // ページ数の取得失敗は計測を止めない
        let pdf_pages = file
            .filter(|f| f.is_pdf())
            .and_then(|f| count_pdf_pages(&f.data));

        let event = FileProcessingEvent {
            success,
            file_type: file
                .map(|f| f.content_type.clone())
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| "unknown".to_string()),
            file_size: file.map(|f| f.size()).unwrap_or(0),
            processing_time_ms: started.elapsed().as_millis() as u64,
            error_message,
            pdf_pages,
            recorded_at: Utc::now(),
        };

        self.telemetry.record(&event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::http_response::HttpResponse;
    use crate::domain::entities::submission_request::FilePart;
    use crate::domain::ports::download_sink::MockDownloadSink;
    use crate::domain::ports::presenter::MockPresenter;
    use crate::domain::ports::submission_gateway::MockSubmissionGateway;
    use crate::domain::ports::telemetry::MockTelemetryRecorder;
    use std::path::PathBuf;

    const PDF: &[u8] = b"%PDF-1.4\n3 0 obj << /Type /Page >> endobj\n%%EOF";

    fn pdf_request() -> SubmissionRequest {
        SubmissionRequest::builder()
            .field("angle", "90")
            .file(FilePart::new("in.pdf", "application/pdf", PDF.to_vec()))
            .build()
            .unwrap()
    }

    fn pdf_response() -> HttpResponse {
        HttpResponse::new(200)
            .with_content_type("application/pdf")
            .with_content_disposition("attachment; filename=\"out.pdf\"")
            .with_body(b"%PDF-out".to_vec())
    }

    fn clearing_presenter() -> MockPresenter {
        let mut presenter = MockPresenter::new();
        presenter.expect_clear_file_selection().times(1).return_const(());
        presenter
    }

    fn any_telemetry() -> MockTelemetryRecorder {
        let mut telemetry = MockTelemetryRecorder::new();
        telemetry.expect_record().times(1).return_const(());
        telemetry
    }

    fn saved(name: &str, mode: DeliveryMode) -> MaterializedDownload {
        MaterializedDownload {
            filename: name.to_string(),
            path: PathBuf::from("/tmp").join(name),
            size: 8,
            mode,
        }
    }

    fn use_case(
        gateway: MockSubmissionGateway,
        sink: MockDownloadSink,
        presenter: MockPresenter,
        telemetry: MockTelemetryRecorder,
    ) -> SubmitSingleUseCase {
        SubmitSingleUseCase::new(
            Arc::new(gateway),
            Arc::new(sink),
            Arc::new(presenter),
            Arc::new(telemetry),
        )
    }

    #[tokio::test]
    async fn test_success_is_downloaded() {
        let mut gateway = MockSubmissionGateway::new();
        gateway
            .expect_send()
            .times(1)
            .returning(|_, _| Ok(pdf_response()));

        let mut sink = MockDownloadSink::new();
        sink.expect_materialize()
            .withf(|artifact, mode| artifact.filename == "out.pdf" && *mode == DeliveryMode::Download)
            .times(1)
            .returning(|a, m| Ok(saved(&a.filename, m)));

        let use_case = use_case(gateway, sink, clearing_presenter(), any_telemetry());
        let result = use_case
            .execute("/api/v1/rotate", &pdf_request(), SubmitOptions::standalone())
            .await
            .unwrap();

        assert!(result.outcome.is_success());
        assert_eq!(result.delivered.unwrap().filename, "out.pdf");
    }

    #[tokio::test]
    async fn test_viewable_standalone_follows_download_option() {
        let mut gateway = MockSubmissionGateway::new();
        gateway.expect_send().returning(|_, _| Ok(pdf_response()));

        let mut sink = MockDownloadSink::new();
        sink.expect_materialize()
            .withf(|_, mode| *mode == DeliveryMode::ViewInNewWindow)
            .times(1)
            .returning(|a, m| Ok(saved(&a.filename, m)));

        let use_case = use_case(gateway, sink, clearing_presenter(), any_telemetry())
            .with_download_option(DownloadOption::NewWindow);
        let result = use_case
            .execute("/api/v1/rotate", &pdf_request(), SubmitOptions::standalone())
            .await
            .unwrap();

        assert_eq!(result.delivered.unwrap().mode, DeliveryMode::ViewInNewWindow);
    }

    #[tokio::test]
    async fn test_batch_never_views_inline() {
        let mut gateway = MockSubmissionGateway::new();
        gateway.expect_send().returning(|_, _| Ok(pdf_response()));

        let mut sink = MockDownloadSink::new();
        sink.expect_materialize()
            .withf(|_, mode| *mode == DeliveryMode::Download)
            .times(1)
            .returning(|a, m| Ok(saved(&a.filename, m)));

        let use_case = use_case(gateway, sink, clearing_presenter(), any_telemetry())
            .with_download_option(DownloadOption::SameWindow);
        let result = use_case
            .execute("/api/v1/rotate", &pdf_request(), SubmitOptions::batch(false))
            .await
            .unwrap();

        assert_eq!(result.delivered.unwrap().mode, DeliveryMode::Download);
    }

    #[tokio::test]
    async fn test_suppressed_download_returns_artifact_only() {
        let mut gateway = MockSubmissionGateway::new();
        gateway.expect_send().returning(|_, _| Ok(pdf_response()));

        // 期待値なし：呼ばれたらパニック
        let sink = MockDownloadSink::new();

        let use_case = use_case(gateway, sink, clearing_presenter(), any_telemetry());
        let result = use_case
            .execute("/api/v1/rotate", &pdf_request(), SubmitOptions::batch(true))
            .await
            .unwrap();

        assert!(result.delivered.is_none());
        match result.outcome {
            SubmissionOutcome::Success(artifact) => assert_eq!(artifact.payload, b"%PDF-out"),
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unauthorized_is_not_downloaded() {
        let mut gateway = MockSubmissionGateway::new();
        gateway
            .expect_send()
            .returning(|_, _| Ok(HttpResponse::new(401)));

        let sink = MockDownloadSink::new();

        let use_case = use_case(gateway, sink, clearing_presenter(), any_telemetry());
        let result = use_case
            .execute("/api/v1/rotate", &pdf_request(), SubmitOptions::standalone())
            .await
            .unwrap();

        assert_eq!(result.outcome, SubmissionOutcome::AuthExpired);
        assert!(result.delivered.is_none());
    }

    #[tokio::test]
    async fn test_transport_failure_becomes_transport_error() {
        let mut gateway = MockSubmissionGateway::new();
        gateway
            .expect_send()
            .returning(|_, _| Err(anyhow::anyhow!("Connection refused")));

        let mut telemetry = MockTelemetryRecorder::new();
        telemetry
            .expect_record()
            .withf(|event| {
                !event.success
                    && event.error_message.as_deref() == Some("Connection refused")
                    && event.file_type == "application/pdf"
            })
            .times(1)
            .return_const(());

        let use_case = use_case(
            gateway,
            MockDownloadSink::new(),
            clearing_presenter(),
            telemetry,
        );
        let result = use_case
            .execute("/api/v1/rotate", &pdf_request(), SubmitOptions::standalone())
            .await
            .unwrap();

        assert_eq!(
            result.outcome,
            SubmissionOutcome::TransportError("Connection refused".to_string())
        );
    }

    #[tokio::test]
    async fn test_telemetry_records_size_type_and_pages() {
        let mut gateway = MockSubmissionGateway::new();
        gateway.expect_send().returning(|_, _| Ok(pdf_response()));

        let mut sink = MockDownloadSink::new();
        sink.expect_materialize()
            .returning(|a, m| Ok(saved(&a.filename, m)));

        let mut telemetry = MockTelemetryRecorder::new();
        telemetry
            .expect_record()
            .withf(|event| {
                event.success
                    && event.file_type == "application/pdf"
                    && event.file_size == PDF.len() as u64
                    && event.pdf_pages == Some(1)
                    && event.error_message.is_none()
            })
            .times(1)
            .return_const(());

        let use_case = use_case(gateway, sink, clearing_presenter(), telemetry);
        use_case
            .execute("/api/v1/rotate", &pdf_request(), SubmitOptions::standalone())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_unparseable_pdf_has_no_page_count() {
        let mut gateway = MockSubmissionGateway::new();
        gateway
            .expect_send()
            .returning(|_, _| Ok(HttpResponse::new(500).with_content_type("text/plain")));

        let mut telemetry = MockTelemetryRecorder::new();
        telemetry
            .expect_record()
            .withf(|event| event.pdf_pages.is_none() && event.error_message.as_deref() == Some("HTTP error: status 500"))
            .times(1)
            .return_const(());

        let request = SubmissionRequest::builder()
            .file(FilePart::new("broken.pdf", "application/pdf", b"garbage".to_vec()))
            .build()
            .unwrap();

        let use_case = use_case(
            gateway,
            MockDownloadSink::new(),
            clearing_presenter(),
            telemetry,
        );
        let result = use_case
            .execute("/api/v1/rotate", &request, SubmitOptions::standalone())
            .await
            .unwrap();
        assert!(matches!(result.outcome, SubmissionOutcome::TransportError(_)));
    }

    #[tokio::test]
    async fn test_sink_failure_is_an_error_after_cleanup() {
        let mut gateway = MockSubmissionGateway::new();
        gateway.expect_send().returning(|_, _| Ok(pdf_response()));

        let mut sink = MockDownloadSink::new();
        sink.expect_materialize()
            .returning(|_, _| Err(anyhow::anyhow!("disk full")));

        let mut telemetry = MockTelemetryRecorder::new();
        telemetry
            .expect_record()
            .withf(|event| !event.success)
            .times(1)
            .return_const(());

        let use_case = use_case(gateway, sink, clearing_presenter(), telemetry);
        let result = use_case
            .execute("/api/v1/rotate", &pdf_request(), SubmitOptions::standalone())
            .await;

        assert!(matches!(result, Err(SubmitError::Sink { .. })));
    }

    #[tokio::test]
    async fn test_selection_kept_when_clearing_disabled() {
        let mut gateway = MockSubmissionGateway::new();
        gateway
            .expect_send()
            .returning(|_, _| Ok(HttpResponse::new(401)));

        // clear_file_selection の期待値なし
        let presenter = MockPresenter::new();

        let use_case = use_case(gateway, MockDownloadSink::new(), presenter, any_telemetry())
            .with_clear_selection(false);
        let result = use_case
            .execute("/api/v1/merge", &pdf_request(), SubmitOptions::standalone())
            .await
            .unwrap();
        assert!(result.outcome.is_fatal());
    }
}
