//! # Submit Form Use Case
//!
//! 送信フォーム全体の処理：単一リクエストかファイルごとのバッチかを振り分ける

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use log::{debug, info};
use tokio::task::JoinHandle;

use crate::application::dto::submit_config::{BoredWaiting, SubmitConfig, SubmitOverride};
use crate::application::use_cases::run_batch::RunBatchUseCase;
use crate::application::use_cases::submit_single::{
    SubmitOptions, SubmitResult, SubmitSingleUseCase,
};
use crate::domain::entities::aggregation::BatchReport;
use crate::domain::entities::submission_request::{FilePart, SubmissionRequest};
use crate::domain::ports::presenter::Presenter;
use crate::domain::services::outcome_router::OutcomeRouter;
use crate::error::SubmitError;

/// 待ち時間ヒントを出すまでの時間
pub const WAITING_HINT_DELAY: Duration = Duration::from_secs(5);

/// 送信フォームの内容
#[derive(Debug, Clone)]
pub struct FormSubmission {
    pub endpoint: String,
    pub files: Vec<FilePart>,
    /// ファイル以外のフォームフィールド（送信順）
    pub fields: Vec<(String, String)>,
    pub submit_override: Option<SubmitOverride>,
}

/// フォーム送信の結果
#[derive(Debug)]
pub enum SubmissionSummary {
    /// 1リクエストで送信した
    Single(SubmitResult),
    /// ファイルごとに送信した
    Batch(BatchReport),
}

impl SubmissionSummary {
    /// 失敗が無かったか
    pub fn is_clean(&self) -> bool {
        match self {
            SubmissionSummary::Single(result) => result.outcome.is_success(),
            SubmissionSummary::Batch(report) => report.is_clean(),
        }
    }
}

/// ファイルごとに送信するかどうか
///
/// 強制指定が優先。指定が無ければ、複数ファイルを1リクエストで受け付けない
/// 操作に2件以上のファイルを渡した場合のみバッチにする。
pub fn dispatches_per_file(
    config: &SubmitConfig,
    file_count: usize,
    submit_override: Option<SubmitOverride>,
) -> bool {
    match submit_override {
        Some(SubmitOverride::Multi) => true,
        Some(SubmitOverride::Single) => false,
        None => !config.multiple_inputs_for_single_request && file_count > 1,
    }
}

/// フォーム送信ユースケース
pub struct SubmitFormUseCase {
    submitter: Arc<SubmitSingleUseCase>,
    batch: Arc<RunBatchUseCase>,
    router: Arc<OutcomeRouter>,
    config: SubmitConfig,
    hint_delay: Duration,
}

impl SubmitFormUseCase {
    pub fn new(
        submitter: Arc<SubmitSingleUseCase>,
        batch: Arc<RunBatchUseCase>,
        router: Arc<OutcomeRouter>,
        config: SubmitConfig,
    ) -> Self {
        Self {
            submitter,
            batch,
            router,
            config,
            hint_delay: WAITING_HINT_DELAY,
        }
    }

    /// 待ち時間ヒントまでの時間を変更
    pub fn with_hint_delay(mut self, delay: Duration) -> Self {
        self.hint_delay = delay;
        self
    }

    /// ファイルごとに送信するかどうか
    pub fn is_batch(&self, file_count: usize, submit_override: Option<SubmitOverride>) -> bool {
        dispatches_per_file(&self.config, file_count, submit_override)
    }

    /// フォームを送信
    ///
    /// 処理中表示と待ち時間ヒントは結果にかかわらず必ず片付ける
    ///
    /// # Errors
    ///
    /// ファイルが無い、リクエストが不正、または成果物を保存できなかった場合
    pub async fn execute(&self, form: FormSubmission) -> Result<SubmissionSummary> {
        let presenter = self.router.presenter().clone();

        self.router.begin_submission();
        presenter.set_processing(true);

        let hint_shown = Arc::new(AtomicBool::new(false));
        let hint = self.arm_waiting_hint(presenter.clone(), hint_shown.clone());

        let result = self.dispatch(form).await;

        if let Some(handle) = hint {
            handle.abort();
        }
        presenter.set_processing(false);
        if hint_shown.load(Ordering::SeqCst) {
            presenter.show_download_complete();
        }

        result
    }

    fn arm_waiting_hint(
        &self,
        presenter: Arc<dyn Presenter>,
        shown: Arc<AtomicBool>,
    ) -> Option<JoinHandle<()>> {
        if self.config.bored_waiting != BoredWaiting::Enabled {
            return None;
        }

        let delay = self.hint_delay;
        Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            shown.store(true, Ordering::SeqCst);
            presenter.show_waiting_hint();
        }))
    }

    async fn dispatch(&self, form: FormSubmission) -> Result<SubmissionSummary> {
        let FormSubmission {
            endpoint,
            files,
            fields,
            submit_override,
        } = form;

        if files.is_empty() {
            return Err(SubmitError::InvalidRequest("no files selected".to_string()).into());
        }

        if self.is_batch(files.len(), submit_override) {
            info!("Submitting {} files one request per file", files.len());
            let report = self
                .batch
                .execute(&endpoint, files, fields, &self.config)
                .await?;
            return Ok(SubmissionSummary::Batch(report));
        }

        debug!("Submitting {} file(s) in a single request", files.len());
        let multiple = files.len() > 1;
        let mut builder = SubmissionRequest::builder()
            .file_field(self.config.file_field.clone())
            .fields(fields);
        for file in files {
            builder = builder.file(file);
        }
        if multiple {
            builder = builder.allow_multiple_files();
        }
        let request = builder.build().context("Failed to build submission request")?;

        match self
            .submitter
            .execute(&endpoint, &request, SubmitOptions::standalone())
            .await
        {
            Ok(result) => {
                self.router.route(&result.outcome);
                Ok(SubmissionSummary::Single(result))
            }
            Err(e) => {
                self.router.report_error(e.to_string());
                Err(e.into())
            }
        }
    }
}
