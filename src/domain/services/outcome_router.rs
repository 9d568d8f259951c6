//! # Outcome Router
//!
//! 失敗した送信結果を画面表示に振り分けるドメインサービス

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::domain::entities::outcome::SubmissionOutcome;
use crate::domain::ports::presenter::{ErrorBanner, Presenter};

/// パスワード案内を1回の送信につき1度だけ通すラッチ
#[derive(Debug, Default)]
pub struct PasswordPromptLatch {
    fired: AtomicBool,
}

impl PasswordPromptLatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// 初回のみ `true` を返す
    pub fn try_fire(&self) -> bool {
        !self.fired.swap(true, Ordering::SeqCst)
    }

    /// 新しい送信の開始時に呼ぶ
    pub fn reset(&self) {
        self.fired.store(false, Ordering::SeqCst);
    }
}

/// 結果の振り分け
pub struct OutcomeRouter {
    presenter: Arc<dyn Presenter>,
    latch: PasswordPromptLatch,
}

impl OutcomeRouter {
    pub fn new(presenter: Arc<dyn Presenter>) -> Self {
        Self {
            presenter,
            latch: PasswordPromptLatch::new(),
        }
    }

    pub fn presenter(&self) -> &Arc<dyn Presenter> {
        &self.presenter
    }

    /// トップレベルの送信ごとに呼び、パスワード案内の抑制を解除する
    pub fn begin_submission(&self) {
        self.latch.reset();
    }

    /// 結果を表示に振り分ける（成功は何もしない）
    pub fn route(&self, outcome: &SubmissionOutcome) {
        match outcome {
            SubmissionOutcome::Success(_) => {}
            SubmissionOutcome::AuthExpired => self.presenter.show_session_expired(),
            SubmissionOutcome::PasswordRequired => {
                if self.latch.try_fire() {
                    self.presenter.show_password_prompt();
                } else {
                    log::debug!("Suppressing repeated password prompt");
                }
            }
            SubmissionOutcome::DomainError {
                error_code,
                message,
                trace,
                ..
            } => {
                self.presenter.show_error_banner(&ErrorBanner::new(
                    format!("{}:{}", error_code, message),
                    trace.clone(),
                ));
            }
            SubmissionOutcome::TransportError(message) => {
                self.presenter
                    .show_error_banner(&ErrorBanner::new(message.clone(), String::new()));
            }
        }
    }

    /// 結果を伴わないローカルエラー（保存失敗など）を表示
    pub fn report_error(&self, message: impl Into<String>) {
        self.presenter
            .show_error_banner(&ErrorBanner::new(message, String::new()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::outcome::Artifact;
    use crate::domain::ports::presenter::MockPresenter;
    use mockall::predicate::eq;

    #[test]
    fn test_latch_fires_once_until_reset() {
        let latch = PasswordPromptLatch::new();
        assert!(latch.try_fire());
        assert!(!latch.try_fire());
        latch.reset();
        assert!(latch.try_fire());
    }

    #[test]
    fn test_password_prompt_shown_once_per_submission() {
        let mut presenter = MockPresenter::new();
        presenter.expect_show_password_prompt().times(2).return_const(());

        let router = OutcomeRouter::new(Arc::new(presenter));
        router.begin_submission();
        router.route(&SubmissionOutcome::PasswordRequired);
        router.route(&SubmissionOutcome::PasswordRequired);
        router.route(&SubmissionOutcome::PasswordRequired);

        router.begin_submission();
        router.route(&SubmissionOutcome::PasswordRequired);
    }

    #[test]
    fn test_auth_expired_shows_session_expired() {
        let mut presenter = MockPresenter::new();
        presenter.expect_show_session_expired().times(1).return_const(());

        let router = OutcomeRouter::new(Arc::new(presenter));
        router.route(&SubmissionOutcome::AuthExpired);
    }

    #[test]
    fn test_domain_error_banner_joins_code_and_message() {
        let mut presenter = MockPresenter::new();
        presenter
            .expect_show_error_banner()
            .with(eq(ErrorBanner::new("Bad Request:invalid angle", "trace-1")))
            .times(1)
            .return_const(());

        let router = OutcomeRouter::new(Arc::new(presenter));
        router.route(&SubmissionOutcome::DomainError {
            status: 400,
            error_code: "Bad Request".into(),
            message: "invalid angle".into(),
            trace: "trace-1".into(),
        });
    }

    #[test]
    fn test_transport_error_banner_has_empty_trace() {
        let mut presenter = MockPresenter::new();
        presenter
            .expect_show_error_banner()
            .with(eq(ErrorBanner::new("HTTP error: status 502", "")))
            .times(1)
            .return_const(());

        let router = OutcomeRouter::new(Arc::new(presenter));
        router.route(&SubmissionOutcome::TransportError(
            "HTTP error: status 502".into(),
        ));
    }

    #[test]
    fn test_success_is_not_presented() {
        // 期待値を設定していないため、呼ばれるとパニックする
        let presenter = MockPresenter::new();
        let router = OutcomeRouter::new(Arc::new(presenter));
        router.route(&SubmissionOutcome::Success(Artifact::new(
            "a.pdf",
            vec![],
            "application/pdf",
        )));
    }
}
