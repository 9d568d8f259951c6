//! # Presenter Trait
//!
//! エラーバナー・セッション切れ表示・パスワード入力案内などの画面表示を抽象化

#[cfg(test)]
use mockall::automock;

/// エラーバナーの内容
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorBanner {
    pub message: String,
    pub trace: String,
}

impl ErrorBanner {
    pub fn new(message: impl Into<String>, trace: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            trace: trace.into(),
        }
    }
}

/// 画面表示
///
/// 表示の抑制（パスワード案内の1回制限など）は呼び出し側が行う
#[cfg_attr(test, automock)]
pub trait Presenter: Send + Sync {
    /// セッション切れバナーと再読み込みの案内
    fn show_session_expired(&self);

    /// パスワード入力の案内
    fn show_password_prompt(&self);

    /// エラーコード・メッセージ・トレースを含むバナー
    fn show_error_banner(&self, banner: &ErrorBanner);

    /// ファイル選択状態をクリア
    fn clear_file_selection(&self);

    /// 処理中表示の切り替え
    fn set_processing(&self, active: bool);

    /// 待ち時間が長い場合のヒント
    fn show_waiting_hint(&self);

    /// 処理完了の通知
    fn show_download_complete(&self);
}
