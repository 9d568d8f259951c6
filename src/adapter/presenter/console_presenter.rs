//! Console Presenter
//!
//! 画面表示を標準エラー出力への状態行として出す

use log::debug;
use std::io::Write;
use std::sync::Mutex;

use crate::domain::ports::presenter::{ErrorBanner, Presenter};

/// 端末向けのPresenter
///
/// 出力先は差し替え可能（既定は標準エラー出力）
pub struct ConsolePresenter {
    out: Mutex<Box<dyn Write + Send>>,
}

impl ConsolePresenter {
    pub fn new() -> Self {
        Self::with_writer(Box::new(std::io::stderr()))
    }

    pub fn with_writer(out: Box<dyn Write + Send>) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    fn line(&self, text: &str) {
        let Ok(mut out) = self.out.lock() else {
            return;
        };
        // 表示の失敗は処理を止めない
        if let Err(e) = writeln!(out, "{}", text) {
            debug!("Failed to write status line: {}", e);
        }
    }
}

impl Default for ConsolePresenter {
    fn default() -> Self {
        Self::new()
    }
}

impl Presenter for ConsolePresenter {
    fn show_session_expired(&self) {
        self.line("✗ Your session has expired. Sign in again and re-run the command.");
    }

    fn show_password_prompt(&self) {
        self.line("⚠ This PDF is password protected. Remove the password first, or pass it with --field password=<value>.");
    }

    fn show_error_banner(&self, banner: &ErrorBanner) {
        self.line(&format!("✗ {}", banner.message));
        if !banner.trace.is_empty() {
            for trace_line in banner.trace.lines() {
                self.line(&format!("    {}", trace_line));
            }
        }
    }

    fn clear_file_selection(&self) {
        debug!("File selection cleared");
    }

    fn set_processing(&self, active: bool) {
        if active {
            self.line("⋯ Processing...");
        }
    }

    fn show_waiting_hint(&self) {
        self.line("⋯ Still working. Large files can take a while.");
    }

    fn show_download_complete(&self) {
        self.line("✓ Download complete");
    }
}
