//! Console Progress
//!
//! indicatifのプログレスバーでバッチの進捗を表示する

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use log::debug;
use std::sync::Mutex;

use crate::domain::ports::progress_reporter::ProgressReporter;

const TEMPLATE: &str = "  {spinner:.green} [{bar:40.cyan/blue}] {pos:>3}% | {msg}";

/// プログレスバー表示
pub struct ConsoleProgress {
    bar: Mutex<Option<ProgressBar>>,
    hidden: bool,
}

impl ConsoleProgress {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
            hidden: false,
        }
    }

    /// 何も描画しない（ドライランとテスト用）
    pub fn hidden() -> Self {
        Self {
            bar: Mutex::new(None),
            hidden: true,
        }
    }

    fn create_bar(&self) -> ProgressBar {
        let bar = if self.hidden {
            ProgressBar::with_draw_target(Some(100), ProgressDrawTarget::hidden())
        } else {
            ProgressBar::new(100)
        };
        match ProgressStyle::default_bar().template(TEMPLATE) {
            Ok(style) => bar.set_style(style.progress_chars("█▓░")),
            Err(e) => debug!("Invalid progress template: {}", e),
        }
        bar
    }

    /// 現在のバー位置（%）。バッチ実行中でなければ `None`
    pub fn position(&self) -> Option<u64> {
        self.bar
            .lock()
            .ok()
            .and_then(|bar| bar.as_ref().map(ProgressBar::position))
    }
}

impl Default for ConsoleProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter for ConsoleProgress {
    fn start(&self, total: usize) {
        let bar = self.create_bar();
        bar.set_message(format!("0/{} files", total));
        if let Ok(mut slot) = self.bar.lock() {
            *slot = Some(bar);
        }
    }

    fn advance(&self, completed: usize, total: usize, percent: f64) {
        if let Ok(slot) = self.bar.lock() {
            if let Some(bar) = slot.as_ref() {
                bar.set_position(percent.round() as u64);
                bar.set_message(format!("{}/{} files", completed, total));
            }
        }
    }

    fn finish(&self, total: usize) {
        if let Ok(mut slot) = self.bar.lock() {
            if let Some(bar) = slot.as_ref() {
                bar.set_position(100);
                bar.finish_with_message(format!("{}/{} files", total, total));
            }
            *slot = None;
        }
    }
}
