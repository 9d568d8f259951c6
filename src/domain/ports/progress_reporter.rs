//! # Progress Reporter Trait

#[cfg(test)]
use mockall::automock;

/// 進捗表示
#[cfg_attr(test, automock)]
pub trait ProgressReporter: Send + Sync {
    /// バッチ開始（0%）
    fn start(&self, total: usize);

    /// 1ファイル完了ごとに呼ばれる
    fn advance(&self, completed: usize, total: usize, percent: f64);

    /// バッチ終了（常に100%）
    fn finish(&self, total: usize);
}
