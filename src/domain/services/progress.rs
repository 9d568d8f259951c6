//! # Progress Counter
//!
//! 完了数/総数の進捗カウンタ

/// 進捗カウンタ
///
/// 完了順に関係なく、最終値は完了したファイル数になる
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressCounter {
    completed: usize,
    total: usize,
}

impl ProgressCounter {
    pub fn new(total: usize) -> Self {
        Self {
            completed: 0,
            total,
        }
    }

    pub fn completed(&self) -> usize {
        self.completed
    }

    pub fn total(&self) -> usize {
        self.total
    }

    /// 1件完了として進め、表示用の割合を返す
    pub fn advance(&mut self) -> f64 {
        self.completed = (self.completed + 1).min(self.total);
        self.percent()
    }

    /// `completed / total * 100`（100で頭打ち）
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 100.0;
        }
        (self.completed as f64 / self.total as f64 * 100.0).min(100.0)
    }

    /// 失敗の有無にかかわらず100%にする
    pub fn force_complete(&mut self) {
        self.completed = self.total;
    }
}
