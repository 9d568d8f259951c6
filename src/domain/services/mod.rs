//! # Domain Services
//!
//! エンティティに属さない純粋なビジネスルール
//!
//! - **ArtifactResolver**: HTTP応答の分類
//! - **OutcomeRouter**: 失敗結果の表示振り分け
//! - **ProgressCounter**: 進捗の計算
//! - **page_count**: PDFページ数の走査

pub mod artifact_resolver;
pub mod outcome_router;
pub mod page_count;
pub mod progress;
