//! # Domain Entities
//!
//! ビジネスエンティティとバリューオブジェクトを定義するモジュール
//!
//! ## エンティティ
//!
//! - **SubmissionRequest**: 1回の送信で使うフォーム
//! - **HttpResponse**: 完了したHTTP応答
//! - **SubmissionOutcome**: 送信結果の分類
//! - **BatchJob**: 一括送信ジョブ
//! - **AggregationResult / BatchReport**: 集約結果

pub mod aggregation;
pub mod batch_job;
pub mod http_response;
pub mod outcome;
pub mod submission_request;
