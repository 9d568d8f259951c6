//! # Use Cases
//!
//! アプリケーションのビジネスフロー（ユースケース）
//!
//! ## ユースケース
//!
//! - **SubmitSingleUseCase**: ファイル1件分の送信と計測
//! - **RunBatchUseCase**: チャンク単位の並行送信と集約
//! - **SubmitFormUseCase**: 単一/複数の振り分けと表示制御

pub mod run_batch;
pub mod submit_form;
pub mod submit_single;
