//! # Docsubmit
//!
//! ドキュメント処理エンドポイントへファイルを送信し、結果を受け取るツール
//!
//! このプロジェクトはクリーンアーキテクチャを採用しており、以下の4層で構成されています：
//!
//! - **Domain層**: 送信リクエスト・送信結果・バッチのルール（外部依存なし）
//! - **Application層**: 単一送信、バッチ送信、フォーム送信のユースケース
//! - **Adapter層**: 外部システムとの統合（HTTP, ファイルシステム, 端末等）
//! - **Driver層**: CLI、依存性注入

// coverage_nightly cfg が設定されている場合のみ coverage_attribute を有効化
// カバレッジ計測時に外部サービス依存コードを除外するために使用
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

// Domain層（純粋なビジネスロジック）
pub mod domain;

// Application層（ユースケース）
pub mod application;

// Adapter層（Infrastructure）
pub mod adapter;

// Driver層（Presentation）
pub mod driver;

// ローカルエラー型
pub mod error;
