//! # Domain Layer
//!
//! このモジュールはビジネスの核心的なルールとエンティティを定義します。
//!
//! ## 特徴
//!
//! - HTTPクライアントやファイルシステムについて何も知らない
//! - 外部との境界は `ports` の trait のみ
//! - 純粋なビジネスロジック
//!
//! ## 構成要素
//!
//! - **entities**: ビジネスエンティティ（SubmissionRequest, BatchJobなど）
//! - **ports**: 外部コラボレーターの trait（インターフェース定義のみ）
//! - **services**: Domain Service（応答分類、進捗、表示振り分け）

pub mod entities;
pub mod ports;
pub mod services;
