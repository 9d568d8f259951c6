//! Docsubmit - Batch Document Submitter
//!
//! ファイルを処理エンドポイントに送信し、成果物を保存する

// coverage_nightly cfg が設定されている場合のみ coverage_attribute を有効化
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

use anyhow::Result;
use clap::Parser;

use docsubmit::adapter::config::Config;
use docsubmit::driver::{Args, SubmissionWorkflow};

#[cfg_attr(coverage_nightly, coverage(off))]
#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();

    // Load configuration
    let config = Config::load(&args.config)?;

    // Create workflow with injected dependencies
    let workflow = SubmissionWorkflow::new(config);

    workflow.execute(args).await
}
