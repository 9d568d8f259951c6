//! CLI Argument Parsing
//!
//! CLIの引数解析

use clap::{Parser, ValueEnum};

use crate::application::dto::submit_config::SubmitOverride;

/// 複数ファイルの扱いの強制指定
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverrideMode {
    /// One request per file
    Multi,
    /// All files in one request
    Single,
}

impl From<OverrideMode> for SubmitOverride {
    fn from(mode: OverrideMode) -> Self {
        match mode {
            OverrideMode::Multi => SubmitOverride::Multi,
            OverrideMode::Single => SubmitOverride::Single,
        }
    }
}

/// ドキュメントを処理エンドポイントに送信するCLI
#[derive(Parser, Debug, Clone)]
#[command(name = "docsubmit")]
#[command(about = "Submit documents to a processing endpoint and collect the results", long_about = None)]
pub struct Args {
    /// Endpoint path (joined onto base_url) or absolute URL
    #[arg(short, long)]
    pub endpoint: String,

    /// Extra form field sent with every request (key=value, repeatable)
    #[arg(long = "field", value_name = "KEY=VALUE", value_parser = parse_field)]
    pub fields: Vec<(String, String)>,

    /// Force one request per file (multi) or one request for all files (single)
    #[arg(long = "override", value_enum)]
    pub submit_override: Option<OverrideMode>,

    /// Dry run mode - print the plan without sending
    #[arg(long)]
    pub dry_run: bool,

    /// Config file path
    #[arg(short, long, default_value = "./docsubmit.json")]
    pub config: String,

    /// Files or directories to submit
    #[arg(required = true)]
    pub files: Vec<String>,
}

/// `key=value` を分解する（値は空でもよい）
pub fn parse_field(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected KEY=VALUE, got '{}'", raw)),
    }
}
