//! Integration tests for docsubmit
//!
//! 実際のアダプター（reqwest, ZIP, ファイルシステム）を組み合わせた送信の検証

use std::fs;
use std::io::{Cursor, Read};
use std::path::Path;
use std::sync::Arc;

use docsubmit::adapter::config::Config;
use docsubmit::adapter::presenter::console_presenter::ConsolePresenter;
use docsubmit::adapter::presenter::console_progress::ConsoleProgress;
use docsubmit::application::use_cases::submit_form::{FormSubmission, SubmissionSummary};
use docsubmit::domain::entities::aggregation::AggregationResult;
use docsubmit::domain::entities::outcome::SubmissionOutcome;
use docsubmit::domain::entities::submission_request::FilePart;
use docsubmit::driver::workflow::SubmissionWorkflow;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ENDPOINT: &str = "/api/v1/general/rotate-pdf";

fn config(base_url: &str, output_dir: &Path) -> Config {
    Config {
        base_url: base_url.to_string(),
        output_dir: output_dir.to_string_lossy().to_string(),
        request_timeout_secs: 10,
        ..Default::default()
    }
}

fn pdf_files(n: usize) -> Vec<FilePart> {
    (0..n)
        .map(|i| {
            FilePart::new(
                format!("doc-{}.pdf", i),
                "application/pdf",
                format!("%PDF-1.4 doc {}", i).into_bytes(),
            )
        })
        .collect()
}

fn form(files: Vec<FilePart>) -> FormSubmission {
    FormSubmission {
        endpoint: ENDPOINT.to_string(),
        files,
        fields: vec![("angle".to_string(), "90".to_string())],
        submit_override: None,
    }
}

async fn mount_pdf_result(server: &MockServer, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Content-Type", "application/pdf")
                .insert_header("Content-Disposition", "attachment; filename=\"rotated.pdf\"")
                .set_body_bytes(b"%PDF-1.4 rotated".to_vec()),
        )
        .expect(expected_calls)
        .mount(server)
        .await;
}

fn build(workflow: &SubmissionWorkflow) -> docsubmit::application::use_cases::submit_form::SubmitFormUseCase {
    workflow
        .build_use_case(
            Arc::new(ConsolePresenter::new()),
            Arc::new(ConsoleProgress::hidden()),
        )
        .unwrap()
}

#[tokio::test]
async fn test_ten_files_are_combined_into_zip() {
    let server = MockServer::start().await;
    mount_pdf_result(&server, 10).await;
    let output = TempDir::new().unwrap();

    let workflow = SubmissionWorkflow::new(config(&server.uri(), output.path()));
    let summary = build(&workflow).execute(form(pdf_files(10))).await.unwrap();

    let report = match summary {
        SubmissionSummary::Batch(report) => report,
        other => panic!("expected batch, got {:?}", other),
    };
    assert_eq!(report.chunk_sizes, vec![8, 2]);
    assert!(report.is_clean());
    assert!(matches!(
        report.aggregation,
        Some(AggregationResult::Archive { .. })
    ));

    // 出力ディレクトリにはZIPだけが保存される
    let saved: Vec<String> = fs::read_dir(output.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    assert_eq!(saved, vec!["files.zip"]);

    let bytes = fs::read(output.path().join("files.zip")).unwrap();
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    assert_eq!(archive.len(), 10);
    let mut content = String::new();
    archive
        .by_index(0)
        .unwrap()
        .read_to_string(&mut content)
        .unwrap();
    assert_eq!(content, "%PDF-1.4 rotated");
}

#[tokio::test]
async fn test_three_files_are_saved_individually() {
    let server = MockServer::start().await;
    mount_pdf_result(&server, 3).await;
    let output = TempDir::new().unwrap();

    let workflow = SubmissionWorkflow::new(config(&server.uri(), output.path()));
    let summary = build(&workflow).execute(form(pdf_files(3))).await.unwrap();

    assert!(summary.is_clean());
    let mut saved: Vec<String> = fs::read_dir(output.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    saved.sort();
    assert_eq!(saved, vec!["rotated (1).pdf", "rotated (2).pdf", "rotated.pdf"]);
}

#[tokio::test]
async fn test_expired_session_saves_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    let output = TempDir::new().unwrap();

    let workflow = SubmissionWorkflow::new(config(&server.uri(), output.path()));
    let summary = build(&workflow).execute(form(pdf_files(1))).await.unwrap();

    match summary {
        SubmissionSummary::Single(result) => {
            assert_eq!(result.outcome, SubmissionOutcome::AuthExpired);
            assert!(result.delivered.is_none());
        }
        other => panic!("expected single, got {:?}", other),
    }
    assert!(!output.path().join("rotated.pdf").exists());
}

#[tokio::test]
async fn test_domain_error_for_one_file_keeps_the_rest() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(wiremock::matchers::body_string_contains("filename=\"doc-1.pdf\""))
        .respond_with(ResponseTemplate::new(400).set_body_raw(
            r#"{"error":"Bad Request","message":"Unsupported page size","trace":""}"#,
            "application/json",
        ))
        .with_priority(1)
        .mount(&server)
        .await;
    mount_pdf_result(&server, 2).await;
    let output = TempDir::new().unwrap();

    let workflow = SubmissionWorkflow::new(config(&server.uri(), output.path()));
    let summary = build(&workflow).execute(form(pdf_files(3))).await.unwrap();

    let report = match summary {
        SubmissionSummary::Batch(report) => report,
        other => panic!("expected batch, got {:?}", other),
    };
    assert_eq!(report.success_count(), 2);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].file_name, "doc-1.pdf");
    assert!(matches!(
        report.failures[0].outcome,
        SubmissionOutcome::DomainError { status: 400, .. }
    ));
}
