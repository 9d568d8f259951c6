//! Reqwest Submission Gateway
//!
//! multipart/form-data でフォームをPOSTする

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::debug;
use reqwest::header::{HeaderMap, HeaderName, CONTENT_DISPOSITION, CONTENT_TYPE};
use reqwest::multipart::{Form, Part};
use std::time::Duration;

use crate::domain::entities::http_response::HttpResponse;
use crate::domain::entities::submission_request::SubmissionRequest;
use crate::domain::ports::submission_gateway::SubmissionGateway;

const FALLBACK_PART_TYPE: &str = "application/octet-stream";

/// reqwestベースの送信ゲートウェイ
pub struct ReqwestSubmissionGateway {
    client: reqwest::Client,
    base_url: String,
}

impl ReqwestSubmissionGateway {
    /// 基準URLとリクエストごとのタイムアウトを指定してゲートウェイを作成
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// 絶対URLはそのまま、パスは基準URLに連結する
    pub fn resolve_url(&self, endpoint: &str) -> String {
        if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            return endpoint.to_string();
        }
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        )
    }

    fn build_form(request: &SubmissionRequest) -> Result<Form> {
        let mut form = Form::new();

        for (key, value) in request.fields() {
            form = form.text(key.clone(), value.clone());
        }

        for file in request.files() {
            let content_type = if file.content_type.is_empty() {
                FALLBACK_PART_TYPE
            } else {
                file.content_type.as_str()
            };
            let part = Part::bytes(file.data.clone())
                .file_name(file.name.clone())
                .mime_str(content_type)
                .context(format!("Invalid content type for {}: {}", file.name, content_type))?;
            form = form.part(request.file_field().to_string(), part);
        }

        Ok(form)
    }
}

#[async_trait]
impl SubmissionGateway for ReqwestSubmissionGateway {
    async fn send(&self, endpoint: &str, request: &SubmissionRequest) -> Result<HttpResponse> {
        let url = self.resolve_url(endpoint);
        let form = Self::build_form(request)?;

        debug!("POST {} ({} file part(s))", url, request.files().len());

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    anyhow::anyhow!("Request to {} timed out", url)
                } else if e.is_connect() {
                    anyhow::anyhow!("Connection failed for {}: {}", url, e)
                } else {
                    anyhow::anyhow!("Request to {} failed: {}", url, e)
                }
            })?;

        let status = response.status().as_u16();
        let content_type = header_value(response.headers(), CONTENT_TYPE);
        let content_disposition = header_value(response.headers(), CONTENT_DISPOSITION);

        let body = response
            .bytes()
            .await
            .context(format!("Failed to read response body from {}", url))?;

        debug!("{} responded with status {}", url, status);

        Ok(HttpResponse {
            status,
            content_type,
            content_disposition,
            body: body.to_vec(),
        })
    }
}

fn header_value(headers: &HeaderMap, name: HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}
