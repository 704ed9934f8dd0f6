use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde_json::Value;
use tracing::{info, warn};

use crate::error::{AnalysisError, Result};
use crate::upload::FileHandle;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

/// The two upload endpoints. Each expects its file under a fixed field name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    SupplyProcess,
    Predict,
}

impl Endpoint {
    pub fn path(self) -> &'static str {
        match self {
            Endpoint::SupplyProcess => "/supply/process",
            Endpoint::Predict => "/predict",
        }
    }

    pub fn field_name(self) -> &'static str {
        match self {
            Endpoint::SupplyProcess => "bom_file",
            Endpoint::Predict => "file",
        }
    }
}

/// HTTP client for the analysis service. No timeout: a request runs until
/// it completes or the transport fails.
#[derive(Debug, Clone)]
pub struct AnalysisClient {
    http: Client,
    base_url: String,
}

impl AnalysisClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// POST `file` as the only multipart field and return the decoded JSON body.
    pub async fn upload(&self, endpoint: Endpoint, file: &FileHandle) -> Result<Value> {
        let url = format!("{}{}", self.base_url, endpoint.path());
        let part = Part::bytes(file.bytes.to_vec())
            .file_name(file.name.clone())
            .mime_str(file.media_type)?;
        let form = Form::new().part(endpoint.field_name(), part);

        info!(
            "POST {} ({}={}, {} bytes)",
            url,
            endpoint.field_name(),
            file.name,
            file.len()
        );
        let response = self.http.post(&url).multipart(form).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("{} returned {}: {}", url, status, body);
            return Err(AnalysisError::ResponseStatus {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown Status").to_string(),
            });
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    #[test]
    fn endpoint_contract() {
        assert_eq!(Endpoint::SupplyProcess.path(), "/supply/process");
        assert_eq!(Endpoint::SupplyProcess.field_name(), "bom_file");
        assert_eq!(Endpoint::Predict.path(), "/predict");
        assert_eq!(Endpoint::Predict.field_name(), "file");
    }

    #[test]
    fn trailing_slash_is_dropped() {
        let c = AnalysisClient::new("http://localhost:8000/");
        assert_eq!(c.base_url(), "http://localhost:8000");
    }

    #[tokio::test]
    async fn sends_file_under_endpoint_field() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/predict")
            .match_body(Matcher::AllOf(vec![
                Matcher::Regex(r#"name="file"; filename="vial.png""#.to_string()),
                Matcher::Regex("image/png".to_string()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"prediction":"vial","mapped_biomedical_category":"Blue"}"#)
            .expect(1)
            .create_async()
            .await;

        let client = AnalysisClient::new(server.url());
        let file = FileHandle::new("vial.png", vec![1, 2, 3]);
        let body = client.upload(Endpoint::Predict, &file).await.unwrap();
        assert_eq!(body["mapped_biomedical_category"], "Blue");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn non_success_status_carries_code() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/supply/process")
            .with_status(400)
            .with_body(r#"{"detail":"BOM CSV must contain 'product_name' column."}"#)
            .create_async()
            .await;

        let client = AnalysisClient::new(server.url());
        let file = FileHandle::new("bom.csv", b"name\nx".to_vec());
        let err = client.upload(Endpoint::SupplyProcess, &file).await.unwrap_err();
        assert_eq!(
            err,
            AnalysisError::ResponseStatus {
                status: 400,
                reason: "Bad Request".into()
            }
        );
    }

    #[tokio::test]
    async fn html_body_is_parse_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/supply/process")
            .with_status(200)
            .with_body("<html>gateway</html>")
            .create_async()
            .await;

        let client = AnalysisClient::new(server.url());
        let file = FileHandle::new("bom.csv", b"a\n1".to_vec());
        let err = client.upload(Endpoint::SupplyProcess, &file).await.unwrap_err();
        assert!(matches!(err, AnalysisError::Parse(_)));
    }
}
