use async_trait::async_trait;
use labpass_core::{CoreError, ResourceStore, Result};
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

const FHIR_JSON: &str = "application/json+fhir";

/// HTTP gateway to a DSTU2 FHIR server.
pub struct FhirClient {
    http: reqwest::Client,
    base_url: String,
}

impl FhirClient {
    pub fn new(base_url: &Url) -> Self {
        let base_url = base_url.as_str().trim_end_matches('/').to_string();
        Self {
            http: reqwest::Client::new(),
            base_url,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn fhir_url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        self.http.request(method, url).header("Accept", FHIR_JSON)
    }
}

#[async_trait]
impl ResourceStore for FhirClient {
    async fn create(&self, resource_type: &str, body: &Value) -> Result<Value> {
        let url = self.fhir_url(resource_type);
        debug!(%url, "POST");
        let resp = self
            .request(reqwest::Method::POST, &url)
            .header("Content-Type", FHIR_JSON)
            .json(body)
            .send()
            .await
            .map_err(|e| CoreError::transport(format!("Failed to connect to server: {e}")))?;
        handle_response(resp).await
    }

    async fn read(&self, resource_type: &str, id: &str) -> Result<Value> {
        let url = self.fhir_url(&format!("{resource_type}/{id}"));
        debug!(%url, "GET");
        let resp = self
            .request(reqwest::Method::GET, &url)
            .send()
            .await
            .map_err(|e| CoreError::transport(format!("Failed to connect to server: {e}")))?;
        handle_response(resp).await
    }
}

async fn handle_response(resp: reqwest::Response) -> Result<Value> {
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();

    if !status.is_success() {
        if let Ok(json) = serde_json::from_str::<Value>(&body)
            && json.get("resourceType").and_then(|v| v.as_str()) == Some("OperationOutcome")
            && let Some(issues) = json.get("issue").and_then(|v| v.as_array())
        {
            let msgs: Vec<&str> = issues
                .iter()
                .filter_map(|i| i.get("diagnostics").and_then(|d| d.as_str()))
                .collect();
            if !msgs.is_empty() {
                warn!(status = status.as_u16(), diagnostics = %msgs.join("; "), "server rejected request");
            }
        }
        return Err(CoreError::remote_rejection(status.as_u16(), body));
    }

    if body.is_empty() {
        return Err(CoreError::invalid_resource(format!(
            "HTTP {status} with an empty body"
        )));
    }

    Ok(serde_json::from_str(&body)?)
}
