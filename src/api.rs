use crate::models::{Client, ClientInput, CreateInvoice, DashboardStats, Invoice, StatusUpdate};
use reqwest::header;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::{env, time::Duration};
use thiserror::Error;
use tracing::warn;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000/api";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Failures from the invoice API, collapsed to one displayable message
/// each. `Api` carries the server's own `{error}` message (or the HTTP
/// status text when the body is missing or unparsable); `Network` covers
/// everything where no usable response arrived.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Api(String),
    #[error("An unknown error occurred.")]
    Network(#[source] reqwest::Error),
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// A proxied PDF download with the filename the browser should save it as.
#[derive(Debug)]
pub struct PdfDownload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Thin client over the invoice REST API. No retries, no local cache; one
/// request per call with a fixed deadline.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    pub async fn list_clients(&self, limit: Option<u32>) -> Result<Vec<Client>, ApiError> {
        let mut url = self.url("/clients");
        if let Some(limit) = limit {
            url.push_str(&format!("?limit={limit}"));
        }
        decode(self.http.get(url).send().await).await
    }

    pub async fn create_client(&self, input: &ClientInput) -> Result<Client, ApiError> {
        decode(self.http.post(self.url("/clients")).json(input).send().await).await
    }

    pub async fn update_client(&self, id: i64, input: &ClientInput) -> Result<Client, ApiError> {
        let url = self.url(&format!("/clients/{id}"));
        decode(self.http.put(url).json(input).send().await).await
    }

    pub async fn delete_client(&self, id: i64) -> Result<(), ApiError> {
        let url = self.url(&format!("/clients/{id}"));
        check(self.http.delete(url).send().await).await.map(|_| ())
    }

    pub async fn list_invoices(&self) -> Result<Vec<Invoice>, ApiError> {
        decode(self.http.get(self.url("/invoices")).send().await).await
    }

    pub async fn create_invoice(&self, payload: &CreateInvoice) -> Result<Invoice, ApiError> {
        decode(self.http.post(self.url("/invoices")).json(payload).send().await).await
    }

    pub async fn get_invoice(&self, id: i64) -> Result<Invoice, ApiError> {
        decode(self.http.get(self.url(&format!("/invoices/{id}"))).send().await).await
    }

    pub async fn update_invoice_status(&self, id: i64, status: &str) -> Result<Invoice, ApiError> {
        let url = self.url(&format!("/invoices/{id}/status"));
        let body = StatusUpdate {
            status: status.to_string(),
        };
        decode(self.http.patch(url).json(&body).send().await).await
    }

    pub async fn delete_invoice(&self, id: i64) -> Result<(), ApiError> {
        let url = self.url(&format!("/invoices/{id}"));
        check(self.http.delete(url).send().await).await.map(|_| ())
    }

    /// Fetches the rendered PDF. The filename comes from the upstream
    /// `Content-Disposition` header when present, otherwise from the
    /// invoice number or id.
    pub async fn invoice_pdf(
        &self,
        id: i64,
        invoice_number: Option<&str>,
    ) -> Result<PdfDownload, ApiError> {
        let url = self.url(&format!("/invoices/{id}/pdf"));
        let response = check(self.http.get(url).send().await).await?;
        let filename = response
            .headers()
            .get(header::CONTENT_DISPOSITION)
            .and_then(|value| value.to_str().ok())
            .and_then(disposition_filename)
            .unwrap_or_else(|| fallback_pdf_name(id, invoice_number));
        let bytes = response.bytes().await.map_err(ApiError::Network)?;
        Ok(PdfDownload {
            filename,
            bytes: bytes.to_vec(),
        })
    }

    pub async fn dashboard_stats(&self) -> Result<DashboardStats, ApiError> {
        decode(self.http.get(self.url("/dashboard-stats")).send().await).await
    }
}

async fn check(
    result: Result<reqwest::Response, reqwest::Error>,
) -> Result<reqwest::Response, ApiError> {
    let response = result.map_err(ApiError::Network)?;
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let fallback = status
        .canonical_reason()
        .unwrap_or("Request failed")
        .to_string();
    let message = match response.json::<ErrorBody>().await {
        Ok(body) if !body.error.trim().is_empty() => body.error,
        _ => fallback,
    };
    warn!(%status, %message, "invoice API returned an error");
    Err(ApiError::Api(message))
}

async fn decode<T: DeserializeOwned>(
    result: Result<reqwest::Response, reqwest::Error>,
) -> Result<T, ApiError> {
    let response = check(result).await?;
    response.json().await.map_err(ApiError::Network)
}

/// Pulls a filename out of a `Content-Disposition: attachment` header.
pub fn disposition_filename(value: &str) -> Option<String> {
    if !value.contains("attachment") {
        return None;
    }
    let start = value.find("filename=")? + "filename=".len();
    let raw = value[start..].split(';').next().unwrap_or("").trim();
    let name = raw.trim_matches(|c| c == '"' || c == '\'').trim();
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

pub fn fallback_pdf_name(id: i64, invoice_number: Option<&str>) -> String {
    match invoice_number {
        Some(number) if !number.trim().is_empty() => format!("invoice_{}.pdf", number.trim()),
        _ => format!("invoice_{id}.pdf"),
    }
}

/// Base URL of the invoice API, overridable via `INVOICE_API_BASE_URL`.
pub fn resolve_base_url() -> String {
    match env::var("INVOICE_API_BASE_URL") {
        Ok(value) if !value.trim().is_empty() => value.trim().trim_end_matches('/').to_string(),
        _ => DEFAULT_BASE_URL.to_string(),
    }
}
