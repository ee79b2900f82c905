use std::fmt;
use std::time::Duration;

use bytes::Bytes;
use drivegate_config::DooraySettings;
use reqwest::header::{AUTHORIZATION, LOCATION};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url, redirect};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::error::{Step, UpstreamError};
use super::model::{Envelope, EnvelopeHeader};

/// Bearer credential for the upstream. Never serialized, redacted in `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiToken(String);

impl ApiToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    fn header_value(&self) -> String {
        format!("dooray-api {}", self.0)
    }
}

impl fmt::Debug for ApiToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiToken(***)")
    }
}

/// A file to be sent as the single `file` part of a multipart upload.
#[derive(Debug, Clone)]
pub struct UploadPart {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

impl UploadPart {
    fn to_form(&self, step: Step) -> Result<Form, UpstreamError> {
        let mime = self
            .content_type
            .as_deref()
            .unwrap_or("application/octet-stream");
        let part = Part::stream_with_length(
            reqwest::Body::from(self.bytes.clone()),
            self.bytes.len() as u64,
        )
        .file_name(self.file_name.clone())
        .mime_str(mime)
        .map_err(UpstreamError::transport(step))?;
        Ok(Form::new().part("file", part))
    }
}

/// Thin authenticated wrapper around the shared HTTP client.
///
/// Cloning is cheap; clones share the connection pool.
#[derive(Clone)]
pub struct DoorayClient {
    http: Client,
    // Uploads handle 301/307 themselves so the body can be rebuilt.
    upload_http: Client,
    base_url: String,
}

impl DoorayClient {
    pub fn new(settings: &DooraySettings) -> Result<Self, reqwest::Error> {
        let timeout = Duration::from_secs(settings.request_timeout_secs);
        let connect_timeout = Duration::from_secs(settings.connect_timeout_secs);

        let http = Client::builder()
            .timeout(timeout)
            .connect_timeout(connect_timeout)
            .build()?;
        let upload_http = Client::builder()
            .timeout(timeout)
            .connect_timeout(connect_timeout)
            .redirect(redirect::Policy::none())
            .build()?;

        Ok(Self {
            http,
            upload_http,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// GET a JSON envelope and return its `result`, `None` when it is null.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        token: &ApiToken,
        step: Step,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Option<T>, UpstreamError> {
        let request = self
            .http
            .get(self.url(path))
            .query(query)
            .header(AUTHORIZATION, token.header_value());
        let response = send(request, step).await?;
        let body = success_body(response, step).await?;

        let envelope: Envelope<T> = serde_json::from_slice(&body)
            .map_err(|e| UpstreamError::malformed(step, e.to_string()))?;
        check_header(&envelope.header, step)?;
        Ok(envelope.result)
    }

    /// GET a raw body.
    pub async fn get_bytes(
        &self,
        token: &ApiToken,
        step: Step,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Bytes, UpstreamError> {
        let request = self
            .http
            .get(self.url(path))
            .query(query)
            .header(AUTHORIZATION, token.header_value());
        let response = send(request, step).await?;
        success_body(response, step).await
    }

    /// POST `multipart/form-data`, re-posting once to `Location` on 301/307.
    ///
    /// Any 2xx JSON body is returned as is, including an envelope whose
    /// header reports failure, so callers can relay it unchanged.
    pub async fn post_multipart(
        &self,
        token: &ApiToken,
        step: Step,
        path: &str,
        query: &[(&str, String)],
        upload: &UploadPart,
    ) -> Result<serde_json::Value, UpstreamError> {
        let mut url = Url::parse(&self.url(path))
            .map_err(|e| UpstreamError::malformed(step, e.to_string()))?;
        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())));
        }

        let response = self.post_form(token, step, url, upload).await?;
        let response = match response.status() {
            StatusCode::MOVED_PERMANENTLY | StatusCode::TEMPORARY_REDIRECT => {
                let target = redirect_target(&response, step)?;
                debug!(%step, %target, "Following upload redirect");
                self.post_form(token, step, target, upload).await?
            }
            _ => response,
        };

        let body = success_body(response, step).await?;
        let value: serde_json::Value = serde_json::from_slice(&body)
            .map_err(|e| UpstreamError::malformed(step, e.to_string()))?;
        if let Ok(header) = EnvelopeHeader::deserialize(&value["header"]) {
            if !header.is_successful {
                warn!(
                    %step,
                    code = header.result_code,
                    message = %header.result_message,
                    "Upstream envelope reports failure"
                );
            }
        }
        Ok(value)
    }

    async fn post_form(
        &self,
        token: &ApiToken,
        step: Step,
        url: Url,
        upload: &UploadPart,
    ) -> Result<Response, UpstreamError> {
        let request = self
            .upload_http
            .post(url)
            .header(AUTHORIZATION, token.header_value())
            .multipart(upload.to_form(step)?);
        send(request, step).await
    }
}

async fn send(request: RequestBuilder, step: Step) -> Result<Response, UpstreamError> {
    let response = request
        .send()
        .await
        .map_err(UpstreamError::transport(step))?;
    debug!(%step, url = %response.url().path(), status = %response.status(), "Upstream call");
    Ok(response)
}

async fn success_body(response: Response, step: Step) -> Result<Bytes, UpstreamError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(UpstreamError::Status { step, status, body });
    }
    response
        .bytes()
        .await
        .map_err(UpstreamError::transport(step))
}

fn check_header(header: &EnvelopeHeader, step: Step) -> Result<(), UpstreamError> {
    if header.is_successful {
        Ok(())
    } else {
        Err(UpstreamError::Rejected {
            step,
            code: header.result_code,
            message: header.result_message.clone(),
        })
    }
}

fn redirect_target(response: &Response, step: Step) -> Result<Url, UpstreamError> {
    let location = response
        .headers()
        .get(LOCATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| UpstreamError::malformed(step, "redirect without Location header"))?;
    response
        .url()
        .join(location)
        .map_err(|e| UpstreamError::malformed(step, format!("bad Location {location}: {e}")))
}
