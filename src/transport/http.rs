use crate::transport::TransportError;
use crate::{Error, Result};
use reqwest::multipart::{Form, Part};
use std::collections::BTreeMap;
use std::env;
use std::time::Duration;
use tracing::debug;

/// File payload attached to a multipart upload request.
#[derive(Debug, Clone)]
pub struct FilePart {
    pub bytes: Vec<u8>,
    pub filename: String,
}

pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        // Minimal production-friendly defaults (env-overridable).
        let timeout_secs = env::var("MEDIA_HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(60);

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .pool_max_idle_per_host(
                env::var("MEDIA_HTTP_POOL_MAX_IDLE_PER_HOST")
                    .ok()
                    .and_then(|s| s.parse::<usize>().ok())
                    .unwrap_or(16),
            )
            .pool_idle_timeout(Some(Duration::from_secs(
                env::var("MEDIA_HTTP_POOL_IDLE_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse::<u64>().ok())
                    .unwrap_or(90),
            )))
            .build()
            .map_err(|e| Error::Transport(TransportError::Other(e.to_string())))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// POST a multipart form and decode the JSON response.
    ///
    /// Every normalized parameter becomes a text part; the optional file
    /// payload becomes a binary `file` part. Extra headers carry chunked
    /// upload metadata (`Content-Range`, `X-Unique-Upload-Id`).
    pub async fn post_upload(
        &self,
        path: &str,
        fields: &BTreeMap<String, String>,
        file: Option<FilePart>,
        extra_headers: &[(String, String)],
    ) -> Result<serde_json::Value> {
        let url = format!("{}{}", self.base_url, path);

        let mut form = Form::new();
        for (key, value) in fields {
            form = form.text(key.clone(), value.clone());
        }
        if let Some(file) = file {
            form = form.part(
                "file",
                Part::bytes(file.bytes).file_name(file.filename),
            );
        }

        debug!(%url, field_count = fields.len(), "posting upload request");

        let mut request = self.client.post(&url).multipart(form);
        for (name, value) in extra_headers {
            request = request.header(name, value);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::Transport(TransportError::Http(e)))?;

        let status = response.status();
        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| Error::Transport(TransportError::Http(e)))?;

        if !status.is_success() {
            return Err(Error::Remote {
                status: status.as_u16(),
                message: remote_error_message(&body),
            });
        }
        Ok(body)
    }
}

/// The service reports failures as `{"error": {"message": "..."}}`.
fn remote_error_message(body: &serde_json::Value) -> String {
    body.pointer("/error/message")
        .and_then(|m| m.as_str())
        .map(str::to_string)
        .unwrap_or_else(|| body.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_error_message_prefers_nested_field() {
        let body = serde_json::json!({"error": {"message": "Raw convert is invalid"}});
        assert_eq!(remote_error_message(&body), "Raw convert is invalid");
    }

    #[test]
    fn remote_error_message_falls_back_to_body() {
        let body = serde_json::json!({"status": "failed"});
        assert_eq!(remote_error_message(&body), r#"{"status":"failed"}"#);
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let transport = HttpTransport::new("https://api.example.test/").unwrap();
        assert_eq!(transport.base_url(), "https://api.example.test");
    }
}
