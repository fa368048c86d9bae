//! Upload client.
//!
//! [`Uploader`] owns the configuration and transport and exposes the upload
//! surface: signed and unsigned uploads, re-processing of existing resources
//! (`explicit`), text image generation, chunked large-file uploads, and tag
//! and context metadata calls.

mod upload_large;

pub use upload_large::DEFAULT_CHUNK_SIZE;

use crate::config::Config;
use crate::params::{ContextMap, UploadOptions};
use crate::signing;
use crate::transport::{FilePart, HttpTransport};
use crate::types::{DestroyResult, MetadataResult, UploadResult};
use crate::{Error, Result};
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;

/// What to upload.
///
/// Remote URLs and data URIs travel as a `file` form field; local paths and
/// in-memory bytes become a multipart file part.
#[derive(Debug, Clone)]
pub enum UploadSource {
    Path(PathBuf),
    Bytes { data: Vec<u8>, filename: String },
    Remote(String),
}

impl UploadSource {
    pub fn path(path: impl Into<PathBuf>) -> Self {
        UploadSource::Path(path.into())
    }

    pub fn bytes(data: impl Into<Vec<u8>>, filename: impl Into<String>) -> Self {
        UploadSource::Bytes {
            data: data.into(),
            filename: filename.into(),
        }
    }

    pub fn url(url: impl Into<String>) -> Self {
        UploadSource::Remote(url.into())
    }

    /// Build a `data:` URI source from raw bytes.
    pub fn data_uri(mime: &str, data: &[u8]) -> Self {
        use base64::Engine;
        let encoded = base64::engine::general_purpose::STANDARD.encode(data);
        UploadSource::Remote(format!("data:{};base64,{}", mime, encoded))
    }

    fn is_remote(raw: &str) -> bool {
        ["http:", "https:", "ftp:", "s3:", "gs:", "data:"]
            .iter()
            .any(|scheme| raw.starts_with(scheme))
    }
}

impl From<&str> for UploadSource {
    fn from(raw: &str) -> Self {
        if UploadSource::is_remote(raw) {
            UploadSource::Remote(raw.to_string())
        } else {
            UploadSource::Path(PathBuf::from(raw))
        }
    }
}

impl From<String> for UploadSource {
    fn from(raw: String) -> Self {
        UploadSource::from(raw.as_str())
    }
}

impl From<&Path> for UploadSource {
    fn from(path: &Path) -> Self {
        UploadSource::Path(path.to_path_buf())
    }
}

impl From<PathBuf> for UploadSource {
    fn from(path: PathBuf) -> Self {
        UploadSource::Path(path)
    }
}

/// Builder for an [`Uploader`] with test-friendly overrides.
pub struct UploaderBuilder {
    config: Config,
    base_url_override: Option<String>,
}

impl UploaderBuilder {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            base_url_override: None,
        }
    }

    /// Override the API base URL.
    ///
    /// This is primarily for testing against a local mock server. In
    /// production, use the upload prefix from the configuration.
    pub fn base_url_override(mut self, base_url: impl Into<String>) -> Self {
        self.base_url_override = Some(base_url.into());
        self
    }

    pub fn build(mut self) -> Result<Uploader> {
        if let Some(base_url) = self.base_url_override.take() {
            self.config.upload_prefix = base_url;
        }
        Uploader::new(self.config)
    }
}

/// Client for the upload API.
pub struct Uploader {
    config: Config,
    transport: Arc<HttpTransport>,
}

impl Uploader {
    pub fn new(config: Config) -> Result<Self> {
        if config.cloud_name.is_empty() {
            return Err(Error::configuration("cloud_name must not be empty"));
        }
        let transport = Arc::new(HttpTransport::new(config.upload_prefix.clone())?);
        Ok(Self { config, transport })
    }

    pub fn builder(config: Config) -> UploaderBuilder {
        UploaderBuilder::new(config)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Upload a local file, raw bytes, remote URL, or data URI.
    pub async fn upload(
        &self,
        source: impl Into<UploadSource>,
        options: &UploadOptions,
    ) -> Result<UploadResult> {
        let params = options.to_params()?;
        let (params, file) = attach_source(params, source.into()).await?;
        let params = self.sign(params)?;
        self.call_api(options.resource_type_or_default(), "upload", params, file, &[])
            .await
    }

    /// Upload without a signature, authorized by an unsigned upload preset.
    pub async fn unsigned_upload(
        &self,
        source: impl Into<UploadSource>,
        upload_preset: &str,
        options: &UploadOptions,
    ) -> Result<UploadResult> {
        let mut params = options.to_params()?;
        params.insert("upload_preset".to_string(), upload_preset.to_string());
        params.insert("timestamp".to_string(), timestamp_now().to_string());
        let (params, file) = attach_source(params, source.into()).await?;
        self.call_api(options.resource_type_or_default(), "upload", params, file, &[])
            .await
    }

    /// Re-process an already-uploaded resource (eager transformations,
    /// coordinates, responsive breakpoints, quality override).
    pub async fn explicit(&self, public_id: &str, options: &UploadOptions) -> Result<UploadResult> {
        let mut params = options.to_params()?;
        params.insert("public_id".to_string(), public_id.to_string());
        let params = self.sign(params)?;
        self.call_api(options.resource_type_or_default(), "explicit", params, None, &[])
            .await
    }

    /// Generate an image from a string of text.
    pub async fn text(&self, text: &str, options: &UploadOptions) -> Result<UploadResult> {
        let mut params = options.to_params()?;
        params.insert("text".to_string(), text.to_string());
        let params = self.sign(params)?;
        self.call_api(options.resource_type_or_default(), "text", params, None, &[])
            .await
    }

    /// Delete a single resource by public ID.
    pub async fn destroy(&self, public_id: &str, options: &UploadOptions) -> Result<DestroyResult> {
        let mut params = options.to_params()?;
        params.insert("public_id".to_string(), public_id.to_string());
        let params = self.sign(params)?;
        self.call_api(options.resource_type_or_default(), "destroy", params, None, &[])
            .await
    }

    /// Add a tag to one or more resources.
    pub async fn add_tag(&self, tag: &str, public_ids: &[&str]) -> Result<MetadataResult> {
        self.tag_command("add", Some(tag), public_ids).await
    }

    /// Remove a tag from one or more resources.
    pub async fn remove_tag(&self, tag: &str, public_ids: &[&str]) -> Result<MetadataResult> {
        self.tag_command("remove", Some(tag), public_ids).await
    }

    /// Replace all tags on one or more resources with a single tag.
    pub async fn replace_tag(&self, tag: &str, public_ids: &[&str]) -> Result<MetadataResult> {
        self.tag_command("replace", Some(tag), public_ids).await
    }

    /// Remove every tag from one or more resources.
    pub async fn remove_all_tags(&self, public_ids: &[&str]) -> Result<MetadataResult> {
        self.tag_command("remove_all", None, public_ids).await
    }

    /// Add context metadata to one or more resources.
    pub async fn add_context(
        &self,
        context: &ContextMap,
        public_ids: &[&str],
    ) -> Result<MetadataResult> {
        let mut params = BTreeMap::new();
        params.insert("command".to_string(), "add".to_string());
        params.insert("context".to_string(), context.to_wire());
        params.insert("public_ids".to_string(), public_ids.join(","));
        let params = self.sign(params)?;
        self.call_api("image", "context", params, None, &[]).await
    }

    /// Remove all context metadata from one or more resources.
    pub async fn remove_all_context(&self, public_ids: &[&str]) -> Result<MetadataResult> {
        let mut params = BTreeMap::new();
        params.insert("command".to_string(), "remove_all".to_string());
        params.insert("public_ids".to_string(), public_ids.join(","));
        let params = self.sign(params)?;
        self.call_api("image", "context", params, None, &[]).await
    }

    /// Check the signature the service attached to an upload response.
    pub fn verify_response(&self, result: &UploadResult) -> Result<bool> {
        let (_, secret) = self.config.require_credentials()?;
        let Some(ref signature) = result.signature else {
            return Ok(false);
        };
        Ok(signing::verify_response_signature(
            &result.public_id,
            result.version,
            signature,
            secret,
            self.config.signature_algorithm,
        ))
    }

    async fn tag_command(
        &self,
        command: &str,
        tag: Option<&str>,
        public_ids: &[&str],
    ) -> Result<MetadataResult> {
        let mut params = BTreeMap::new();
        params.insert("command".to_string(), command.to_string());
        if let Some(tag) = tag {
            params.insert("tag".to_string(), tag.to_string());
        }
        params.insert("public_ids".to_string(), public_ids.join(","));
        let params = self.sign(params)?;
        self.call_api("image", "tags", params, None, &[]).await
    }

    /// Attach `timestamp`, `signature`, and `api_key` to a wire map.
    pub(crate) fn sign(
        &self,
        mut params: BTreeMap<String, String>,
    ) -> Result<BTreeMap<String, String>> {
        let (api_key, api_secret) = self.config.require_credentials()?;
        params
            .entry("timestamp".to_string())
            .or_insert_with(|| timestamp_now().to_string());
        let signature =
            signing::sign_parameters(&params, api_secret, self.config.signature_algorithm);
        params.insert("api_key".to_string(), api_key.to_string());
        params.insert("signature".to_string(), signature);
        Ok(params)
    }

    pub(crate) async fn call_api<T: DeserializeOwned>(
        &self,
        resource_type: &str,
        action: &str,
        params: BTreeMap<String, String>,
        file: Option<FilePart>,
        extra_headers: &[(String, String)],
    ) -> Result<T> {
        let path = format!("/v1_1/{}/{}/{}", self.config.cloud_name, resource_type, action);
        debug!(%action, %resource_type, params = params.len(), "calling upload API");
        let body = self
            .transport
            .post_upload(&path, &params, file, extra_headers)
            .await?;
        Ok(serde_json::from_value(body)?)
    }
}

fn timestamp_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Move the source into the request: remote sources become the `file` form
/// field, local sources become the multipart file part.
pub(crate) async fn attach_source(
    mut params: BTreeMap<String, String>,
    source: UploadSource,
) -> Result<(BTreeMap<String, String>, Option<FilePart>)> {
    match source {
        UploadSource::Remote(url) => {
            params.insert("file".to_string(), url);
            Ok((params, None))
        }
        UploadSource::Bytes { data, filename } => Ok((
            params,
            Some(FilePart {
                bytes: data,
                filename,
            }),
        )),
        UploadSource::Path(path) => {
            let filename = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "file".to_string());
            let bytes = tokio::fs::read(&path).await?;
            Ok((
                params,
                Some(FilePart {
                    bytes,
                    filename,
                }),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strings_split_into_remote_and_local_sources() {
        assert!(matches!(
            UploadSource::from("https://example.test/logo.png"),
            UploadSource::Remote(_)
        ));
        assert!(matches!(
            UploadSource::from("data:image/png;base64,iVBOR"),
            UploadSource::Remote(_)
        ));
        assert!(matches!(
            UploadSource::from("tests/fixtures/logo.png"),
            UploadSource::Path(_)
        ));
    }

    #[test]
    fn remote_sources_become_the_file_field() {
        let (params, file) = tokio_test::block_on(attach_source(
            BTreeMap::new(),
            UploadSource::url("https://example.test/logo.png"),
        ))
        .unwrap();
        assert_eq!(params["file"], "https://example.test/logo.png");
        assert!(file.is_none());
    }

    #[test]
    fn byte_sources_become_the_file_part() {
        let (params, file) = tokio_test::block_on(attach_source(
            BTreeMap::new(),
            UploadSource::bytes(b"pixels".to_vec(), "stream"),
        ))
        .unwrap();
        assert!(!params.contains_key("file"));
        let file = file.unwrap();
        assert_eq!(file.filename, "stream");
        assert_eq!(file.bytes, b"pixels");
    }

    #[test]
    fn data_uri_sources_are_remote() {
        let source = UploadSource::data_uri("image/png", b"not-a-real-png");
        match source {
            UploadSource::Remote(uri) => {
                assert!(uri.starts_with("data:image/png;base64,"));
            }
            other => panic!("expected remote source, got {other:?}"),
        }
    }

    #[test]
    fn signing_adds_auth_params_and_keeps_them_unsigned() {
        let uploader = Uploader::new(Config::new("demo").with_credentials("key", "secret")).unwrap();
        let mut params = BTreeMap::new();
        params.insert("public_id".to_string(), "sample".to_string());
        params.insert("timestamp".to_string(), "1315060510".to_string());

        let signed = uploader.sign(params.clone()).unwrap();
        assert_eq!(signed["api_key"], "key");
        // api_key/signature are excluded from the signed string, so the
        // attached signature equals the one over the bare params.
        assert_eq!(
            signed["signature"],
            signing::sign_parameters(
                &params,
                "secret",
                crate::config::SignatureAlgorithm::Sha256
            )
        );
    }

    #[test]
    fn signing_without_credentials_fails() {
        let uploader = Uploader::new(Config::new("demo")).unwrap();
        assert!(uploader.sign(BTreeMap::new()).is_err());
    }

    #[test]
    fn verify_response_round_trip() {
        let uploader = Uploader::new(Config::new("demo").with_credentials("key", "secret")).unwrap();
        let mut params = BTreeMap::new();
        params.insert("public_id".to_string(), "sample".to_string());
        params.insert("version".to_string(), "1571218330".to_string());
        let signature = signing::sign_parameters(
            &params,
            "secret",
            crate::config::SignatureAlgorithm::Sha256,
        );

        let result: UploadResult = serde_json::from_value(serde_json::json!({
            "public_id": "sample",
            "version": 1571218330u64,
            "signature": signature,
        }))
        .unwrap();
        assert!(uploader.verify_response(&result).unwrap());
    }
}
