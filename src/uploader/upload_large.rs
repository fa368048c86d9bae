//! Chunked upload of large files.
//!
//! The file is split into `chunk_size` slices; every slice is posted to the
//! same signed parameter set with a shared `X-Unique-Upload-Id` header and a
//! `Content-Range` describing its byte span. The response to the final chunk
//! is the upload result. Remote URLs cannot be chunked client-side and fall
//! back to a regular upload.

use crate::params::UploadOptions;
use crate::transport::FilePart;
use crate::types::UploadResult;
use crate::uploader::{attach_source, UploadSource, Uploader};
use crate::{Error, Result};
use tokio::io::AsyncReadExt;
use tracing::debug;
use uuid::Uuid;

/// Default slice size: 20 MB.
pub const DEFAULT_CHUNK_SIZE: u64 = 20_000_000;

/// The service rejects non-final chunks smaller than this.
const MIN_CHUNK_SIZE: u64 = 5_000_000;

impl Uploader {
    /// Upload a large file in chunks.
    ///
    /// `chunk_size` defaults to [`DEFAULT_CHUNK_SIZE`]. Unlike [`Uploader::upload`],
    /// the resource type defaults to `raw`.
    pub async fn upload_large(
        &self,
        source: impl Into<UploadSource>,
        chunk_size: Option<u64>,
        options: &UploadOptions,
    ) -> Result<UploadResult> {
        let source = source.into();
        let chunk_size = chunk_size.unwrap_or(DEFAULT_CHUNK_SIZE);

        match source {
            UploadSource::Remote(_) => {
                // Nothing to chunk; hand the URL to the regular upload path
                // (keeping the raw default of this entry point).
                let params = options.to_params()?;
                let (params, file) = attach_source(params, source).await?;
                let params = self.sign(params)?;
                self.call_api(self.large_resource_type(options), "upload", params, file, &[])
                    .await
            }
            UploadSource::Bytes { data, filename } => {
                self.upload_chunks(&data, &filename, data.len() as u64, chunk_size, options)
                    .await
            }
            UploadSource::Path(path) => {
                let filename = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "file".to_string());
                let mut file = tokio::fs::File::open(&path).await?;
                let total = file.metadata().await?.len();
                ensure_chunkable(total, chunk_size)?;
                // Files within one chunk skip the streaming read.
                if total <= chunk_size {
                    let mut data = Vec::with_capacity(total as usize);
                    file.read_to_end(&mut data).await?;
                    return self
                        .upload_chunks(&data, &filename, total, chunk_size, options)
                        .await;
                }

                let upload_id = Uuid::new_v4().simple().to_string();
                let params = self.sign(options.to_params()?)?;
                let resource_type = self.large_resource_type(options);

                let mut offset = 0u64;
                let mut last = None;
                while offset < total {
                    let want = chunk_size.min(total - offset) as usize;
                    let mut buffer = vec![0u8; want];
                    file.read_exact(&mut buffer).await?;
                    last = Some(
                        self.send_chunk(
                            resource_type,
                            &params,
                            buffer,
                            &filename,
                            &upload_id,
                            offset,
                            total,
                        )
                        .await?,
                    );
                    offset += want as u64;
                }
                decode_final(last)
            }
        }
    }

    async fn upload_chunks(
        &self,
        data: &[u8],
        filename: &str,
        total: u64,
        chunk_size: u64,
        options: &UploadOptions,
    ) -> Result<UploadResult> {
        ensure_chunkable(total, chunk_size)?;
        let upload_id = Uuid::new_v4().simple().to_string();
        let params = self.sign(options.to_params()?)?;
        let resource_type = self.large_resource_type(options);

        let mut last = None;
        let mut offset = 0u64;
        for chunk in data.chunks(chunk_size as usize) {
            last = Some(
                self.send_chunk(
                    resource_type,
                    &params,
                    chunk.to_vec(),
                    filename,
                    &upload_id,
                    offset,
                    total,
                )
                .await?,
            );
            offset += chunk.len() as u64;
        }
        decode_final(last)
    }

    #[allow(clippy::too_many_arguments)]
    async fn send_chunk(
        &self,
        resource_type: &str,
        params: &std::collections::BTreeMap<String, String>,
        bytes: Vec<u8>,
        filename: &str,
        upload_id: &str,
        offset: u64,
        total: u64,
    ) -> Result<serde_json::Value> {
        let end = offset + bytes.len() as u64 - 1;
        debug!(%upload_id, offset, end, total, "sending upload chunk");
        let headers = vec![
            ("X-Unique-Upload-Id".to_string(), upload_id.to_string()),
            (
                "Content-Range".to_string(),
                format!("bytes {}-{}/{}", offset, end, total),
            ),
        ];
        self.call_api(
            resource_type,
            "upload",
            params.clone(),
            Some(FilePart {
                bytes,
                filename: filename.to_string(),
            }),
            &headers,
        )
        .await
    }

    fn large_resource_type<'a>(&self, options: &'a UploadOptions) -> &'a str {
        options.resource_type.as_deref().unwrap_or("raw")
    }
}

/// Sources within one chunk produce only a final chunk, which may be any
/// size; the minimum applies once non-final chunks exist.
fn ensure_chunkable(total: u64, chunk_size: u64) -> Result<()> {
    if total > chunk_size && chunk_size < MIN_CHUNK_SIZE {
        return Err(Error::validation(
            format!("chunk_size must be at least {} bytes", MIN_CHUNK_SIZE),
            "chunk_size",
        ));
    }
    Ok(())
}

fn decode_final(last: Option<serde_json::Value>) -> Result<UploadResult> {
    let body = last.ok_or_else(|| Error::validation("cannot upload an empty file", "file"))?;
    Ok(serde_json::from_value(body)?)
}
