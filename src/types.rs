//! Typed responses returned by the service.

use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

/// Result of an upload-style call (`upload`, `explicit`, `text`, ...).
///
/// The service evolves its response shape over time, so everything beyond
/// the stable core is optional and unknown fields are kept in `extra`.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadResult {
    pub public_id: String,
    #[serde(default)]
    pub version: u64,
    #[serde(default)]
    pub signature: Option<String>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub resource_type: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub secure_url: Option<String>,
    #[serde(default)]
    pub original_filename: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub eager: Vec<EagerResult>,
    #[serde(default)]
    pub moderation: Vec<ModerationStatus>,
    #[serde(default)]
    pub faces: Vec<[i32; 4]>,
    #[serde(default)]
    pub responsive_breakpoints: Vec<BreakpointSetResult>,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

/// One derived asset generated by an eager transformation.
#[derive(Debug, Clone, Deserialize)]
pub struct EagerResult {
    #[serde(default)]
    pub transformation: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub secure_url: Option<String>,
}

/// Moderation verdict attached to an uploaded resource.
#[derive(Debug, Clone, Deserialize)]
pub struct ModerationStatus {
    pub kind: String,
    pub status: String,
}

/// Breakpoints computed for one requested settings object.
#[derive(Debug, Clone, Deserialize)]
pub struct BreakpointSetResult {
    #[serde(default)]
    pub transformation: Option<String>,
    #[serde(default)]
    pub breakpoints: Vec<Breakpoint>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Breakpoint {
    pub width: u32,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub bytes: Option<u64>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub secure_url: Option<String>,
}

/// Result of a tag or context metadata call.
#[derive(Debug, Clone, Deserialize)]
pub struct MetadataResult {
    #[serde(default)]
    pub public_ids: Vec<String>,
}

/// Result of a `destroy` call.
#[derive(Debug, Clone, Deserialize)]
pub struct DestroyResult {
    pub result: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_minimal_upload_response() {
        let result: UploadResult = serde_json::from_str(
            r#"{"public_id":"sample","version":1571218330,"width":241,"height":51}"#,
        )
        .unwrap();
        assert_eq!(result.public_id, "sample");
        assert_eq!(result.version, 1571218330);
        assert_eq!(result.width, Some(241));
        assert!(result.tags.is_empty());
    }

    #[test]
    fn unknown_fields_land_in_extra() {
        let result: UploadResult = serde_json::from_str(
            r#"{"public_id":"sample","placeholder":true,"pages":3}"#,
        )
        .unwrap();
        assert_eq!(result.extra["placeholder"], serde_json::json!(true));
        assert_eq!(result.extra["pages"], serde_json::json!(3));
    }

    #[test]
    fn decodes_moderation_and_eager() {
        let result: UploadResult = serde_json::from_str(
            r#"{
                "public_id": "sample",
                "moderation": [{"kind": "manual", "status": "pending"}],
                "eager": [{"transformation": "a_90", "url": "http://res.example.test/a_90/sample"}]
            }"#,
        )
        .unwrap();
        assert_eq!(result.moderation[0].status, "pending");
        assert_eq!(result.eager[0].transformation.as_deref(), Some("a_90"));
    }
}
