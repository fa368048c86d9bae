//! Upload option normalization.
//!
//! [`UploadOptions`] collects the caller's structured options and flattens
//! them into one canonical `BTreeMap<String, String>` wire map. Everything
//! downstream (signing, the multipart form) consumes that map, so the
//! builder is the single place where heterogeneous input becomes wire data.

pub mod access_control;
pub mod breakpoints;
pub mod context;
pub mod coordinates;
pub mod transformation;
pub mod validate;
pub mod value;

pub use access_control::{AccessControlEntry, AccessControlRule, AclTime};
pub use breakpoints::ResponsiveBreakpoints;
pub use context::ContextMap;
pub use coordinates::Coordinates;
pub use transformation::{Transformation, TextLayer};
pub use value::{DateTimeValue, OptionValue};

use crate::Result;
use std::collections::BTreeMap;

/// Structured options for upload-style calls.
///
/// Unset options never reach the wire. The `extra` escape hatch accepts any
/// additional parameter as an [`OptionValue`].
#[derive(Debug, Clone, Default)]
pub struct UploadOptions {
    pub public_id: Option<String>,
    /// Delivery type (`upload`, `private`, `authenticated`, ...). Travels as
    /// the `type` parameter.
    pub delivery_type: Option<String>,
    /// Resource type segment of the request path (`image`, `raw`, `video`).
    /// Not a wire parameter.
    pub resource_type: Option<String>,
    pub format: Option<String>,
    pub quality_override: Option<String>,
    pub tags: Vec<String>,
    pub allowed_formats: Vec<String>,
    pub context: ContextMap,
    pub face_coordinates: Coordinates,
    pub custom_coordinates: Coordinates,
    pub eager: Vec<Transformation>,
    pub responsive_breakpoints: Vec<ResponsiveBreakpoints>,
    pub access_control: Vec<AccessControlEntry>,
    /// `Name: value` header lines forwarded to the delivery response.
    pub headers: Vec<String>,
    pub use_filename: Option<bool>,
    pub unique_filename: Option<bool>,
    pub overwrite: Option<bool>,
    pub faces: Option<bool>,
    pub asynchronous: Option<bool>,
    pub backup: Option<bool>,
    pub moderation: Option<String>,
    pub ocr: Option<String>,
    pub raw_convert: Option<String>,
    pub categorization: Option<String>,
    pub detection: Option<String>,
    pub background_removal: Option<String>,
    pub upload_preset: Option<String>,
    pub extra: BTreeMap<String, OptionValue>,
}

impl UploadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn public_id(mut self, public_id: impl Into<String>) -> Self {
        self.public_id = Some(public_id.into());
        self
    }

    pub fn delivery_type(mut self, delivery_type: impl Into<String>) -> Self {
        self.delivery_type = Some(delivery_type.into());
        self
    }

    pub fn resource_type(mut self, resource_type: impl Into<String>) -> Self {
        self.resource_type = Some(resource_type.into());
        self
    }

    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    pub fn quality_override(mut self, quality: impl Into<String>) -> Self {
        self.quality_override = Some(quality.into());
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    pub fn allowed_formats<I, S>(mut self, formats: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_formats
            .extend(formats.into_iter().map(Into::into));
        self
    }

    pub fn context(mut self, context: ContextMap) -> Self {
        self.context = context;
        self
    }

    pub fn face_coordinates(mut self, coordinates: impl Into<Coordinates>) -> Self {
        self.face_coordinates = coordinates.into();
        self
    }

    pub fn custom_coordinates(mut self, coordinates: impl Into<Coordinates>) -> Self {
        self.custom_coordinates = coordinates.into();
        self
    }

    pub fn eager(mut self, transformation: Transformation) -> Self {
        self.eager.push(transformation);
        self
    }

    pub fn responsive_breakpoints(mut self, settings: ResponsiveBreakpoints) -> Self {
        self.responsive_breakpoints.push(settings);
        self
    }

    pub fn access_control(mut self, entry: impl Into<AccessControlEntry>) -> Self {
        self.access_control.push(entry.into());
        self
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push(format!("{}: {}", name, value));
        self
    }

    pub fn header_line(mut self, line: impl Into<String>) -> Self {
        self.headers.push(line.into());
        self
    }

    pub fn use_filename(mut self, enable: bool) -> Self {
        self.use_filename = Some(enable);
        self
    }

    pub fn unique_filename(mut self, enable: bool) -> Self {
        self.unique_filename = Some(enable);
        self
    }

    pub fn overwrite(mut self, enable: bool) -> Self {
        self.overwrite = Some(enable);
        self
    }

    pub fn faces(mut self, enable: bool) -> Self {
        self.faces = Some(enable);
        self
    }

    pub fn asynchronous(mut self, enable: bool) -> Self {
        self.asynchronous = Some(enable);
        self
    }

    pub fn backup(mut self, enable: bool) -> Self {
        self.backup = Some(enable);
        self
    }

    pub fn moderation(mut self, kind: impl Into<String>) -> Self {
        self.moderation = Some(kind.into());
        self
    }

    pub fn ocr(mut self, engine: impl Into<String>) -> Self {
        self.ocr = Some(engine.into());
        self
    }

    pub fn raw_convert(mut self, engine: impl Into<String>) -> Self {
        self.raw_convert = Some(engine.into());
        self
    }

    pub fn categorization(mut self, engine: impl Into<String>) -> Self {
        self.categorization = Some(engine.into());
        self
    }

    pub fn detection(mut self, engine: impl Into<String>) -> Self {
        self.detection = Some(engine.into());
        self
    }

    pub fn background_removal(mut self, engine: impl Into<String>) -> Self {
        self.background_removal = Some(engine.into());
        self
    }

    pub fn upload_preset(mut self, preset: impl Into<String>) -> Self {
        self.upload_preset = Some(preset.into());
        self
    }

    /// Set any additional parameter by wire name.
    pub fn param(mut self, name: impl Into<String>, value: impl Into<OptionValue>) -> Self {
        self.extra.insert(name.into(), value.into());
        self
    }

    /// Resource type path segment, defaulting to `image`.
    pub fn resource_type_or_default(&self) -> &str {
        self.resource_type.as_deref().unwrap_or("image")
    }

    /// Validate every option and flatten into the canonical wire map.
    pub fn to_params(&self) -> Result<BTreeMap<String, String>> {
        if let Some(ref quality) = self.quality_override {
            validate::validate_quality_override(quality)?;
        }
        validate::validate_allowed_formats(&self.allowed_formats)?;

        let mut params = BTreeMap::new();
        let mut put = |key: &str, value: String| {
            if !value.is_empty() {
                params.insert(key.to_string(), value);
            }
        };

        if let Some(ref v) = self.public_id {
            put("public_id", v.clone());
        }
        if let Some(ref v) = self.delivery_type {
            put("type", v.clone());
        }
        if let Some(ref v) = self.format {
            put("format", v.clone());
        }
        if let Some(ref v) = self.quality_override {
            put("quality_override", v.clone());
        }
        if !self.tags.is_empty() {
            put("tags", self.tags.join(","));
        }
        if !self.allowed_formats.is_empty() {
            put("allowed_formats", self.allowed_formats.join(","));
        }
        if !self.context.is_empty() {
            put("context", self.context.to_wire());
        }
        if !self.face_coordinates.is_empty() {
            put("face_coordinates", self.face_coordinates.to_wire());
        }
        if !self.custom_coordinates.is_empty() {
            put("custom_coordinates", self.custom_coordinates.to_wire());
        }
        if !self.eager.is_empty() {
            put("eager", transformation::encode_eager(&self.eager));
        }
        if !self.responsive_breakpoints.is_empty() {
            put(
                "responsive_breakpoints",
                breakpoints::encode_breakpoints(&self.responsive_breakpoints)?,
            );
        }
        if !self.access_control.is_empty() {
            put(
                "access_control",
                access_control::encode_access_control(&self.access_control)?,
            );
        }
        if !self.headers.is_empty() {
            put("headers", self.headers.join("\n"));
        }

        let bools = [
            ("use_filename", self.use_filename),
            ("unique_filename", self.unique_filename),
            ("overwrite", self.overwrite),
            ("faces", self.faces),
            ("async", self.asynchronous),
            ("backup", self.backup),
        ];
        for (key, flag) in bools {
            if let Some(b) = flag {
                put(key, OptionValue::Bool(b).to_wire());
            }
        }

        let add_ons = [
            ("moderation", &self.moderation),
            ("ocr", &self.ocr),
            ("raw_convert", &self.raw_convert),
            ("categorization", &self.categorization),
            ("detection", &self.detection),
            ("background_removal", &self.background_removal),
            ("upload_preset", &self.upload_preset),
        ];
        for (key, value) in add_ons {
            if let Some(v) = value {
                put(key, v.clone());
            }
        }

        for (key, value) in &self.extra {
            if !value.is_empty() {
                put(key.as_str(), value.to_wire());
            }
        }

        Ok(params)
    }
}
