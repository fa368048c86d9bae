//! Responsive breakpoint settings.
//!
//! One settings object or a list of them travels as a JSON array string; a
//! nested transformation serializes to its wire string form.

use crate::params::transformation::Transformation;
use crate::Result;
use serde::Serialize;

/// Settings for one responsive-breakpoint generation request.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResponsiveBreakpoints {
    pub create_derived: bool,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_transformation"
    )]
    pub transformation: Option<Transformation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bytes_step: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_images: Option<u32>,
}

impl ResponsiveBreakpoints {
    pub fn new(create_derived: bool) -> Self {
        Self {
            create_derived,
            ..Self::default()
        }
    }

    pub fn transformation(mut self, transformation: Transformation) -> Self {
        self.transformation = Some(transformation);
        self
    }

    pub fn width_range(mut self, min_width: u32, max_width: u32) -> Self {
        self.min_width = Some(min_width);
        self.max_width = Some(max_width);
        self
    }

    pub fn max_images(mut self, max_images: u32) -> Self {
        self.max_images = Some(max_images);
        self
    }
}

fn serialize_transformation<S>(
    value: &Option<Transformation>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    // skip_serializing_if guarantees Some here
    match value {
        Some(t) => serializer.serialize_str(&t.to_wire()),
        None => serializer.serialize_none(),
    }
}

/// Encode one or more settings objects as the wire JSON array string.
pub fn encode_breakpoints(settings: &[ResponsiveBreakpoints]) -> Result<String> {
    Ok(serde_json::to_string(settings)?)
}
