//! Transformation serialization.
//!
//! A transformation renders as its parameters sorted by wire key and joined
//! with `,` (`c_scale,l_text:arial_20:hi,w_2.0`). Eager transformations may
//! append a delivery format after a `/`. A list of eager transformations is
//! joined with `|`.

use std::collections::BTreeMap;

/// A single server-side transformation step.
///
/// Parameter setters store the short wire key, so serialization is a sorted
/// walk of the map. Unknown parameters can be injected with [`Transformation::param`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transformation {
    params: BTreeMap<String, String>,
    format: Option<String>,
}

impl Transformation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn crop(self, mode: impl Into<String>) -> Self {
        self.param("c", mode)
    }

    pub fn width(self, width: impl ToString) -> Self {
        self.param("w", width.to_string())
    }

    pub fn height(self, height: impl ToString) -> Self {
        self.param("h", height.to_string())
    }

    pub fn angle(self, degrees: i32) -> Self {
        self.param("a", degrees.to_string())
    }

    pub fn effect(self, effect: impl Into<String>) -> Self {
        self.param("e", effect)
    }

    pub fn gravity(self, gravity: impl Into<String>) -> Self {
        self.param("g", gravity)
    }

    pub fn quality(self, quality: impl Into<String>) -> Self {
        self.param("q", quality)
    }

    pub fn overlay(self, layer: impl Into<String>) -> Self {
        self.param("l", layer)
    }

    /// Delivery format appended after the transformation string (`.../png`).
    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    /// Set a raw wire-key parameter.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty() && self.format.is_none()
    }

    /// The transformation string without the format suffix.
    pub fn to_wire(&self) -> String {
        self.params
            .iter()
            .map(|(k, v)| format!("{}_{}", k, v))
            .collect::<Vec<_>>()
            .join(",")
    }

    /// The eager form: transformation string plus optional `/format`.
    pub fn to_eager_wire(&self) -> String {
        match &self.format {
            Some(format) => format!("{}/{}", self.to_wire(), format),
            None => self.to_wire(),
        }
    }
}

/// A text layer usable as an overlay (`text:arial_20:hello`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextLayer {
    pub font_family: String,
    pub font_size: u32,
    pub text: String,
}

impl TextLayer {
    pub fn new(font_family: impl Into<String>, font_size: u32, text: impl Into<String>) -> Self {
        Self {
            font_family: font_family.into(),
            font_size,
            text: text.into(),
        }
    }

    pub fn to_wire(&self) -> String {
        format!("text:{}_{}:{}", self.font_family, self.font_size, self.text)
    }
}

impl From<TextLayer> for String {
    fn from(layer: TextLayer) -> Self {
        layer.to_wire()
    }
}

/// Join eager transformations with `|`.
pub fn encode_eager(transformations: &[Transformation]) -> String {
    transformations
        .iter()
        .map(Transformation::to_eager_wire)
        .collect::<Vec<_>>()
        .join("|")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parameters_sort_by_wire_key() {
        let overlay = TextLayer::new("arial", 20, "hello").to_wire();
        assert_eq!(overlay, "text:arial_20:hello");
        let t = Transformation::new()
            .width("2.0")
            .crop("scale")
            .overlay(overlay);
        assert_eq!(t.to_wire(), "c_scale,l_text:arial_20:hello,w_2.0");
    }

    #[test]
    fn eager_form_appends_format() {
        let t = Transformation::new()
            .crop("scale")
            .width("2.0")
            .overlay(TextLayer::new("arial", 20, "hello"))
            .format("png");
        assert_eq!(t.to_eager_wire(), "c_scale,l_text:arial_20:hello,w_2.0/png");
    }

    #[test]
    fn eager_list_joins_with_pipe() {
        let a = Transformation::new().angle(90);
        let b = Transformation::new().angle(45).format("png");
        assert_eq!(encode_eager(&[a, b]), "a_90|a_45/png");
    }

    #[test]
    fn single_param_has_no_separator() {
        assert_eq!(Transformation::new().angle(90).to_wire(), "a_90");
    }
}
