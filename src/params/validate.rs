//! Per-option legality rules, checked before a request is built.

use crate::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;

/// `auto` with an optional named preset, a numeric quality with an optional
/// chroma subsampling suffix, or `none`.
static QUALITY_OVERRIDE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(auto(:(advanced|best|eco|good|low))?|none|\d+(:\d+)?)$")
        .expect("quality_override pattern is valid")
});

pub fn validate_quality_override(value: &str) -> Result<()> {
    if QUALITY_OVERRIDE_RE.is_match(value) {
        return Ok(());
    }
    Err(Error::validation(
        format!("'{}' is not a valid quality override", value),
        "quality_override",
    ))
}

/// Allowed formats are plain lowercase extension tokens.
static FORMAT_TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9]+$").expect("format token pattern is valid"));

pub fn validate_allowed_formats(formats: &[String]) -> Result<()> {
    for format in formats {
        if !FORMAT_TOKEN_RE.is_match(format) {
            return Err(Error::validation(
                format!("'{}' is not a valid format token", format),
                "allowed_formats",
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_known_quality_overrides() {
        for value in ["auto:advanced", "auto:best", "80:420", "none", "auto", "70"] {
            assert!(validate_quality_override(value).is_ok(), "{}", value);
        }
    }

    #[test]
    fn rejects_illegal_quality_overrides() {
        for value in ["illegal", "auto:illegal", "auto:", "80:", ":420", ""] {
            let err = validate_quality_override(value).unwrap_err();
            assert!(matches!(err, Error::Validation { .. }), "{}", value);
            assert_eq!(
                err.context().and_then(|c| c.field_path.as_deref()),
                Some("quality_override")
            );
        }
    }

    #[test]
    fn allowed_formats_must_be_extension_tokens() {
        assert!(validate_allowed_formats(&["png".into(), "jpg".into()]).is_ok());
        assert!(validate_allowed_formats(&["PNG".into()]).is_err());
        assert!(validate_allowed_formats(&["".into()]).is_err());
        assert!(validate_allowed_formats(&["p ng".into()]).is_err());
    }
}
