//! LSP 3.17 payload records produced by the analysis core.
//!
//! Only the types that cross the boundary to the language-server layer live
//! here: diagnostics and location links. Field names serialize as camelCase,
//! absent optionals are omitted from the wire (never `null`), the severity
//! and tag enums encode as their LSP integer values, and unknown incoming
//! fields are ignored on deserialization.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub use robotcode_text::{Position, Range};

/// Severity of a [`Diagnostic`], encoded as the LSP integer value.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum DiagnosticSeverity {
    Error = 1,
    Warning = 2,
    Information = 3,
    Hint = 4,
}

impl Serialize for DiagnosticSeverity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(*self as u8)
    }
}

impl<'de> Deserialize<'de> for DiagnosticSeverity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match u8::deserialize(deserializer)? {
            1 => Ok(Self::Error),
            2 => Ok(Self::Warning),
            3 => Ok(Self::Information),
            4 => Ok(Self::Hint),
            other => Err(D::Error::custom(format!(
                "invalid diagnostic severity: {other}"
            ))),
        }
    }
}

/// Extra metadata about a [`Diagnostic`], encoded as the LSP integer value.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum DiagnosticTag {
    Unnecessary = 1,
    Deprecated = 2,
}

impl Serialize for DiagnosticTag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(*self as u8)
    }
}

impl<'de> Deserialize<'de> for DiagnosticTag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match u8::deserialize(deserializer)? {
            1 => Ok(Self::Unnecessary),
            2 => Ok(Self::Deprecated),
            other => Err(D::Error::custom(format!("invalid diagnostic tag: {other}"))),
        }
    }
}

/// The `integer | string` slot used for diagnostic codes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumberOrString {
    Number(i32),
    String(String),
}

impl From<&str> for NumberOrString {
    fn from(value: &str) -> Self {
        NumberOrString::String(value.to_string())
    }
}

impl From<i32> for NumberOrString {
    fn from(value: i32) -> Self {
        NumberOrString::Number(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeDescription {
    pub href: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub uri: String,
    pub range: Range,
}

/// A link from a selection in the requesting document to a target range in
/// another file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationLink {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_selection_range: Option<Range>,
    pub target_uri: String,
    pub target_range: Range,
    pub target_selection_range: Range,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticRelatedInformation {
    pub location: Location,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    pub range: Range,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<DiagnosticSeverity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<NumberOrString>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_description: Option<CodeDescription>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<DiagnosticTag>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_information: Option<Vec<DiagnosticRelatedInformation>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl Diagnostic {
    pub fn new(range: Range, message: impl Into<String>) -> Self {
        Self {
            range,
            message: message.into(),
            severity: None,
            code: None,
            code_description: None,
            source: None,
            tags: None,
            related_information: None,
            data: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn minimal_diagnostic_omits_absent_fields() {
        let diagnostic = Diagnostic {
            severity: Some(DiagnosticSeverity::Error),
            source: Some("robotcode".to_string()),
            code: Some("KeywordError/not_found".into()),
            ..Diagnostic::new(Range::from((2, 4, 2, 14)), "Keyword 'Unknown Kw' not found.")
        };
        assert_eq!(
            serde_json::to_value(&diagnostic).unwrap(),
            json!({
                "range": {
                    "start": {"line": 2, "character": 4},
                    "end": {"line": 2, "character": 14},
                },
                "message": "Keyword 'Unknown Kw' not found.",
                "severity": 1,
                "code": "KeywordError/not_found",
                "source": "robotcode",
            })
        );
    }

    #[test]
    fn tags_and_related_information_serialize_camel_case() {
        let diagnostic = Diagnostic {
            severity: Some(DiagnosticSeverity::Hint),
            tags: Some(vec![DiagnosticTag::Deprecated]),
            related_information: Some(vec![DiagnosticRelatedInformation {
                location: Location {
                    uri: "file:///lib.resource".to_string(),
                    range: Range::zero(),
                },
                message: "defined here".to_string(),
            }]),
            ..Diagnostic::new(Range::zero(), "Keyword 'Old' is deprecated.")
        };
        let value = serde_json::to_value(&diagnostic).unwrap();
        assert_eq!(value["tags"], json!([2]));
        assert_eq!(
            value["relatedInformation"][0]["location"]["uri"],
            json!("file:///lib.resource")
        );
        assert!(value.get("related_information").is_none());
    }

    #[test]
    fn unknown_fields_are_ignored_and_optionals_default() {
        let diagnostic: Diagnostic = serde_json::from_value(json!({
            "range": {
                "start": {"line": 0, "character": 0},
                "end": {"line": 0, "character": 1},
            },
            "message": "m",
            "futureExtension": {"ignored": true},
        }))
        .unwrap();
        assert_eq!(diagnostic.severity, None);
        assert_eq!(diagnostic.code, None);
    }

    #[test]
    fn numeric_codes_round_trip() {
        let code: NumberOrString = serde_json::from_value(json!(404)).unwrap();
        assert_eq!(code, NumberOrString::Number(404));
        assert_eq!(serde_json::to_value(&code).unwrap(), json!(404));
    }

    #[test]
    fn location_link_shape() {
        let link = LocationLink {
            origin_selection_range: Some(Range::from((1, 2, 1, 5))),
            target_uri: "file:///keywords.resource".to_string(),
            target_range: Range::from((10, 0, 10, 0)),
            target_selection_range: Range::from((10, 0, 10, 0)),
        };
        let value = serde_json::to_value(&link).unwrap();
        assert_eq!(value["targetUri"], json!("file:///keywords.resource"));
        assert_eq!(value["originSelectionRange"]["start"]["line"], json!(1));
    }
}
