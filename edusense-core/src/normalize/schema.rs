//! Required-field schemas for structured responses.

use super::extract::{extract_json_block, remove_trailing_commas, strip_line_comments, Shape};
use crate::error::EduError;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// What to do when a field is absent (or `null`)
#[derive(Debug, Clone, PartialEq)]
pub enum FieldPolicy {
    /// The provider fails if the field is missing
    Required,
    /// The field is filled with this value
    Default(Value),
}

/// One field of a response schema
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub name: String,
    pub policy: FieldPolicy,
    /// Fields checked inside this field when it holds an object
    pub nested: Vec<FieldSpec>,
}

impl FieldSpec {
    /// An identity field that must be present
    pub fn required(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            policy: FieldPolicy::Required,
            nested: Vec::new(),
        }
    }

    /// A numeric score that reads as `0.0` when missing
    pub fn score(name: impl Into<String>) -> Self {
        Self::with_default(name, Value::from(0.0))
    }

    /// A field filled with `value` when missing
    pub fn with_default(name: impl Into<String>, value: Value) -> Self {
        Self {
            name: name.into(),
            policy: FieldPolicy::Default(value),
            nested: Vec::new(),
        }
    }

    /// Validate these fields inside the object held by this field
    pub fn nested(mut self, fields: Vec<FieldSpec>) -> Self {
        self.nested = fields;
        self
    }
}

/// A call-site schema: container shape plus field rules.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseSchema {
    pub name: String,
    pub shape: Shape,
    pub fields: Vec<FieldSpec>,
    /// Arrays are truncated to this many items
    pub max_items: Option<usize>,
}

impl ResponseSchema {
    /// Schema for a single JSON object
    pub fn object(name: impl Into<String>, fields: Vec<FieldSpec>) -> Self {
        Self {
            name: name.into(),
            shape: Shape::Object,
            fields,
            max_items: None,
        }
    }

    /// Schema for a non-empty array of JSON objects
    pub fn array(name: impl Into<String>, fields: Vec<FieldSpec>) -> Self {
        Self {
            name: name.into(),
            shape: Shape::Array,
            fields,
            max_items: None,
        }
    }

    /// Truncate arrays to at most `max` items
    pub fn with_max_items(mut self, max: usize) -> Self {
        self.max_items = Some(max);
        self
    }

    /// Extract, repair, parse and validate a free-form model response.
    pub fn normalize_text(&self, text: &str) -> Result<Value, EduError> {
        let block = extract_json_block(text, self.shape).ok_or(EduError::NoJsonFound)?;
        let cleaned = remove_trailing_commas(&strip_line_comments(block));
        let value: Value = serde_json::from_str(&cleaned)?;
        self.conform(value)
    }

    /// Like [`normalize_text`](Self::normalize_text), then deserialize into `T`.
    pub fn parse<T: DeserializeOwned>(&self, text: &str) -> Result<T, EduError> {
        let value = self.normalize_text(text)?;
        Ok(serde_json::from_value(value)?)
    }

    /// Check the container shape and apply field policies.
    pub fn conform(&self, value: Value) -> Result<Value, EduError> {
        match (self.shape, value) {
            (Shape::Object, Value::Object(mut map)) => {
                self.apply(&mut map)?;
                Ok(Value::Object(map))
            }
            (Shape::Array, Value::Array(items)) => {
                if items.is_empty() {
                    return Err(EduError::shape_mismatch(format!(
                        "{}: empty array",
                        self.name
                    )));
                }

                let limit = self.max_items.unwrap_or(items.len());
                let mut conformed = Vec::with_capacity(items.len().min(limit));
                for item in items.into_iter().take(limit) {
                    match item {
                        Value::Object(mut map) => {
                            self.apply(&mut map)?;
                            conformed.push(Value::Object(map));
                        }
                        other => {
                            return Err(EduError::shape_mismatch(format!(
                                "{}: array item is {}",
                                self.name,
                                type_name(&other)
                            )))
                        }
                    }
                }
                Ok(Value::Array(conformed))
            }
            (shape, other) => Err(EduError::shape_mismatch(format!(
                "{}: expected {:?}, got {}",
                self.name,
                shape,
                type_name(&other)
            ))),
        }
    }

    fn apply(&self, map: &mut Map<String, Value>) -> Result<(), EduError> {
        let mut missing = Vec::new();
        apply_fields(map, &self.fields, "", &mut missing);
        if missing.is_empty() {
            Ok(())
        } else {
            Err(EduError::MissingFields(missing))
        }
    }
}

fn apply_fields(
    map: &mut Map<String, Value>,
    fields: &[FieldSpec],
    prefix: &str,
    missing: &mut Vec<String>,
) {
    for field in fields {
        let path = format!("{}{}", prefix, field.name);
        let present = map.get(&field.name).is_some_and(|v| !v.is_null());

        if !present {
            match &field.policy {
                FieldPolicy::Required => {
                    missing.push(path);
                    continue;
                }
                FieldPolicy::Default(default) => {
                    map.insert(field.name.clone(), default.clone());
                }
            }
        }

        if field.nested.is_empty() {
            continue;
        }

        match map.get_mut(&field.name) {
            Some(Value::Object(inner)) => {
                apply_fields(inner, &field.nested, &format!("{path}."), missing);
            }
            _ => missing.push(path),
        }
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sentiment_schema() -> ResponseSchema {
        ResponseSchema::object(
            "sentiment",
            vec![
                FieldSpec::score("positive"),
                FieldSpec::score("neutral"),
                FieldSpec::score("negative"),
                FieldSpec::required("overall"),
            ],
        )
    }

    #[test]
    fn test_well_formed_object_is_unmodified() {
        let text = r#"Some preamble {"positive":0.9,"neutral":0.08,"negative":0.02,"overall":"positive"} trailing text"#;
        let value = sentiment_schema().normalize_text(text).unwrap();
        assert_eq!(
            value,
            json!({"positive":0.9,"neutral":0.08,"negative":0.02,"overall":"positive"})
        );
    }

    #[test]
    fn test_scores_are_default_filled() {
        let value = sentiment_schema()
            .normalize_text(r#"{"positive": 1.0, "negative": null, "overall": "positive"}"#)
            .unwrap();
        assert_eq!(value["neutral"], json!(0.0));
        assert_eq!(value["negative"], json!(0.0));
        assert_eq!(value["positive"], json!(1.0));
    }

    #[test]
    fn test_identity_fields_are_required() {
        let err = sentiment_schema()
            .normalize_text(r#"{"positive": 1.0}"#)
            .unwrap_err();
        match err {
            EduError::MissingFields(fields) => assert_eq!(fields, vec!["overall".to_string()]),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_no_json() {
        assert!(matches!(
            sentiment_schema().normalize_text("I cannot help with that."),
            Err(EduError::NoJsonFound)
        ));
    }

    #[test]
    fn test_unparsable_json() {
        assert!(matches!(
            sentiment_schema().normalize_text("{positive: high}"),
            Err(EduError::Serialization(_))
        ));
    }

    #[test]
    fn test_nested_defaults() {
        let schema = ResponseSchema::object(
            "image",
            vec![
                FieldSpec::required("emotions")
                    .nested(vec![FieldSpec::score("happiness"), FieldSpec::score("fear")]),
                FieldSpec::required("dominant_emotion"),
            ],
        );
        let value = schema
            .normalize_text(r#"{"emotions": {"happiness": 0.7}, "dominant_emotion": "happiness"}"#)
            .unwrap();
        assert_eq!(value["emotions"]["fear"], json!(0.0));

        let err = schema
            .normalize_text(r#"{"emotions": "happy", "dominant_emotion": "happiness"}"#)
            .unwrap_err();
        assert!(matches!(err, EduError::MissingFields(f) if f == vec!["emotions".to_string()]));
    }

    #[test]
    fn test_array_schema_with_comments_and_truncation() {
        let schema = ResponseSchema::array(
            "resources",
            vec![FieldSpec::required("title"), FieldSpec::required("link")],
        )
        .with_max_items(1);
        let text = "Here you go:\n[\n  {\"title\": \"A\", \"link\": \"https://a\"},\n  {\"title\": \"B\", \"link\": \"b\"},\n  // more resources...\n]";
        let value = schema.normalize_text(text).unwrap();
        assert_eq!(value, json!([{"title": "A", "link": "https://a"}]));
    }

    #[test]
    fn test_array_schema_rejects_bad_items() {
        let schema = ResponseSchema::array("resources", vec![FieldSpec::required("title")]);
        assert!(matches!(
            schema.normalize_text("[]"),
            Err(EduError::ShapeMismatch(_))
        ));
        assert!(matches!(
            schema.normalize_text("[1, 2]"),
            Err(EduError::ShapeMismatch(_))
        ));
        assert!(matches!(
            schema.normalize_text(r#"[{"title": "a"}, {"name": "b"}]"#),
            Err(EduError::MissingFields(_))
        ));
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let schema = sentiment_schema();
        let text = r#"{"positive": 0.5, "overall": "neutral"}"#;
        let first = schema.normalize_text(text).unwrap();
        let second = schema.normalize_text(text).unwrap();
        assert_eq!(first, second);
        assert_eq!(schema.conform(first.clone()).unwrap(), first);
    }
}
