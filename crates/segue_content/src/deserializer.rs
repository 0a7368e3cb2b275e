//! Parsing of content files and submitted answers.
//!
//! Parsing happens in three passes: the bytes are read as untyped JSON, every
//! `type` discriminator in the tree is checked against the registry (missing
//! discriminators default to `content` / `choice`), and only then is the tree
//! converted into typed nodes. This keeps "not JSON", "JSON naming a type we
//! do not know" and "known type with the wrong fields" distinguishable.

use crate::choice::Choice;
use crate::content::Content;
use crate::registry::{ChoiceType, ContentType, ContentTypeRegistry};
use serde_json::{Map, Value};

/// Keys of a content object whose values are nested content objects.
const CONTENT_LIST_KEYS: &[&str] = &["children", "hints"];
/// Keys of a content object whose value is a single nested content object.
const CONTENT_OBJECT_KEYS: &[&str] = &["answer", "defaultFeedback"];

/// Errors raised while parsing content or answers.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// The input is not well-formed JSON.
    #[error("malformed JSON: {reason}")]
    MalformedJson {
        /// Description from the JSON reader.
        reason: String,
    },

    /// A `type` discriminator is not registered.
    #[error("unknown type '{type_name}' at {path}")]
    UnknownType {
        /// The unrecognised discriminator.
        type_name: String,
        /// JSON path of the offending object.
        path: String,
    },

    /// The JSON names a known type but does not fit its shape.
    #[error("content does not match its declared type: {reason}")]
    Schema {
        /// Description of the mismatch.
        reason: String,
    },
}

/// Parses polymorphic content using a [`ContentTypeRegistry`].
#[derive(Clone, Debug, Default)]
pub struct ContentDeserializer {
    registry: ContentTypeRegistry,
}

impl ContentDeserializer {
    /// Creates a deserializer over the given registry.
    pub fn new(registry: ContentTypeRegistry) -> Self {
        Self { registry }
    }

    /// Returns the registry in use.
    pub fn registry(&self) -> &ContentTypeRegistry {
        &self.registry
    }

    /// Parses a content file.
    pub fn parse_content(&self, bytes: &[u8]) -> Result<Content, ParseError> {
        let mut value = read_json(bytes)?;
        self.check_content(&mut value, "$")?;
        serde_json::from_value(value).map_err(|e| ParseError::Schema {
            reason: e.to_string(),
        })
    }

    /// Parses a submitted answer.
    pub fn parse_choice(&self, bytes: &[u8]) -> Result<Choice, ParseError> {
        let mut value = read_json(bytes)?;
        self.check_choice(&mut value, "$")?;
        serde_json::from_value(value).map_err(|e| ParseError::Schema {
            reason: e.to_string(),
        })
    }

    fn check_content(&self, value: &mut Value, path: &str) -> Result<(), ParseError> {
        let Some(object) = value.as_object_mut() else {
            return Ok(());
        };
        let type_name = discriminator(object, ContentType::Content.discriminator(), path)?;
        if self.registry.resolve_content(&type_name).is_none() {
            return Err(ParseError::UnknownType {
                type_name,
                path: path.to_string(),
            });
        }

        for key in CONTENT_LIST_KEYS {
            if let Some(Value::Array(items)) = object.get_mut(*key) {
                for (i, item) in items.iter_mut().enumerate() {
                    self.check_content(item, &format!("{path}.{key}[{i}]"))?;
                }
            }
        }
        for key in CONTENT_OBJECT_KEYS {
            if let Some(item) = object.get_mut(*key) {
                self.check_content(item, &format!("{path}.{key}"))?;
            }
        }
        if let Some(Value::Array(choices)) = object.get_mut("choices") {
            for (i, choice) in choices.iter_mut().enumerate() {
                self.check_choice(choice, &format!("{path}.choices[{i}]"))?;
            }
        }
        Ok(())
    }

    fn check_choice(&self, value: &mut Value, path: &str) -> Result<(), ParseError> {
        let Some(object) = value.as_object_mut() else {
            return Ok(());
        };
        let type_name = discriminator(object, ChoiceType::Choice.discriminator(), path)?;
        if self.registry.resolve_choice(&type_name).is_none() {
            return Err(ParseError::UnknownType {
                type_name,
                path: path.to_string(),
            });
        }
        if let Some(explanation) = object.get_mut("explanation") {
            self.check_content(explanation, &format!("{path}.explanation"))?;
        }
        Ok(())
    }
}

fn read_json(bytes: &[u8]) -> Result<Value, ParseError> {
    serde_json::from_slice(bytes).map_err(|e| ParseError::MalformedJson {
        reason: e.to_string(),
    })
}

/// Reads the `type` field, inserting `default` when it is absent.
fn discriminator(
    object: &mut Map<String, Value>,
    default: &str,
    path: &str,
) -> Result<String, ParseError> {
    match object.get("type") {
        None | Some(Value::Null) => {
            object.insert("type".to_string(), Value::String(default.to_string()));
            Ok(default.to_string())
        }
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(ParseError::UnknownType {
            type_name: other.to_string(),
            path: path.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::choice::ChoiceKind;
    use crate::content::ContentKind;

    fn deserializer() -> ContentDeserializer {
        ContentDeserializer::new(ContentTypeRegistry::standard())
    }

    #[test]
    fn parse_nested_question_page() {
        let json = br#"{
            "id": "page1",
            "type": "isaacQuestionPage",
            "title": "Kinematics",
            "tags": ["physics", "mechanics"],
            "children": [
                {
                    "id": "q1",
                    "type": "isaacNumericQuestion",
                    "significantFiguresMin": 2,
                    "significantFiguresMax": 3,
                    "hints": [{"id": "h1", "value": "Use suvat"}],
                    "choices": [
                        {"type": "quantity", "value": "10", "units": "m", "correct": true,
                         "explanation": {"value": "Correct!"}}
                    ]
                }
            ]
        }"#;
        let page = deserializer().parse_content(json).unwrap();
        assert_eq!(page.id.as_deref(), Some("page1"));
        assert_eq!(page.content_type(), ContentType::QuestionPage);
        assert_eq!(page.tags.len(), 2);

        let question = &page.children[0];
        match &question.kind {
            ContentKind::NumericQuestion(q) => {
                assert_eq!(q.significant_figures_min, Some(2));
                assert_eq!(q.significant_figures_max, Some(3));
                assert_eq!(q.question.hints.len(), 1);
                let choice = &q.question.choices[0];
                assert!(choice.correct);
                assert_eq!(choice.value.as_deref(), Some("10"));
                assert!(matches!(
                    &choice.kind,
                    ChoiceKind::Quantity { units: Some(u) } if u == "m"
                ));
            }
            other => panic!("expected numeric question, got {other:?}"),
        }
        assert_eq!(question.hints()[0].content_type(), ContentType::Content);
    }

    #[test]
    fn missing_type_defaults_to_content() {
        let c = deserializer().parse_content(br#"{"id": "plain"}"#).unwrap();
        assert_eq!(c.content_type(), ContentType::Content);
    }

    #[test]
    fn malformed_json_is_distinguished() {
        let err = deserializer().parse_content(b"{ not json").unwrap_err();
        assert!(matches!(err, ParseError::MalformedJson { .. }));
    }

    #[test]
    fn unknown_type_reports_path() {
        let json = br#"{"type": "page", "children": [{"type": "content"}, {"type": "hologram"}]}"#;
        match deserializer().parse_content(json).unwrap_err() {
            ParseError::UnknownType { type_name, path } => {
                assert_eq!(type_name, "hologram");
                assert_eq!(path, "$.children[1]");
            }
            other => panic!("expected UnknownType, got {other:?}"),
        }
    }

    #[test]
    fn unknown_choice_type() {
        let json = br#"{"type": "isaacQuestion", "choices": [{"type": "teleport"}]}"#;
        let err = deserializer().parse_content(json).unwrap_err();
        assert!(matches!(err, ParseError::UnknownType { .. }));
    }

    #[test]
    fn non_string_type_is_unknown() {
        let err = deserializer().parse_content(br#"{"type": 7}"#).unwrap_err();
        assert!(err.to_string().contains("unknown type '7'"));
    }

    #[test]
    fn wrong_field_shape_is_schema_error() {
        let json = br#"{"type": "content", "tags": "not-a-list"}"#;
        let err = deserializer().parse_content(json).unwrap_err();
        assert!(matches!(err, ParseError::Schema { .. }));
    }

    #[test]
    fn parse_coordinate_answer() {
        let json = br#"{"type": "coordinateChoice", "items": [
            {"type": "coordinateItem", "x": "1", "y": "2"},
            {"type": "coordinateItem", "x": "3", "y": "4"}
        ]}"#;
        let answer = deserializer().parse_choice(json).unwrap();
        match answer.kind {
            ChoiceKind::Coordinate { items } => assert_eq!(items.len(), 2),
            other => panic!("expected coordinates, got {other:?}"),
        }
    }

    #[test]
    fn reserialised_content_parses_back() {
        let json = br#"{"id": "fig", "type": "figure", "src": "a.png", "altText": "A"}"#;
        let d = deserializer();
        let c = d.parse_content(json).unwrap();
        let again = d
            .parse_content(c.to_canonical_json().unwrap().as_bytes())
            .unwrap();
        assert_eq!(c, again);
    }
}
