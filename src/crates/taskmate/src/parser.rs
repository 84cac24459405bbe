//! Action parser
//!
//! Turns raw classifier output into a validated [`Action`]. The output must be
//! exactly one JSON object, optionally wrapped in a markdown code fence; no
//! attempt is made to dig a JSON object out of surrounding prose.

use crate::action::Action;
use crate::schema::{Operation, ValidationError};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Output is not delimited as a single JSON object.
    #[error("model output is not a JSON object")]
    NotAnObject,

    #[error("model output is not valid JSON: {0}")]
    InvalidJson(String),

    /// Well-formed JSON that does not describe a valid action.
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

impl ParseError {
    /// True when the output could not be read as JSON at all.
    pub fn is_malformed(&self) -> bool {
        matches!(self, ParseError::NotAnObject | ParseError::InvalidJson(_))
    }
}

const TOOL_CALLING: &str = "tool_calling";
const CONVERSATION: &str = "conversation";

/// Parse and validate raw model output.
pub fn parse_action(raw: &str) -> Result<Action, ParseError> {
    let body = strip_code_fence(raw);

    if !(body.starts_with('{') && body.ends_with('}')) {
        return Err(ParseError::NotAnObject);
    }

    let value: Value =
        serde_json::from_str(body).map_err(|e| ParseError::InvalidJson(e.to_string()))?;
    let Value::Object(object) = value else {
        return Err(ParseError::NotAnObject);
    };

    validate_object(&object)
}

/// Remove a surrounding ```` ```json ```` / ```` ``` ```` fence.
pub fn strip_code_fence(raw: &str) -> &str {
    let mut body = raw.trim();

    if let Some(rest) = body.strip_prefix("```") {
        body = match rest.get(..4) {
            Some(tag) if tag.eq_ignore_ascii_case("json") => &rest[4..],
            _ => rest,
        };
    }
    if let Some(rest) = body.strip_suffix("```") {
        body = rest;
    }

    body.trim()
}

fn validate_object(object: &Map<String, Value>) -> Result<Action, ParseError> {
    let kind = object
        .get("type")
        .or_else(|| object.get("kind"))
        .and_then(Value::as_str)
        .map(str::trim)
        .ok_or(ValidationError::MissingKind)?;

    let follow_up = text_field(object, &["followUp", "follow_up"]);

    if kind.eq_ignore_ascii_case(TOOL_CALLING) {
        let name = object
            .get("function")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .ok_or(ValidationError::MissingFunction)?;
        let operation = Operation::from_name(name)
            .ok_or_else(|| ValidationError::UnknownOperation(name.to_string()))?;

        let raw_params = match object.get("parameters") {
            None | Some(Value::Null) => BTreeMap::new(),
            Some(Value::Object(params)) => flatten_parameters(operation, params)?,
            Some(_) => return Err(ValidationError::ParametersNotObject.into()),
        };

        let parameters = operation.validate(&raw_params)?;

        Ok(Action::ToolCall {
            operation,
            parameters,
            follow_up,
        })
    } else if kind.eq_ignore_ascii_case(CONVERSATION) {
        let message =
            text_field(object, &["message"]).ok_or(ValidationError::MissingMessage)?;
        Ok(Action::Conversation { message, follow_up })
    } else {
        Err(ValidationError::UnknownKind(kind.to_string()).into())
    }
}

/// First non-blank string among `keys`, trimmed.
fn text_field(object: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| object.get(*key))
        .filter_map(Value::as_str)
        .map(str::trim)
        .find(|text| !text.is_empty())
        .map(str::to_string)
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Stringify scalar parameters and lift the scalar members of nested objects
/// (such as a `filter` object). Top-level values win over lifted ones.
///
/// A nested object whose values all fall outside the operation's parameters
/// is rejected rather than silently dropped.
fn flatten_parameters(
    operation: Operation,
    params: &Map<String, Value>,
) -> Result<BTreeMap<String, String>, ValidationError> {
    let mut flat = BTreeMap::new();

    for (key, value) in params {
        if let Some(text) = scalar_to_string(value) {
            flat.insert(operation.canonical_param(key).to_string(), text);
        }
    }

    for (key, value) in params {
        match value {
            Value::Object(nested) => {
                let mut carried = false;
                let mut usable = false;
                for (inner_key, inner_value) in nested {
                    let Some(text) = scalar_to_string(inner_value) else {
                        continue;
                    };
                    carried = true;
                    let name = operation.canonical_param(inner_key);
                    if operation.param(name).is_some() {
                        usable = true;
                    }
                    flat.entry(name.to_string()).or_insert(text);
                }
                if carried && !usable {
                    return Err(ValidationError::UnusableNested {
                        operation: operation.name(),
                        param: key.clone(),
                    });
                }
            }
            Value::Array(_) => debug!(parameter = %key, "Ignoring array parameter"),
            _ => {}
        }
    }

    Ok(flat)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Parameters;

    #[test]
    fn test_parse_tool_call() {
        let action = parse_action(
            r#"{"type": "tool_calling", "function": "createTodo", "parameters": {"title": "buy milk", "priority": "High Priority"}, "followUp": "Anything else?"}"#,
        )
        .unwrap();

        let expected: Parameters = [
            ("title", "buy milk"),
            ("priority", "high"),
            ("assignee", "Unassigned"),
        ]
        .into_iter()
        .collect();
        assert_eq!(
            action,
            Action::ToolCall {
                operation: Operation::CreateTodo,
                parameters: expected,
                follow_up: Some("Anything else?".to_string()),
            }
        );
    }

    #[test]
    fn test_parse_fenced_conversation() {
        let raw = "```json\n{\"kind\": \"conversation\", \"message\": \"Hello!\"}\n```";
        assert_eq!(
            parse_action(raw).unwrap(),
            Action::Conversation {
                message: "Hello!".to_string(),
                follow_up: None,
            }
        );

        let bare_fence = "```\n{\"type\": \"conversation\", \"message\": \"Hi\"}\n```";
        assert!(parse_action(bare_fence).is_ok());
    }

    #[test]
    fn test_not_an_object() {
        assert_eq!(parse_action("not json"), Err(ParseError::NotAnObject));
        assert_eq!(
            parse_action("Sure! {\"type\": \"conversation\", \"message\": \"hi\"}"),
            Err(ParseError::NotAnObject)
        );
        assert!(parse_action("").unwrap_err().is_malformed());
    }

    #[test]
    fn test_invalid_json_is_distinct() {
        let err = parse_action("{\"type\": }").unwrap_err();
        assert!(matches!(err, ParseError::InvalidJson(_)));
        assert!(err.is_malformed());
    }

    #[test]
    fn test_schema_failures() {
        let unknown = parse_action(r#"{"type": "tool_calling", "function": "launchRocket"}"#)
            .unwrap_err();
        assert_eq!(
            unknown,
            ParseError::Invalid(ValidationError::UnknownOperation("launchRocket".into()))
        );
        assert!(!unknown.is_malformed());

        assert_eq!(
            parse_action(r#"{"message": "hi"}"#),
            Err(ParseError::Invalid(ValidationError::MissingKind))
        );
        assert_eq!(
            parse_action(r#"{"type": "conversation", "message": "  "}"#),
            Err(ParseError::Invalid(ValidationError::MissingMessage))
        );
        assert_eq!(
            parse_action(r#"{"type": "tool_calling", "function": "getAllTodos", "parameters": [1]}"#),
            Err(ParseError::Invalid(ValidationError::ParametersNotObject))
        );
        assert_eq!(
            parse_action(r#"{"type": "dance"}"#),
            Err(ParseError::Invalid(ValidationError::UnknownKind("dance".into())))
        );
    }

    #[test]
    fn test_nested_filter_is_lifted() {
        let action = parse_action(
            r#"{"type": "tool_calling", "function": "bulkUpdateAssignee",
                "parameters": {"newAssignee": "Kim", "priority": "low",
                               "filter": {"currentAssignee": "Sam", "priority": "high"}}}"#,
        )
        .unwrap();

        let Action::ToolCall { parameters, .. } = action else {
            panic!("expected a tool call");
        };
        assert_eq!(parameters.get("currentAssignee"), Some("Sam"));
        assert_eq!(parameters.get("priority"), Some("low"));
    }

    #[test]
    fn test_filter_assignee_scopes_bulk_reassign() {
        let action = parse_action(
            r#"{"type": "tool_calling", "function": "bulkUpdateAssignee",
                "parameters": {"newAssignee": "Kim", "filter": {"assignee": "Sam"}}}"#,
        )
        .unwrap();

        let Action::ToolCall { parameters, .. } = action else {
            panic!("expected a tool call");
        };
        assert_eq!(parameters.get("currentAssignee"), Some("Sam"));
        assert_eq!(parameters.get("newAssignee"), Some("Kim"));
    }

    #[test]
    fn test_unusable_filter_is_rejected() {
        let err = parse_action(
            r#"{"type": "tool_calling", "function": "bulkUpdateAssignee",
                "parameters": {"newAssignee": "Kim", "filter": {"team": "ops"}}}"#,
        )
        .unwrap_err();

        assert!(matches!(
            err,
            ParseError::Invalid(ValidationError::UnusableNested { .. })
        ));
        assert!(!err.is_malformed());
    }

    #[test]
    fn test_scalars_are_stringified() {
        let action = parse_action(
            r#"{"type": "tool_calling", "function": "getAllTodos", "parameters": {"searchTerm": 42, "assignee": null}}"#,
        )
        .unwrap();
        let Action::ToolCall { parameters, .. } = action else {
            panic!("expected a tool call");
        };
        assert_eq!(parameters.get("searchTerm"), Some("42"));
        assert_eq!(parameters.get("assignee"), None);
    }
}
