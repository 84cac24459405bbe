//! System prompt for the intent classifier, generated from the schema.

use crate::schema::{Operation, ParamSpec};
use std::fmt::Write;

const PREAMBLE: &str = "\
You are a task assistant. You keep track of the user's todos and can look up \
weather, GitHub and Twitter profiles, and country facts. Keep the context of \
the conversation in mind and offer a short, helpful follow-up.";

const RESPONSE_FORMAT: &str = r#"RESPONSE FORMAT:
Respond with a single raw JSON object (no code blocks, no markdown) in one of these shapes.

To run an operation:
{"type": "tool_calling", "function": "<operation>", "parameters": {"<name>": "<value>"}, "followUp": "<optional suggestion>"}

To reply without running anything:
{"type": "conversation", "message": "<your reply>", "followUp": "<optional suggestion>"}

Parameter values are strings. Leave out optional parameters you do not need.
A task can be identified by its 24-character id or by its exact title."#;

/// (utterance, response) pairs shown to the model.
const EXAMPLES: &[(&str, &str)] = &[
    (
        "add a high priority task to buy milk",
        r#"{"type": "tool_calling", "function": "createTodo", "parameters": {"title": "buy milk", "priority": "high"}, "followUp": "Want me to assign it to someone?"}"#,
    ),
    (
        "show tasks for vansh",
        r#"{"type": "tool_calling", "function": "getAllTodos", "parameters": {"assignee": "vansh"}, "followUp": "Should I filter these by priority or date?"}"#,
    ),
    (
        "what did I add yesterday",
        r#"{"type": "tool_calling", "function": "getAllTodos", "parameters": {"dateFilter": "yesterday"}}"#,
    ),
    (
        "mark go shopping as done",
        r#"{"type": "tool_calling", "function": "toggleComplete", "parameters": {"identifier": "Go shopping"}}"#,
    ),
    (
        "move all of sam's high priority tasks to kim",
        r#"{"type": "tool_calling", "function": "bulkUpdateAssignee", "parameters": {"newAssignee": "kim", "currentAssignee": "sam", "priority": "high"}}"#,
    ),
    (
        "what's the weather in Paris",
        r#"{"type": "tool_calling", "function": "getCurrentWeather", "parameters": {"city": "Paris"}, "followUp": "Want a reminder task for an umbrella?"}"#,
    ),
    (
        "hi there",
        r#"{"type": "conversation", "message": "Hello! I can manage your tasks or look things up for you.", "followUp": "Would you like to see your tasks?"}"#,
    ),
];

/// Full system prompt describing every operation in the schema.
pub fn system_prompt() -> String {
    let mut prompt = String::with_capacity(4096);

    prompt.push_str(PREAMBLE);
    prompt.push_str("\n\nOPERATIONS:\n");
    for op in Operation::ALL {
        describe_operation(&mut prompt, op);
    }

    prompt.push('\n');
    prompt.push_str(RESPONSE_FORMAT);

    prompt.push_str("\n\nEXAMPLES:\n");
    for (utterance, response) in EXAMPLES {
        let _ = writeln!(prompt, "User: \"{}\"\nResponse: {}", utterance, response);
    }

    prompt
}

fn describe_operation(out: &mut String, op: Operation) {
    let _ = writeln!(out, "- {}: {}", op.name(), op.description());
    for spec in op.params() {
        let _ = writeln!(out, "    {}", describe_param(spec));
    }
}

fn describe_param(spec: &ParamSpec) -> String {
    let mut line = format!("{} ({}", spec.name, spec.kind.type_hint());
    if spec.required {
        line.push_str(", required");
    } else if let Some(default) = spec.default {
        let _ = write!(line, ", default \"{}\"", default);
    } else {
        line.push_str(", optional");
    }
    let _ = write!(line, "): {}", spec.description);
    line
}
