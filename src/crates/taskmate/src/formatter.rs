//! Renders handler results as reply text.

use crate::result::{ToolData, ToolResult};
use crate::schema::Operation;
use crate::store::TaskRecord;

/// Render `result` of `operation`, appending `follow_up` after a blank line.
pub fn format_result(operation: Operation, result: &ToolResult, follow_up: Option<&str>) -> String {
    let body = if !result.success {
        result.message.clone()
    } else {
        match &result.data {
            ToolData::Many(records) if records.is_empty() && operation.is_listing() => {
                result.message.clone()
            }
            ToolData::Many(records) if !records.is_empty() => {
                let lines: Vec<String> = records.iter().map(format_record).collect();
                format!("{}\n{}", result.message, lines.join("\n"))
            }
            ToolData::Many(_) | ToolData::One(_) | ToolData::None => result.message.clone(),
        }
    };

    with_follow_up(body, follow_up)
}

/// Conversational replies: the message plus optional follow-up.
pub fn format_conversation(message: &str, follow_up: Option<&str>) -> String {
    with_follow_up(message.to_string(), follow_up)
}

pub fn format_record(record: &TaskRecord) -> String {
    format!("[{}] {} ({})", record.id, record.title, record.status_label())
}

fn with_follow_up(mut body: String, follow_up: Option<&str>) -> String {
    if let Some(follow_up) = follow_up.map(str::trim).filter(|f| !f.is_empty()) {
        body.push_str("\n\n");
        body.push_str(follow_up);
    }
    body
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::NewTask;
    use chrono::Utc;

    fn record(title: &str, completed: bool) -> TaskRecord {
        let mut record = TaskRecord::new(NewTask::new(title), Utc::now()).unwrap();
        record.completed = completed;
        record
    }

    #[test]
    fn test_failure_is_verbatim() {
        let result = ToolResult::failure("Todo not found: x").with_error_detail("secret detail");
        assert_eq!(
            format_result(Operation::DeleteTodo, &result, None),
            "Todo not found: x"
        );
    }

    #[test]
    fn test_empty_listing_is_message_only() {
        let result = ToolResult::success("No todos found").with_records(Vec::new());
        assert_eq!(
            format_result(Operation::GetAllTodos, &result, None),
            "No todos found"
        );
    }

    #[test]
    fn test_listing_renders_records() {
        let a = record("Buy milk", false);
        let b = record("Pay rent", true);
        let expected = format!(
            "Found 2 todos\n[{}] Buy milk (Pending)\n[{}] Pay rent (Completed)",
            a.id, b.id
        );
        let result = ToolResult::success("Found 2 todos").with_records(vec![a, b]);

        assert_eq!(format_result(Operation::GetAllTodos, &result, None), expected);
    }

    #[test]
    fn test_single_record_uses_message() {
        let result = ToolResult::success("Deleted: Buy milk").with_record(record("Buy milk", false));
        assert_eq!(
            format_result(Operation::DeleteTodo, &result, None),
            "Deleted: Buy milk"
        );
    }

    #[test]
    fn test_follow_up_appended_on_every_branch() {
        let ok = ToolResult::success("Added: x (medium priority) - Assigned to: Unassigned");
        assert_eq!(
            format_result(Operation::CreateTodo, &ok, Some("Anything else?")),
            "Added: x (medium priority) - Assigned to: Unassigned\n\nAnything else?"
        );

        let failed = ToolResult::failure("Todo not found: y");
        assert_eq!(
            format_result(Operation::DeleteTodo, &failed, Some("Try another title?")),
            "Todo not found: y\n\nTry another title?"
        );

        assert_eq!(format_conversation("Hi!", Some("   ")), "Hi!");
        assert_eq!(format_conversation("Hi!", Some("Need help?")), "Hi!\n\nNeed help?");
    }
}
