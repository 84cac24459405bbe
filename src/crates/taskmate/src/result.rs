//! Uniform handler result.

use crate::store::TaskRecord;
use serde::Serialize;

/// Payload attached to a [`ToolResult`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "records", rename_all = "lowercase")]
pub enum ToolData {
    #[default]
    None,
    One(TaskRecord),
    Many(Vec<TaskRecord>),
}

/// Outcome of a handler invocation.
///
/// `message` is always non-empty and is what the user sees on failure.
/// `error_detail` is for logs only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolResult {
    pub success: bool,
    pub data: ToolData,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<String>,
}

impl ToolResult {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: ToolData::None,
            message: message.into(),
            error_detail: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: ToolData::None,
            message: message.into(),
            error_detail: None,
        }
    }

    pub fn with_record(mut self, record: TaskRecord) -> Self {
        self.data = ToolData::One(record);
        self
    }

    pub fn with_records(mut self, records: Vec<TaskRecord>) -> Self {
        self.data = ToolData::Many(records);
        self
    }

    pub fn with_error_detail(mut self, detail: impl Into<String>) -> Self {
        self.error_detail = Some(detail.into());
        self
    }
}
