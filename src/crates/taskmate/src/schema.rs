//! Action schema
//!
//! The fixed set of operations the assistant can perform, with the declared
//! parameters of each. Both the system prompt (see [`crate::prompt`]) and the
//! action validator (see [`crate::parser`]) are driven from this table, so an
//! operation added here is described to the model and validated without
//! further changes. Binding a handler for it is done in
//! [`crate::registry::ToolRegistry::standard`].

use chrono::{DateTime, Duration, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Every operation the classifier may select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Operation {
    CreateTodo,
    GetAllTodos,
    UpdateTodo,
    ToggleComplete,
    DeleteTodo,
    ReassignTodo,
    BulkUpdateAssignee,
    GetCurrentWeather,
    GetGithubProfile,
    GetTwitterProfile,
    GetCountryInfo,
}

impl Operation {
    pub const ALL: [Operation; 11] = [
        Operation::CreateTodo,
        Operation::GetAllTodos,
        Operation::UpdateTodo,
        Operation::ToggleComplete,
        Operation::DeleteTodo,
        Operation::ReassignTodo,
        Operation::BulkUpdateAssignee,
        Operation::GetCurrentWeather,
        Operation::GetGithubProfile,
        Operation::GetTwitterProfile,
        Operation::GetCountryInfo,
    ];

    /// Wire name used by the model and the registry.
    pub fn name(self) -> &'static str {
        match self {
            Operation::CreateTodo => "createTodo",
            Operation::GetAllTodos => "getAllTodos",
            Operation::UpdateTodo => "updateTodo",
            Operation::ToggleComplete => "toggleComplete",
            Operation::DeleteTodo => "deleteTodo",
            Operation::ReassignTodo => "reassignTodo",
            Operation::BulkUpdateAssignee => "bulkUpdateAssignee",
            Operation::GetCurrentWeather => "getCurrentWeather",
            Operation::GetGithubProfile => "getGithubProfile",
            Operation::GetTwitterProfile => "getTwitterProfile",
            Operation::GetCountryInfo => "getCountryInfo",
        }
    }

    /// Look up an operation by wire name, ignoring ASCII case.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|op| op.name().eq_ignore_ascii_case(name))
    }

    pub fn description(self) -> &'static str {
        match self {
            Operation::CreateTodo => "Create a new task with an optional priority and assignee",
            Operation::GetAllTodos => {
                "List tasks, optionally filtered by keyword, priority, date range and assignee"
            }
            Operation::UpdateTodo => {
                "Change the title, priority or assignee of a task (identify it by id or title)"
            }
            Operation::ToggleComplete => {
                "Flip a task between completed and pending (identify it by id or title)"
            }
            Operation::DeleteTodo => "Remove a task (identify it by id or title)",
            Operation::ReassignTodo => "Assign a single task to someone else",
            Operation::BulkUpdateAssignee => {
                "Reassign every task matching a filter (current assignee, priority, keyword)"
            }
            Operation::GetCurrentWeather => "Current weather for a city",
            Operation::GetGithubProfile => "Summary of a GitHub user's public profile",
            Operation::GetTwitterProfile => "Summary of a Twitter/X user's profile",
            Operation::GetCountryInfo => "Capital, population, language and currency of a country",
        }
    }

    /// Declared parameters, in the order they are described to the model.
    pub fn params(self) -> &'static [ParamSpec] {
        match self {
            Operation::CreateTodo => CREATE_TODO,
            Operation::GetAllTodos => GET_ALL_TODOS,
            Operation::UpdateTodo => UPDATE_TODO,
            Operation::ToggleComplete | Operation::DeleteTodo => IDENTIFIER_ONLY,
            Operation::ReassignTodo => REASSIGN_TODO,
            Operation::BulkUpdateAssignee => BULK_UPDATE_ASSIGNEE,
            Operation::GetCurrentWeather => WEATHER,
            Operation::GetGithubProfile | Operation::GetTwitterProfile => USERNAME,
            Operation::GetCountryInfo => COUNTRY,
        }
    }

    pub fn param(self, name: &str) -> Option<&'static ParamSpec> {
        self.params().iter().find(|spec| spec.name == name)
    }

    /// Declared name for a parameter the model may send under another name.
    ///
    /// A bulk reassign scoped by `assignee` means the current owner; dropping
    /// it as unknown would widen the update to every task.
    pub fn canonical_param<'a>(self, key: &'a str) -> &'a str {
        match (self, key) {
            (Operation::BulkUpdateAssignee, "assignee") => "currentAssignee",
            _ => key,
        }
    }

    /// Listing operations render their records one per line.
    pub fn is_listing(self) -> bool {
        matches!(self, Operation::GetAllTodos)
    }

    /// Validate and normalize raw string parameters against this operation.
    ///
    /// Absent optional parameters with a default get the default; unknown
    /// parameters are dropped.
    pub fn validate(
        self,
        raw: &BTreeMap<String, String>,
    ) -> std::result::Result<Parameters, ValidationError> {
        let mut params = Parameters::new();

        for spec in self.params() {
            let normalized = match raw.get(spec.name) {
                Some(value) => spec.kind.normalize(value).map_err(|reason| {
                    ValidationError::InvalidValue {
                        operation: self.name(),
                        param: spec.name,
                        value: value.clone(),
                        reason,
                    }
                })?,
                None => None,
            };

            match (normalized, spec.default) {
                (Some(value), _) => params.insert(spec.name, value),
                (None, Some(default)) => params.insert(spec.name, default),
                (None, None) if spec.required => {
                    return Err(ValidationError::MissingParameter {
                        operation: self.name(),
                        param: spec.name,
                    })
                }
                (None, None) => {}
            }
        }

        for key in raw.keys().filter(|key| self.param(key).is_none()) {
            tracing::debug!(operation = self.name(), parameter = %key, "Ignoring unknown parameter");
        }

        Ok(params)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Operation {
    type Err = ValidationError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| ValidationError::UnknownOperation(s.to_string()))
    }
}

/// How a parameter value is normalized before use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// Free text, trimmed.
    Text,
    /// A user handle; a leading `@` is dropped.
    Handle,
    /// One of low/medium/high.
    Priority,
    /// A record id or a title.
    Identifier,
    /// A relative date window.
    DateFilter,
}

impl ParamKind {
    /// Normalize a raw value. `Ok(None)` means the value is blank and counts
    /// as absent.
    pub fn normalize(self, raw: &str) -> std::result::Result<Option<String>, String> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }

        match self {
            ParamKind::Text | ParamKind::Identifier => Ok(Some(trimmed.to_string())),
            ParamKind::Handle => {
                let handle = trimmed.trim_start_matches('@').trim();
                Ok((!handle.is_empty()).then(|| handle.to_string()))
            }
            ParamKind::Priority => trimmed
                .parse::<Priority>()
                .map(|p| Some(p.as_str().to_string())),
            ParamKind::DateFilter => trimmed
                .parse::<DateFilter>()
                .map(|d| Some(d.as_str().to_string())),
        }
    }

    pub fn type_hint(self) -> &'static str {
        match self {
            ParamKind::Text => "string",
            ParamKind::Handle => "username",
            ParamKind::Priority => "low | medium | high",
            ParamKind::Identifier => "task id or exact title",
            ParamKind::DateFilter => "today | yesterday | week | month",
        }
    }
}

/// Declaration of one operation parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamKind,
    pub required: bool,
    pub default: Option<&'static str>,
    pub description: &'static str,
}

impl ParamSpec {
    const fn required(name: &'static str, kind: ParamKind, description: &'static str) -> Self {
        Self {
            name,
            kind,
            required: true,
            default: None,
            description,
        }
    }

    const fn optional(
        name: &'static str,
        kind: ParamKind,
        default: Option<&'static str>,
        description: &'static str,
    ) -> Self {
        Self {
            name,
            kind,
            required: false,
            default,
            description,
        }
    }
}

const CREATE_TODO: &[ParamSpec] = &[
    ParamSpec::required("title", ParamKind::Text, "what the task is"),
    ParamSpec::optional("priority", ParamKind::Priority, Some("medium"), "task priority"),
    ParamSpec::optional("assignee", ParamKind::Text, Some("Unassigned"), "who should do it"),
];

const GET_ALL_TODOS: &[ParamSpec] = &[
    ParamSpec::optional("searchTerm", ParamKind::Text, None, "keyword to match in titles"),
    ParamSpec::optional("priority", ParamKind::Priority, None, "only this priority"),
    ParamSpec::optional("dateFilter", ParamKind::DateFilter, None, "only tasks created in this window"),
    ParamSpec::optional("assignee", ParamKind::Text, None, "only tasks assigned to this person"),
];

const UPDATE_TODO: &[ParamSpec] = &[
    ParamSpec::required("identifier", ParamKind::Identifier, "the task to change"),
    ParamSpec::optional("newTitle", ParamKind::Text, None, "replacement title"),
    ParamSpec::optional("priority", ParamKind::Priority, None, "new priority"),
    ParamSpec::optional("assignee", ParamKind::Text, None, "new assignee"),
];

const IDENTIFIER_ONLY: &[ParamSpec] = &[ParamSpec::required(
    "identifier",
    ParamKind::Identifier,
    "the task to act on",
)];

const REASSIGN_TODO: &[ParamSpec] = &[
    ParamSpec::required("identifier", ParamKind::Identifier, "the task to reassign"),
    ParamSpec::required("newAssignee", ParamKind::Text, "who should own it now"),
];

const BULK_UPDATE_ASSIGNEE: &[ParamSpec] = &[
    ParamSpec::required("newAssignee", ParamKind::Text, "who should own the matching tasks"),
    ParamSpec::optional("currentAssignee", ParamKind::Text, None, "only tasks currently assigned to this person"),
    ParamSpec::optional("priority", ParamKind::Priority, None, "only tasks with this priority"),
    ParamSpec::optional("searchTerm", ParamKind::Text, None, "only tasks whose title contains this"),
];

const WEATHER: &[ParamSpec] = &[ParamSpec::required("city", ParamKind::Text, "city name")];

const USERNAME: &[ParamSpec] = &[ParamSpec::required("username", ParamKind::Handle, "account name")];

const COUNTRY: &[ParamSpec] = &[ParamSpec::required("country", ParamKind::Text, "country name")];

/// Task priority.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    /// Accepts any case and a trailing "priority" word ("High Priority").
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();
        let word = lowered
            .strip_suffix("priority")
            .unwrap_or(&lowered)
            .trim_end_matches(['-', '_', ' '])
            .trim();

        match word {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            _ => Err(format!("expected low, medium or high, got '{}'", s.trim())),
        }
    }
}

/// Length of a record id in hex characters.
pub const RECORD_ID_LEN: usize = 24;

/// True when `value` has the shape of a record id.
pub fn is_record_id(value: &str) -> bool {
    value.len() == RECORD_ID_LEN && value.bytes().all(|b| b.is_ascii_hexdigit())
}

/// A reference to one task: either its id or its title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identifier {
    Id(String),
    Title(String),
}

impl Identifier {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if is_record_id(trimmed) {
            Identifier::Id(trimmed.to_ascii_lowercase())
        } else {
            Identifier::Title(trimmed.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Identifier::Id(id) => id,
            Identifier::Title(title) => title,
        }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Creation-date window for listing tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateFilter {
    Today,
    Yesterday,
    /// The last 7 days.
    Week,
    /// The last 30 days.
    Month,
}

impl DateFilter {
    pub fn as_str(self) -> &'static str {
        match self {
            DateFilter::Today => "today",
            DateFilter::Yesterday => "yesterday",
            DateFilter::Week => "week",
            DateFilter::Month => "month",
        }
    }

    /// Half-open `[start, end)` window relative to `now`, in UTC. `end` is
    /// `None` for windows that run up to the present.
    pub fn window(self, now: DateTime<Utc>) -> (DateTime<Utc>, Option<DateTime<Utc>>) {
        let midnight = Utc.from_utc_datetime(&now.date_naive().and_time(NaiveTime::default()));

        match self {
            DateFilter::Today => (midnight, None),
            DateFilter::Yesterday => (midnight - Duration::days(1), Some(midnight)),
            DateFilter::Week => (now - Duration::days(7), None),
            DateFilter::Month => (now - Duration::days(30), None),
        }
    }

    pub fn contains(self, now: DateTime<Utc>, instant: DateTime<Utc>) -> bool {
        let (start, end) = self.window(now);
        instant >= start && end.map_or(true, |end| instant < end)
    }
}

impl FromStr for DateFilter {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "today" => Ok(DateFilter::Today),
            "yesterday" => Ok(DateFilter::Yesterday),
            "week" | "this week" | "last week" | "last 7 days" => Ok(DateFilter::Week),
            "month" | "this month" | "last month" | "last 30 days" => Ok(DateFilter::Month),
            other => Err(format!(
                "expected today, yesterday, week or month, got '{}'",
                other
            )),
        }
    }
}

/// Validated, normalized operation parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Parameters(BTreeMap<String, String>);

impl Parameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn priority(&self, name: &str) -> Option<Priority> {
        self.get(name).and_then(|value| value.parse().ok())
    }

    pub fn identifier(&self, name: &str) -> Option<Identifier> {
        self.get(name)
            .filter(|value| !value.trim().is_empty())
            .map(Identifier::parse)
    }

    pub fn date_filter(&self, name: &str) -> Option<DateFilter> {
        self.get(name).and_then(|value| value.parse().ok())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Parameters {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Why a classified action does not fit the schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("missing action type")]
    MissingKind,

    #[error("unknown action type '{0}'")]
    UnknownKind(String),

    #[error("tool call without a function name")]
    MissingFunction,

    #[error("unknown operation '{0}'")]
    UnknownOperation(String),

    #[error("parameters must be an object")]
    ParametersNotObject,

    #[error("{operation}: missing required parameter '{param}'")]
    MissingParameter {
        operation: &'static str,
        param: &'static str,
    },

    #[error("{operation}: invalid value '{value}' for '{param}': {reason}")]
    InvalidValue {
        operation: &'static str,
        param: &'static str,
        value: String,
        reason: String,
    },

    /// A nested object (such as a `filter`) carried values but none of them
    /// named a parameter of the operation.
    #[error("{operation}: no usable field in '{param}'")]
    UnusableNested {
        operation: &'static str,
        param: String,
    },

    #[error("conversation reply without a message")]
    MissingMessage,
}
