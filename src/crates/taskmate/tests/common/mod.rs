//! Shared test doubles for the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use llm::{ChatModel, ChatRequest, ChatResponse, LlmError};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use taskmate::conversation::ConversationState;
use taskmate::prompt::system_prompt;
use taskmate::{
    Dispatcher, IntentClassifier, LookupOutcome, LookupService, Lookups, MemoryTaskStore,
    TaskStore, ToolRegistry,
};
use tooling::async_utils::RetryPolicy;

/// Chat model that replays a fixed script and records every request.
pub struct ScriptedModel {
    replies: Mutex<VecDeque<llm::Result<ChatResponse>>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedModel {
    pub fn new(replies: Vec<llm::Result<ChatResponse>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    /// Script of successful replies.
    pub fn replying(texts: &[&str]) -> Arc<Self> {
        Self::new(
            texts
                .iter()
                .map(|text| Ok(ChatResponse::new(*text)))
                .collect(),
        )
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().len()
    }

    pub fn last_request(&self) -> Option<ChatRequest> {
        self.requests.lock().last().cloned()
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    async fn chat(&self, request: ChatRequest) -> llm::Result<ChatResponse> {
        self.requests.lock().push(request);
        self.replies
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::ProviderError("script exhausted".into())))
    }

    fn provider_name(&self) -> &str {
        "scripted"
    }
}

/// Lookup that always answers with the same summary.
pub struct CannedLookup(pub &'static str);

#[async_trait]
impl LookupService for CannedLookup {
    fn name(&self) -> &'static str {
        "canned"
    }

    async fn lookup(&self, key: &str) -> LookupOutcome {
        LookupOutcome::found(format!("{}: {}", self.0, key))
    }
}

pub fn canned_lookups() -> Lookups {
    Lookups {
        weather: Arc::new(CannedLookup("weather")),
        github: Arc::new(CannedLookup("github")),
        twitter: Arc::new(CannedLookup("twitter")),
        country: Arc::new(CannedLookup("country")),
    }
}

pub fn fast_retry() -> RetryPolicy {
    RetryPolicy::new(3)
        .with_initial_interval(Duration::from_millis(10))
        .with_backoff_factor(2.0)
}

pub fn memory_store() -> Arc<dyn TaskStore> {
    Arc::new(MemoryTaskStore::new())
}

pub fn dispatcher_with(
    model: Arc<ScriptedModel>,
    registry: ToolRegistry,
    retry: RetryPolicy,
) -> Dispatcher {
    let classifier = IntentClassifier::new(model).with_retry_policy(retry);
    Dispatcher::new(
        Arc::new(classifier),
        Arc::new(registry),
        ConversationState::new(system_prompt(), 9),
    )
}

pub fn dispatcher(model: Arc<ScriptedModel>, store: Arc<dyn TaskStore>) -> Dispatcher {
    dispatcher_with(
        model,
        ToolRegistry::standard(store, &canned_lookups()),
        fast_retry(),
    )
}
