//! Startup wiring: builds the collaborators and the dispatcher from a
//! validated [`TaskmateConfig`].

use crate::classifier::IntentClassifier;
use crate::config::{Provider, StoreBackend, TaskmateConfig};
use crate::conversation::ConversationState;
use crate::dispatcher::Dispatcher;
use crate::error::{Result, TaskmateError};
use crate::lookup::Lookups;
use crate::prompt::system_prompt;
use crate::registry::ToolRegistry;
use crate::store::{MemoryTaskStore, SqliteTaskStore, TaskStore};
use llm::remote::{GeminiClient, OpenAiClient};
use llm::{ChatModel, RemoteLlmConfig};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Open the configured task store and check it responds.
pub async fn build_store(config: &TaskmateConfig) -> Result<Arc<dyn TaskStore>> {
    let store: Arc<dyn TaskStore> = match config.store.backend()? {
        StoreBackend::Memory => Arc::new(MemoryTaskStore::new()),
        StoreBackend::Sqlite => Arc::new(SqliteTaskStore::open(config.database_path()?).await?),
    };

    store.ping().await?;
    info!(backend = store.backend_name(), "Task store ready");
    Ok(store)
}

/// Build the chat model client for the configured provider.
pub fn build_model(config: &TaskmateConfig) -> Result<Arc<dyn ChatModel>> {
    let llm = &config.llm;
    let api_key = llm
        .api_key
        .clone()
        .ok_or_else(|| TaskmateError::Config("No API key configured".to_string()))?;

    let remote = RemoteLlmConfig::new(api_key, llm.base_url(), llm.model_name())
        .with_timeout(Duration::from_secs(llm.timeout_secs));

    let model: Arc<dyn ChatModel> = match llm.provider()? {
        Provider::Gemini => Arc::new(GeminiClient::new(remote)?),
        Provider::OpenAi => Arc::new(OpenAiClient::new(remote)?.with_json_mode(true)),
    };

    info!(provider = model.provider_name(), model = %llm.model_name(), "Chat model ready");
    Ok(model)
}

/// Assemble a dispatcher from already-built collaborators.
pub fn build_dispatcher(
    config: &TaskmateConfig,
    model: Arc<dyn ChatModel>,
    store: Arc<dyn TaskStore>,
    lookups: &Lookups,
) -> Result<Dispatcher> {
    let registry = ToolRegistry::standard(store, lookups);
    let missing = registry.missing_operations();
    if !missing.is_empty() {
        let names: Vec<_> = missing.iter().map(|op| op.name()).collect();
        return Err(TaskmateError::Config(format!(
            "No handler registered for: {}",
            names.join(", ")
        )));
    }

    let classifier = IntentClassifier::new(model)
        .with_retry_policy(config.classifier.retry_policy())
        .with_temperature(config.llm.temperature);
    let conversation = ConversationState::new(system_prompt(), config.classifier.history_turns);

    Ok(
        Dispatcher::new(Arc::new(classifier), Arc::new(registry), conversation)
            .with_exchange_timeout(config.classifier.exchange_timeout()),
    )
}

/// Validate `config` and build everything the assistant needs.
pub async fn bootstrap(config: &TaskmateConfig) -> Result<Dispatcher> {
    config.validate()?;

    let store = build_store(config).await?;
    let model = build_model(config)?;
    let lookups = Lookups::from_config(&config.lookup)?;

    build_dispatcher(config, model, store, &lookups)
}
