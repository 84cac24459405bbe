//! Configuration loading and schema

pub mod loader;
pub mod schema;

pub use loader::{ConfigLoader, ConfigOverrides};
pub use schema::{
    ClassifierConfig, LlmConfig, LookupConfig, Provider, StoreBackend, StoreConfig,
    TaskmateConfig,
};
