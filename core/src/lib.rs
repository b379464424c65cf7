//! Core traits and types shared by every environment crate.
//! An environment is driven through `ToolCall`s and answers with JSON `Observation`s;
//! factories are registered by name so services and demos can build environments from config.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};

/// A named tool invocation with JSON arguments.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ToolCall {
    pub tool: String,
    #[serde(default)]
    pub args: Json,
}

impl ToolCall {
    pub fn new(tool: impl Into<String>, args: Json) -> Self {
        Self { tool: tool.into(), args }
    }

    /// Required integer argument.
    pub fn arg_i64(&self, key: &str) -> Result<i64, EngineError> {
        self.args
            .get(key)
            .and_then(Json::as_i64)
            .ok_or_else(|| EngineError::Validation(format!("{}: missing integer '{key}'", self.tool)))
    }

    /// Optional argument; present but wrongly typed is an error.
    pub fn opt_arg<T: serde::de::DeserializeOwned>(&self, key: &str) -> Result<Option<T>, EngineError> {
        match self.args.get(key) {
            None | Some(Json::Null) => Ok(None),
            Some(v) => serde_json::from_value(v.clone())
                .map(Some)
                .map_err(|e| EngineError::Validation(format!("{}: bad '{key}': {e}", self.tool))),
        }
    }
}

/// Observation contract. `terminated`/`truncated` are always present; the rest lives in `data`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Observation {
    pub terminated: bool,
    pub truncated: bool,
    #[serde(default)]
    pub data: Json,
}

/// Checkpoint payload tagged with the engine that produced it.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Snapshot {
    pub version: u32,
    pub engine: String,
    pub data: Json,
}

#[derive(thiserror::Error, Debug)]
pub enum EngineError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("internal error: {0}")]
    Internal(String),
}

#[async_trait]
pub trait Environment: Send + Sync {
    async fn initialize(&mut self) -> Result<Observation, EngineError>;
    async fn step(&mut self, tool_calls: Vec<ToolCall>) -> Result<Observation, EngineError>;
    async fn checkpoint(&self) -> Result<Snapshot, EngineError>;
    async fn terminate(&mut self) -> Result<Observation, EngineError>;
}

/// Builds an environment from an optional JSON config.
pub type EnvConfigFactory =
    Arc<dyn Fn(Option<Json>) -> Result<Box<dyn Environment>, EngineError> + Send + Sync + 'static>;

static ENV_REGISTRY: OnceLock<Mutex<HashMap<String, EnvConfigFactory>>> = OnceLock::new();

fn registry() -> &'static Mutex<HashMap<String, EnvConfigFactory>> {
    ENV_REGISTRY.get_or_init(|| Mutex::new(HashMap::new()))
}

/// Register a factory under `name`, replacing any previous one.
pub fn register_environment_with_config(name: &str, factory: EnvConfigFactory) {
    let mut reg = registry().lock().expect("env registry poisoned");
    reg.insert(name.to_string(), factory);
}

pub fn create_environment_with_config(
    name: &str,
    config: Option<Json>,
) -> Result<Box<dyn Environment>, EngineError> {
    // Clone the factory out so it runs without holding the lock.
    let factory = {
        let reg = registry()
            .lock()
            .map_err(|_| EngineError::Internal("env registry poisoned".into()))?;
        reg.get(name)
            .cloned()
            .ok_or_else(|| EngineError::NotFound(format!("unsupported environment: {name}")))?
    };
    factory(config)
}

pub fn create_environment(name: &str) -> Result<Box<dyn Environment>, EngineError> {
    create_environment_with_config(name, None)
}

/// Registered names, sorted.
pub fn list_environments() -> Vec<String> {
    let mut names: Vec<String> = registry()
        .lock()
        .map(|reg| reg.keys().cloned().collect())
        .unwrap_or_default();
    names.sort();
    names
}

/// Decode a factory config, falling back to `T::default()` when absent.
pub fn config_or_default<T>(cfg: Option<Json>) -> Result<T, EngineError>
where
    T: serde::de::DeserializeOwned + Default,
{
    match cfg {
        Some(v) => serde_json::from_value(v).map_err(|e| EngineError::Validation(format!("bad config: {e}"))),
        None => Ok(T::default()),
    }
}
