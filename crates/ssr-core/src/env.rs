//! Public environment variable resolution.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Flat mapping of public environment variables.
///
/// Serialized into the page as `window.VUE_ENV` and handed to the app
/// through the render context.
pub type EnvMap = serde_json::Map<String, Value>;

/// The deployment environment key that is always exposed when set.
pub const PROJECT_ENV: &str = "PROJECT_ENV";

/// A key/value store to resolve variables from.
pub trait EnvSource {
    /// Look up a variable. `None` means unset.
    fn var(&self, key: &str) -> Option<String>;
}

/// The environment of the current process.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl EnvSource for HashMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

impl EnvSource for BTreeMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

/// A static value for `additional_env_vars`.
///
/// Any JSON value is accepted and copied into the mapping as is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EnvValue {
    Text(String),
    Number(serde_json::Number),
    Bool(bool),
    Json(Value),
}

impl From<&str> for EnvValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for EnvValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for EnvValue {
    fn from(value: i64) -> Self {
        Self::Number(value.into())
    }
}

impl From<bool> for EnvValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<Value> for EnvValue {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

impl From<EnvValue> for Value {
    fn from(value: EnvValue) -> Self {
        match value {
            EnvValue::Text(s) => Value::String(s),
            EnvValue::Number(n) => Value::Number(n),
            EnvValue::Bool(b) => Value::Bool(b),
            EnvValue::Json(v) => v,
        }
    }
}

/// Build the public variable mapping.
///
/// Every permitted name is present in the result: unset names map to
/// `null` so the frontend can tell "not provided" from "not requested".
/// `PROJECT_ENV` is added whenever the source has it. Entries from
/// `additional` overwrite computed ones.
pub fn resolve_env_vars(
    permitted: &[String],
    source: &dyn EnvSource,
    additional: &BTreeMap<String, EnvValue>,
) -> EnvMap {
    let mut vars = EnvMap::new();

    for key in permitted {
        let value = source.var(key).map(Value::String).unwrap_or(Value::Null);
        vars.insert(key.clone(), value);
    }

    if let Some(project_env) = source.var(PROJECT_ENV) {
        vars.insert(PROJECT_ENV.to_string(), Value::String(project_env));
    }

    for (key, value) in additional {
        vars.insert(key.clone(), value.clone().into());
    }

    vars
}
