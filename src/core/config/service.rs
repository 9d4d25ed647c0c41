use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::{Map, Value};
use thiserror::Error;

use super::app_config::AppConfig;
use super::paths::AppPaths;
use super::validation::validate_config;

const REDACT_PLACEHOLDER: &str = "****";

const SENSITIVE_PATTERNS: [&str; 10] = [
    "api_key",
    "secret",
    "password",
    "_token",
    "token_",
    "credential",
    "private_key",
    "auth_",
    "_auth",
    "bearer",
];

const SENSITIVE_WHITELIST: [&str; 3] = ["max_tokens", "total_tokens", "tokens"];

/// Environment variables folded into the merged document, with their target
/// path and whether the value is numeric.
const ENV_OVERRIDES: [(&str, &[&str], bool); 3] = [
    ("OPENAI_API_KEY", &["openai", "api_key"], false),
    ("PINECONE_API_KEY", &["vector_store", "pinecone", "api_key"], false),
    ("PORT", &["server", "port"], true),
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("{0}")]
    Invalid(String),
}

#[derive(Clone)]
pub struct ConfigService {
    paths: Arc<AppPaths>,
}

impl ConfigService {
    pub fn new(paths: Arc<AppPaths>) -> Self {
        Self { paths }
    }

    pub fn config_path(&self) -> PathBuf {
        if let Ok(path) = env::var("LAVENDER_CONFIG_PATH") {
            return PathBuf::from(path);
        }

        let user_config = self.paths.user_data_dir.join("config.yml");
        if user_config.exists() {
            return user_config;
        }

        self.paths.project_root.join("config.yml")
    }

    pub fn secrets_path(&self) -> PathBuf {
        self.paths.secrets_path.clone()
    }

    /// Public config and secrets merged, with environment overrides applied.
    pub fn load_value(&self) -> Result<Value, ConfigError> {
        let public_config = load_yaml_file(&self.config_path())?;
        let secrets_config = load_yaml_file(&self.secrets_path())?;
        let mut merged = deep_merge(&public_config, &secrets_config);
        apply_env_overrides(&mut merged, |key| env::var(key).ok());
        Ok(merged)
    }

    pub fn load(&self) -> Result<AppConfig, ConfigError> {
        let value = self.load_value()?;
        parse_config(value)
    }
}

pub fn parse_config(value: Value) -> Result<AppConfig, ConfigError> {
    validate_config(&value)?;
    serde_json::from_value(value).map_err(|e| ConfigError::Invalid(e.to_string()))
}

fn load_yaml_file(path: &Path) -> Result<Value, ConfigError> {
    if !path.exists() {
        return Ok(Value::Object(Map::new()));
    }

    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    if contents.trim().is_empty() {
        return Ok(Value::Object(Map::new()));
    }

    let value = serde_yaml::from_str::<Value>(&contents).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    match value {
        Value::Object(_) => Ok(value),
        Value::Null => Ok(Value::Object(Map::new())),
        _ => Err(ConfigError::Parse {
            path: path.to_path_buf(),
            message: "top level must be a mapping".to_string(),
        }),
    }
}

fn apply_env_overrides<F>(config: &mut Value, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    for (var, path, numeric) in ENV_OVERRIDES {
        let Some(raw) = lookup(var).filter(|v| !v.trim().is_empty()) else {
            continue;
        };
        // Unparseable numbers stay strings so validation names the variable's path.
        let value = match raw.trim().parse::<u64>() {
            Ok(number) if numeric => Value::from(number),
            _ => Value::String(raw),
        };
        ensure_object_path(config, path, value);
    }
}

fn ensure_object_path(config: &mut Value, path: &[&str], value: Value) {
    if path.is_empty() {
        return;
    }

    let mut current = config;
    for (index, key) in path.iter().enumerate() {
        if index == path.len() - 1 {
            if let Some(map) = current.as_object_mut() {
                map.insert(key.to_string(), value);
            }
            return;
        }

        if !current.get(*key).map(|v| v.is_object()).unwrap_or(false) {
            let Some(map) = current.as_object_mut() else {
                return;
            };
            map.insert((*key).to_string(), Value::Object(Map::new()));
        }

        let Some(next) = current.get_mut(*key) else {
            return;
        };
        current = next;
    }
}

fn deep_merge(base: &Value, override_value: &Value) -> Value {
    match (base, override_value) {
        (Value::Object(base_map), Value::Object(override_map)) => {
            let mut merged: Map<String, Value> = base_map.clone();
            for (key, value) in override_map {
                let merged_value = match merged.get(key) {
                    Some(existing) => deep_merge(existing, value),
                    None => value.clone(),
                };
                merged.insert(key.clone(), merged_value);
            }
            Value::Object(merged)
        }
        _ => override_value.clone(),
    }
}

pub fn redact_sensitive_values(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut redacted = Map::new();
            for (key, val) in map {
                if is_sensitive_key(key) && !val.is_null() {
                    redacted.insert(key.clone(), Value::String(REDACT_PLACEHOLDER.to_string()));
                } else {
                    redacted.insert(key.clone(), redact_sensitive_values(val));
                }
            }
            Value::Object(redacted)
        }
        Value::Array(items) => Value::Array(items.iter().map(redact_sensitive_values).collect()),
        _ => value.clone(),
    }
}

fn is_sensitive_key(key: &str) -> bool {
    let key_lower = key.to_lowercase();
    if SENSITIVE_WHITELIST
        .iter()
        .any(|allowed| *allowed == key_lower)
    {
        return false;
    }
    SENSITIVE_PATTERNS
        .iter()
        .any(|pattern| key_lower.contains(pattern))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn service_in(dir: &Path) -> ConfigService {
        let paths = AppPaths::with_data_dir(dir.to_path_buf(), dir.to_path_buf());
        ConfigService::new(Arc::new(paths))
    }

    #[test]
    fn deep_merge_merges_objects_and_overrides_scalars() {
        let base = json!({
            "openai": { "base_url": "http://a", "request_timeout_secs": 10 },
            "retrieval": { "top_k": 3 }
        });
        let secrets = json!({
            "openai": { "api_key": "sk-test" },
            "retrieval": { "top_k": 5 }
        });

        let merged = deep_merge(&base, &secrets);

        assert_eq!(
            merged,
            json!({
                "openai": { "base_url": "http://a", "request_timeout_secs": 10, "api_key": "sk-test" },
                "retrieval": { "top_k": 5 }
            })
        );
    }

    #[test]
    fn env_overrides_fill_nested_paths() {
        let mut config = json!({ "server": { "host": "0.0.0.0" } });

        apply_env_overrides(&mut config, |key| match key {
            "OPENAI_API_KEY" => Some("sk-env".to_string()),
            "PORT" => Some("9000".to_string()),
            _ => None,
        });

        assert_eq!(config["openai"]["api_key"], "sk-env");
        assert_eq!(config["server"]["port"], 9000);
        assert_eq!(config["server"]["host"], "0.0.0.0");
        assert!(config.get("vector_store").is_none());
    }

    #[test]
    fn digit_only_api_keys_stay_strings() {
        let mut config = json!({});

        apply_env_overrides(&mut config, |key| match key {
            "OPENAI_API_KEY" => Some("1234567890".to_string()),
            "PINECONE_API_KEY" => Some("42".to_string()),
            _ => None,
        });

        assert_eq!(config["openai"]["api_key"], "1234567890");
        assert_eq!(config["vector_store"]["pinecone"]["api_key"], "42");
        let parsed = parse_config(config).unwrap();
        assert_eq!(parsed.openai.api_key.as_deref(), Some("1234567890"));
    }

    #[test]
    fn redact_sensitive_values_replaces_secrets_only() {
        let input = json!({
            "openai": { "api_key": "sk-secret", "base_url": "https://api.openai.com/v1" },
            "completion": { "max_tokens": 256 },
            "vector_store": { "pinecone": { "api_key": null } }
        });

        let redacted = redact_sensitive_values(&input);

        assert_eq!(
            redacted,
            json!({
                "openai": { "api_key": "****", "base_url": "https://api.openai.com/v1" },
                "completion": { "max_tokens": 256 },
                "vector_store": { "pinecone": { "api_key": null } }
            })
        );
    }

    #[test]
    fn load_merges_config_and_secrets_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("config.yml"),
            "completion:\n  model: gpt-4o-mini\nretrieval:\n  top_k: 3\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("secrets.yaml"),
            "vector_store:\n  pinecone:\n    api_key: pc-secret\n",
        )
        .unwrap();

        let service = service_in(dir.path());
        let value = service.load_value().unwrap();

        assert_eq!(value["completion"]["model"], "gpt-4o-mini");
        assert_eq!(value["vector_store"]["pinecone"]["api_key"], "pc-secret");

        let config = parse_config(value).unwrap();
        assert_eq!(config.retrieval.top_k, 3);
        assert_eq!(config.completion.model, "gpt-4o-mini");
    }

    #[test]
    fn malformed_yaml_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.yml");
        fs::write(&path, "retrieval: [unclosed").unwrap();

        let err = load_yaml_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn missing_files_yield_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let value = load_yaml_file(&dir.path().join("absent.yml")).unwrap();
        let config = parse_config(value).unwrap();

        assert_eq!(config.completion.model, "gpt-4o");
        assert_eq!(config.session.max_turns, 100);
    }
}
