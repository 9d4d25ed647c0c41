use serde_json::{Map, Value};

use super::service::ConfigError;

pub fn validate_config(config: &Value) -> Result<(), ConfigError> {
    let root = config
        .as_object()
        .ok_or_else(|| config_type_error("root", "object"))?;

    if let Some(server) = expect_optional_object(root, "server")? {
        validate_optional_string_field(server, "server.host", "host")?;
        validate_u64_field(server, "server.port", "port", 0, 65535)?;
        validate_string_array_field(
            server,
            "server.cors_allowed_origins",
            "cors_allowed_origins",
        )?;
    }

    if let Some(openai) = expect_optional_object(root, "openai")? {
        validate_optional_string_field(openai, "openai.api_key", "api_key")?;
        validate_optional_string_field(openai, "openai.base_url", "base_url")?;
        validate_u64_field(
            openai,
            "openai.request_timeout_secs",
            "request_timeout_secs",
            1,
            3_600,
        )?;
    }

    if let Some(embedding) = expect_optional_object(root, "embedding")? {
        validate_optional_string_field(embedding, "embedding.model", "model")?;
        validate_u64_field(embedding, "embedding.dimensions", "dimensions", 1, 65_536)?;
    }

    if let Some(completion) = expect_optional_object(root, "completion")? {
        validate_optional_string_field(completion, "completion.model", "model")?;
        validate_f64_field(completion, "completion.temperature", "temperature", 0.0, 2.0)?;
        validate_u64_field(completion, "completion.max_tokens", "max_tokens", 1, 1_000_000)?;
        validate_optional_string_field(
            completion,
            "completion.prompt_template",
            "prompt_template",
        )?;
    }

    if let Some(retrieval) = expect_optional_object(root, "retrieval")? {
        validate_u64_field(retrieval, "retrieval.top_k", "top_k", 1, 100)?;
        validate_bool_field(
            retrieval,
            "retrieval.allow_empty_context",
            "allow_empty_context",
        )?;
    }

    if let Some(store) = expect_optional_object(root, "vector_store")? {
        validate_enum_field(
            store,
            "vector_store.backend",
            "backend",
            &["local", "pinecone"],
        )?;
        if let Some(local) = expect_optional_object(store, "local")? {
            validate_optional_string_field(local, "vector_store.local.path", "path")?;
        }
        if let Some(pinecone) = expect_optional_object(store, "pinecone")? {
            validate_optional_string_field(
                pinecone,
                "vector_store.pinecone.index_host",
                "index_host",
            )?;
            validate_optional_string_field(pinecone, "vector_store.pinecone.api_key", "api_key")?;
            validate_optional_string_field(
                pinecone,
                "vector_store.pinecone.namespace",
                "namespace",
            )?;
            validate_optional_string_field(pinecone, "vector_store.pinecone.text_key", "text_key")?;
        }

        let is_pinecone = store.get("backend").and_then(|v| v.as_str()) == Some("pinecone");
        if is_pinecone {
            let host = store
                .get("pinecone")
                .and_then(|p| p.get("index_host"))
                .and_then(|v| v.as_str())
                .unwrap_or_default();
            if host.trim().is_empty() {
                return Err(ConfigError::Invalid(
                    "Invalid config at 'vector_store.pinecone.index_host': required when backend is 'pinecone'"
                        .to_string(),
                ));
            }
        }
    }

    if let Some(session) = expect_optional_object(root, "session")? {
        validate_u64_field(session, "session.max_turns", "max_turns", 0, 1_000_000)?;
        validate_u64_field(
            session,
            "session.idle_ttl_secs",
            "idle_ttl_secs",
            0,
            31_536_000,
        )?;
    }

    Ok(())
}

fn expect_optional_object<'a>(
    root: &'a Map<String, Value>,
    key: &str,
) -> Result<Option<&'a Map<String, Value>>, ConfigError> {
    match root.get(key) {
        Some(Value::Object(map)) => Ok(Some(map)),
        Some(Value::Null) | None => Ok(None),
        Some(_) => Err(config_type_error(key, "object")),
    }
}

fn validate_bool_field(
    section: &Map<String, Value>,
    path: &str,
    key: &str,
) -> Result<(), ConfigError> {
    let Some(value) = section.get(key) else {
        return Ok(());
    };
    if value.as_bool().is_some() {
        return Ok(());
    }
    Err(config_type_error(path, "boolean"))
}

fn validate_u64_field(
    section: &Map<String, Value>,
    path: &str,
    key: &str,
    min: u64,
    max: u64,
) -> Result<(), ConfigError> {
    let Some(value) = section.get(key) else {
        return Ok(());
    };
    if value.is_null() {
        return Ok(());
    }
    let Some(number) = value.as_u64() else {
        return Err(config_type_error(path, "integer"));
    };
    if number < min || number > max {
        return Err(ConfigError::Invalid(format!(
            "Invalid config at '{}': must be between {} and {}",
            path, min, max
        )));
    }
    Ok(())
}

fn validate_f64_field(
    section: &Map<String, Value>,
    path: &str,
    key: &str,
    min: f64,
    max: f64,
) -> Result<(), ConfigError> {
    let Some(value) = section.get(key) else {
        return Ok(());
    };
    let Some(number) = value.as_f64() else {
        return Err(config_type_error(path, "number"));
    };
    if number < min || number > max {
        return Err(ConfigError::Invalid(format!(
            "Invalid config at '{}': must be between {} and {}",
            path, min, max
        )));
    }
    Ok(())
}

fn validate_optional_string_field(
    section: &Map<String, Value>,
    path: &str,
    key: &str,
) -> Result<(), ConfigError> {
    let Some(value) = section.get(key) else {
        return Ok(());
    };
    if value.is_null() || value.as_str().is_some() {
        return Ok(());
    }
    Err(config_type_error(path, "string"))
}

fn validate_enum_field(
    section: &Map<String, Value>,
    path: &str,
    key: &str,
    allowed: &[&str],
) -> Result<(), ConfigError> {
    let Some(value) = section.get(key) else {
        return Ok(());
    };
    let Some(text) = value.as_str() else {
        return Err(config_type_error(path, "string"));
    };
    if allowed.contains(&text) {
        return Ok(());
    }
    Err(ConfigError::Invalid(format!(
        "Invalid config at '{}': expected one of {}",
        path,
        allowed.join(", ")
    )))
}

fn validate_string_array_field(
    section: &Map<String, Value>,
    path: &str,
    key: &str,
) -> Result<(), ConfigError> {
    let Some(value) = section.get(key) else {
        return Ok(());
    };
    let Some(items) = value.as_array() else {
        return Err(config_type_error(path, "array of strings"));
    };
    for (index, item) in items.iter().enumerate() {
        let Some(text) = item.as_str() else {
            return Err(config_type_error(&format!("{}[{}]", path, index), "string"));
        };
        if text.trim().is_empty() {
            return Err(ConfigError::Invalid(format!(
                "Invalid config at '{}[{}]': value cannot be empty",
                path, index
            )));
        }
    }
    Ok(())
}

fn config_type_error(path: &str, expected: &str) -> ConfigError {
    ConfigError::Invalid(format!(
        "Invalid config at '{}': expected {}",
        path, expected
    ))
}
