use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Field carrying the caller's session token. Never stored on a record.
pub const AUTH_TOKEN_FIELD: &str = "auth_token";

/// Field injected into API output; the id lives in the collection key, not in the record.
pub const ID_FIELD: &str = "id";

/// Errors that can occur while turning API input into a record
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RecordError {
    #[error("Invalid JSON format: {0}")]
    InvalidJson(String),
    #[error("Field '{0}' must be a string, number, boolean or null")]
    NonScalarField(String),
    #[error("Field '{0}' must be a string")]
    NotAString(String),
}

/// A flat record: field name to scalar value, without its id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: Map<String, Value>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create record from API input JSON. Only objects of scalar values are accepted.
    pub fn from_json(json: Value) -> Result<Self, RecordError> {
        match json {
            Value::Object(map) => {
                if let Some((key, _)) = map
                    .iter()
                    .find(|(_, v)| matches!(v, Value::Array(_) | Value::Object(_)))
                {
                    return Err(RecordError::NonScalarField(key.clone()));
                }
                Ok(Self { fields: map })
            }
            _ => Err(RecordError::InvalidJson("Expected JSON object".to_string())),
        }
    }

    /// Remove the session token from API input, returning it if present.
    pub fn take_auth_token(&mut self) -> Result<Option<String>, RecordError> {
        match self.fields.remove(AUTH_TOKEN_FIELD) {
            None => Ok(None),
            Some(Value::String(token)) => Ok(Some(token)),
            Some(_) => Err(RecordError::NotAString(AUTH_TOKEN_FIELD.to_string())),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Read a field as a key into another collection.
    ///
    /// Integers are accepted and compared by their decimal text.
    pub fn get_key(&self, key: &str) -> Option<String> {
        match self.fields.get(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) if n.is_u64() || n.is_i64() => Some(n.to_string()),
            _ => None,
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Overwrite the submitted fields; untouched fields are kept.
    pub fn apply_changes(&mut self, changes: Record) -> &mut Self {
        for (key, value) in changes.fields {
            self.fields.insert(key, value);
        }
        self
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Convert to API output format with the id injected
    pub fn to_api_output(&self, id: &str) -> Value {
        let mut output = Map::with_capacity(self.fields.len() + 1);
        output.insert(ID_FIELD.to_string(), Value::String(id.to_string()));
        for (key, value) in &self.fields {
            output.insert(key.clone(), value.clone());
        }
        Value::Object(output)
    }
}
