use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::collections::HashMap;
use uuid::Uuid;

use crate::error::ApiError;

/// A single TV schedule entry.
///
/// A record is an ordered set of named fields. Values are JSON scalars
/// (text, number, boolean) or nested lists/maps, all of which DynamoDB can
/// persist. Once stored, a record always carries its identifier field.
///
/// # Example
///
/// ```
/// use tv_schedule_crud::record::Record;
///
/// let record = Record::new()
///     .set_string("id", "news-1800")
///     .set_string("title", "Six O'Clock News")
///     .set_string("channel", "BBC One")
///     .set_number("durationMinutes", 30)
///     .set_bool("live", true);
/// ```
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    pub(crate) attributes: Map<String, Value>,
}

impl Record {
    /// Creates a new empty `Record`.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_attributes(attributes: Map<String, Value>) -> Self {
        Self { attributes }
    }

    /// Parses a JSON body into a record. Anything other than an object is rejected.
    pub fn from_json(body: &str) -> Result<Self, ApiError> {
        match serde_json::from_str::<Value>(body) {
            Ok(Value::Object(attributes)) => Ok(Self { attributes }),
            Ok(_) => Err(ApiError::BadRequest(
                "request body must be a JSON object".to_string(),
            )),
            Err(e) => Err(ApiError::BadRequest(format!("invalid JSON body: {e}"))),
        }
    }

    pub fn set_string(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes
            .insert(key.into(), Value::String(value.into()));
        self
    }

    /// Sets a number field. Non-finite floats are not representable and are stored as null.
    pub fn set_number(mut self, key: impl Into<String>, value: impl Into<f64>) -> Self {
        let value = value.into();
        let number = if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
            Some(Number::from(value as i64))
        } else {
            Number::from_f64(value)
        };
        self.attributes
            .insert(key.into(), number.map_or(Value::Null, Value::Number));
        self
    }

    pub fn set_bool(mut self, key: impl Into<String>, value: bool) -> Self {
        self.attributes.insert(key.into(), Value::Bool(value));
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    pub fn get_string(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).and_then(Value::as_str)
    }

    pub fn get_number(&self, key: &str) -> Option<f64> {
        self.attributes.get(key).and_then(Value::as_f64)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.attributes.get(key).and_then(Value::as_bool)
    }

    pub fn attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }

    pub fn into_attributes(self) -> Map<String, Value> {
        self.attributes
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Returns the identifier, if present and textual.
    pub fn id(&self, id_field: &str) -> Option<&str> {
        self.get_string(id_field)
    }

    /// Makes sure the record carries an identifier, generating a UUID v4 when absent.
    ///
    /// A present identifier must be a non-blank string without surrounding
    /// whitespace, since path identifiers are trimmed before lookup.
    pub fn ensure_id(&mut self, id_field: &str) -> Result<String, ApiError> {
        match self.attributes.get(id_field) {
            None | Some(Value::Null) => {
                let id = Uuid::new_v4().to_string();
                self.attributes
                    .insert(id_field.to_string(), Value::String(id.clone()));
                Ok(id)
            }
            Some(Value::String(id)) if !id.is_empty() && id.trim() == id => Ok(id.clone()),
            Some(Value::String(_)) => Err(ApiError::BadRequest(format!(
                "'{id_field}' must not be blank or padded with whitespace"
            ))),
            Some(_) => Err(ApiError::BadRequest(format!(
                "'{id_field}' must be a non-empty string"
            ))),
        }
    }

    /// Overwrites the listed fields and leaves every other field untouched.
    pub fn apply_fields(&mut self, fields: impl IntoIterator<Item = (String, Value)>) {
        for (key, value) in fields {
            self.attributes.insert(key, value);
        }
    }
}

/// A partial update addressed to one record.
///
/// The identifier is the record key and never an updatable field, so it is
/// stripped from the field mapping on construction.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateRequest {
    id: String,
    fields: Map<String, Value>,
}

impl UpdateRequest {
    pub fn new(
        id: Option<&str>,
        id_field: &str,
        mut fields: Map<String, Value>,
    ) -> Result<Self, ApiError> {
        let id = id
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| ApiError::BadRequest(format!("missing '{id_field}'")))?;

        fields.shift_remove(id_field);
        if fields.is_empty() {
            return Err(ApiError::BadRequest(
                "update must contain at least one field".to_string(),
            ));
        }

        Ok(Self {
            id: id.to_string(),
            fields,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn into_parts(self) -> (String, Map<String, Value>) {
        (self.id, self.fields)
    }
}

/// Narrows a list operation to records whose `field` equals `value`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterCriterion {
    pub field: String,
    pub value: String,
}

impl FilterCriterion {
    pub fn new(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Picks the criterion out of query string parameters. Only `filter_field` is
    /// honoured; a blank value means no filtering.
    pub fn from_query(
        query: Option<&HashMap<String, String>>,
        filter_field: &str,
    ) -> Option<Self> {
        query
            .and_then(|params| params.get(filter_field))
            .filter(|value| !value.trim().is_empty())
            .map(|value| Self::new(filter_field, value.as_str()))
    }

    pub fn matches(&self, record: &Record) -> bool {
        record.get_string(&self.field) == Some(self.value.as_str())
    }
}
