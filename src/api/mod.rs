//! HTTP-style request adapters over a [`ScheduleStore`].
//!
//! Events use the API Gateway proxy shape (`httpMethod`, `pathParameters`,
//! `queryStringParameters`, `body`) and the reply mirrors it (`statusCode`,
//! `headers`, `body`). Routing:
//!
//! | Method           | Identifier | Operation       |
//! |------------------|------------|-----------------|
//! | `GET`            | absent     | list / filter   |
//! | `GET`            | present    | get             |
//! | `POST`           | -          | create          |
//! | `PATCH` / `PUT`  | present    | partial update  |
//! | `DELETE`         | present    | delete          |
//!
//! Create never replaces a stored record: a body carrying an identifier that is
//! already taken is answered with 409.

mod handlers;

use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::ApiError;
use crate::store::ScheduleStore;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    pub http_method: String,
    #[serde(default)]
    pub path_parameters: Option<HashMap<String, String>>,
    #[serde(default)]
    pub query_string_parameters: Option<HashMap<String, String>>,
    #[serde(default)]
    pub body: Option<String>,
}

impl Request {
    pub fn new(http_method: impl Into<String>) -> Self {
        Self {
            http_method: http_method.into(),
            ..Self::default()
        }
    }

    pub fn with_path_parameter(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.path_parameters
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn with_query_parameter(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.query_string_parameters
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn path_parameter(&self, key: &str) -> Option<&str> {
        self.path_parameters
            .as_ref()
            .and_then(|params| params.get(key))
            .map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub status_code: u16,
    #[serde(default)]
    pub headers: HashMap<String, String>,
    #[serde(default)]
    pub body: String,
}

impl Response {
    pub fn json<T: Serialize + ?Sized>(status_code: u16, body: &T) -> Self {
        match serde_json::to_string(body) {
            Ok(body) => Self {
                status_code,
                headers: HashMap::from([(
                    "Content-Type".to_string(),
                    "application/json".to_string(),
                )]),
                body,
            },
            Err(e) => {
                error!("Failed to serialize response body: {}", e);
                Self::json(500, &json!({ "message": "internal server error" }))
            }
        }
    }

    pub fn no_content() -> Self {
        Self {
            status_code: 204,
            headers: HashMap::new(),
            body: String::new(),
        }
    }

    pub fn from_error(err: &ApiError) -> Self {
        Self::json(err.status_code(), &json!({ "message": err.to_string() }))
    }

    /// Parses the body as JSON. An empty body reads as `null`.
    pub fn json_body(&self) -> serde_json::Result<serde_json::Value> {
        if self.body.is_empty() {
            return Ok(serde_json::Value::Null);
        }
        serde_json::from_str(&self.body)
    }
}

/// Routes requests to the handlers. Holds only borrowed, read-only state.
#[derive(Clone, Copy)]
pub struct Api<'a> {
    store: &'a dyn ScheduleStore,
    id_field: &'a str,
    filter_field: &'a str,
}

impl<'a> Api<'a> {
    pub fn new(store: &'a dyn ScheduleStore, config: &'a Config) -> Self {
        Self {
            store,
            id_field: &config.id_field,
            filter_field: &config.filter_field,
        }
    }

    pub fn id_field(&self) -> &str {
        self.id_field
    }

    pub fn filter_field(&self) -> &str {
        self.filter_field
    }

    /// Handles one request. Every failure, including store failures, becomes a response.
    pub async fn dispatch(&self, request: &Request) -> Response {
        let method = request.http_method.trim().to_uppercase();
        let id = request.path_parameter(self.id_field);
        info!("{} {}", method, id.unwrap_or("-"));

        let result = match (method.as_str(), id) {
            ("GET", None) => handlers::list(self, request).await,
            ("GET", Some(id)) => handlers::get(self, id).await,
            ("POST", _) => handlers::create(self, request).await,
            ("PATCH" | "PUT", _) => handlers::update(self, id, request).await,
            ("DELETE", _) => handlers::delete(self, id).await,
            _ => Err(ApiError::MethodNotAllowed(method.clone())),
        };

        match result {
            Ok(response) => response,
            Err(err) => {
                match &err {
                    ApiError::Store(source) => error!("{} failed: {:?}", method, source),
                    client => warn!("{} rejected: {}", method, client),
                }
                Response::from_error(&err)
            }
        }
    }
}
