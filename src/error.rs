use thiserror::Error;

use crate::dynamodb::UpdateExpressionError;

/// Failures reported by a [`crate::store::ScheduleStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record '{0}' not found")]
    NotFound(String),

    #[error("record '{0}' already exists")]
    AlreadyExists(String),

    /// The store refused the request as malformed.
    #[error("store rejected the request: {0}")]
    Rejected(String),

    #[error("store failure: {0}")]
    Backend(#[from] anyhow::Error),
}

/// Errors surfaced by the request adapters, classified by who is at fault.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("record '{0}' not found")]
    NotFound(String),

    #[error("record '{0}' already exists")]
    Conflict(String),

    #[error("method {0} not allowed")]
    MethodNotAllowed(String),

    #[error("internal server error")]
    Store(#[source] StoreError),
}

impl ApiError {
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::BadRequest(_) => 400,
            ApiError::NotFound(_) => 404,
            ApiError::MethodNotAllowed(_) => 405,
            ApiError::Conflict(_) => 409,
            ApiError::Store(_) => 500,
        }
    }

    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status_code())
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => ApiError::NotFound(id),
            StoreError::AlreadyExists(id) => ApiError::Conflict(id),
            StoreError::Rejected(msg) => ApiError::BadRequest(msg),
            other => ApiError::Store(other),
        }
    }
}

impl From<UpdateExpressionError> for ApiError {
    fn from(err: UpdateExpressionError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn test_status_classification() {
        assert_eq!(ApiError::BadRequest("x".into()).status_code(), 400);
        assert_eq!(ApiError::NotFound("x".into()).status_code(), 404);
        assert_eq!(ApiError::MethodNotAllowed("PUT".into()).status_code(), 405);

        let server = ApiError::from(StoreError::Backend(anyhow!("connection reset")));
        assert_eq!(server.status_code(), 500);
        assert!(!server.is_client_error());
        // backend details stay out of the client-facing message
        assert_eq!(server.to_string(), "internal server error");
    }

    #[test]
    fn test_store_errors_map_to_client_errors() {
        assert!(matches!(
            ApiError::from(StoreError::NotFound("a".into())),
            ApiError::NotFound(id) if id == "a"
        ));
        assert_eq!(
            ApiError::from(StoreError::AlreadyExists("a".into())).status_code(),
            409
        );
        assert!(ApiError::from(StoreError::Rejected("bad".into())).is_client_error());
        assert!(ApiError::from(UpdateExpressionError::NoFields).is_client_error());
    }
}
