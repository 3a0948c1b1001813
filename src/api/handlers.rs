use tracing::debug;

use super::{Api, Request, Response};
use crate::dynamodb::UpdateExpression;
use crate::error::ApiError;
use crate::record::{FilterCriterion, Record, UpdateRequest};

fn required_id<'r>(api: &Api<'_>, id: Option<&'r str>) -> Result<&'r str, ApiError> {
    id.map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ApiError::BadRequest(format!("missing '{}'", api.id_field)))
}

fn body(request: &Request) -> Result<&str, ApiError> {
    request
        .body
        .as_deref()
        .filter(|body| !body.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("missing request body".to_string()))
}

/// Lists the schedule, narrowed to one filter field value when the query asks for it.
pub(super) async fn list(api: &Api<'_>, request: &Request) -> Result<Response, ApiError> {
    let filter = FilterCriterion::from_query(
        request.query_string_parameters.as_ref(),
        api.filter_field,
    );
    let records = api.store.scan(filter.as_ref()).await?;
    debug!("Listing {} record(s)", records.len());
    Ok(Response::json(200, &records))
}

pub(super) async fn get(api: &Api<'_>, id: &str) -> Result<Response, ApiError> {
    let id = required_id(api, Some(id))?;
    match api.store.get(id).await? {
        Some(record) => Ok(Response::json(200, &record)),
        None => Err(ApiError::NotFound(id.to_string())),
    }
}

/// Stores a new record, generating its identifier when the body has none.
///
/// A supplied identifier that is already taken is a conflict; the stored
/// record is left as it was.
pub(super) async fn create(api: &Api<'_>, request: &Request) -> Result<Response, ApiError> {
    let mut record = Record::from_json(body(request)?)?;
    let id = record.ensure_id(api.id_field)?;
    api.store.put(record.clone()).await?;
    debug!("Created record '{id}'");
    Ok(Response::json(201, &record))
}

/// Partial update: only the fields in the body change.
///
/// The identifier comes from the path and is stripped from the body, and an
/// update with nothing left to set is rejected before the store is called.
pub(super) async fn update(
    api: &Api<'_>,
    id: Option<&str>,
    request: &Request,
) -> Result<Response, ApiError> {
    let id = required_id(api, id)?;
    let fields = Record::from_json(body(request)?)?.into_attributes();
    let (id, fields) = UpdateRequest::new(Some(id), api.id_field, fields)?.into_parts();

    let update = UpdateExpression::from_fields(fields)?;
    debug!("Updating '{id}' with {}", update.expression());
    let record = api.store.update(&id, update).await?;
    Ok(Response::json(200, &record))
}

pub(super) async fn delete(api: &Api<'_>, id: Option<&str>) -> Result<Response, ApiError> {
    let id = required_id(api, id)?;
    api.store.delete(id).await?;
    debug!("Deleted record '{id}'");
    Ok(Response::no_content())
}
