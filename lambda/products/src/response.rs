use crate::store::Item;
use lambda_http::{http, Body, Response};
use serde::Serialize;

/// Body returned for any request that could not be processed.
pub(crate) const FALLBACK_MESSAGE: &str = "Error processing request";
/// Body returned for an unknown (method, path) pair.
pub(crate) const NOT_FOUND_MESSAGE: &str = "404 Not Found Or Wrong method";

const SUCCESS: &str = "SUCCESS";

#[derive(Serialize)]
pub(crate) struct ProductList {
    #[serde(rename = "Products")]
    pub products: Vec<Item>,
}

/// Outcome of a mutating operation: `{Operation, Message, ..data}`.
#[derive(Serialize)]
pub(crate) struct Descriptor<T> {
    #[serde(rename = "Operation")]
    operation: &'static str,
    #[serde(rename = "Message")]
    message: &'static str,
    #[serde(flatten)]
    data: T,
}

#[derive(Serialize)]
pub(crate) struct AffectedItem {
    #[serde(rename = "Item")]
    item: Option<Item>,
}

#[derive(Serialize)]
pub(crate) struct UpdatedAttributes {
    #[serde(rename = "UpdatedAttributes")]
    updated_attributes: Item,
}

impl<T> Descriptor<T> {
    fn success(operation: &'static str, data: T) -> Self {
        Self {
            operation,
            message: SUCCESS,
            data,
        }
    }
}

impl Descriptor<AffectedItem> {
    pub fn added(item: Item) -> Self {
        Self::success("Add", AffectedItem { item: Some(item) })
    }

    pub fn deleted(item: Option<Item>) -> Self {
        Self::success("DELETE", AffectedItem { item })
    }
}

impl Descriptor<UpdatedAttributes> {
    pub fn updated(updated_attributes: Item) -> Self {
        Self::success("UPDATE", UpdatedAttributes { updated_attributes })
    }
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum ResponseError {
    #[error("failed to encode response body")]
    Encode(#[from] serde_json::Error),
    #[error("failed to build response")]
    Build(#[from] http::Error),
}

/// Wrap `body` as JSON text in the uniform response envelope.
pub(crate) fn build_response<T>(status: u16, body: &T) -> Result<Response<Body>, ResponseError>
where
    T: Serialize + ?Sized,
{
    let body = serde_json::to_string(body)?;
    Ok(Response::builder()
        .status(status)
        .header("content-type", "application/json")
        .body(Body::Text(body))?)
}
