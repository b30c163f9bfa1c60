use crate::response::{
    build_response, Descriptor, ProductList, ResponseError, FALLBACK_MESSAGE, NOT_FOUND_MESSAGE,
};
use crate::store::{Item, ProductStore, StoreError, KEY_ATTRIBUTE};
use lambda_http::{tracing, Body, Error, Request, RequestExt, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

const PRODUCT_PATH: &str = "/product";
const LIST_PATH: &str = "/list";

#[derive(Deserialize)]
struct UpdateRequest {
    id: String,
    #[serde(rename = "Key")]
    key: String,
    #[serde(rename = "Value")]
    value: Value,
}

#[derive(Deserialize)]
struct DeleteRequest {
    id: String,
}

/// Anything that stops a request before or after the store is reached.
#[derive(Debug, thiserror::Error)]
enum RequestError {
    #[error("invalid JSON body: {0}")]
    Body(#[from] serde_json::Error),
    #[error("missing query parameter `{0}`")]
    MissingParameter(&'static str),
    #[error(transparent)]
    Response(#[from] ResponseError),
}

pub(crate) async fn function_handler<S>(store: &S, event: Request) -> Result<Response<Body>, Error>
where
    S: ProductStore + Sync,
{
    tracing::info!(method = %event.method(), path = route_path(&event), "request received");

    match dispatch(store, &event).await {
        Ok(response) => Ok(response),
        Err(err) => {
            tracing::error!(error = %err, "failed to process request");
            Ok(build_response(400, FALLBACK_MESSAGE)?)
        }
    }
}

async fn dispatch<S>(store: &S, event: &Request) -> Result<Response<Body>, RequestError>
where
    S: ProductStore + Sync,
{
    let path = route_path(event);
    let method = event.method().as_str();

    match (method, path) {
        ("GET", PRODUCT_PATH) => {
            let id = event
                .query_string_parameters_ref()
                .and_then(|params| params.first(KEY_ATTRIBUTE))
                .ok_or(RequestError::MissingParameter(KEY_ATTRIBUTE))?;
            get_product(store, id).await
        }
        ("GET", LIST_PATH) => list_products(store).await,
        ("POST", PRODUCT_PATH) => {
            let item: Item = parse_body(event)?;
            add_product(store, item).await
        }
        ("PUT", PRODUCT_PATH) => {
            let req: UpdateRequest = parse_body(event)?;
            update_product(store, &req.id, &req.key, req.value).await
        }
        ("DELETE", PRODUCT_PATH) => {
            let req: DeleteRequest = parse_body(event)?;
            delete_product(store, &req.id).await
        }
        _ => Ok(build_response(404, NOT_FOUND_MESSAGE)?),
    }
}

/// Path as the client sent it. API Gateway REST events carry the stage in
/// `uri()`; requests built without an event have no raw path recorded.
fn route_path(event: &Request) -> &str {
    match event.raw_http_path() {
        "" => event.uri().path(),
        raw => raw,
    }
}

fn parse_body<T: DeserializeOwned>(event: &Request) -> Result<T, RequestError> {
    Ok(serde_json::from_slice(event.body().as_ref())?)
}

/// Storage failures surface the backend's own message.
fn store_failure(err: StoreError) -> Result<Response<Body>, RequestError> {
    tracing::error!(code = err.code().unwrap_or("-"), error = %err, "storage request failed");
    Ok(build_response(400, &err.to_string())?)
}

async fn get_product<S: ProductStore>(
    store: &S,
    id: &str,
) -> Result<Response<Body>, RequestError> {
    match store.get(id).await {
        Ok(item) => Ok(build_response(200, &item)?),
        Err(err) => store_failure(err),
    }
}

async fn list_products<S: ProductStore>(store: &S) -> Result<Response<Body>, RequestError> {
    match scan_all(store).await {
        Ok(products) => Ok(build_response(200, &ProductList { products })?),
        Err(err) => store_failure(err),
    }
}

/// Follow `LastEvaluatedKey` until the scan is exhausted, keeping page order.
async fn scan_all<S: ProductStore>(store: &S) -> Result<Vec<Item>, StoreError> {
    let mut products = Vec::new();
    let mut start_key = None;

    loop {
        let page = store.scan(start_key.take()).await?;
        tracing::debug!(
            count = page.items.len(),
            more = page.last_evaluated_key.is_some(),
            "scanned page"
        );
        products.extend(page.items);

        match page.last_evaluated_key {
            Some(key) => start_key = Some(key),
            None => break,
        }
    }

    Ok(products)
}

async fn add_product<S: ProductStore>(
    store: &S,
    item: Item,
) -> Result<Response<Body>, RequestError> {
    // Unconditional put: an existing product with the same id is replaced.
    match store.put(item.clone()).await {
        Ok(()) => Ok(build_response(200, &Descriptor::added(item))?),
        Err(err) => store_failure(err),
    }
}

async fn update_product<S: ProductStore>(
    store: &S,
    id: &str,
    key: &str,
    value: Value,
) -> Result<Response<Body>, RequestError> {
    match store.update_attribute(id, key, value).await {
        Ok(updated) => Ok(build_response(200, &Descriptor::updated(updated))?),
        Err(err) => store_failure(err),
    }
}

async fn delete_product<S: ProductStore>(
    store: &S,
    id: &str,
) -> Result<Response<Body>, RequestError> {
    match store.delete(id).await {
        Ok(item) => Ok(build_response(200, &Descriptor::deleted(item))?),
        Err(err) => store_failure(err),
    }
}
