use crate::config::Config;
use crate::store::{Item, ProductStore, ScanPage, StoreError, KEY_ATTRIBUTE};
use aws_sdk_dynamodb::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_dynamodb::types::{AttributeValue, ReturnValue};
use aws_sdk_dynamodb::Client;
use base64::{engine::general_purpose, Engine as _};
use lambda_http::tracing;
use serde_json::{Number, Value};
use std::collections::HashMap;

/// [`ProductStore`] backed by a DynamoDB table keyed on `id`.
pub(crate) struct DynamoTable {
    client: Client,
    table_name: String,
}

impl DynamoTable {
    pub fn new(client: Client, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
        }
    }

    /// Build the SDK client from the default credential chain, honouring the
    /// configured region override.
    pub async fn connect(config: &Config) -> Self {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
        if let Some(region) = &config.region {
            loader = loader.region(aws_config::Region::new(region.clone()));
        }
        let sdk_config = loader.load().await;

        Self::new(Client::new(&sdk_config), config.table_name.clone())
    }

    fn key(id: &str) -> HashMap<String, AttributeValue> {
        HashMap::from([(KEY_ATTRIBUTE.to_string(), AttributeValue::S(id.to_string()))])
    }
}

impl<E, R> From<SdkError<E, R>> for StoreError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    fn from(err: SdkError<E, R>) -> Self {
        match err.message() {
            Some(message) => StoreError::service(err.code(), message),
            None => StoreError::Transport(DisplayErrorContext(&err).to_string()),
        }
    }
}

impl ProductStore for DynamoTable {
    async fn get(&self, id: &str) -> Result<Option<Item>, StoreError> {
        let output = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .set_key(Some(Self::key(id)))
            .send()
            .await?;

        Ok(output.item.map(item_from_attributes))
    }

    async fn scan(&self, exclusive_start_key: Option<Item>) -> Result<ScanPage, StoreError> {
        let output = self
            .client
            .scan()
            .table_name(&self.table_name)
            .set_exclusive_start_key(exclusive_start_key.map(item_to_attributes))
            .send()
            .await?;

        Ok(ScanPage {
            items: output
                .items
                .unwrap_or_default()
                .into_iter()
                .map(item_from_attributes)
                .collect(),
            last_evaluated_key: output.last_evaluated_key.map(item_from_attributes),
        })
    }

    async fn put(&self, item: Item) -> Result<(), StoreError> {
        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item_to_attributes(item)))
            .send()
            .await?;

        Ok(())
    }

    async fn update_attribute(
        &self,
        id: &str,
        attribute: &str,
        value: Value,
    ) -> Result<Item, StoreError> {
        // The attribute name goes into the expression verbatim, without an
        // `ExpressionAttributeNames` placeholder.
        let output = self
            .client
            .update_item()
            .table_name(&self.table_name)
            .set_key(Some(Self::key(id)))
            .update_expression(format!("SET {attribute} = :value"))
            .expression_attribute_values(":value", to_attribute(value))
            .return_values(ReturnValue::UpdatedNew)
            .send()
            .await?;

        Ok(output
            .attributes
            .map(item_from_attributes)
            .unwrap_or_default())
    }

    async fn delete(&self, id: &str) -> Result<Option<Item>, StoreError> {
        let output = self
            .client
            .delete_item()
            .table_name(&self.table_name)
            .set_key(Some(Self::key(id)))
            .return_values(ReturnValue::AllOld)
            .send()
            .await?;

        Ok(output.attributes.map(item_from_attributes))
    }
}

pub(crate) fn item_to_attributes(item: Item) -> HashMap<String, AttributeValue> {
    item.into_iter()
        .map(|(name, value)| (name, to_attribute(value)))
        .collect()
}

pub(crate) fn item_from_attributes(attributes: HashMap<String, AttributeValue>) -> Item {
    attributes
        .into_iter()
        .map(|(name, value)| (name, from_attribute(value)))
        .collect()
}

pub(crate) fn to_attribute(value: Value) -> AttributeValue {
    match value {
        Value::Null => AttributeValue::Null(true),
        Value::Bool(b) => AttributeValue::Bool(b),
        Value::Number(n) => AttributeValue::N(n.to_string()),
        Value::String(s) => AttributeValue::S(s),
        Value::Array(values) => AttributeValue::L(values.into_iter().map(to_attribute).collect()),
        Value::Object(map) => AttributeValue::M(item_to_attributes(map)),
    }
}

pub(crate) fn from_attribute(value: AttributeValue) -> Value {
    match value {
        AttributeValue::S(s) => Value::String(s),
        AttributeValue::N(n) => number(&n),
        AttributeValue::Bool(b) => Value::Bool(b),
        AttributeValue::Null(_) => Value::Null,
        AttributeValue::L(values) => Value::Array(values.into_iter().map(from_attribute).collect()),
        AttributeValue::M(map) => Value::Object(item_from_attributes(map)),
        AttributeValue::Ss(values) => Value::Array(values.into_iter().map(Value::String).collect()),
        AttributeValue::Ns(values) => Value::Array(values.iter().map(|n| number(n)).collect()),
        AttributeValue::B(blob) => Value::String(general_purpose::STANDARD.encode(blob.as_ref())),
        AttributeValue::Bs(blobs) => Value::Array(
            blobs
                .iter()
                .map(|blob| Value::String(general_purpose::STANDARD.encode(blob.as_ref())))
                .collect(),
        ),
        other => {
            tracing::warn!(?other, "unsupported attribute type");
            Value::Null
        }
    }
}

/// DynamoDB numbers arrive as strings; keep integers exact where they fit.
fn number(n: &str) -> Value {
    if let Ok(i) = n.parse::<i64>() {
        return Value::Number(i.into());
    }
    if let Ok(u) = n.parse::<u64>() {
        return Value::Number(u.into());
    }
    n.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .unwrap_or_else(|| Value::String(n.to_string()))
}
