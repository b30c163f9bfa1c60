use lambda_http::{run, service_fn, tracing, Error};
mod config;
mod dynamo;
mod http_handler;
mod response;
mod store;
use config::Config;
use dynamo::DynamoTable;
use http_handler::function_handler;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing::init_default_subscriber();

    let config = Config::from_env()?;
    tracing::info!(table = %config.table_name, region = ?config.region, "starting products function");
    let table = DynamoTable::connect(&config).await;

    run(service_fn(|event| function_handler(&table, event))).await
}
