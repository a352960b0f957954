use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_dynamodb as ddb;
use aws_sdk_dynamodb::error::ProvideErrorMetadata; // for .code()
use ddb::types::AttributeValue as Av;
use serde::Deserialize;
use thiserror::Error;

use crate::model::Item;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("query {partition}: {message}")]
    Query { partition: String, message: String },
    #[error("put {key}: {message}")]
    Put { key: String, message: String },
}

/// Explicit key pair from the invoke event; overrides ambient credentials.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    pub access_key_id: String,
    pub secret_access_key: String,
}

/// The two table operations the sync needs.
#[async_trait]
pub trait Store: Send + Sync {
    /// Every item under `partition`, across all result pages.
    async fn query_partition(&self, partition: &str) -> Result<Vec<Item>, StoreError>;

    /// Overwrites the item at its `PK`/`SK`.
    async fn put_item(&self, item: Item) -> Result<(), StoreError>;
}

fn describe<E>(e: &E) -> String
where
    E: ProvideErrorMetadata + std::fmt::Display,
{
    match e.code() {
        Some(code) => format!("{code}: {}", e.message().unwrap_or_default()),
        None => e.to_string(),
    }
}

#[derive(Clone)]
pub struct DynamoStore {
    pub client: ddb::Client,
    pub table: String,
}

impl DynamoStore {
    pub fn new(sdk: &SdkConfig, table: &str, credentials: Option<&Credentials>) -> Self {
        let mut conf = ddb::config::Builder::from(sdk);
        if let Some(c) = credentials {
            conf = conf.credentials_provider(ddb::config::Credentials::new(
                c.access_key_id.clone(),
                c.secret_access_key.clone(),
                None,
                None,
                "invoke-event",
            ));
        }
        Self {
            client: ddb::Client::from_conf(conf.build()),
            table: table.to_string(),
        }
    }
}

#[async_trait]
impl Store for DynamoStore {
    async fn query_partition(&self, partition: &str) -> Result<Vec<Item>, StoreError> {
        let mut items = Vec::new();
        let mut start: Option<Item> = None;
        loop {
            let resp = self
                .client
                .query()
                .table_name(&self.table)
                .key_condition_expression("PK = :pk")
                .expression_attribute_values(":pk", Av::S(partition.to_string()))
                .set_exclusive_start_key(start.take())
                .send()
                .await
                .map_err(|e| StoreError::Query {
                    partition: partition.to_string(),
                    message: describe(&e),
                })?;

            items.extend(resp.items.unwrap_or_default());
            match resp.last_evaluated_key {
                Some(lek) if !lek.is_empty() => start = Some(lek),
                _ => break,
            }
        }
        tracing::debug!(table = %self.table, partition, count = items.len(), "queried partition");
        Ok(items)
    }

    async fn put_item(&self, item: Item) -> Result<(), StoreError> {
        let key = item
            .get("SK")
            .and_then(|v| v.as_s().ok())
            .cloned()
            .unwrap_or_default();
        self.client
            .put_item()
            .table_name(&self.table)
            .set_item(Some(item))
            .send()
            .await
            .map_err(|e| StoreError::Put {
                key,
                message: describe(&e),
            })?;
        Ok(())
    }
}
