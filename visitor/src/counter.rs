// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

use std::collections::HashMap;
use std::future::Future;

use anyhow::{Result, anyhow, bail};
use aws_sdk_dynamodb::types::AttributeValue;
use lambda_runtime::LambdaEvent;
use serde_json::{Number, Value};

use crate::constants::{RECORD_COUNT_FIELD, RECORD_ID, RECORD_ID_KEY};

pub type Item = HashMap<String, AttributeValue>;

/// Source of the counter record.
pub trait CountStore {
    fn get_record(&self) -> impl Future<Output = Result<Option<Item>>> + Send;
}

pub struct DynamoCountStore {
    client: aws_sdk_dynamodb::Client,
    table_name: String,
}

impl DynamoCountStore {
    pub fn new(client: aws_sdk_dynamodb::Client, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
        }
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }
}

impl CountStore for DynamoCountStore {
    async fn get_record(&self) -> Result<Option<Item>> {
        let output = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key(RECORD_ID_KEY, AttributeValue::S(RECORD_ID.to_string()))
            .send()
            .await
            .map_err(|err| anyhow!("failed to get item from {}: {err:?}", self.table_name))?;

        Ok(output.item)
    }
}

/// Extracts the numeric count from the record.
pub fn record_count(item: Option<&Item>) -> Result<Value> {
    let Some(item) = item else {
        bail!("record {RECORD_ID_KEY}={RECORD_ID} not found");
    };

    let raw = match item.get(RECORD_COUNT_FIELD) {
        Some(AttributeValue::N(raw)) => raw,
        Some(other) => bail!("{RECORD_COUNT_FIELD} is not a number: {other:?}"),
        None => bail!("record has no {RECORD_COUNT_FIELD} field"),
    };

    parse_number(raw)
        .map(Value::Number)
        .ok_or_else(|| anyhow!("{RECORD_COUNT_FIELD} is not a valid number: {raw:?}"))
}

// DynamoDB numbers arrive as strings; keep integers exact.
fn parse_number(raw: &str) -> Option<Number> {
    let raw = raw.trim();
    if let Ok(n) = raw.parse::<i64>() {
        return Some(Number::from(n));
    }
    if let Ok(n) = raw.parse::<u64>() {
        return Some(Number::from(n));
    }
    raw.parse::<f64>().ok().and_then(Number::from_f64)
}

pub async fn function_handler<S: CountStore>(
    store: &S,
    _event: LambdaEvent<Value>,
) -> Result<Value, lambda_runtime::Error> {
    let item = store.get_record().await?;
    let count = record_count(item.as_ref())?;
    tracing::info!("[visitor] {RECORD_COUNT_FIELD} = {count}");
    Ok(count)
}
