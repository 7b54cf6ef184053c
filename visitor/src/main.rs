// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

use aws_config::BehaviorVersion;
use lambda_runtime::{Error, LambdaEvent, run, service_fn};
use serde_json::Value;
use tracing_subscriber::EnvFilter;
use visitor_counter::constants::{DEFAULT_TABLE_NAME, TABLE_NAME_ENV};
use visitor_counter::counter::{DynamoCountStore, function_handler};

// Avoid musl's default allocator due to terrible performance
#[cfg(target_env = "musl")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        // CloudWatch adds the ingestion time
        .with_target(false)
        .without_time()
        .init();

    let table_name =
        std::env::var(TABLE_NAME_ENV).unwrap_or_else(|_| DEFAULT_TABLE_NAME.to_string());
    tracing::info!("[visitor] reading counter from {}", table_name);

    let config = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let store = DynamoCountStore::new(aws_sdk_dynamodb::Client::new(&config), table_name);
    let store = &store;

    run(service_fn(move |event: LambdaEvent<Value>| async move {
        function_handler(store, event).await
    }))
    .await
}
