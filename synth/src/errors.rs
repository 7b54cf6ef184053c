// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

use std::fmt::Debug;

use aws_smithy_runtime_api::client::result::SdkError;

#[derive(thiserror::Error, Debug)]
pub enum SynthError {
    #[error("duplicate logical id {1} in stack {0}")]
    DuplicateLogicalId(String, String),
    #[error("invalid approved management CIDR: {0:?}")]
    InvalidCidr(String),
    #[error("missing context values (lookups disabled): {}", .0.join(", "))]
    MissingContext(Vec<String>),
    #[error("context still unresolved after {0} synthesis passes: {}", .1.join(", "))]
    UnresolvedContext(usize, Vec<String>),
    #[error("lookup failed: {0}")]
    LookupError(String),
    #[error("unknown stack: {0}")]
    UnknownStack(String),
    #[error("unknown resource: {0}")]
    UnknownResource(String),
    #[error("dependency cycle between stacks: {}", .0.join(" -> "))]
    DependencyCycle(Vec<String>),
    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("json error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl<E, R> From<SdkError<E, R>> for SynthError
where
    E: std::error::Error + Send + Sync + 'static,
    R: Debug,
{
    fn from(source: SdkError<E, R>) -> Self {
        tracing::error!("{:?}", source);
        let message = match source.as_service_error() {
            Some(service) => service.to_string(),
            None => source.to_string(),
        };
        SynthError::LookupError(message)
    }
}
