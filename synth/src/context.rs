// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

//! Synthesis-time context: cached results of environment lookups.
//!
//! Stacks read external values (Parameter Store entries, machine image ids)
//! while they are being built. Construction itself never calls AWS; it asks
//! the [`Context`] for a value under a deterministic key. When the key is not
//! cached the lookup is recorded as [`MissingContext`] and a placeholder is
//! returned so construction can finish. The caller then resolves the missing
//! entries (see [`crate::lookups`]) and synthesizes again.
//!
//! The cache persists as a flat JSON object, so resolved values stay pinned
//! across runs until the file is edited or deleted.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::{DUMMY_IMAGE_ID, DUMMY_VALUE_PREFIX};
use crate::errors::SynthError;
use crate::stack::Environment;

/// What a missing context entry needs to be resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "provider", rename_all = "kebab-case")]
pub enum LookupRequest {
    SsmParameter {
        account: String,
        region: String,
        #[serde(rename = "parameterName")]
        parameter_name: String,
    },
    Ami {
        account: String,
        region: String,
        name: String,
    },
}

impl LookupRequest {
    pub fn ssm_parameter(env: &Environment, parameter_name: &str) -> Self {
        LookupRequest::SsmParameter {
            account: env.account_or_unknown().to_string(),
            region: env.region.clone(),
            parameter_name: parameter_name.to_string(),
        }
    }

    pub fn ami(env: &Environment, name: &str) -> Self {
        LookupRequest::Ami {
            account: env.account_or_unknown().to_string(),
            region: env.region.clone(),
            name: name.to_string(),
        }
    }

    /// The cache key, with properties in sorted order.
    pub fn key(&self) -> String {
        match self {
            LookupRequest::SsmParameter {
                account,
                region,
                parameter_name,
            } => format!("ssm:account={account}:parameterName={parameter_name}:region={region}"),
            LookupRequest::Ami {
                account,
                region,
                name,
            } => format!(
                "ami:account={account}:filters.image-type.0=machine:filters.name.0={name}:filters.state.0=available:region={region}"
            ),
        }
    }

    /// Value returned while the entry is unresolved.
    pub fn placeholder(&self) -> String {
        match self {
            LookupRequest::SsmParameter { parameter_name, .. } => {
                format!("{DUMMY_VALUE_PREFIX}{parameter_name}")
            }
            LookupRequest::Ami { .. } => DUMMY_IMAGE_ID.to_string(),
        }
    }

    /// True when the request was built from another unresolved lookup.
    pub fn depends_on_placeholder(&self) -> bool {
        match self {
            LookupRequest::SsmParameter { parameter_name, .. } => is_placeholder(parameter_name),
            LookupRequest::Ami { name, .. } => is_placeholder(name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingContext {
    pub key: String,
    pub request: LookupRequest,
}

pub fn is_placeholder(value: &str) -> bool {
    value.starts_with(DUMMY_VALUE_PREFIX) || value == DUMMY_IMAGE_ID
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Context {
    values: BTreeMap<String, Value>,
    missing: Vec<MissingContext>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads cached values, starting empty when the file does not exist.
    #[tracing::instrument]
    pub fn load(path: &Path) -> Result<Self, SynthError> {
        if !path.exists() {
            tracing::debug!("[synth] no context file at {:?}", path);
            return Ok(Self::new());
        }
        let contents = std::fs::read(path)?;
        let values: BTreeMap<String, Value> = serde_json::from_slice(&contents)?;
        tracing::debug!("[synth] loaded {} context values", values.len());
        Ok(Self {
            values,
            missing: Vec::new(),
        })
    }

    pub fn save(&self, path: &Path) -> Result<(), SynthError> {
        let contents = serde_json::to_string_pretty(&self.values)?;
        std::fs::write(path, contents + "\n")?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Entries requested since the last [`Context::take_missing`].
    pub fn missing(&self) -> &[MissingContext] {
        &self.missing
    }

    pub fn take_missing(&mut self) -> Vec<MissingContext> {
        std::mem::take(&mut self.missing)
    }

    /// Reads a Parameter Store string value.
    pub fn ssm_parameter(&mut self, env: &Environment, parameter_name: &str) -> String {
        self.lookup(LookupRequest::ssm_parameter(env, parameter_name))
    }

    /// Resolves a machine image name to an image id.
    pub fn machine_image(&mut self, env: &Environment, name: &str) -> String {
        self.lookup(LookupRequest::ami(env, name))
    }

    fn lookup(&mut self, request: LookupRequest) -> String {
        let key = request.key();
        if let Some(Value::String(value)) = self.values.get(&key) {
            return value.clone();
        }

        let placeholder = request.placeholder();
        tracing::debug!("[synth] missing context {}, using {}", key, placeholder);
        if !self.missing.iter().any(|m| m.key == key) {
            self.missing.push(MissingContext { key, request });
        }
        placeholder
    }
}
