// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

//! CloudFormation template model.
//!
//! Templates are plain serde types with PascalCase keys, so a synthesized
//! [`Template`] serializes directly into the JSON document CloudFormation
//! accepts. Maps are keyed by logical id and ordered, which keeps output
//! byte-stable across runs.
//!
//! Values that point at other resources are [`Reference`]s. A reference only
//! becomes JSON once the consuming stack is known, through
//! [`crate::stack::Stack::resolve`], which turns it into a [`Token`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::constants::TEMPLATE_FORMAT_VERSION;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Template {
    #[serde(rename = "AWSTemplateFormatVersion")]
    pub format_version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub resources: BTreeMap<String, Resource>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub outputs: BTreeMap<String, Output>,
}

impl Default for Template {
    fn default() -> Self {
        Self {
            format_version: TEMPLATE_FORMAT_VERSION.to_string(),
            description: None,
            resources: BTreeMap::new(),
            outputs: BTreeMap::new(),
        }
    }
}

impl Template {
    /// Returns every resource of the given CloudFormation type, with its logical id.
    pub fn resources_of_type<'a>(
        &'a self,
        resource_type: &'a str,
    ) -> impl Iterator<Item = (&'a String, &'a Resource)> + 'a {
        self.resources
            .iter()
            .filter(move |(_, r)| r.resource_type == resource_type)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Resource {
    #[serde(rename = "Type")]
    pub resource_type: String,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub properties: Value,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deletion_policy: Option<RemovalPolicy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_replace_policy: Option<RemovalPolicy>,
}

impl Resource {
    /// Looks up a top-level property by its CloudFormation name.
    pub fn property(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RemovalPolicy {
    Delete,
    Retain,
    Snapshot,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Output {
    pub value: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub export: Option<Export>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Export {
    pub name: String,
}

/// A pointer to a resource (or one of its attributes) owned by a stack.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Reference {
    pub stack: String,
    pub logical_id: String,
    pub attribute: Option<String>,
}

impl Reference {
    pub fn new(stack: impl Into<String>, logical_id: impl Into<String>) -> Self {
        Self {
            stack: stack.into(),
            logical_id: logical_id.into(),
            attribute: None,
        }
    }

    /// Returns a reference to an attribute of the same resource (`Fn::GetAtt`).
    pub fn attr(&self, attribute: impl Into<String>) -> Self {
        Self {
            stack: self.stack.clone(),
            logical_id: self.logical_id.clone(),
            attribute: Some(attribute.into()),
        }
    }

    /// Renders the reference as seen from inside its own stack.
    pub fn local_value(&self) -> Value {
        match &self.attribute {
            Some(attribute) => json!({ "Fn::GetAtt": [self.logical_id, attribute] }),
            None => json!({ "Ref": self.logical_id }),
        }
    }

    /// Logical id of the output the producing stack exports this value under.
    pub fn export_output_id(&self) -> String {
        match &self.attribute {
            Some(attribute) => format!(
                "ExportsOutputFnGetAtt{}{}",
                self.logical_id,
                sanitize_id(attribute)
            ),
            None => format!("ExportsOutputRef{}", self.logical_id),
        }
    }

    /// Export name used by `Fn::ImportValue` in consuming stacks.
    pub fn export_name(&self) -> String {
        format!("{}:{}", self.stack, self.export_output_id())
    }

    pub fn import_value(&self) -> Value {
        json!({ "Fn::ImportValue": self.export_name() })
    }
}

/// A property value: either a literal or a rendered reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Token(pub Value);

impl Token {
    pub fn as_value(&self) -> &Value {
        &self.0
    }
}

impl From<&str> for Token {
    fn from(value: &str) -> Self {
        Token(Value::String(value.to_string()))
    }
}

impl From<String> for Token {
    fn from(value: String) -> Self {
        Token(Value::String(value))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Tag {
    pub key: String,
    pub value: String,
}

/// The single `Name` tag every named resource here carries.
pub fn name_tag(name: impl Into<String>) -> Vec<Tag> {
    vec![Tag {
        key: "Name".to_string(),
        value: name.into(),
    }]
}

/// Strips everything but ASCII alphanumerics, the character set CloudFormation
/// allows in logical ids.
pub fn sanitize_id(id: &str) -> String {
    id.chars().filter(char::is_ascii_alphanumeric).collect()
}
