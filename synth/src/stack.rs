// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

//! A stack: one CloudFormation template under construction.
//!
//! Resources are added with [`Stack::add`], which returns a [`Reference`] to
//! the new resource. References are turned into property values with
//! [`Stack::resolve`]; resolving a reference owned by another stack records an
//! import, which [`crate::assembly`] later turns into an export on the
//! producer plus a deploy-order dependency.

use std::collections::BTreeSet;
use std::fmt;

use serde_json::Value;

use crate::errors::SynthError;
use crate::resources::ResourceProperties;
use crate::template::{Output, Reference, RemovalPolicy, Resource, Template, Token, sanitize_id};

/// Account and region a stack deploys into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment {
    pub account: Option<String>,
    pub region: String,
}

impl Environment {
    pub fn new(account: Option<String>, region: impl Into<String>) -> Self {
        Self {
            account,
            region: region.into(),
        }
    }

    pub fn account_or_unknown(&self) -> &str {
        self.account
            .as_deref()
            .unwrap_or(crate::constants::UNKNOWN_ACCOUNT)
    }

    /// Availability zone name for a zone suffix, e.g. `us-east-1` + `a`.
    pub fn availability_zone(&self, zone: char) -> String {
        format!("{}{}", self.region, zone)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "aws://{}/{}", self.account_or_unknown(), self.region)
    }
}

#[derive(Debug, Clone)]
pub struct Stack {
    name: String,
    env: Environment,
    template: Template,
    imports: BTreeSet<Reference>,
    dependencies: BTreeSet<String>,
}

impl Stack {
    pub fn new(name: impl Into<String>, env: Environment) -> Self {
        Self {
            name: name.into(),
            env,
            template: Template::default(),
            imports: BTreeSet::new(),
            dependencies: BTreeSet::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.template.description = Some(description.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    pub fn template(&self) -> &Template {
        &self.template
    }

    pub(crate) fn template_mut(&mut self) -> &mut Template {
        &mut self.template
    }

    pub fn imports(&self) -> &BTreeSet<Reference> {
        &self.imports
    }

    /// Stacks this one must deploy after, explicit or implied by imports.
    pub fn dependencies(&self) -> BTreeSet<String> {
        let mut deps = self.dependencies.clone();
        deps.extend(self.imports.iter().map(|r| r.stack.clone()));
        deps
    }

    pub fn add_dependency(&mut self, stack: impl Into<String>) {
        self.dependencies.insert(stack.into());
    }

    /// Adds a resource under the logical id derived from `id`.
    pub fn add<P: ResourceProperties>(&mut self, id: &str, props: P) -> Result<Reference, SynthError> {
        self.add_with_policy(id, props, None)
    }

    /// Adds a resource with a deletion and update-replace policy.
    pub fn add_with_policy<P: ResourceProperties>(
        &mut self,
        id: &str,
        props: P,
        removal: Option<RemovalPolicy>,
    ) -> Result<Reference, SynthError> {
        let logical_id = self.claim_logical_id(id)?;

        let mut properties = serde_json::to_value(&props)?;
        if properties.as_object().is_some_and(|o| o.is_empty()) {
            properties = Value::Null;
        }

        tracing::trace!("[synth] {}: {} {}", self.name, P::TYPE, logical_id);

        self.template.resources.insert(
            logical_id.clone(),
            Resource {
                resource_type: P::TYPE.to_string(),
                properties,
                depends_on: Vec::new(),
                deletion_policy: removal,
                update_replace_policy: removal,
            },
        );

        Ok(Reference::new(self.name.clone(), logical_id))
    }

    /// Adds a stack output under the logical id derived from `id`.
    pub fn add_output(&mut self, id: &str, value: &Reference) -> Result<(), SynthError> {
        let logical_id = sanitize_id(id);
        if self.template.outputs.contains_key(&logical_id) {
            return Err(SynthError::DuplicateLogicalId(self.name.clone(), logical_id));
        }
        let value = self.resolve(value).0;
        self.template.outputs.insert(
            logical_id,
            Output {
                value,
                description: None,
                export: None,
            },
        );
        Ok(())
    }

    /// Renders a reference for use inside this stack.
    pub fn resolve(&mut self, reference: &Reference) -> Token {
        if reference.stack == self.name {
            Token(reference.local_value())
        } else {
            self.imports.insert(reference.clone());
            Token(reference.import_value())
        }
    }

    fn claim_logical_id(&self, id: &str) -> Result<String, SynthError> {
        let logical_id = sanitize_id(id);
        if logical_id.is_empty() || self.template.resources.contains_key(&logical_id) {
            return Err(SynthError::DuplicateLogicalId(self.name.clone(), logical_id));
        }
        Ok(logical_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::{EipProps, InternetGatewayProps};
    use crate::template::name_tag;
    use serde_json::json;

    fn env() -> Environment {
        Environment::new(Some("123456789012".to_string()), "us-east-1")
    }

    #[test]
    fn test_environment_display() {
        assert_eq!(env().to_string(), "aws://123456789012/us-east-1");
        assert_eq!(
            Environment::new(None, "eu-west-1").to_string(),
            "aws://unknown-account/eu-west-1"
        );
        assert_eq!(env().availability_zone('b'), "us-east-1b");
    }

    #[test]
    fn test_add_returns_local_reference() {
        let mut stack = Stack::new("net", env());
        let igw = stack
            .add("vSRX-IGW", InternetGatewayProps { tags: name_tag("vSRX-IGW") })
            .unwrap();
        assert_eq!(igw.logical_id, "vSRXIGW");
        assert_eq!(stack.resolve(&igw).0, json!({"Ref": "vSRXIGW"}));
        assert!(stack.imports().is_empty());
    }

    #[test]
    fn test_duplicate_logical_id_rejected() {
        let mut stack = Stack::new("net", env());
        stack.add("vSRX-EIP", EipProps::default()).unwrap();
        let err = stack.add("vSRXEIP", EipProps::default()).unwrap_err();
        assert!(matches!(err, SynthError::DuplicateLogicalId(_, id) if id == "vSRXEIP"));
    }

    #[test]
    fn test_empty_properties_are_omitted() {
        let mut stack = Stack::new("app", env());
        stack.add("vSRX-Public-EIP", EipProps::default()).unwrap();
        let resource = &stack.template().resources["vSRXPublicEIP"];
        assert!(resource.properties.is_null());
    }

    #[test]
    fn test_foreign_reference_becomes_import() {
        let mut stack = Stack::new("app", env());
        let foreign = Reference::new("net", "vSRXVPC");
        let token = stack.resolve(&foreign);
        assert_eq!(
            token.0,
            json!({"Fn::ImportValue": "net:ExportsOutputRefvSRXVPC"})
        );
        assert!(stack.dependencies().contains("net"));
    }

    #[test]
    fn test_duplicate_output_rejected() {
        let mut stack = Stack::new("net", env());
        let eip = stack.add("eip", EipProps::default()).unwrap();
        stack.add_output("eip-out", &eip).unwrap();
        assert!(stack.add_output("eipout", &eip).is_err());
    }
}
