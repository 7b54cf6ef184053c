// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

//! Cloud assembly: the synthesized stacks, linked and ordered for deployment.
//!
//! # Linking
//!
//! Every reference a stack imports from another stack gets a matching output
//! with an `Export` on the producer. The producer then becomes a dependency
//! of the consumer.
//!
//! # Output layout
//!
//! ```text
//! <dir>/
//!   manifest.json              artifacts, dependencies, deploy order
//!   <stack>.template.json      one CloudFormation template per stack
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants::{ASSEMBLY_VERSION, MANIFEST_FILE};
use crate::context::MissingContext;
use crate::errors::SynthError;
use crate::stack::Stack;
use crate::template::{Export, Output, Reference};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub version: String,
    pub artifacts: BTreeMap<String, Artifact>,
    pub deploy_order: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub missing: Vec<MissingContext>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    #[serde(rename = "type")]
    pub artifact_type: String,
    pub environment: String,
    pub properties: ArtifactProperties,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactProperties {
    pub template_file: String,
}

#[derive(Debug, Clone)]
pub struct CloudAssembly {
    stacks: Vec<Stack>,
    deploy_order: Vec<String>,
    missing: Vec<MissingContext>,
}

impl CloudAssembly {
    /// Links cross-stack references and computes the deploy order.
    ///
    /// # Errors
    ///
    /// - [`SynthError::UnknownStack`] if a reference or dependency names a
    ///   stack that is not part of the assembly
    /// - [`SynthError::DependencyCycle`] if the stacks cannot be ordered
    #[tracing::instrument(skip_all, fields(stacks = stacks.len()))]
    pub fn synthesize(
        mut stacks: Vec<Stack>,
        missing: Vec<MissingContext>,
    ) -> Result<Self, SynthError> {
        let imports: Vec<Reference> = stacks
            .iter()
            .flat_map(|s| s.imports().iter().cloned())
            .collect();

        for reference in imports {
            let producer = stacks
                .iter_mut()
                .find(|s| s.name() == reference.stack)
                .ok_or_else(|| SynthError::UnknownStack(reference.stack.clone()))?;
            export(producer, &reference);
        }

        let deploy_order = deploy_order(&stacks)?;
        tracing::debug!("[synth] deploy order: {:?}", deploy_order);

        Ok(Self {
            stacks,
            deploy_order,
            missing,
        })
    }

    pub fn stacks(&self) -> &[Stack] {
        &self.stacks
    }

    pub fn stack(&self, name: &str) -> Option<&Stack> {
        self.stacks.iter().find(|s| s.name() == name)
    }

    pub fn deploy_order(&self) -> &[String] {
        &self.deploy_order
    }

    /// Context entries that were still unresolved when this assembly was built.
    pub fn missing(&self) -> &[MissingContext] {
        &self.missing
    }

    pub fn template_file(stack: &str) -> String {
        format!("{stack}.template.json")
    }

    pub fn manifest(&self) -> Manifest {
        let artifacts = self
            .stacks
            .iter()
            .map(|stack| {
                let artifact = Artifact {
                    artifact_type: "aws:cloudformation:stack".to_string(),
                    environment: stack.env().to_string(),
                    properties: ArtifactProperties {
                        template_file: Self::template_file(stack.name()),
                    },
                    dependencies: stack.dependencies().into_iter().collect(),
                };
                (stack.name().to_string(), artifact)
            })
            .collect();

        Manifest {
            version: ASSEMBLY_VERSION.to_string(),
            artifacts,
            deploy_order: self.deploy_order.clone(),
            missing: self.missing.clone(),
        }
    }

    /// Writes every template and the manifest, returning the written paths.
    #[tracing::instrument(skip(self))]
    pub fn write(&self, dir: &Path) -> Result<Vec<PathBuf>, SynthError> {
        std::fs::create_dir_all(dir)?;

        let mut written = Vec::with_capacity(self.stacks.len() + 1);
        for stack in &self.stacks {
            let path = dir.join(Self::template_file(stack.name()));
            let contents = serde_json::to_string_pretty(stack.template())?;
            std::fs::write(&path, contents + "\n")?;
            tracing::info!(
                "[synth] wrote {} ({} resources)",
                path.display(),
                stack.template().resources.len()
            );
            written.push(path);
        }

        let path = dir.join(MANIFEST_FILE);
        std::fs::write(&path, serde_json::to_string_pretty(&self.manifest())? + "\n")?;
        tracing::info!("[synth] wrote {}", path.display());
        written.push(path);

        Ok(written)
    }
}

fn export(producer: &mut Stack, reference: &Reference) {
    let output_id = reference.export_output_id();
    let outputs = &mut producer.template_mut().outputs;
    if outputs.contains_key(&output_id) {
        return;
    }
    outputs.insert(
        output_id,
        Output {
            value: reference.local_value(),
            description: None,
            export: Some(Export {
                name: reference.export_name(),
            }),
        },
    );
}

/// Orders stacks so every stack follows its dependencies. Ties keep the
/// order the stacks were added in.
fn deploy_order(stacks: &[Stack]) -> Result<Vec<String>, SynthError> {
    let names: BTreeSet<&str> = stacks.iter().map(|s| s.name()).collect();
    let dependencies: Vec<(&str, BTreeSet<String>)> = stacks
        .iter()
        .map(|s| (s.name(), s.dependencies()))
        .collect();

    for (_, deps) in &dependencies {
        if let Some(unknown) = deps.iter().find(|d| !names.contains(d.as_str())) {
            return Err(SynthError::UnknownStack(unknown.clone()));
        }
    }

    let mut ordered: Vec<String> = Vec::with_capacity(stacks.len());
    while ordered.len() < stacks.len() {
        let next = dependencies.iter().find(|(name, deps)| {
            !ordered.iter().any(|o| o == name) && deps.iter().all(|d| ordered.contains(d))
        });

        match next {
            Some((name, _)) => ordered.push(name.to_string()),
            None => {
                let remaining = dependencies
                    .iter()
                    .map(|(name, _)| name.to_string())
                    .filter(|name| !ordered.contains(name))
                    .collect();
                return Err(SynthError::DependencyCycle(remaining));
            }
        }
    }

    Ok(ordered)
}
