// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

//! Resolution of missing context entries against AWS.
//!
//! [`AwsLookups`] answers Parameter Store reads with SSM `GetParameter` and
//! machine image lookups with EC2 `DescribeImages` (newest matching image
//! wins). Credentials come from the default `aws-config` provider chain.

use std::future::Future;

use aws_config::BehaviorVersion;
use aws_config::Region;
use aws_sdk_ec2::types::{Filter, Image};

use crate::context::{Context, LookupRequest, MissingContext};
use crate::errors::SynthError;

/// Source of values for missing context entries.
pub trait LookupProvider {
    fn ssm_parameter(
        &self,
        region: &str,
        name: &str,
    ) -> impl Future<Output = Result<String, SynthError>> + Send;

    fn machine_image(
        &self,
        region: &str,
        name: &str,
    ) -> impl Future<Output = Result<String, SynthError>> + Send;
}

pub struct AwsLookups {
    ssm: aws_sdk_ssm::Client,
    ec2: aws_sdk_ec2::Client,
    region: String,
}

impl AwsLookups {
    pub async fn new(region: &str) -> Self {
        let config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .load()
            .await;

        Self {
            ssm: aws_sdk_ssm::Client::new(&config),
            ec2: aws_sdk_ec2::Client::new(&config),
            region: region.to_string(),
        }
    }

    fn check_region(&self, region: &str) -> Result<(), SynthError> {
        if region != self.region {
            return Err(SynthError::LookupError(format!(
                "lookup for region {region} but clients target {}",
                self.region
            )));
        }
        Ok(())
    }
}

impl LookupProvider for AwsLookups {
    async fn ssm_parameter(&self, region: &str, name: &str) -> Result<String, SynthError> {
        self.check_region(region)?;

        let output = self.ssm.get_parameter().name(name).send().await?;

        output
            .parameter()
            .and_then(|p| p.value())
            .map(str::to_string)
            .ok_or_else(|| SynthError::LookupError(format!("SSM parameter {name} has no value")))
    }

    async fn machine_image(&self, region: &str, name: &str) -> Result<String, SynthError> {
        self.check_region(region)?;

        let output = self
            .ec2
            .describe_images()
            .filters(Filter::builder().name("name").values(name).build())
            .filters(Filter::builder().name("state").values("available").build())
            .filters(Filter::builder().name("image-type").values("machine").build())
            .send()
            .await?;

        tracing::debug!(
            "[synth] {} images match name {}",
            output.images().len(),
            name
        );

        select_newest_image(output.images())
            .ok_or_else(|| SynthError::LookupError(format!("no image found matching {name}")))
    }
}

/// Picks the image with the latest creation date.
///
/// Creation dates are ISO 8601 strings, so lexical order is chronological.
pub fn select_newest_image(images: &[Image]) -> Option<String> {
    images
        .iter()
        .filter(|image| image.image_id().is_some())
        .max_by(|a, b| a.creation_date().cmp(&b.creation_date()))
        .and_then(|image| image.image_id())
        .map(str::to_string)
}

/// Resolves missing entries into `context`, returning how many were stored.
///
/// Entries whose inputs are themselves placeholders are skipped; they become
/// resolvable on the next synthesis pass.
#[tracing::instrument(skip_all, fields(missing = missing.len()))]
pub async fn resolve_missing<P: LookupProvider>(
    provider: &P,
    context: &mut Context,
    missing: &[MissingContext],
) -> Result<usize, SynthError> {
    let mut resolved = 0;

    for entry in missing {
        if entry.request.depends_on_placeholder() {
            tracing::debug!("[synth] deferring {}", entry.key);
            continue;
        }

        let value = match &entry.request {
            LookupRequest::SsmParameter {
                region,
                parameter_name,
                ..
            } => provider.ssm_parameter(region, parameter_name).await?,
            LookupRequest::Ami { region, name, .. } => provider.machine_image(region, name).await?,
        };

        tracing::info!("[synth] resolved {}", entry.key);
        context.set(entry.key.clone(), value);
        resolved += 1;
    }

    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stack::Environment;
    use std::collections::BTreeMap;

    struct StaticLookups {
        parameters: BTreeMap<String, String>,
        images: BTreeMap<String, String>,
    }

    impl LookupProvider for StaticLookups {
        async fn ssm_parameter(&self, _region: &str, name: &str) -> Result<String, SynthError> {
            self.parameters
                .get(name)
                .cloned()
                .ok_or_else(|| SynthError::LookupError(name.to_string()))
        }

        async fn machine_image(&self, _region: &str, name: &str) -> Result<String, SynthError> {
            self.images
                .get(name)
                .cloned()
                .ok_or_else(|| SynthError::LookupError(name.to_string()))
        }
    }

    fn image(id: &str, created: &str) -> Image {
        Image::builder().image_id(id).creation_date(created).build()
    }

    #[test]
    fn test_select_newest_image() {
        let images = vec![
            image("ami-old", "2023-01-01T00:00:00.000Z"),
            image("ami-new", "2024-06-01T00:00:00.000Z"),
            image("ami-mid", "2023-09-01T00:00:00.000Z"),
        ];
        assert_eq!(select_newest_image(&images), Some("ami-new".to_string()));
    }

    #[test]
    fn test_select_newest_image_empty() {
        assert_eq!(select_newest_image(&[]), None);
    }

    #[tokio::test]
    async fn test_resolve_defers_dependent_lookups() {
        let env = Environment::new(None, "us-east-1");
        let provider = StaticLookups {
            parameters: BTreeMap::from([("/vsrx/ami-name".to_string(), "junos".to_string())]),
            images: BTreeMap::from([("junos".to_string(), "ami-0abc".to_string())]),
        };

        let mut context = Context::new();
        let name = context.ssm_parameter(&env, "/vsrx/ami-name");
        context.machine_image(&env, &name);
        let missing = context.take_missing();

        let resolved = resolve_missing(&provider, &mut context, &missing).await.unwrap();
        assert_eq!(resolved, 1);

        // second pass sees the real name and can resolve the image
        let name = context.ssm_parameter(&env, "/vsrx/ami-name");
        assert_eq!(name, "junos");
        context.machine_image(&env, &name);
        let missing = context.take_missing();
        let resolved = resolve_missing(&provider, &mut context, &missing).await.unwrap();
        assert_eq!(resolved, 1);
        assert_eq!(context.machine_image(&env, "junos"), "ami-0abc");
    }

    #[tokio::test]
    async fn test_resolve_propagates_provider_errors() {
        let env = Environment::new(None, "us-east-1");
        let provider = StaticLookups {
            parameters: BTreeMap::new(),
            images: BTreeMap::new(),
        };

        let mut context = Context::new();
        context.ssm_parameter(&env, "/vsrx/key-pair-name");
        let missing = context.take_missing();

        let err = resolve_missing(&provider, &mut context, &missing)
            .await
            .unwrap_err();
        assert!(matches!(err, SynthError::LookupError(_)));
    }
}
