// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

//! End-to-end synthesis tests.
//!
//! These build the full three-stack assembly through [`Application`] with an
//! in-memory lookup provider standing in for SSM and EC2.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use proptest::prelude::*;
use serde_json::{Value, json};
use vsrx_synth::application::Application;
use vsrx_synth::assembly::{CloudAssembly, Manifest};
use vsrx_synth::configuration::SynthOptions;
use vsrx_synth::constants::{
    AMI_NAME_PARAMETER, APPLIANCE_STACK_NAME, APPROVED_MANAGEMENT_IPS_PARAMETER,
    INSTANCE_TYPE_PARAMETER, KEY_PAIR_NAME_PARAMETER, NETWORK_STACK_NAME, PARAMETER_STACK_NAME,
};
use vsrx_synth::context::{Context, LookupRequest};
use vsrx_synth::errors::SynthError;
use vsrx_synth::lookups::LookupProvider;
use vsrx_synth::models::ParameterValues;
use vsrx_synth::stack::{Environment, Stack};
use vsrx_synth::stacks::{network, parameters};

const IMAGE_ID: &str = "ami-0123456789abcdef0";

/// Serves fixed values and counts how many lookups it answered.
struct StaticLookups {
    parameters: BTreeMap<String, String>,
    images: BTreeMap<String, String>,
    calls: AtomicUsize,
}

impl StaticLookups {
    fn new(approved_ips: &str) -> Self {
        let parameters = BTreeMap::from([
            (
                APPROVED_MANAGEMENT_IPS_PARAMETER.to_string(),
                approved_ips.to_string(),
            ),
            (AMI_NAME_PARAMETER.to_string(), "junos-vsrx3-x86-64".to_string()),
            (INSTANCE_TYPE_PARAMETER.to_string(), "c5.2xlarge".to_string()),
            (KEY_PAIR_NAME_PARAMETER.to_string(), "ops-keypair".to_string()),
        ]);
        let images = BTreeMap::from([("junos-vsrx3-x86-64".to_string(), IMAGE_ID.to_string())]);
        Self {
            parameters,
            images,
            calls: AtomicUsize::new(0),
        }
    }
}

impl LookupProvider for StaticLookups {
    async fn ssm_parameter(&self, _region: &str, name: &str) -> Result<String, SynthError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.parameters
            .get(name)
            .cloned()
            .ok_or_else(|| SynthError::LookupError(format!("ParameterNotFound: {name}")))
    }

    async fn machine_image(&self, _region: &str, name: &str) -> Result<String, SynthError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.images
            .get(name)
            .cloned()
            .ok_or_else(|| SynthError::LookupError(format!("no image found matching {name}")))
    }
}

fn options(dir: &Path) -> SynthOptions {
    SynthOptions {
        account: Some("123456789012".to_string()),
        region: "eu-west-1".to_string(),
        output: dir.join("cdk.out"),
        context_file: dir.join("vsrx.context.json"),
        skip_lookups: false,
        ..SynthOptions::default()
    }
}

fn env() -> Environment {
    Environment::new(Some("123456789012".to_string()), "eu-west-1")
}

async fn resolved_assembly(approved_ips: &str) -> CloudAssembly {
    let dir = tempfile::tempdir().unwrap();
    let provider = StaticLookups::new(approved_ips);
    let mut application = Application::build(options(dir.path())).unwrap();
    application
        .synthesize_resolved(Some(&provider))
        .await
        .unwrap()
}

fn stack<'a>(assembly: &'a CloudAssembly, name: &str) -> &'a Stack {
    assembly.stack(name).unwrap()
}

fn network_with_allow_list(ips: &str) -> Stack {
    let mut context = Context::new();
    context.set(
        LookupRequest::ssm_parameter(&env(), APPROVED_MANAGEMENT_IPS_PARAMETER).key(),
        ips,
    );
    network::build(env(), &mut context).unwrap().stack
}

fn management_ssh_rules(stack: &Stack) -> Vec<&Value> {
    stack
        .template()
        .resources_of_type("AWS::EC2::SecurityGroupIngress")
        .filter(|(id, _)| id.starts_with("vSRXManagementSGIngress"))
        .map(|(_, resource)| &resource.properties)
        .collect()
}

// =============================================================================
// Network layout
// =============================================================================

#[tokio::test]
async fn test_subnet_cidrs_are_unique_and_associated_once() {
    let assembly = resolved_assembly("10.1.1.1/32").await;
    let template = stack(&assembly, NETWORK_STACK_NAME).template();

    let cidrs: BTreeSet<&str> = template
        .resources_of_type("AWS::EC2::Subnet")
        .map(|(_, r)| r.properties["CidrBlock"].as_str().unwrap())
        .collect();
    assert_eq!(cidrs.len(), 12);
    assert!(cidrs.iter().all(|cidr| cidr.starts_with("10.0.")));

    let mut associations: BTreeMap<String, usize> = BTreeMap::new();
    for (_, association) in template.resources_of_type("AWS::EC2::SubnetRouteTableAssociation") {
        let subnet = association.properties["SubnetId"]["Ref"].as_str().unwrap();
        *associations.entry(subnet.to_string()).or_default() += 1;
    }
    assert_eq!(associations.len(), 12);
    assert!(associations.values().all(|count| *count == 1));
}

#[tokio::test]
async fn test_default_routes_only_on_internet_facing_tables() {
    let assembly = resolved_assembly("10.1.1.1/32").await;
    let template = stack(&assembly, NETWORK_STACK_NAME).template();

    let routed: Vec<&str> = template
        .resources_of_type("AWS::EC2::Route")
        .map(|(_, route)| {
            assert_eq!(route.properties["DestinationCidrBlock"], "0.0.0.0/0");
            assert_eq!(route.properties["GatewayId"], json!({"Ref": "vSRXIGW"}));
            route.properties["RouteTableId"]["Ref"].as_str().unwrap()
        })
        .collect();

    assert_eq!(routed.len(), 2);
    assert!(routed.contains(&"vSRXPublicRT"));
    assert!(routed.contains(&"vSRXManagementRT"));
}

#[test]
fn test_allow_list_with_blank_lines() {
    let stack = network_with_allow_list("10.1.1.1/32\n\n192.0.2.0/24\n");
    let rules = management_ssh_rules(&stack);
    assert_eq!(rules.len(), 2);
    assert_eq!(rules[0]["CidrIp"], "10.1.1.1/32");
    assert_eq!(rules[1]["CidrIp"], "192.0.2.0/24");
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_one_ssh_rule_per_approved_cidr(
        addresses in prop::collection::vec((any::<[u8; 4]>(), 0u8..=32), 1..10)
    ) {
        let cidrs: Vec<String> = addresses
            .iter()
            .map(|([a, b, c, d], prefix)| format!("{a}.{b}.{c}.{d}/{prefix}"))
            .collect();

        let stack = network_with_allow_list(&cidrs.join("\n"));
        let rules = management_ssh_rules(&stack);

        prop_assert_eq!(rules.len(), cidrs.len());
        for rule in &rules {
            prop_assert!(rule["IpProtocol"] == "tcp");
            prop_assert!(rule["FromPort"] == 22 && rule["ToPort"] == 22);
        }
        let covered: BTreeSet<&str> = rules.iter().map(|r| r["CidrIp"].as_str().unwrap()).collect();
        let expected: BTreeSet<&str> = cidrs.iter().map(String::as_str).collect();
        prop_assert_eq!(covered, expected);
    }
}

// =============================================================================
// Appliance
// =============================================================================

#[tokio::test]
async fn test_instance_uses_resolved_settings() {
    let assembly = resolved_assembly("10.1.1.1/32").await;
    let instance = &stack(&assembly, APPLIANCE_STACK_NAME).template().resources["vSRXInstance"];

    assert_eq!(instance.properties["ImageId"], IMAGE_ID);
    assert_eq!(instance.properties["InstanceType"], "c5.2xlarge");
    assert_eq!(instance.properties["KeyName"], "ops-keypair");

    let indices: Vec<&str> = instance.properties["NetworkInterfaces"]
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["DeviceIndex"].as_str().unwrap())
        .collect();
    assert_eq!(indices, ["0", "1", "2"]);
}

#[tokio::test]
async fn test_appliance_imports_network_exports() {
    let assembly = resolved_assembly("10.1.1.1/32").await;
    let network = stack(&assembly, NETWORK_STACK_NAME);
    let appliance = stack(&assembly, APPLIANCE_STACK_NAME);

    let exported: BTreeSet<&str> = network
        .template()
        .outputs
        .values()
        .filter_map(|output| output.export.as_ref())
        .map(|export| export.name.as_str())
        .collect();
    assert!(!exported.is_empty());

    let eni = &appliance.template().resources["vSRXManagementENI"];
    let import = eni.properties["SubnetId"]["Fn::ImportValue"].as_str().unwrap();
    assert!(exported.contains(import), "{import} is not exported");

    for reference in appliance.imports() {
        assert_eq!(reference.stack, NETWORK_STACK_NAME);
        assert!(exported.contains(reference.export_name().as_str()));
    }
}

// =============================================================================
// Assembly
// =============================================================================

#[tokio::test]
async fn test_deploy_order() {
    let assembly = resolved_assembly("10.1.1.1/32").await;
    let order = assembly.deploy_order();
    assert_eq!(order.len(), 3);

    let position = |name: &str| order.iter().position(|s| s == name).unwrap();
    assert!(position(PARAMETER_STACK_NAME) < position(APPLIANCE_STACK_NAME));
    assert!(position(NETWORK_STACK_NAME) < position(APPLIANCE_STACK_NAME));
}

#[test]
fn test_parameter_seeding_is_idempotent() {
    let values = ParameterValues::from(&SynthOptions::default());
    let first = parameters::build(env(), &values).unwrap();
    let second = parameters::build(env(), &values).unwrap();
    assert_eq!(
        serde_json::to_string(first.template()).unwrap(),
        serde_json::to_string(second.template()).unwrap()
    );

    let seeded = &first.template().resources["ApprovedVSRXManagementIPs"];
    assert_eq!(seeded.properties["Value"], "198.51.100.10/32");
    assert_eq!(seeded.properties["Name"], "/vsrx/approved_management_ips");
}

#[tokio::test]
async fn test_multi_pass_resolution_caches_context() {
    let dir = tempfile::tempdir().unwrap();
    let options = options(dir.path());
    let provider = StaticLookups::new("10.1.1.1/32\n10.2.2.2/32");

    let assembly = Application::build(options.clone())
        .unwrap()
        .run(Some(&provider))
        .await
        .unwrap();
    assert!(assembly.missing().is_empty());
    assert_eq!(
        management_ssh_rules(stack(&assembly, NETWORK_STACK_NAME)).len(),
        2
    );
    // four parameters, then the image once its name is known
    assert_eq!(provider.calls.load(Ordering::SeqCst), 5);

    let cached = Context::load(&options.context_file).unwrap();
    assert_eq!(cached.len(), 5);

    // a second run is served entirely from the context file
    let again = StaticLookups::new("10.1.1.1/32\n10.2.2.2/32");
    Application::build(options).unwrap().run(Some(&again)).await.unwrap();
    assert_eq!(again.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_pass_limit_is_enforced() {
    let dir = tempfile::tempdir().unwrap();
    let provider = StaticLookups::new("10.1.1.1/32");

    // the image lookup only becomes resolvable on the second pass
    let err = Application::build(options(dir.path()))
        .unwrap()
        .with_max_passes(2)
        .run(Some(&provider))
        .await
        .unwrap_err();

    match err {
        SynthError::UnresolvedContext(passes, keys) => {
            assert_eq!(passes, 2);
            assert_eq!(keys.len(), 1);
            assert!(keys[0].starts_with("ami:"));
        }
        other => panic!("unexpected error: {other}"),
    }
    // no lookups run on the final pass
    assert_eq!(provider.calls.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn test_missing_context_without_lookups() {
    let dir = tempfile::tempdir().unwrap();
    let options = SynthOptions {
        skip_lookups: true,
        ..options(dir.path())
    };

    let err = Application::build(options.clone())
        .unwrap()
        .run::<StaticLookups>(None)
        .await
        .unwrap_err();

    match err {
        SynthError::MissingContext(keys) => {
            assert_eq!(keys.len(), 5);
            assert!(keys.iter().any(|k| k.starts_with("ami:")));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!options.output.exists());
}

#[tokio::test]
async fn test_lookup_failure_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let mut provider = StaticLookups::new("10.1.1.1/32");
    provider.images.clear();

    let err = Application::build(options(dir.path()))
        .unwrap()
        .run(Some(&provider))
        .await
        .unwrap_err();
    assert!(matches!(err, SynthError::LookupError(message) if message.contains("no image")));
}

#[tokio::test]
async fn test_write_assembly_to_disk() {
    let dir = tempfile::tempdir().unwrap();
    let options = options(dir.path());
    let provider = StaticLookups::new("10.1.1.1/32");

    Application::build(options.clone())
        .unwrap()
        .run(Some(&provider))
        .await
        .unwrap();

    let manifest: Manifest =
        serde_json::from_slice(&std::fs::read(options.output.join("manifest.json")).unwrap())
            .unwrap();
    assert_eq!(manifest.artifacts.len(), 3);
    assert_eq!(manifest.deploy_order.last().unwrap(), APPLIANCE_STACK_NAME);
    assert!(manifest.missing.is_empty());

    for name in [PARAMETER_STACK_NAME, NETWORK_STACK_NAME, APPLIANCE_STACK_NAME] {
        let path = options.output.join(CloudAssembly::template_file(name));
        let template: Value = serde_json::from_slice(&std::fs::read(path).unwrap()).unwrap();
        assert_eq!(template["AWSTemplateFormatVersion"], "2010-09-09");
        assert!(template["Resources"].as_object().unwrap().len() >= 4);
    }
}
