// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

//! The vSRX instance with its three ENIs, two Elastic IPs and IAM profile.
//!
//! The instance attaches its interfaces at fixed device indices:
//!
//! | Index | ENI        | Subnet (zone a) | Security group     | Elastic IP |
//! |-------|------------|-----------------|--------------------|------------|
//! | 0     | management | Management      | vSRX-Management-SG | yes        |
//! | 1     | public     | Public          | vSRX-Public-SG     | yes        |
//! | 2     | private    | Private         | vSRX-Private-SG    | no         |
//!
//! The vSRX maps interfaces to its management and revenue ports by index, so
//! the order is part of the deployment contract.

use serde_json::json;

use crate::constants::{
    AMI_NAME_PARAMETER, APPLIANCE_STACK_NAME, EC2_SERVICE_PRINCIPAL, INSTANCE_PROFILE_NAME,
    INSTANCE_TYPE_PARAMETER, KEY_PAIR_NAME_PARAMETER, PARAMETER_STACK_NAME,
    SSM_MANAGED_INSTANCE_POLICY,
};
use crate::context::Context;
use crate::errors::SynthError;
use crate::models::SubnetTier;
use crate::resources::{
    EipAssociationProps, EipProps, InstanceNetworkInterface, InstanceProfileProps, InstanceProps,
    NetworkInterfaceProps, PolicyDocument, RoleProps,
};
use crate::stack::{Environment, Stack};
use crate::stacks::network::NetworkRefs;
use crate::template::{Reference, name_tag};

const APPLIANCE_ZONE: char = 'a';

/// Settings read from Parameter Store at synthesis time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplianceSettings {
    pub ami_name: String,
    pub instance_type: String,
    pub key_pair_name: String,
    pub image_id: String,
}

impl ApplianceSettings {
    pub fn lookup(context: &mut Context, env: &Environment) -> Self {
        let ami_name = context.ssm_parameter(env, AMI_NAME_PARAMETER);
        let instance_type = context.ssm_parameter(env, INSTANCE_TYPE_PARAMETER);
        let key_pair_name = context.ssm_parameter(env, KEY_PAIR_NAME_PARAMETER);

        tracing::info!("[synth] Using AMI name: {}", ami_name);
        tracing::info!("[synth] Using instance type: {}", instance_type);
        tracing::info!("[synth] Using key pair name: {}", key_pair_name);

        let image_id = context.machine_image(env, &ami_name);

        Self {
            ami_name,
            instance_type,
            key_pair_name,
            image_id,
        }
    }
}

struct Interface {
    id: &'static str,
    description: &'static str,
    tier: SubnetTier,
    eip: Option<&'static str>,
}

const INTERFACES: [Interface; 3] = [
    Interface {
        id: "vSRX-Management",
        description: "vSRX Management ENI",
        tier: SubnetTier::Management,
        eip: Some("vSRX-Management-EIP"),
    },
    Interface {
        id: "vSRX-Public",
        description: "vSRX Public ENI",
        tier: SubnetTier::Public,
        eip: Some("vSRX-Public-EIP"),
    },
    Interface {
        id: "vSRX-Private",
        description: "vSRX Private ENI",
        tier: SubnetTier::Private,
        eip: None,
    },
];

#[tracing::instrument(skip(context, network))]
pub fn build(
    env: Environment,
    context: &mut Context,
    network: &NetworkRefs,
) -> Result<Stack, SynthError> {
    let settings = ApplianceSettings::lookup(context, &env);

    let mut stack = Stack::new(APPLIANCE_STACK_NAME, env)
        .with_description("vSRX firewall instance, ENIs and Elastic IPs");
    // lookups above read values the parameter stack writes
    stack.add_dependency(PARAMETER_STACK_NAME);

    let mut eips = Vec::new();
    for interface in &INTERFACES {
        if let Some(eip_id) = interface.eip {
            eips.push((interface.id, stack.add(eip_id, EipProps::default())?));
        }
    }

    let mut attachments = Vec::with_capacity(INTERFACES.len());
    let mut enis = Vec::with_capacity(INTERFACES.len());
    for (device_index, interface) in INTERFACES.iter().enumerate() {
        let eni = add_interface(&mut stack, network, interface)?;

        if let Some((_, eip)) = eips.iter().find(|(id, _)| *id == interface.id) {
            let allocation_id = stack.resolve(&eip.attr("AllocationId"));
            let network_interface_id = stack.resolve(&eni);
            stack.add(
                &format!("{}-EIP-Association", interface.id),
                EipAssociationProps {
                    allocation_id,
                    network_interface_id,
                },
            )?;
        }

        attachments.push(InstanceNetworkInterface {
            device_index: device_index.to_string(),
            network_interface_id: stack.resolve(&eni),
        });
        enis.push((interface.id, eni));
    }

    let role = stack.add(
        "vSRXInstanceRole",
        RoleProps {
            assume_role_policy_document: PolicyDocument::assumed_by(EC2_SERVICE_PRINCIPAL),
            managed_policy_arns: vec![json!({
                "Fn::Join": ["", [
                    "arn:",
                    { "Ref": "AWS::Partition" },
                    format!(":iam::aws:policy/{SSM_MANAGED_INSTANCE_POLICY}")
                ]]
            })],
        },
    )?;
    let role_name = stack.resolve(&role);

    let profile = stack.add(
        "vSRX-Instance-Profile",
        InstanceProfileProps {
            roles: vec![role_name],
            instance_profile_name: INSTANCE_PROFILE_NAME.to_string(),
        },
    )?;
    let iam_instance_profile = stack.resolve(&profile);

    let instance = stack.add(
        "vSRX-Instance",
        InstanceProps {
            instance_type: settings.instance_type,
            image_id: settings.image_id,
            key_name: settings.key_pair_name,
            network_interfaces: attachments,
            iam_instance_profile,
            tags: name_tag("vSRX-Instance"),
        },
    )?;

    for (id, eni) in &enis {
        stack.add_output(&format!("{id}-ENI-Id"), eni)?;
    }
    for (id, eip) in &eips {
        stack.add_output(&format!("{id}-ElasticIP"), eip)?;
    }
    stack.add_output("vSRX-Instance-Id", &instance)?;

    Ok(stack)
}

fn add_interface(
    stack: &mut Stack,
    network: &NetworkRefs,
    interface: &Interface,
) -> Result<Reference, SynthError> {
    let subnet_id = stack.resolve(network.subnet(interface.tier, APPLIANCE_ZONE)?);
    let security_group = match interface.tier {
        SubnetTier::Management => &network.management_sg,
        SubnetTier::Public => &network.public_sg,
        SubnetTier::Private | SubnetTier::Tgw => &network.private_sg,
    };
    let group_id = stack.resolve(security_group);

    stack.add(
        &format!("{}-ENI", interface.id),
        NetworkInterfaceProps {
            subnet_id,
            group_set: vec![group_id],
            source_dest_check: false,
            description: interface.description.to_string(),
        },
    )
}
