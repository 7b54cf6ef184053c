// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

//! Parameter Store seeding.
//!
//! Writes the four values the other stacks look up at synthesis time. Values
//! are literals, so the template only changes when the inputs change.

use crate::constants::{
    AMI_NAME_PARAMETER, APPROVED_MANAGEMENT_IPS_PARAMETER, INSTANCE_TYPE_PARAMETER,
    KEY_PAIR_NAME_PARAMETER, PARAMETER_STACK_NAME,
};
use crate::errors::SynthError;
use crate::models::{ParameterValues, parse_approved_cidrs};
use crate::resources::{ParameterTier, SsmParameterProps};
use crate::stack::{Environment, Stack};

#[tracing::instrument(skip(values))]
pub fn build(env: Environment, values: &ParameterValues) -> Result<Stack, SynthError> {
    let mut stack = Stack::new(PARAMETER_STACK_NAME, env)
        .with_description("Parameter Store values for the vSRX deployment");

    // the vpc stack parses this value back; reject it before it is stored
    let approved_management_ips = values.approved_management_ips_value();
    parse_approved_cidrs(&approved_management_ips)?;

    let parameters = [
        (
            "ApprovedVSRXManagementIPs",
            APPROVED_MANAGEMENT_IPS_PARAMETER,
            approved_management_ips,
            "Approved IPs for vSRX management interface",
        ),
        (
            "VSRXAmiName",
            AMI_NAME_PARAMETER,
            values.ami_name.clone(),
            "AMI name for vSRX instances",
        ),
        (
            "VSRXInstanceType",
            INSTANCE_TYPE_PARAMETER,
            values.instance_type.clone(),
            "EC2 instance type for vSRX instances",
        ),
        (
            "VSRXKeyPairName",
            KEY_PAIR_NAME_PARAMETER,
            values.key_pair_name.clone(),
            "Key pair name for vSRX instances",
        ),
    ];

    for (id, name, value, description) in parameters {
        stack.add(
            id,
            SsmParameterProps {
                name: name.to_string(),
                parameter_type: "String".to_string(),
                value,
                description: description.to_string(),
                tier: ParameterTier::Standard,
            },
        )?;
    }

    Ok(stack)
}
