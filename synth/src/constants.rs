// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

// Stack names
pub const PARAMETER_STACK_NAME: &str = "vsrx-parameters";
pub const NETWORK_STACK_NAME: &str = "vsrx-vpc";
pub const APPLIANCE_STACK_NAME: &str = "vsrx-appliance";

// Parameter Store keys
pub const APPROVED_MANAGEMENT_IPS_PARAMETER: &str = "/vsrx/approved_management_ips";
pub const AMI_NAME_PARAMETER: &str = "/vsrx/ami-name";
pub const INSTANCE_TYPE_PARAMETER: &str = "/vsrx/instance-type";
pub const KEY_PAIR_NAME_PARAMETER: &str = "/vsrx/key-pair-name";

pub const DEFAULT_APPROVED_MANAGEMENT_IP: &str = "198.51.100.10/32";
pub const DEFAULT_AMI_NAME: &str = "junos-vsrx3-x86-64";
pub const DEFAULT_INSTANCE_TYPE: &str = "c5.xlarge";
pub const DEFAULT_KEY_PAIR_NAME: &str = "vSRXKeyPair";

pub const VPC_CIDR: &str = "10.0.0.0/20";
pub const ANY_IPV4: &str = "0.0.0.0/0";

/// Availability zone suffixes, in CIDR table column order.
pub const ZONES: [char; 3] = ['a', 'b', 'c'];

/// Subnet CIDRs per tier, one column per zone in [`ZONES`] order.
pub const PUBLIC_SUBNET_CIDRS: [&str; 3] = ["10.0.0.0/24", "10.0.1.0/24", "10.0.2.0/24"];
pub const MANAGEMENT_SUBNET_CIDRS: [&str; 3] = ["10.0.4.0/24", "10.0.5.0/24", "10.0.6.0/24"];
pub const PRIVATE_SUBNET_CIDRS: [&str; 3] = ["10.0.8.0/24", "10.0.9.0/24", "10.0.10.0/24"];
pub const TGW_SUBNET_CIDRS: [&str; 3] = ["10.0.15.192/28", "10.0.15.208/28", "10.0.15.224/28"];

pub const SSH_PORT: u16 = 22;
pub const HTTPS_PORT: u16 = 443;
pub const MAX_PORT: u16 = 65535;

pub const FLOW_LOG_GROUP_NAME: &str = "/aws/vpc/flowlogs";
pub const FLOW_LOG_RETENTION_DAYS: u32 = 7;
pub const FLOW_LOGS_SERVICE_PRINCIPAL: &str = "vpc-flow-logs.amazonaws.com";
pub const EC2_SERVICE_PRINCIPAL: &str = "ec2.amazonaws.com";
pub const SSM_MANAGED_INSTANCE_POLICY: &str = "AmazonSSMManagedInstanceCore";
pub const INSTANCE_PROFILE_NAME: &str = "vSRXInstanceProfile";

// Synthesis
pub const DUMMY_VALUE_PREFIX: &str = "dummy-value-for-";
pub const DUMMY_IMAGE_ID: &str = "ami-1234";
pub const UNKNOWN_ACCOUNT: &str = "unknown-account";
pub const MAX_SYNTH_PASSES: usize = 3;
pub const ASSEMBLY_VERSION: &str = "36.0.0";
pub const MANIFEST_FILE: &str = "manifest.json";
pub const TEMPLATE_FORMAT_VERSION: &str = "2010-09-09";
