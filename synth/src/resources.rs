// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

//! Typed properties for the CloudFormation resource types these stacks use.
//!
//! Field names follow the CloudFormation property names through
//! `rename_all = "PascalCase"`; only the properties the stacks set are modeled.

use serde::Serialize;
use serde_json::Value;

use crate::template::{Tag, Token};

/// Properties of a CloudFormation resource type.
pub trait ResourceProperties: Serialize {
    const TYPE: &'static str;
}

macro_rules! resource_type {
    ($props:ty, $name:literal) => {
        impl ResourceProperties for $props {
            const TYPE: &'static str = $name;
        }
    };
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct VpcProps {
    pub cidr_block: String,
    pub enable_dns_hostnames: bool,
    pub enable_dns_support: bool,
    pub tags: Vec<Tag>,
}
resource_type!(VpcProps, "AWS::EC2::VPC");

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct InternetGatewayProps {
    pub tags: Vec<Tag>,
}
resource_type!(InternetGatewayProps, "AWS::EC2::InternetGateway");

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct VpcGatewayAttachmentProps {
    pub vpc_id: Token,
    pub internet_gateway_id: Token,
}
resource_type!(VpcGatewayAttachmentProps, "AWS::EC2::VPCGatewayAttachment");

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct RouteTableProps {
    pub vpc_id: Token,
    pub tags: Vec<Tag>,
}
resource_type!(RouteTableProps, "AWS::EC2::RouteTable");

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SubnetProps {
    pub vpc_id: Token,
    pub cidr_block: String,
    pub availability_zone: String,
    pub map_public_ip_on_launch: bool,
    pub tags: Vec<Tag>,
}
resource_type!(SubnetProps, "AWS::EC2::Subnet");

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SubnetRouteTableAssociationProps {
    pub subnet_id: Token,
    pub route_table_id: Token,
}
resource_type!(
    SubnetRouteTableAssociationProps,
    "AWS::EC2::SubnetRouteTableAssociation"
);

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct RouteProps {
    pub route_table_id: Token,
    pub destination_cidr_block: String,
    pub gateway_id: Token,
}
resource_type!(RouteProps, "AWS::EC2::Route");

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct EgressRule {
    pub ip_protocol: String,
    pub cidr_ip: String,
}

impl EgressRule {
    pub fn allow_all() -> Self {
        Self {
            ip_protocol: "-1".to_string(),
            cidr_ip: crate::constants::ANY_IPV4.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct IngressRule {
    pub ip_protocol: String,
    pub from_port: u16,
    pub to_port: u16,
    pub cidr_ip: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SecurityGroupProps {
    pub group_description: String,
    pub group_name: String,
    pub vpc_id: Token,
    pub security_group_egress: Vec<EgressRule>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub security_group_ingress: Vec<IngressRule>,
    pub tags: Vec<Tag>,
}
resource_type!(SecurityGroupProps, "AWS::EC2::SecurityGroup");

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SecurityGroupIngressProps {
    pub group_id: Token,
    pub ip_protocol: String,
    pub from_port: u16,
    pub to_port: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cidr_ip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_security_group_id: Option<Token>,
    pub description: String,
}
resource_type!(SecurityGroupIngressProps, "AWS::EC2::SecurityGroupIngress");

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct LogGroupProps {
    pub log_group_name: String,
    pub retention_in_days: u32,
}
resource_type!(LogGroupProps, "AWS::Logs::LogGroup");

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct RoleProps {
    pub assume_role_policy_document: PolicyDocument,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub managed_policy_arns: Vec<Value>,
}
resource_type!(RoleProps, "AWS::IAM::Role");

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyProps {
    pub policy_document: PolicyDocument,
    pub policy_name: String,
    pub roles: Vec<Token>,
}
resource_type!(PolicyProps, "AWS::IAM::Policy");

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyDocument {
    pub statement: Vec<PolicyStatement>,
    pub version: String,
}

impl PolicyDocument {
    pub fn new(statement: Vec<PolicyStatement>) -> Self {
        Self {
            statement,
            version: "2012-10-17".to_string(),
        }
    }

    /// Trust policy letting the given service principal assume a role.
    pub fn assumed_by(service: &str) -> Self {
        Self::new(vec![PolicyStatement {
            action: vec!["sts:AssumeRole".to_string()],
            effect: "Allow".to_string(),
            principal: Some(serde_json::json!({ "Service": service })),
            resource: None,
        }])
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyStatement {
    pub action: Vec<String>,
    pub effect: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub principal: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<Token>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct FlowLogProps {
    pub resource_id: Token,
    pub resource_type: String,
    pub traffic_type: String,
    pub deliver_logs_permission_arn: Token,
    pub log_destination_type: String,
    pub log_group_name: Token,
}
resource_type!(FlowLogProps, "AWS::EC2::FlowLog");

#[derive(Debug, Clone, Default, Serialize)]
pub struct EipProps {}
resource_type!(EipProps, "AWS::EC2::EIP");

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct EipAssociationProps {
    pub allocation_id: Token,
    pub network_interface_id: Token,
}
resource_type!(EipAssociationProps, "AWS::EC2::EIPAssociation");

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct NetworkInterfaceProps {
    pub subnet_id: Token,
    pub group_set: Vec<Token>,
    pub source_dest_check: bool,
    pub description: String,
}
resource_type!(NetworkInterfaceProps, "AWS::EC2::NetworkInterface");

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct InstanceProfileProps {
    pub roles: Vec<Token>,
    pub instance_profile_name: String,
}
resource_type!(InstanceProfileProps, "AWS::IAM::InstanceProfile");

/// One entry of an instance's `NetworkInterfaces` list.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct InstanceNetworkInterface {
    /// CloudFormation takes the device index as a string.
    pub device_index: String,
    pub network_interface_id: Token,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct InstanceProps {
    pub instance_type: String,
    pub image_id: String,
    pub key_name: String,
    pub network_interfaces: Vec<InstanceNetworkInterface>,
    pub iam_instance_profile: Token,
    pub tags: Vec<Tag>,
}
resource_type!(InstanceProps, "AWS::EC2::Instance");

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SsmParameterProps {
    pub name: String,
    #[serde(rename = "Type")]
    pub parameter_type: String,
    pub value: String,
    pub description: String,
    pub tier: ParameterTier,
}
resource_type!(SsmParameterProps, "AWS::SSM::Parameter");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ParameterTier {
    Standard,
    Advanced,
    #[serde(rename = "Intelligent-Tiering")]
    IntelligentTiering,
}
