// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

//! The vSRX VPC: subnets in three zones, route tables, the internet gateway,
//! security groups and VPC flow logs.
//!
//! Subnets come from the fixed CIDR table in [`crate::constants`], one per
//! (tier, zone). Management SSH ingress is generated from the allow-list in
//! Parameter Store, one rule per entry, so the number of ingress resources
//! depends on a value read at synthesis time.

use std::collections::BTreeMap;

use crate::constants::{
    ANY_IPV4, APPROVED_MANAGEMENT_IPS_PARAMETER, FLOW_LOG_GROUP_NAME, FLOW_LOG_RETENTION_DAYS,
    FLOW_LOGS_SERVICE_PRINCIPAL, HTTPS_PORT, MAX_PORT, NETWORK_STACK_NAME, SSH_PORT, VPC_CIDR,
    ZONES,
};
use crate::context::{Context, is_placeholder};
use crate::errors::SynthError;
use crate::models::{SubnetTier, parse_approved_cidrs};
use crate::resources::{
    EgressRule, FlowLogProps, IngressRule, InternetGatewayProps, LogGroupProps, PolicyDocument,
    PolicyProps, PolicyStatement, RoleProps, RouteProps, RouteTableProps, SecurityGroupIngressProps,
    SecurityGroupProps, SubnetProps, SubnetRouteTableAssociationProps, VpcGatewayAttachmentProps,
    VpcProps,
};
use crate::stack::{Environment, Stack};
use crate::template::{Reference, RemovalPolicy, Token, name_tag};

/// Handles to network resources other stacks attach to.
#[derive(Debug, Clone)]
pub struct NetworkRefs {
    pub vpc: Reference,
    pub subnets: BTreeMap<(SubnetTier, char), Reference>,
    pub management_sg: Reference,
    pub public_sg: Reference,
    pub private_sg: Reference,
}

impl NetworkRefs {
    pub fn subnet(&self, tier: SubnetTier, zone: char) -> Result<&Reference, SynthError> {
        self.subnets
            .get(&(tier, zone))
            .ok_or_else(|| SynthError::UnknownResource(format!("{tier} subnet in zone {zone}")))
    }
}

#[derive(Debug, Clone)]
pub struct NetworkStack {
    pub stack: Stack,
    pub refs: NetworkRefs,
}

struct RouteTables {
    public: Reference,
    management: Reference,
    private: BTreeMap<char, Reference>,
    tgw: BTreeMap<char, Reference>,
}

impl RouteTables {
    fn for_subnet(&self, tier: SubnetTier, zone: char) -> &Reference {
        match tier {
            SubnetTier::Public => &self.public,
            SubnetTier::Management => &self.management,
            SubnetTier::Private => &self.private[&zone],
            SubnetTier::Tgw => &self.tgw[&zone],
        }
    }
}

#[tracing::instrument(skip(context))]
pub fn build(env: Environment, context: &mut Context) -> Result<NetworkStack, SynthError> {
    let mut stack = Stack::new(NETWORK_STACK_NAME, env.clone())
        .with_description("vSRX VPC, subnets, routing, security groups and flow logs");

    let vpc = stack.add(
        "vSRX-VPC",
        VpcProps {
            cidr_block: VPC_CIDR.to_string(),
            enable_dns_hostnames: true,
            enable_dns_support: true,
            tags: name_tag("vSRX-VPC"),
        },
    )?;
    let vpc_id = stack.resolve(&vpc);

    let igw = stack.add(
        "vSRX-IGW",
        InternetGatewayProps {
            tags: name_tag("vSRX-IGW"),
        },
    )?;
    let igw_id = stack.resolve(&igw);

    stack.add(
        "vSRX-VPCGW-Attachment",
        VpcGatewayAttachmentProps {
            vpc_id: vpc_id.clone(),
            internet_gateway_id: igw_id.clone(),
        },
    )?;

    let route_tables = add_route_tables(&mut stack, &vpc_id)?;
    let subnets = add_subnets(&mut stack, &env, &vpc_id, &route_tables)?;

    for (id, table) in [
        ("vSRX-Management-IGW-Route", &route_tables.management),
        ("vSRX-Public-IGW-Route", &route_tables.public),
    ] {
        let route_table_id = stack.resolve(table);
        stack.add(
            id,
            RouteProps {
                route_table_id,
                destination_cidr_block: ANY_IPV4.to_string(),
                gateway_id: igw_id.clone(),
            },
        )?;
    }

    let management_sg = add_security_group(
        &mut stack,
        "vSRX-Management-SG",
        "Security group for vSRX management",
        &vpc_id,
        Vec::new(),
    )?;
    let approved = approved_management_cidrs(context, &env)?;
    add_management_ingress(&mut stack, &management_sg, &approved)?;

    let public_sg = add_security_group(
        &mut stack,
        "vSRX-Public-SG",
        "Security group for vSRX public access",
        &vpc_id,
        vec![IngressRule {
            ip_protocol: "tcp".to_string(),
            from_port: HTTPS_PORT,
            to_port: HTTPS_PORT,
            cidr_ip: ANY_IPV4.to_string(),
            description: "Allow HTTPS traffic from anywhere".to_string(),
        }],
    )?;

    let private_sg = add_security_group(
        &mut stack,
        "vSRX-Private-SG",
        "Security group for vSRX private access",
        &vpc_id,
        Vec::new(),
    )?;
    let private_sg_id = stack.resolve(&private_sg);
    stack.add(
        "vSRX-Private-SG-SelfIngress",
        SecurityGroupIngressProps {
            group_id: private_sg_id.clone(),
            ip_protocol: "tcp".to_string(),
            from_port: 0,
            to_port: MAX_PORT,
            cidr_ip: None,
            source_security_group_id: Some(private_sg_id),
            description: "Allow all TCP traffic from vSRX-Private-SG".to_string(),
        },
    )?;

    add_flow_logs(&mut stack, &vpc_id)?;

    stack.add_output("vSRX-VPC-ID", &vpc)?;
    stack.add_output("vSRX-Management-SG-ID", &management_sg)?;
    stack.add_output("vSRX-Public-SG-ID", &public_sg)?;
    stack.add_output("vSRX-Private-SG-ID", &private_sg)?;
    stack.add_output("vSRX-Management-RT-ID", &route_tables.management)?;
    stack.add_output("vSRX-Public-RT-ID", &route_tables.public)?;
    for (zone, table) in &route_tables.private {
        stack.add_output(&format!("vSRX-Private-RT-ID-{}", zone.to_ascii_uppercase()), table)?;
    }
    for ((tier, zone), subnet) in &subnets {
        stack.add_output(
            &format!("vSRX-{}1{}-Subnet-ID", tier, zone.to_ascii_uppercase()),
            subnet,
        )?;
    }

    tracing::debug!(
        "[synth] {} resources in {}",
        stack.template().resources.len(),
        stack.name()
    );

    Ok(NetworkStack {
        stack,
        refs: NetworkRefs {
            vpc,
            subnets,
            management_sg,
            public_sg,
            private_sg,
        },
    })
}

fn add_route_tables(stack: &mut Stack, vpc_id: &Token) -> Result<RouteTables, SynthError> {
    let mut add_table = |id: String, name: String| {
        stack.add(
            &id,
            RouteTableProps {
                vpc_id: vpc_id.clone(),
                tags: name_tag(name),
            },
        )
    };

    let public = add_table("vSRX-Public-RT".into(), "vSRX-Public-RT".into())?;
    let management = add_table("vSRX-Management-RT".into(), "vSRX-Management-RT".into())?;

    let mut private = BTreeMap::new();
    let mut tgw = BTreeMap::new();
    for zone in ZONES {
        let upper = zone.to_ascii_uppercase();
        private.insert(
            zone,
            add_table(format!("vSRX-Private-RT-{zone}"), format!("vSRX-Private-RT-{upper}"))?,
        );
        tgw.insert(
            zone,
            add_table(format!("vSRX-TGW-RT-{zone}"), format!("vSRX-TGW-RT-{upper}"))?,
        );
    }

    Ok(RouteTables {
        public,
        management,
        private,
        tgw,
    })
}

fn add_subnets(
    stack: &mut Stack,
    env: &Environment,
    vpc_id: &Token,
    route_tables: &RouteTables,
) -> Result<BTreeMap<(SubnetTier, char), Reference>, SynthError> {
    let mut subnets = BTreeMap::new();

    for tier in SubnetTier::ALL {
        for (zone, cidr) in ZONES.into_iter().zip(tier.cidrs()) {
            let upper = zone.to_ascii_uppercase();
            let subnet = stack.add(
                &format!("vSRX-{tier}-Subnet-{zone}"),
                SubnetProps {
                    vpc_id: vpc_id.clone(),
                    cidr_block: cidr.to_string(),
                    availability_zone: env.availability_zone(zone),
                    map_public_ip_on_launch: tier.is_internet_facing(),
                    tags: name_tag(format!("vSRX-{tier}-Subnet-{upper}")),
                },
            )?;

            let subnet_id = stack.resolve(&subnet);
            let route_table_id = stack.resolve(route_tables.for_subnet(tier, zone));
            stack.add(
                &format!("vSRX-{tier}-RTAssoc-{zone}"),
                SubnetRouteTableAssociationProps {
                    subnet_id,
                    route_table_id,
                },
            )?;

            subnets.insert((tier, zone), subnet);
        }
    }

    Ok(subnets)
}

fn add_security_group(
    stack: &mut Stack,
    name: &str,
    description: &str,
    vpc_id: &Token,
    ingress: Vec<IngressRule>,
) -> Result<Reference, SynthError> {
    stack.add(
        name,
        SecurityGroupProps {
            group_description: description.to_string(),
            group_name: name.to_string(),
            vpc_id: vpc_id.clone(),
            security_group_egress: vec![EgressRule::allow_all()],
            security_group_ingress: ingress,
            tags: name_tag(name),
        },
    )
}

/// Reads the allow-list parameter. While it is unresolved the placeholder is
/// used as a single entry so the first pass still yields a complete graph.
fn approved_management_cidrs(
    context: &mut Context,
    env: &Environment,
) -> Result<Vec<String>, SynthError> {
    let value = context.ssm_parameter(env, APPROVED_MANAGEMENT_IPS_PARAMETER);
    if is_placeholder(&value) {
        return Ok(vec![value]);
    }
    parse_approved_cidrs(&value)
}

fn add_management_ingress(
    stack: &mut Stack,
    management_sg: &Reference,
    approved: &[String],
) -> Result<(), SynthError> {
    let group_id = stack.resolve(management_sg);
    for (i, cidr) in approved.iter().enumerate() {
        stack.add(
            &format!("vSRX-Management-SG-Ingress-{i}"),
            SecurityGroupIngressProps {
                group_id: group_id.clone(),
                ip_protocol: "tcp".to_string(),
                from_port: SSH_PORT,
                to_port: SSH_PORT,
                cidr_ip: Some(cidr.clone()),
                source_security_group_id: None,
                description: format!("Allow approved IP {cidr} for SSH"),
            },
        )?;
    }
    tracing::debug!("[synth] {} management ingress rules", approved.len());
    Ok(())
}

fn add_flow_logs(stack: &mut Stack, vpc_id: &Token) -> Result<(), SynthError> {
    let log_group = stack.add_with_policy(
        "vSRX-VPC-Flow-LogGroup",
        LogGroupProps {
            log_group_name: FLOW_LOG_GROUP_NAME.to_string(),
            retention_in_days: FLOW_LOG_RETENTION_DAYS,
        },
        Some(RemovalPolicy::Delete),
    )?;

    let role = stack.add(
        "vSRX-VPCFlowLogRole",
        RoleProps {
            assume_role_policy_document: PolicyDocument::assumed_by(FLOW_LOGS_SERVICE_PRINCIPAL),
            managed_policy_arns: Vec::new(),
        },
    )?;
    let role_id = stack.resolve(&role);
    let log_group_arn = stack.resolve(&log_group.attr("Arn"));

    let policy = stack.add(
        "vSRX-VPCFlowLogRole-DefaultPolicy",
        PolicyProps {
            policy_document: PolicyDocument::new(vec![PolicyStatement {
                action: vec![
                    "logs:CreateLogGroup".to_string(),
                    "logs:CreateLogStream".to_string(),
                    "logs:PutLogEvents".to_string(),
                ],
                effect: "Allow".to_string(),
                principal: None,
                resource: Some(log_group_arn),
            }]),
            policy_name: "vSRXVPCFlowLogRoleDefaultPolicy".to_string(),
            roles: vec![role_id],
        },
    )?;

    let role_arn = stack.resolve(&role.attr("Arn"));
    let log_group_name = stack.resolve(&log_group);
    let flow_log = stack.add(
        "vSRX-VPC-Flow-Log",
        FlowLogProps {
            resource_id: vpc_id.clone(),
            resource_type: "VPC".to_string(),
            traffic_type: "ALL".to_string(),
            deliver_logs_permission_arn: role_arn,
            log_destination_type: "cloud-watch-logs".to_string(),
            log_group_name,
        },
    )?;

    // the role needs its policy before the flow log can deliver
    if let Some(resource) = stack.template_mut().resources.get_mut(&flow_log.logical_id) {
        resource.depends_on.push(policy.logical_id);
    }

    Ok(())
}
