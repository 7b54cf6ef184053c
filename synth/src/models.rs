// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

use std::fmt;
use std::net::Ipv4Addr;

use serde::{Deserialize, Serialize};

use crate::constants::{
    MANAGEMENT_SUBNET_CIDRS, PRIVATE_SUBNET_CIDRS, PUBLIC_SUBNET_CIDRS, TGW_SUBNET_CIDRS,
};
use crate::errors::SynthError;

/// The four subnet tiers of the vSRX VPC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SubnetTier {
    Public,
    Management,
    Private,
    #[serde(rename = "TGW")]
    Tgw,
}

impl SubnetTier {
    pub const ALL: [SubnetTier; 4] = [
        SubnetTier::Public,
        SubnetTier::Management,
        SubnetTier::Private,
        SubnetTier::Tgw,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SubnetTier::Public => "Public",
            SubnetTier::Management => "Management",
            SubnetTier::Private => "Private",
            SubnetTier::Tgw => "TGW",
        }
    }

    /// CIDR blocks for this tier, one per zone.
    pub fn cidrs(&self) -> &'static [&'static str; 3] {
        match self {
            SubnetTier::Public => &PUBLIC_SUBNET_CIDRS,
            SubnetTier::Management => &MANAGEMENT_SUBNET_CIDRS,
            SubnetTier::Private => &PRIVATE_SUBNET_CIDRS,
            SubnetTier::Tgw => &TGW_SUBNET_CIDRS,
        }
    }

    /// Internet-facing tiers get public IPs on launch and a default route.
    pub fn is_internet_facing(&self) -> bool {
        matches!(self, SubnetTier::Public | SubnetTier::Management)
    }
}

impl fmt::Display for SubnetTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Values written to Parameter Store by the parameter stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterValues {
    pub approved_management_ips: Vec<String>,
    pub ami_name: String,
    pub instance_type: String,
    pub key_pair_name: String,
}

impl ParameterValues {
    /// The allow-list as stored: one entry per line.
    pub fn approved_management_ips_value(&self) -> String {
        self.approved_management_ips.join("\n")
    }
}

/// Splits the newline-delimited allow-list into validated IPv4 CIDR blocks.
///
/// Blank lines are skipped and surrounding whitespace trimmed.
pub fn parse_approved_cidrs(value: &str) -> Result<Vec<String>, SynthError> {
    value
        .split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| validate_ipv4_cidr(line).map(|_| line.to_string()))
        .collect()
}

fn validate_ipv4_cidr(cidr: &str) -> Result<(), SynthError> {
    let invalid = || SynthError::InvalidCidr(cidr.to_string());

    let (address, prefix) = cidr.split_once('/').ok_or_else(invalid)?;
    address.parse::<Ipv4Addr>().map_err(|_| invalid())?;
    let prefix: u8 = prefix.parse().map_err(|_| invalid())?;
    if prefix > 32 {
        return Err(invalid());
    }
    Ok(())
}
