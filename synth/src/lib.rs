// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

//! # vSRX Synth
//!
//! Synthesizes the CloudFormation templates for a Juniper vSRX firewall
//! deployment: Parameter Store values, the VPC it lives in, and the instance.
//!
//! ## Architecture
//!
//! ```text
//! options -> stacks (parameters, vpc, appliance) -> assembly -> cdk.out/
//!                 |
//!                 +-> context file <- lookups (SSM, EC2 DescribeImages)
//! ```
//!
//! Stacks are built synchronously from constant tables and looked-up values.
//! Nothing here provisions resources; the written templates and manifest are
//! handed to CloudFormation by whatever deploys them, in the manifest's
//! deploy order.
//!
//! ## Modules
//!
//! - [`application`]: synthesis passes and lookup resolution
//! - [`assembly`]: cross-stack exports, deploy order, manifest and output files
//! - [`configuration`]: CLI argument parsing with clap
//! - [`constants`]: parameter names, the subnet CIDR table and other fixed values
//! - [`context`]: cached synthesis-time lookup values
//! - [`errors`]: the synthesis error type
//! - [`lookups`]: AWS-backed resolution of missing context
//! - [`models`]: subnet tiers, parameter values, allow-list parsing
//! - [`resources`]: typed CloudFormation resource properties
//! - [`stack`]: a template under construction
//! - [`stacks`]: the three stack definitions
//! - [`template`]: CloudFormation template model
//!
//! ## Usage
//!
//! ```bash
//! vsrx-synth --region us-east-1 --account 123456789012 --approved-ip 198.51.100.10/32
//! ```

pub mod application;
pub mod assembly;
pub mod configuration;
pub mod constants;
pub mod context;
pub mod errors;
pub mod lookups;
pub mod models;
pub mod resources;
pub mod stack;
pub mod stacks;
pub mod template;
