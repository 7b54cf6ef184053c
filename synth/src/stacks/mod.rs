// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

//! The three vSRX stacks.
//!
//! - [`parameters`]: Parameter Store seeding, no dependencies
//! - [`network`]: VPC topology, reads the management allow-list
//! - [`appliance`]: vSRX instance, uses network outputs and parameter values

pub mod appliance;
pub mod network;
pub mod parameters;
