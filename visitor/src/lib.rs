// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

//! Visitor counter Lambda: reads the page visit count from DynamoDB.

pub mod constants;
pub mod counter;
