// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

pub const DEFAULT_TABLE_NAME: &str = "Visitor_Count";

/// Overrides [`DEFAULT_TABLE_NAME`] when set.
pub const TABLE_NAME_ENV: &str = "VISITOR_TABLE_NAME";

pub const RECORD_ID_KEY: &str = "record_id";
pub const RECORD_ID: &str = "0";
pub const RECORD_COUNT_FIELD: &str = "record_count";
