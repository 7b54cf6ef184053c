// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

use std::path::PathBuf;

use clap::{ArgAction, Parser};

use crate::constants::{
    DEFAULT_AMI_NAME, DEFAULT_APPROVED_MANAGEMENT_IP, DEFAULT_INSTANCE_TYPE, DEFAULT_KEY_PAIR_NAME,
};
use crate::models::ParameterValues;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct SynthOptions {
    #[arg(long, default_value = "us-east-1", env("AWS_REGION"))]
    pub region: String,
    #[arg(long, env("CDK_DEFAULT_ACCOUNT"))]
    pub account: Option<String>,
    #[arg(long, default_value = "cdk.out", env("VSRX_OUTPUT_DIR"))]
    pub output: PathBuf,
    #[arg(long, default_value = "vsrx.context.json", env("VSRX_CONTEXT_FILE"))]
    pub context_file: PathBuf,
    #[arg(long = "approved-ip", default_value = DEFAULT_APPROVED_MANAGEMENT_IP, env("VSRX_APPROVED_IPS"), value_delimiter = ',')]
    pub approved_ips: Vec<String>,
    #[arg(long, default_value = DEFAULT_AMI_NAME, env("VSRX_AMI_NAME"))]
    pub ami_name: String,
    #[arg(long, default_value = DEFAULT_INSTANCE_TYPE, env("VSRX_INSTANCE_TYPE"))]
    pub instance_type: String,
    #[arg(long, default_value = DEFAULT_KEY_PAIR_NAME, env("VSRX_KEY_PAIR_NAME"))]
    pub key_pair_name: String,
    #[arg(long, default_value = "false", env("VSRX_SKIP_LOOKUPS"), action = ArgAction::SetTrue)]
    pub skip_lookups: bool,
    #[arg(long, default_value = "false", env("VSRX_LOG_JSON"), action = ArgAction::SetTrue)]
    pub log_json: bool,
}

impl Default for SynthOptions {
    fn default() -> Self {
        SynthOptions {
            region: "us-east-1".to_string(),
            account: None,
            output: PathBuf::from("cdk.out"),
            context_file: PathBuf::from("vsrx.context.json"),
            approved_ips: vec![DEFAULT_APPROVED_MANAGEMENT_IP.to_string()],
            ami_name: DEFAULT_AMI_NAME.to_string(),
            instance_type: DEFAULT_INSTANCE_TYPE.to_string(),
            key_pair_name: DEFAULT_KEY_PAIR_NAME.to_string(),
            skip_lookups: true,
            log_json: false,
        }
    }
}

impl From<&SynthOptions> for ParameterValues {
    fn from(options: &SynthOptions) -> Self {
        ParameterValues {
            approved_management_ips: options.approved_ips.clone(),
            ami_name: options.ami_name.clone(),
            instance_type: options.instance_type.clone(),
            key_pair_name: options.key_pair_name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_defaults() {
        let options = SynthOptions::try_parse_from(["vsrx-synth"]).unwrap();
        assert_eq!(options.ami_name, "junos-vsrx3-x86-64");
        assert_eq!(options.instance_type, "c5.xlarge");
        assert_eq!(options.key_pair_name, "vSRXKeyPair");
        assert_eq!(options.output, PathBuf::from("cdk.out"));
    }

    #[test]
    fn test_parse_approved_ip_list() {
        let options = SynthOptions::try_parse_from([
            "vsrx-synth",
            "--approved-ip",
            "10.1.1.1/32,10.2.2.2/32",
            "--approved-ip",
            "10.3.3.3/32",
            "--skip-lookups",
        ])
        .unwrap();
        assert_eq!(
            options.approved_ips,
            vec!["10.1.1.1/32", "10.2.2.2/32", "10.3.3.3/32"]
        );
        assert!(options.skip_lookups);
    }

    #[test]
    fn test_parameter_values_from_options() {
        let values = ParameterValues::from(&SynthOptions::default());
        assert_eq!(values.approved_management_ips_value(), "198.51.100.10/32");
    }
}
